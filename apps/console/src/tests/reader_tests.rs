use std::time::Duration;

use client_core::{dispatcher::CommandDispatcher, WarehouseSession};
use shared::domain::LatLng;
use tokio::time::timeout;

use super::*;

fn offline_feed() -> RobotFeed {
    RobotFeed::new("http://127.0.0.1:9")
}

async fn read_all(input: &[u8], grid_size: usize) -> (Vec<SessionEvent>, String) {
    let (tx, mut rx) = mpsc::channel(64);
    let mut feedback = Vec::new();
    CommandReader::new(tx, offline_feed(), grid_size)
        .run(input, &mut feedback)
        .await;

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (events, String::from_utf8(feedback).expect("utf8 feedback"))
}

fn map_click(label: Option<&str>) -> SessionEvent {
    SessionEvent::MapClick {
        position: LatLng::new(1.0, 2.0),
        label: label.map(str::to_string),
    }
}

#[tokio::test]
async fn map_prompt_reads_the_label_from_the_next_line() {
    let (events, feedback) = read_all(b"map 1 2\n\nmap 1 2\nDock\n", 20).await;
    assert_eq!(
        events,
        vec![
            SessionEvent::Render,
            map_click(None),
            map_click(Some("Dock")),
            SessionEvent::Unmount,
        ]
    );
    assert_eq!(feedback.matches("type for point at").count(), 2);
}

#[tokio::test]
async fn end_of_input_during_the_prompt_cancels() {
    let (events, _) = read_all(b"map 1 2\n", 20).await;
    assert_eq!(
        events,
        vec![SessionEvent::Render, map_click(None), SessionEvent::Unmount]
    );
}

#[tokio::test]
async fn bad_lines_are_reported_and_skipped() {
    let (events, feedback) = read_all(b"jump\n\nclick 25 1\nclick 1 1\r\n", 20).await;
    assert_eq!(
        events,
        vec![
            SessionEvent::Render,
            SessionEvent::CellClick(CellCoord::new(1, 1)),
            SessionEvent::Unmount,
        ]
    );
    assert!(feedback.contains("unknown command 'jump'"));
    assert!(feedback.contains("outside the 20x20 grid"));
}

#[tokio::test]
async fn undecodable_lines_do_not_stop_input() {
    let (events, feedback) = read_all(b"show\n\xff\xfe\nkey ArrowUp\n", 20).await;
    assert_eq!(
        events,
        vec![
            SessionEvent::Render,
            SessionEvent::Render,
            SessionEvent::Key(KeyEvent::press("ArrowUp")),
            SessionEvent::Unmount,
        ]
    );
    assert!(feedback.contains("not valid UTF-8"));
}

#[tokio::test]
async fn quit_ends_input_and_unmounts() {
    let (events, _) = read_all(b"key ArrowLeft repeat\nquit\nkey ArrowUp\n", 20).await;
    assert_eq!(
        events,
        vec![
            SessionEvent::Render,
            SessionEvent::Key(KeyEvent::repeat("ArrowLeft")),
            SessionEvent::Unmount,
        ]
    );
}

#[tokio::test]
async fn session_shuts_down_while_another_producer_is_alive() {
    let session =
        WarehouseSession::with_dispatcher(20, CommandDispatcher::closed("ws://127.0.0.1:9"));
    let (tx, rx) = mpsc::channel(16);
    // Stands in for the robot poller, which keeps its own sender.
    let _poller_sender = tx.clone();

    let reader = CommandReader::new(tx, offline_feed(), 20);
    let input: &[u8] = b"click 0 0\n\xff\xfe\n";
    let run = tokio::spawn(session.run(rx));
    reader.run(input, tokio::io::sink()).await;

    let summary = timeout(Duration::from_secs(5), run)
        .await
        .expect("session torn down")
        .expect("session task");
    assert_eq!(summary.events_handled, 3);
}
