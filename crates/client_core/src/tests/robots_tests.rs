use super::*;
use axum::{http::StatusCode, routing::get, Json, Router};
use tokio::{net::TcpListener, time::timeout};

async fn spawn_api(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn two_robots() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "robots": [
            { "id": 1, "x": 5, "y": 5 },
            { "id": 2, "x": 10.5, "y": 3, "heading": "north" }
        ]
    }))
}

#[tokio::test]
async fn fetches_robot_positions_in_order() {
    let base = spawn_api(Router::new().route("/robots", get(two_robots))).await;
    let feed = RobotFeed::new(format!("{base}/"));
    assert_eq!(feed.base_url(), base);

    let robots = feed.robot_positions().await;
    assert_eq!(
        robots,
        vec![
            RobotPosition { id: Some(1), x: 5.0, y: 5.0 },
            RobotPosition { id: Some(2), x: 10.5, y: 3.0 },
        ]
    );
}

#[tokio::test]
async fn unreachable_endpoint_degrades_to_empty() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");

    let feed = RobotFeed::new(format!("http://{addr}"));
    assert!(matches!(
        feed.try_robot_positions().await,
        Err(FeedError::Transport(_))
    ));
    assert!(feed.robot_positions().await.is_empty());
}

#[tokio::test]
async fn server_error_degrades_to_empty() {
    let app = Router::new().route(
        "/robots",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let feed = RobotFeed::new(spawn_api(app).await);
    assert!(matches!(
        feed.try_robot_positions().await,
        Err(FeedError::Status(500))
    ));
    assert!(feed.robot_positions().await.is_empty());
}

#[tokio::test]
async fn malformed_body_degrades_to_empty() {
    let app = Router::new().route("/robots", get(|| async { "not json at all" }));
    let feed = RobotFeed::new(spawn_api(app).await);
    assert!(matches!(
        feed.try_robot_positions().await,
        Err(FeedError::Decode(_))
    ));
    assert!(feed.robot_positions().await.is_empty());
}

#[tokio::test]
async fn body_without_robots_field_degrades_to_empty() {
    let app = Router::new().route(
        "/robots",
        get(|| async { Json(serde_json::json!({ "bots": [{ "x": 1, "y": 1 }] })) }),
    );
    let feed = RobotFeed::new(spawn_api(app).await);
    assert!(feed.robot_positions().await.is_empty());
}

#[tokio::test]
async fn poller_forwards_results_and_stops_when_session_is_gone() {
    let base = spawn_api(Router::new().route("/robots", get(two_robots))).await;
    let (tx, mut rx) = mpsc::channel(4);
    let handle = RobotFeed::new(base).spawn_poller(Duration::from_millis(20), tx);

    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("poll in time")
        .expect("event");
    match event {
        SessionEvent::RobotsUpdated(robots) => assert_eq!(robots.len(), 2),
        other => panic!("unexpected event: {other:?}"),
    }

    drop(rx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("poller exits")
        .expect("poller task");
}

#[tokio::test]
async fn zero_poll_interval_is_raised_to_the_minimum() {
    let base = spawn_api(Router::new().route("/robots", get(two_robots))).await;
    let (tx, mut rx) = mpsc::channel(4);
    let handle = RobotFeed::new(base).spawn_poller(Duration::ZERO, tx);

    for _ in 0..2 {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("poll in time")
            .expect("event");
        assert!(matches!(event, SessionEvent::RobotsUpdated(ref robots) if robots.len() == 2));
    }
    assert!(!handle.is_finished());

    drop(rx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("poller exits")
        .expect("poller task");
}
