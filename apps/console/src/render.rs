use std::fmt::Write;

use client_core::{GridSnapshot, SessionSummary, ViewUpdate};
use shared::{
    domain::{MapPoint, ObjectKind},
    protocol::RobotPosition,
};

fn glyph(kind: ObjectKind) -> char {
    match kind {
        ObjectKind::None => '.',
        ObjectKind::Qr => 'Q',
        ObjectKind::Robot => 'R',
        ObjectKind::Charging => 'C',
    }
}

pub fn render_update(update: &ViewUpdate) -> String {
    match update {
        ViewUpdate::Grid(snapshot) => render_grid(snapshot),
        ViewUpdate::Points(points) => render_points(points),
        ViewUpdate::Robots(robots) => render_robots(robots),
        ViewUpdate::ActionDispatched(action) => format!("> {}", action.as_str()),
        ViewUpdate::ChannelClosed { reason } => format!("simulator channel closed: {reason}"),
    }
}

pub fn render_grid(snapshot: &GridSnapshot) -> String {
    let mut out = format!(
        "grid {size}x{size} zoom {zoom:.2}\n",
        size = snapshot.size,
        zoom = snapshot.zoom
    );
    for row in &snapshot.rows {
        out.extend(row.iter().map(|kind| glyph(*kind)));
        out.push('\n');
    }
    out.push_str("legend: Q=QR R=Robot C=Charging");
    out
}

pub fn render_points(points: &[MapPoint]) -> String {
    let mut out = format!("map points ({})", points.len());
    for point in points {
        let _ = write!(
            out,
            "\n  #{} {} @ {:.5}, {:.5}",
            point.id.0, point.kind, point.position.lat, point.position.lng
        );
    }
    out
}

pub fn render_robots(robots: &[RobotPosition]) -> String {
    if robots.is_empty() {
        return "robots: none reported".to_string();
    }
    let mut out = format!("robots ({})", robots.len());
    for robot in robots {
        let id = robot
            .id
            .map(|id| format!("#{id}"))
            .unwrap_or_else(|| "#?".to_string());
        let _ = write!(out, "\n  {id} at ({}, {})", robot.x, robot.y);
    }
    out
}

pub fn render_summary(summary: &SessionSummary) -> String {
    let placed = summary
        .grid
        .rows
        .iter()
        .flatten()
        .filter(|kind| !kind.is_none())
        .count();
    format!(
        "session ended: {} events, {} actions sent, {} cells placed, {} map points",
        summary.events_handled,
        summary.actions_sent,
        placed,
        summary.points.len()
    )
}
