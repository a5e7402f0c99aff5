//! Session object for one mounted view and its single-consumer event loop.
//!
//! Producers (key listener, pointer clicks, robot poller) push typed
//! [`SessionEvent`]s into one queue; [`WarehouseSession::run`] handles them one
//! at a time in arrival order. Each event touches exactly one component, and
//! the components never share state.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{CellCoord, DirectionalAction, KeyEvent, LatLng, MapPoint},
    protocol::RobotPosition,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::{
    dispatcher::{ChannelEvent, ChannelState, CommandDispatcher, DEFAULT_SIMULATOR_URL},
    grid::{GridObjectStore, GridSnapshot, DEFAULT_GRID_SIZE},
    points::PointRegistry,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub simulator_url: String,
    pub grid_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            simulator_url: DEFAULT_SIMULATOR_URL.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Key(KeyEvent),
    CellClick(CellCoord),
    Zoom(f64),
    /// `label` is the operator's answer to the type prompt; `None` when the
    /// prompt was cancelled.
    MapClick {
        position: LatLng,
        label: Option<String>,
    },
    RobotsUpdated(Vec<RobotPosition>),
    Render,
    Unmount,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Grid(GridSnapshot),
    Points(Vec<MapPoint>),
    ActionDispatched(DirectionalAction),
    Robots(Vec<RobotPosition>),
    ChannelClosed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub events_handled: u64,
    pub actions_sent: u64,
    pub grid: GridSnapshot,
    pub points: Vec<MapPoint>,
}

pub struct WarehouseSession {
    grid: GridObjectStore,
    points: PointRegistry,
    dispatcher: CommandDispatcher,
    robots: Vec<RobotPosition>,
    updates: broadcast::Sender<ViewUpdate>,
    handled: u64,
}

impl WarehouseSession {
    /// Builds the seeded state and opens the simulator channel eagerly.
    pub async fn mount(options: SessionOptions) -> Self {
        let dispatcher = CommandDispatcher::open(&options.simulator_url).await;
        Self::with_dispatcher(options.grid_size, dispatcher)
    }

    pub fn with_dispatcher(grid_size: usize, dispatcher: CommandDispatcher) -> Self {
        let (updates, _) = broadcast::channel(256);
        info!(
            grid_size,
            simulator = %dispatcher.url(),
            channel_open = dispatcher.state() == ChannelState::Open,
            "session: mounted"
        );
        Self {
            grid: GridObjectStore::new(grid_size),
            points: PointRegistry::seeded(),
            dispatcher,
            robots: Vec::new(),
            updates,
            handled: 0,
        }
    }

    pub fn grid(&self) -> &GridObjectStore {
        &self.grid
    }

    pub fn points(&self) -> &PointRegistry {
        &self.points
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn robots(&self) -> &[RobotPosition] {
        &self.robots
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewUpdate> {
        self.updates.subscribe()
    }

    /// Handles one event to completion. `Break` means the view asked to
    /// unmount.
    pub async fn handle(&mut self, event: SessionEvent) -> ControlFlow<()> {
        self.handled += 1;
        match event {
            SessionEvent::Key(key) => {
                if let Some(action) = self.dispatcher.handle_key(&key).await {
                    self.publish(ViewUpdate::ActionDispatched(action));
                }
            }
            SessionEvent::CellClick(coord) => {
                self.grid.cycle(coord);
                self.publish(ViewUpdate::Grid(self.grid.snapshot()));
            }
            SessionEvent::Zoom(factor) => {
                self.grid.zoom(factor);
                self.publish(ViewUpdate::Grid(self.grid.snapshot()));
            }
            SessionEvent::MapClick { position, label } => {
                if self.points.add_labelled(label.as_deref(), position).is_some() {
                    self.publish(ViewUpdate::Points(self.points.points().to_vec()));
                }
            }
            SessionEvent::RobotsUpdated(robots) => {
                debug!(count = robots.len(), "session: robot positions updated");
                self.robots = robots;
                self.publish(ViewUpdate::Robots(self.robots.clone()));
            }
            SessionEvent::Render => {
                self.publish(ViewUpdate::Grid(self.grid.snapshot()));
                self.publish(ViewUpdate::Points(self.points.points().to_vec()));
                self.publish(ViewUpdate::Robots(self.robots.clone()));
            }
            SessionEvent::Unmount => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Consumes events until `Unmount` arrives or every producer is gone, then
    /// tears the session down. The receiver is dropped before the channel is
    /// closed, so no producer can reach the session after this returns.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) -> SessionSummary {
        let mut channel = self.dispatcher.subscribe();
        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => {
                        if self.handle(event).await.is_break() {
                            break;
                        }
                    }
                    None => break,
                },
                Ok(ChannelEvent::Closed { reason }) = channel.recv() => {
                    self.publish(ViewUpdate::ChannelClosed { reason });
                }
            }
        }
        events.close();
        drop(events);
        self.unmount().await
    }

    pub async fn unmount(mut self) -> SessionSummary {
        self.dispatcher.close().await;
        let summary = SessionSummary {
            events_handled: self.handled,
            actions_sent: self.dispatcher.sent_count(),
            grid: self.grid.snapshot(),
            points: self.points.points().to_vec(),
        };
        info!(
            events = summary.events_handled,
            actions_sent = summary.actions_sent,
            placed_cells = self.grid.occupied_count(),
            points = summary.points.len(),
            "session: unmounted"
        );
        summary
    }

    fn publish(&self, update: ViewUpdate) {
        let _ = self.updates.send(update);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
