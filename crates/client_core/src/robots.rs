//! Read-only robot-position feed (`GET {base}/robots`).

use std::time::Duration;

use reqwest::Client;
use shared::{
    error::FeedError,
    protocol::{RobotPosition, RobotsResponse},
};
use tokio::{sync::mpsc, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, warn};

use crate::session::SessionEvent;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
/// Shorter poll intervals (including zero) are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct RobotFeed {
    http: Client,
    base_url: String,
}

impl RobotFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Best-effort read: every failure degrades to an empty list.
    pub async fn robot_positions(&self) -> Vec<RobotPosition> {
        match self.try_robot_positions().await {
            Ok(robots) => robots,
            Err(err) => {
                warn!(base_url = %self.base_url, error = %err, "robots: fetch failed, using empty set");
                Vec::new()
            }
        }
    }

    pub async fn try_robot_positions(&self) -> Result<Vec<RobotPosition>, FeedError> {
        let res = self
            .http
            .get(format!("{}/robots", self.base_url))
            .send()
            .await
            .map_err(|err| FeedError::Transport(err.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body: RobotsResponse = res
            .json()
            .await
            .map_err(|err| FeedError::Decode(err.to_string()))?;
        debug!(count = body.robots.len(), "robots: fetched");
        Ok(body.robots)
    }

    /// Polls every `interval` and forwards each result into the session queue.
    /// Stops on its own once the session has torn down its receiver.
    pub fn spawn_poller(self, interval: Duration, sink: mpsc::Sender<SessionEvent>) -> JoinHandle<()> {
        let interval = interval.max(MIN_POLL_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if sink.is_closed() {
                    break;
                }
                let robots = self.robot_positions().await;
                if sink.send(SessionEvent::RobotsUpdated(robots)).await.is_err() {
                    break;
                }
            }
            debug!("robots: poller stopped");
        })
    }
}

#[cfg(test)]
#[path = "tests/robots_tests.rs"]
mod tests;
