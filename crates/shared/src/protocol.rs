use serde::{Deserialize, Serialize};

use crate::domain::DirectionalAction;

/// Text frame sent to the simulator: `{"action":"UP"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub action: DirectionalAction,
}

impl ActionEnvelope {
    pub fn new(action: DirectionalAction) -> Self {
        Self { action }
    }
}

/// Body of `GET /robots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotsResponse {
    pub robots: Vec<RobotPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotPosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub x: f64,
    pub y: f64,
}
