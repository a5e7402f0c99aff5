//! Geospatial Point Registry: append-only, click-ordered map markers.

use chrono::Utc;
use shared::domain::{LatLng, MapPoint, PointId};
use tracing::{debug, info};

pub const SEED_POINT_COUNT: usize = 3;

pub const DEFAULT_MAP_CENTER: LatLng = LatLng {
    lat: 51.505,
    lng: -0.09,
};
pub const DEFAULT_MAP_ZOOM: u8 = 13;
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

pub fn seed_points() -> Vec<MapPoint> {
    vec![
        MapPoint {
            id: PointId(1),
            kind: "QR Code".to_string(),
            position: LatLng::new(51.505, -0.09),
        },
        MapPoint {
            id: PointId(2),
            kind: "Charging Station".to_string(),
            position: LatLng::new(51.51, -0.1),
        },
        MapPoint {
            id: PointId(3),
            kind: "Robot".to_string(),
            position: LatLng::new(51.52, -0.12),
        },
    ]
}

/// Issues time-derived ids (epoch milliseconds) that are strictly increasing
/// for the lifetime of the generator, even for several clicks in one
/// millisecond or a clock that steps backwards.
#[derive(Debug, Clone)]
pub struct PointIdGenerator {
    last: i64,
}

impl PointIdGenerator {
    pub fn starting_after(last: PointId) -> Self {
        Self { last: last.0 }
    }

    pub fn next_id(&mut self) -> PointId {
        self.next_from_clock(Utc::now().timestamp_millis())
    }

    pub(crate) fn next_from_clock(&mut self, now_ms: i64) -> PointId {
        self.last = now_ms.max(self.last.saturating_add(1));
        PointId(self.last)
    }
}

#[derive(Debug, Clone)]
pub struct PointRegistry {
    points: Vec<MapPoint>,
    ids: PointIdGenerator,
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

impl PointRegistry {
    pub fn seeded() -> Self {
        Self::with_points(seed_points())
    }

    pub fn with_points(points: Vec<MapPoint>) -> Self {
        let last = points.iter().map(|p| p.id).max().unwrap_or(PointId(0));
        Self {
            points,
            ids: PointIdGenerator::starting_after(last),
        }
    }

    /// Appends a point under a fresh id. Neither the label nor the position
    /// is validated and duplicates are allowed.
    pub fn add_point(&mut self, kind: impl Into<String>, position: LatLng) -> &MapPoint {
        let point = MapPoint {
            id: self.ids.next_id(),
            kind: kind.into(),
            position,
        };
        info!(
            id = point.id.0,
            kind = %point.kind,
            lat = position.lat,
            lng = position.lng,
            "points: added"
        );
        let index = self.points.len();
        self.points.push(point);
        &self.points[index]
    }

    /// Map-click path: `label` is the operator's answer to the type prompt.
    /// A cancelled (`None`) or empty answer leaves the registry untouched.
    pub fn add_labelled(&mut self, label: Option<&str>, position: LatLng) -> Option<&MapPoint> {
        match label {
            Some(label) if !label.is_empty() => Some(self.add_point(label, position)),
            _ => {
                debug!(lat = position.lat, lng = position.lng, "points: click without label ignored");
                None
            }
        }
    }

    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    pub fn get(&self, id: PointId) -> Option<&MapPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/points_tests.rs"]
mod tests;
