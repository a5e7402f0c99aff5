use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(PointId);

/// One `(row, col)` address on the warehouse floor grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Marker placed on a grid cell. `None` is the empty sentinel and is never
/// part of the placement rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectKind {
    #[default]
    None,
    #[serde(rename = "QR")]
    Qr,
    Robot,
    Charging,
}

impl ObjectKind {
    /// Next marker for a click on a cell holding `self`.
    pub fn next(self) -> Self {
        match self {
            ObjectKind::None => ObjectKind::Qr,
            ObjectKind::Qr => ObjectKind::Robot,
            ObjectKind::Robot => ObjectKind::Charging,
            ObjectKind::Charging => ObjectKind::Qr,
        }
    }

    pub fn is_none(self) -> bool {
        self == ObjectKind::None
    }

    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::None => "None",
            ObjectKind::Qr => "QR",
            ObjectKind::Robot => "Robot",
            ObjectKind::Charging => "Charging",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DirectionalAction {
    Up,
    Down,
    Left,
    Right,
}

impl DirectionalAction {
    /// Fixed key table. Anything that is not an arrow key maps to nothing.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(DirectionalAction::Up),
            "ArrowDown" => Some(DirectionalAction::Down),
            "ArrowLeft" => Some(DirectionalAction::Left),
            "ArrowRight" => Some(DirectionalAction::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DirectionalAction::Up => "UP",
            DirectionalAction::Down => "DOWN",
            DirectionalAction::Left => "LEFT",
            DirectionalAction::Right => "RIGHT",
        }
    }
}

/// A key-down observed by the view. Auto-repeat events carry `repeat = true`
/// and are handled exactly like a first press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub repeat: bool,
}

impl KeyEvent {
    pub fn press(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            repeat: false,
        }
    }

    pub fn repeat(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            repeat: true,
        }
    }
}

/// Geographic position, serialized as a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.lat, value.lng]
    }
}

/// Operator-placed marker on the map. `kind` is a free-form label; the
/// canonical values are "QR Code", "Charging Station" and "Robot".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub id: PointId,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: LatLng,
}
