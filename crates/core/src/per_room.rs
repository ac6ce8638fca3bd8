//! Per-room constraint view: a presentation-oriented projection of the
//! grouped form, keyed by room.

use crate::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Fields every room bag must carry for [`is_valid_rooms`].
const ROOM_FIELDS: [&str; 6] = [
    "connection",
    "area",
    "orientation",
    "window_access",
    "aspect_ratio",
    "repulsion",
];

/// Optional lower/upper bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Everything constraining a single room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomConstraints {
    #[serde(default)]
    pub connection: BTreeSet<RoomId>,

    #[serde(default)]
    pub area: Bounds,

    /// Empty when no orientation is requested.
    #[serde(default)]
    pub orientation: String,

    #[serde(default)]
    pub window_access: bool,

    #[serde(default)]
    pub aspect_ratio: Bounds,

    #[serde(default)]
    pub repulsion: BTreeSet<RoomId>,
}

impl RoomConstraints {
    /// A bag with no constraints at all.
    pub fn is_unconstrained(&self) -> bool {
        self.connection.is_empty()
            && self.area.is_empty()
            && self.orientation.is_empty()
            && !self.window_access
            && self.aspect_ratio.is_empty()
            && self.repulsion.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerRoomConstraints {
    #[serde(default)]
    pub rooms: BTreeMap<RoomId, RoomConstraints>,
}

impl PerRoomConstraints {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Gate and decode a per-room payload. Returns `None` when the shape is
    /// wrong; callers fall back to the empty view.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !is_valid_rooms(value) {
            return None;
        }
        match serde_json::from_value(value.clone()) {
            Ok(view) => Some(view),
            Err(e) => {
                warn!(error = %e, "Per-room constraint payload rejected");
                None
            }
        }
    }

    pub fn get(&self, room: &str) -> Option<&RoomConstraints> {
        self.rooms.get(room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Structural gate for per-room payloads: a `rooms` mapping whose every bag
/// carries all six constraint fields.
pub fn is_valid_rooms(value: &Value) -> bool {
    let Some(rooms) = value.get("rooms").and_then(Value::as_object) else {
        return false;
    };
    rooms.values().all(|bag| {
        bag.as_object()
            .is_some_and(|fields| ROOM_FIELDS.iter().all(|f| fields.contains_key(*f)))
    })
}
