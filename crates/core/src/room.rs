//! Room identifiers, special spaces, and canonical room pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque room identifier, unique within a constraint set.
pub type RoomId = String;

/// Reserved non-room nodes used for circulation and access topology.
///
/// Special spaces never appear in the room list but may take part in
/// relation constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialSpace {
    /// Circulation hub.
    Path,
    /// Building entrance; the root of the reachability check.
    Entrance,
}

impl SpecialSpace {
    pub const ALL: [SpecialSpace; 2] = [SpecialSpace::Path, SpecialSpace::Entrance];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SpecialSpace::Path => "path",
            SpecialSpace::Entrance => "entrance",
        }
    }

    /// Parse a room identifier as a special space.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "path" => Some(SpecialSpace::Path),
            "entrance" => Some(SpecialSpace::Entrance),
            _ => None,
        }
    }
}

impl fmt::Display for SpecialSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `name` is one of the reserved special spaces.
pub fn is_special(name: &str) -> bool {
    SpecialSpace::from_name(name).is_some()
}

/// An undirected pair of rooms in canonical (sorted) order.
///
/// `RoomPair::new("kitchen", "bath")` and `RoomPair::new("bath", "kitchen")`
/// compare equal, hash equal, and serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomPair {
    low: RoomId,
    high: RoomId,
}

impl RoomPair {
    pub fn new(a: impl Into<RoomId>, b: impl Into<RoomId>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn first(&self) -> &str {
        &self.low
    }

    pub fn second(&self) -> &str {
        &self.high
    }

    /// Whether `room` is one of the two ends.
    pub fn involves(&self, room: &str) -> bool {
        self.low == room || self.high == room
    }

    /// The opposite end from `room`, if `room` is part of this pair.
    pub fn other(&self, room: &str) -> Option<&str> {
        if self.low == room {
            Some(&self.high)
        } else if self.high == room {
            Some(&self.low)
        } else {
            None
        }
    }

    /// A pair whose two ends are the same room.
    pub fn is_loop(&self) -> bool {
        self.low == self.high
    }

    pub fn into_array(self) -> [RoomId; 2] {
        [self.low, self.high]
    }
}

impl fmt::Display for RoomPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.low, self.high)
    }
}

impl Serialize for RoomPair {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [&self.low, &self.high].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoomPair {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [a, b] = <[RoomId; 2]>::deserialize(deserializer)?;
        Ok(RoomPair::new(a, b))
    }
}
