//! Grouped constraint schema: the canonical, persisted form.
//!
//! A grouped set is organized by constraint category rather than by room:
//!
//! ```json
//! {
//!   "hard_constraints": {"room_list": ["bedroom", "kitchen"]},
//!   "soft_constraints": {
//!     "connection": {"weight": 0.6, "constraints": [{"room_pair": ["bedroom", "path"], "weight": 0.5}]},
//!     "area": {"weight": 0.4, "constraints": [{"room": "kitchen", "min": 10, "max": 20, "weight": 0.5}]},
//!     ...
//!   },
//!   "special_spaces": {"path": true, "entrance": true}
//! }
//! ```
//!
//! External payloads are checked once at the boundary with
//! [`is_valid_grouped`] and then decoded into typed records. Individual
//! malformed entries are skipped rather than failing the whole set.

use crate::room::{RoomId, RoomPair, is_special};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::warn;

/// Item-level weight used when an entry does not carry one.
pub const DEFAULT_ITEM_WEIGHT: f64 = 0.5;

/// Repulsion separation used when an entry does not carry one.
pub const DEFAULT_MIN_DISTANCE: f64 = 2.0;

/// The fixed set of soft-constraint categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Connection,
    Adjacency,
    Area,
    Orientation,
    WindowAccess,
    AspectRatio,
    Repulsion,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 7] = [
        CategoryKind::Connection,
        CategoryKind::Adjacency,
        CategoryKind::Area,
        CategoryKind::Orientation,
        CategoryKind::WindowAccess,
        CategoryKind::AspectRatio,
        CategoryKind::Repulsion,
    ];

    /// Categories that must be present for a payload to be accepted.
    /// `adjacency` is optional and defaults to an empty category.
    pub const REQUIRED: [CategoryKind; 6] = [
        CategoryKind::Connection,
        CategoryKind::Area,
        CategoryKind::Orientation,
        CategoryKind::WindowAccess,
        CategoryKind::AspectRatio,
        CategoryKind::Repulsion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Connection => "connection",
            CategoryKind::Adjacency => "adjacency",
            CategoryKind::Area => "area",
            CategoryKind::Orientation => "orientation",
            CategoryKind::WindowAccess => "window_access",
            CategoryKind::AspectRatio => "aspect_ratio",
            CategoryKind::Repulsion => "repulsion",
        }
    }

    /// Undirected two-room relations.
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            CategoryKind::Connection | CategoryKind::Adjacency | CategoryKind::Repulsion
        )
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_item_weight() -> f64 {
    DEFAULT_ITEM_WEIGHT
}

fn default_min_distance() -> f64 {
    DEFAULT_MIN_DISTANCE
}

/// `connection` / `adjacency` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationEntry {
    #[serde(alias = "room pair")]
    pub room_pair: RoomPair,

    #[serde(default = "default_item_weight", alias = "room_weight")]
    pub weight: f64,
}

impl RelationEntry {
    pub fn new(a: impl Into<RoomId>, b: impl Into<RoomId>, weight: f64) -> Self {
        Self {
            room_pair: RoomPair::new(a, b),
            weight,
        }
    }
}

/// `area` / `aspect_ratio` entry. Either bound may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeEntry {
    pub room: RoomId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default = "default_item_weight", alias = "room_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationEntry {
    pub room: RoomId,
    pub direction: String,

    #[serde(default = "default_item_weight", alias = "room_weight")]
    pub weight: f64,
}

/// Presence-only constraint: the room wants an exterior window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAccessEntry {
    pub room: RoomId,

    #[serde(default = "default_item_weight", alias = "room_weight")]
    pub weight: f64,
}

/// Undirected separation requirement between two rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepulsionEntry {
    pub room1: RoomId,
    pub room2: RoomId,

    #[serde(default = "default_min_distance")]
    pub min_distance: f64,

    #[serde(default = "default_item_weight", alias = "room_weight")]
    pub weight: f64,
}

impl RepulsionEntry {
    pub fn pair(&self) -> RoomPair {
        RoomPair::new(self.room1.clone(), self.room2.clone())
    }
}

/// One soft-constraint category: a category-level weight plus its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Category<T> {
    #[serde(default)]
    pub weight: f64,

    #[serde(default, deserialize_with = "lenient_entries")]
    pub constraints: Vec<T>,
}

impl<T> Default for Category<T> {
    fn default() -> Self {
        Self {
            weight: 0.0,
            constraints: Vec::new(),
        }
    }
}

impl<T> Category<T> {
    pub fn with_weight(weight: f64) -> Self {
        Self {
            weight,
            constraints: Vec::new(),
        }
    }
}

/// Decode a constraint list entry by entry, dropping the ones that do not fit
/// the category's shape. A non-array value decodes as an empty list.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping malformed constraint entry");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardConstraints {
    #[serde(default)]
    pub room_list: Vec<RoomId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftConstraints {
    #[serde(default)]
    pub connection: Category<RelationEntry>,

    #[serde(default)]
    pub adjacency: Category<RelationEntry>,

    #[serde(default)]
    pub area: Category<RangeEntry>,

    #[serde(default)]
    pub orientation: Category<OrientationEntry>,

    #[serde(default)]
    pub window_access: Category<WindowAccessEntry>,

    #[serde(default)]
    pub aspect_ratio: Category<RangeEntry>,

    #[serde(default)]
    pub repulsion: Category<RepulsionEntry>,
}

impl SoftConstraints {
    pub fn weight(&self, kind: CategoryKind) -> f64 {
        match kind {
            CategoryKind::Connection => self.connection.weight,
            CategoryKind::Adjacency => self.adjacency.weight,
            CategoryKind::Area => self.area.weight,
            CategoryKind::Orientation => self.orientation.weight,
            CategoryKind::WindowAccess => self.window_access.weight,
            CategoryKind::AspectRatio => self.aspect_ratio.weight,
            CategoryKind::Repulsion => self.repulsion.weight,
        }
    }

    pub fn set_weight(&mut self, kind: CategoryKind, weight: f64) {
        match kind {
            CategoryKind::Connection => self.connection.weight = weight,
            CategoryKind::Adjacency => self.adjacency.weight = weight,
            CategoryKind::Area => self.area.weight = weight,
            CategoryKind::Orientation => self.orientation.weight = weight,
            CategoryKind::WindowAccess => self.window_access.weight = weight,
            CategoryKind::AspectRatio => self.aspect_ratio.weight = weight,
            CategoryKind::Repulsion => self.repulsion.weight = weight,
        }
    }

    /// Number of entries in a category.
    pub fn len(&self, kind: CategoryKind) -> usize {
        match kind {
            CategoryKind::Connection => self.connection.constraints.len(),
            CategoryKind::Adjacency => self.adjacency.constraints.len(),
            CategoryKind::Area => self.area.constraints.len(),
            CategoryKind::Orientation => self.orientation.constraints.len(),
            CategoryKind::WindowAccess => self.window_access.constraints.len(),
            CategoryKind::AspectRatio => self.aspect_ratio.constraints.len(),
            CategoryKind::Repulsion => self.repulsion.constraints.len(),
        }
    }
}

/// Whether the circulation and entrance nodes are active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSpaces {
    #[serde(default)]
    pub path: bool,

    #[serde(default)]
    pub entrance: bool,
}

impl SpecialSpaces {
    pub fn both_active(&self) -> bool {
        self.path && self.entrance
    }
}

/// The canonical constraint set handed to the layout solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedConstraints {
    #[serde(default)]
    pub hard_constraints: HardConstraints,

    #[serde(default)]
    pub soft_constraints: SoftConstraints,

    #[serde(default)]
    pub special_spaces: SpecialSpaces,
}

impl GroupedConstraints {
    /// The empty session-start template: no rooms, every category at weight 0.
    pub fn template() -> Self {
        Self::default()
    }

    /// Gate an external payload and decode it.
    ///
    /// Returns `None` when the payload fails [`is_valid_grouped`] or cannot be
    /// decoded; callers keep their previous state in that case. Duplicate
    /// room names are collapsed, keeping the first occurrence.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !is_valid_grouped(value) {
            return None;
        }
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(mut set) => {
                set.dedup_rooms();
                Some(set)
            }
            Err(e) => {
                warn!(error = %e, "Grouped constraint payload rejected");
                None
            }
        }
    }

    /// Parse and gate a JSON string.
    pub fn from_json_str(json: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(json).ok()?;
        Self::from_value(&value)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn room_list(&self) -> &[RoomId] {
        &self.hard_constraints.room_list
    }

    pub fn has_room(&self, room: &str) -> bool {
        self.hard_constraints.room_list.iter().any(|r| r == room)
    }

    /// A reference resolves when it names a listed room or a special space.
    pub fn resolves(&self, room: &str) -> bool {
        is_special(room) || self.has_room(room)
    }

    /// Canonical set of connection pairs.
    pub fn connection_pairs(&self) -> BTreeSet<RoomPair> {
        self.soft_constraints
            .connection
            .constraints
            .iter()
            .map(|c| c.room_pair.clone())
            .collect()
    }

    /// Collapse duplicate room names and drop special spaces, which are
    /// never room-list members.
    fn dedup_rooms(&mut self) {
        let mut seen = HashSet::new();
        self.hard_constraints.room_list.retain(|room| {
            if is_special(room) {
                warn!(room = %room, "Dropping special space from room list");
                return false;
            }
            seen.insert(room.clone())
        });
    }

    /// Drop every entry that references a room outside the room list and the
    /// special spaces. Returns the number of entries removed.
    pub fn prune_unresolved(&mut self) -> usize {
        let known: HashSet<RoomId> = self.hard_constraints.room_list.iter().cloned().collect();
        let ok = |room: &str| is_special(room) || known.contains(room);
        let soft = &mut self.soft_constraints;
        let before: usize = CategoryKind::ALL.iter().map(|k| soft.len(*k)).sum();

        soft.connection
            .constraints
            .retain(|c| ok(c.room_pair.first()) && ok(c.room_pair.second()));
        soft.adjacency
            .constraints
            .retain(|c| ok(c.room_pair.first()) && ok(c.room_pair.second()));
        soft.area.constraints.retain(|c| ok(&c.room));
        soft.orientation.constraints.retain(|c| ok(&c.room));
        soft.window_access.constraints.retain(|c| ok(&c.room));
        soft.aspect_ratio.constraints.retain(|c| ok(&c.room));
        soft.repulsion
            .constraints
            .retain(|c| ok(&c.room1) && ok(&c.room2));

        let after: usize = CategoryKind::ALL.iter().map(|k| soft.len(*k)).sum();
        before - after
    }
}

/// Structural gate for grouped payloads.
///
/// Checks that the value is a mapping with `hard_constraints.room_list`, and
/// that `soft_constraints` carries all six required categories, each a mapping
/// with both `weight` and `constraints` keys. Never panics.
pub fn is_valid_grouped(value: &Value) -> bool {
    let Some(root) = value.as_object() else {
        return false;
    };
    let has_room_list = root
        .get("hard_constraints")
        .and_then(Value::as_object)
        .is_some_and(|hard| hard.contains_key("room_list"));
    if !has_room_list {
        return false;
    }
    let Some(soft) = root.get("soft_constraints").and_then(Value::as_object) else {
        return false;
    };
    CategoryKind::REQUIRED.iter().all(|kind| {
        soft.get(kind.as_str())
            .and_then(Value::as_object)
            .is_some_and(|cat| cat.contains_key("weight") && cat.contains_key("constraints"))
    })
}
