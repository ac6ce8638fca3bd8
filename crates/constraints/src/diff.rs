//! Structural diff between two grouped constraint sets.
//!
//! Relations are compared as sets of canonical pairs, so `[a, b]` and
//! `[b, a]` never show up as a change. Single-room categories are indexed by
//! room and compared value by value. The diff is anti-symmetric:
//! `compare(new, old)` is `compare(old, new)` with every entry inverted.

use crate::table::boxed;
use plancraft_core::{CategoryKind, GroupedConstraints, RangeEntry, RoomPair};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Category label used for room-list entries.
pub const ROOM_LIST: &str = "room_list";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    AddedRooms,
    RemovedRooms,
    AddedRelation,
    RemovedRelation,
    DistanceChanged,
    AddedConstraint,
    RemovedConstraint,
    ValueChanged,
    WeightChanged,
}

impl ChangeKind {
    /// The kind seen when the two sides of the comparison are swapped.
    pub fn inverse(self) -> Self {
        match self {
            ChangeKind::AddedRooms => ChangeKind::RemovedRooms,
            ChangeKind::RemovedRooms => ChangeKind::AddedRooms,
            ChangeKind::AddedRelation => ChangeKind::RemovedRelation,
            ChangeKind::RemovedRelation => ChangeKind::AddedRelation,
            ChangeKind::AddedConstraint => ChangeKind::RemovedConstraint,
            ChangeKind::RemovedConstraint => ChangeKind::AddedConstraint,
            other => other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::AddedRooms => "added rooms",
            ChangeKind::RemovedRooms => "removed rooms",
            ChangeKind::AddedRelation => "added relation",
            ChangeKind::RemovedRelation => "removed relation",
            ChangeKind::DistanceChanged => "distance changed",
            ChangeKind::AddedConstraint => "added constraint",
            ChangeKind::RemovedConstraint => "removed constraint",
            ChangeKind::ValueChanged => "value changed",
            ChangeKind::WeightChanged => "weight changed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// `room_list` or a soft-constraint category name.
    pub category: String,
    pub change: ChangeKind,
    /// Room, pair (`a <-> b`), joined room names, or the category itself for
    /// weight changes.
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl DiffEntry {
    fn new(
        category: impl Into<String>,
        change: ChangeKind,
        subject: impl Into<String>,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) -> Self {
        Self {
            category: category.into(),
            change,
            subject: subject.into(),
            old_value,
            new_value,
        }
    }

    /// The same change seen from the other side.
    pub fn inverted(&self) -> Self {
        Self {
            category: self.category.clone(),
            change: self.change.inverse(),
            subject: self.subject.clone(),
            old_value: self.new_value.clone(),
            new_value: self.old_value.clone(),
        }
    }
}

/// Compare two grouped sets. An empty result means no structural change.
pub fn compare(old: &GroupedConstraints, new: &GroupedConstraints) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    diff_room_list(old, new, &mut entries);

    for kind in CategoryKind::ALL {
        let (o, n) = (
            old.soft_constraints.weight(kind),
            new.soft_constraints.weight(kind),
        );
        if o != n {
            entries.push(DiffEntry::new(
                kind.as_str(),
                ChangeKind::WeightChanged,
                kind.as_str(),
                Some(json!(o)),
                Some(json!(n)),
            ));
        }

        match kind {
            CategoryKind::Connection => diff_relations(
                kind,
                &relation_index(
                    old.soft_constraints
                        .connection
                        .constraints
                        .iter()
                        .map(|c| (c.room_pair.clone(), json!(c.weight))),
                ),
                &relation_index(
                    new.soft_constraints
                        .connection
                        .constraints
                        .iter()
                        .map(|c| (c.room_pair.clone(), json!(c.weight))),
                ),
                None,
                &mut entries,
            ),
            CategoryKind::Adjacency => diff_relations(
                kind,
                &relation_index(
                    old.soft_constraints
                        .adjacency
                        .constraints
                        .iter()
                        .map(|c| (c.room_pair.clone(), json!(c.weight))),
                ),
                &relation_index(
                    new.soft_constraints
                        .adjacency
                        .constraints
                        .iter()
                        .map(|c| (c.room_pair.clone(), json!(c.weight))),
                ),
                None,
                &mut entries,
            ),
            CategoryKind::Repulsion => diff_relations(
                kind,
                &relation_index(
                    old.soft_constraints
                        .repulsion
                        .constraints
                        .iter()
                        .map(|c| (c.pair(), json!(c.min_distance))),
                ),
                &relation_index(
                    new.soft_constraints
                        .repulsion
                        .constraints
                        .iter()
                        .map(|c| (c.pair(), json!(c.min_distance))),
                ),
                Some(ChangeKind::DistanceChanged),
                &mut entries,
            ),
            CategoryKind::Area => diff_rooms(
                kind,
                &range_index(&old.soft_constraints.area.constraints),
                &range_index(&new.soft_constraints.area.constraints),
                &mut entries,
            ),
            CategoryKind::AspectRatio => diff_rooms(
                kind,
                &range_index(&old.soft_constraints.aspect_ratio.constraints),
                &range_index(&new.soft_constraints.aspect_ratio.constraints),
                &mut entries,
            ),
            CategoryKind::Orientation => diff_rooms(
                kind,
                &room_index(
                    old.soft_constraints
                        .orientation
                        .constraints
                        .iter()
                        .map(|c| (c.room.as_str(), json!(c.direction))),
                ),
                &room_index(
                    new.soft_constraints
                        .orientation
                        .constraints
                        .iter()
                        .map(|c| (c.room.as_str(), json!(c.direction))),
                ),
                &mut entries,
            ),
            CategoryKind::WindowAccess => diff_rooms(
                kind,
                &room_index(
                    old.soft_constraints
                        .window_access
                        .constraints
                        .iter()
                        .map(|c| (c.room.as_str(), json!(true))),
                ),
                &room_index(
                    new.soft_constraints
                        .window_access
                        .constraints
                        .iter()
                        .map(|c| (c.room.as_str(), json!(true))),
                ),
                &mut entries,
            ),
        }
    }

    entries
}

/// Whether two sets are structurally identical.
pub fn is_unchanged(old: &GroupedConstraints, new: &GroupedConstraints) -> bool {
    compare(old, new).is_empty()
}

fn diff_room_list(old: &GroupedConstraints, new: &GroupedConstraints, out: &mut Vec<DiffEntry>) {
    let old_set: BTreeSet<&str> = old.room_list().iter().map(String::as_str).collect();
    let new_set: BTreeSet<&str> = new.room_list().iter().map(String::as_str).collect();

    let added: Vec<&str> = new_set.difference(&old_set).copied().collect();
    if !added.is_empty() {
        out.push(DiffEntry::new(
            ROOM_LIST,
            ChangeKind::AddedRooms,
            added.join(", "),
            None,
            Some(json!(added)),
        ));
    }

    let removed: Vec<&str> = old_set.difference(&new_set).copied().collect();
    if !removed.is_empty() {
        out.push(DiffEntry::new(
            ROOM_LIST,
            ChangeKind::RemovedRooms,
            removed.join(", "),
            Some(json!(removed)),
            None,
        ));
    }
}

/// First entry per canonical pair wins.
fn relation_index(items: impl Iterator<Item = (RoomPair, Value)>) -> BTreeMap<RoomPair, Value> {
    let mut index = BTreeMap::new();
    for (pair, value) in items {
        index.entry(pair).or_insert(value);
    }
    index
}

fn diff_relations(
    kind: CategoryKind,
    old: &BTreeMap<RoomPair, Value>,
    new: &BTreeMap<RoomPair, Value>,
    changed: Option<ChangeKind>,
    out: &mut Vec<DiffEntry>,
) {
    for (pair, value) in new {
        match old.get(pair) {
            None => out.push(DiffEntry::new(
                kind.as_str(),
                ChangeKind::AddedRelation,
                pair.to_string(),
                None,
                Some(value.clone()),
            )),
            Some(previous) => {
                if let Some(change) = changed {
                    if previous != value {
                        out.push(DiffEntry::new(
                            kind.as_str(),
                            change,
                            pair.to_string(),
                            Some(previous.clone()),
                            Some(value.clone()),
                        ));
                    }
                }
            }
        }
    }

    for (pair, value) in old {
        if !new.contains_key(pair) {
            out.push(DiffEntry::new(
                kind.as_str(),
                ChangeKind::RemovedRelation,
                pair.to_string(),
                Some(value.clone()),
                None,
            ));
        }
    }
}

fn room_index<'a>(items: impl Iterator<Item = (&'a str, Value)>) -> BTreeMap<&'a str, Value> {
    let mut index = BTreeMap::new();
    for (room, value) in items {
        index.entry(room).or_insert(value);
    }
    index
}

fn range_index(entries: &[RangeEntry]) -> BTreeMap<&str, Value> {
    room_index(
        entries
            .iter()
            .map(|c| (c.room.as_str(), json!({"min": c.min, "max": c.max}))),
    )
}

fn diff_rooms(
    kind: CategoryKind,
    old: &BTreeMap<&str, Value>,
    new: &BTreeMap<&str, Value>,
    out: &mut Vec<DiffEntry>,
) {
    for (room, value) in new {
        match old.get(room) {
            None => out.push(DiffEntry::new(
                kind.as_str(),
                ChangeKind::AddedConstraint,
                *room,
                None,
                Some(value.clone()),
            )),
            Some(previous) if previous != value => out.push(DiffEntry::new(
                kind.as_str(),
                ChangeKind::ValueChanged,
                *room,
                Some(previous.clone()),
                Some(value.clone()),
            )),
            Some(_) => {}
        }
    }

    for (room, value) in old {
        if !new.contains_key(room) {
            out.push(DiffEntry::new(
                kind.as_str(),
                ChangeKind::RemovedConstraint,
                *room,
                Some(value.clone()),
                None,
            ));
        }
    }
}

/// Render a value for a table cell: ranges as `min-max`, strings bare.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".into(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| cell(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Object(map)) if map.contains_key("min") || map.contains_key("max") => {
            format!("{}-{}", bound(map.get("min")), bound(map.get("max")))
        }
        Some(other) => other.to_string(),
    }
}

fn bound(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "?".into(),
        Some(v) => v.to_string(),
    }
}

/// Box-drawn table of diff entries, one row per entry.
pub fn render_table(entries: &[DiffEntry]) -> String {
    if entries.is_empty() {
        return "No changes\n".into();
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.category.clone(),
                e.change.to_string(),
                e.subject.clone(),
                cell(e.old_value.as_ref()),
                cell(e.new_value.as_ref()),
            ]
        })
        .collect();
    boxed(&["Category", "Change", "Subject", "Old", "New"], &rows)
}
