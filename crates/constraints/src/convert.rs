//! Bidirectional transform between the grouped form and the per-room view.
//!
//! Both directions are pure: deterministic for a given input, no shared
//! state, and malformed input degrades to empty shapes instead of failing.
//!
//! The per-room view carries no weights. Rebuilding the grouped form
//! recovers category weights, item weights, and repulsion distances from
//! the original grouped set when one is supplied, and falls back to
//! [`ConverterOptions`] defaults otherwise. Relations the per-room view
//! cannot express (adjacency, and connections touching `path`/`entrance`)
//! are likewise carried forward from the original.

use plancraft_core::{
    Bounds, Category, CategoryKind, ConverterOptions, GroupedConstraints, OrientationEntry,
    PerRoomConstraints, RangeEntry, RelationEntry, RepulsionEntry, RoomConstraints, RoomId,
    RoomPair, WindowAccessEntry, is_special,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// Derive the per-room view from a grouped set.
///
/// Only rooms in `room_list` get a bag. References to unknown rooms and to
/// the special spaces are skipped, even when a special space was listed as a
/// room.
pub fn all_to_rooms(grouped: &GroupedConstraints) -> PerRoomConstraints {
    let mut rooms: BTreeMap<RoomId, RoomConstraints> = grouped
        .room_list()
        .iter()
        .filter(|room| !is_special(room))
        .map(|room| (room.clone(), RoomConstraints::default()))
        .collect();
    let soft = &grouped.soft_constraints;

    for entry in &soft.connection.constraints {
        let (a, b) = (entry.room_pair.first(), entry.room_pair.second());
        if rooms.contains_key(a) && rooms.contains_key(b) {
            link(&mut rooms, a, b, |bag| &mut bag.connection);
        }
    }

    for entry in &soft.area.constraints {
        if let Some(bag) = rooms.get_mut(&entry.room) {
            merge_bounds(&mut bag.area, entry);
        }
    }

    for entry in &soft.orientation.constraints {
        if let Some(bag) = rooms.get_mut(&entry.room) {
            bag.orientation = entry.direction.clone();
        }
    }

    for entry in &soft.window_access.constraints {
        if let Some(bag) = rooms.get_mut(&entry.room) {
            bag.window_access = true;
        }
    }

    for entry in &soft.aspect_ratio.constraints {
        if let Some(bag) = rooms.get_mut(&entry.room) {
            merge_bounds(&mut bag.aspect_ratio, entry);
        }
    }

    for entry in &soft.repulsion.constraints {
        let (a, b) = (entry.room1.as_str(), entry.room2.as_str());
        if rooms.contains_key(a) && rooms.contains_key(b) {
            link(&mut rooms, a, b, |bag| &mut bag.repulsion);
        }
    }

    debug!(rooms = rooms.len(), "Derived per-room constraint view");
    PerRoomConstraints { rooms }
}

/// [`all_to_rooms`] over an untyped payload.
///
/// A payload missing `hard_constraints` or `soft_constraints` yields the
/// empty view `{"rooms": {}}`.
pub fn all_to_rooms_value(value: &Value) -> PerRoomConstraints {
    let has_sections = value.get("hard_constraints").is_some_and(Value::is_object)
        && value.get("soft_constraints").is_some_and(Value::is_object);
    if !has_sections {
        return PerRoomConstraints::empty();
    }
    match serde_json::from_value::<GroupedConstraints>(value.clone()) {
        Ok(grouped) => all_to_rooms(&grouped),
        Err(e) => {
            debug!(error = %e, "Grouped payload undecodable, returning empty view");
            PerRoomConstraints::empty()
        }
    }
}

fn link(
    rooms: &mut BTreeMap<RoomId, RoomConstraints>,
    a: &str,
    b: &str,
    field: impl Fn(&mut RoomConstraints) -> &mut BTreeSet<RoomId>,
) {
    if let Some(bag) = rooms.get_mut(a) {
        field(bag).insert(b.to_string());
    }
    if let Some(bag) = rooms.get_mut(b) {
        field(bag).insert(a.to_string());
    }
}

fn merge_bounds(bounds: &mut Bounds, entry: &RangeEntry) {
    if entry.min.is_some() {
        bounds.min = entry.min;
    }
    if entry.max.is_some() {
        bounds.max = entry.max;
    }
}

/// Rebuild the grouped form with default [`ConverterOptions`].
pub fn rooms_to_all(
    per_room: &PerRoomConstraints,
    original: Option<&GroupedConstraints>,
) -> GroupedConstraints {
    rooms_to_all_with(per_room, original, &ConverterOptions::default())
}

/// Rebuild the grouped form from the per-room view.
///
/// Symmetric relations are emitted once per sorted pair, no matter how many
/// bags mention them.
pub fn rooms_to_all_with(
    per_room: &PerRoomConstraints,
    original: Option<&GroupedConstraints>,
    options: &ConverterOptions,
) -> GroupedConstraints {
    let sanitized;
    let per_room = if per_room.rooms.keys().any(|room| is_special(room)) {
        warn!("Ignoring special-space bags in per-room view");
        sanitized = PerRoomConstraints {
            rooms: per_room
                .rooms
                .iter()
                .filter(|(room, _)| !is_special(room))
                .map(|(room, bag)| (room.clone(), bag.clone()))
                .collect(),
        };
        &sanitized
    } else {
        per_room
    };

    let recovered = Recovered::from_original(original);
    let mut out = GroupedConstraints::template();

    out.hard_constraints.room_list = ordered_room_list(per_room, original);
    for kind in CategoryKind::ALL {
        let weight = original
            .map(|o| o.soft_constraints.weight(kind))
            .unwrap_or(options.default_category_weight);
        out.soft_constraints.set_weight(kind, weight);
    }
    if let Some(o) = original {
        out.special_spaces = o.special_spaces;
    }

    let item_weight = |w: Option<f64>| w.unwrap_or(options.default_item_weight);
    let soft = &mut out.soft_constraints;
    let mut seen_connections: HashSet<RoomPair> = HashSet::new();
    let mut seen_repulsions: HashSet<RoomPair> = HashSet::new();

    for (room, bag) in &per_room.rooms {
        for other in &bag.connection {
            if !per_room.rooms.contains_key(other) {
                continue;
            }
            let pair = RoomPair::new(room.clone(), other.clone());
            if seen_connections.insert(pair.clone()) {
                let weight = item_weight(recovered.connection.get(&pair).copied());
                soft.connection.constraints.push(RelationEntry {
                    room_pair: pair,
                    weight,
                });
            }
        }

        if !bag.area.is_empty() {
            soft.area.constraints.push(RangeEntry {
                room: room.clone(),
                min: bag.area.min,
                max: bag.area.max,
                weight: item_weight(recovered.area.get(room).copied()),
            });
        }

        if !bag.orientation.is_empty() {
            soft.orientation.constraints.push(OrientationEntry {
                room: room.clone(),
                direction: bag.orientation.clone(),
                weight: item_weight(recovered.orientation.get(room).copied()),
            });
        }

        if bag.window_access {
            soft.window_access.constraints.push(WindowAccessEntry {
                room: room.clone(),
                weight: item_weight(recovered.window_access.get(room).copied()),
            });
        }

        if !bag.aspect_ratio.is_empty() {
            soft.aspect_ratio.constraints.push(RangeEntry {
                room: room.clone(),
                min: bag.aspect_ratio.min,
                max: bag.aspect_ratio.max,
                weight: item_weight(recovered.aspect_ratio.get(room).copied()),
            });
        }
    }

    for (room, bag) in &per_room.rooms {
        for other in &bag.repulsion {
            if !per_room.rooms.contains_key(other) {
                continue;
            }
            let pair = RoomPair::new(room.clone(), other.clone());
            if seen_repulsions.insert(pair.clone()) {
                let (distance, weight) = match recovered.repulsion.get(&pair) {
                    Some(&(d, w)) => (d, w),
                    None => (options.default_min_distance, options.default_item_weight),
                };
                let [room1, room2] = pair.into_array();
                soft.repulsion.constraints.push(RepulsionEntry {
                    room1,
                    room2,
                    min_distance: distance,
                    weight,
                });
            }
        }
    }

    if let Some(o) = original {
        carry_forward(o, &mut out, &mut seen_connections);
    }

    debug!(
        rooms = out.room_list().len(),
        connections = out.soft_constraints.connection.constraints.len(),
        repulsions = out.soft_constraints.repulsion.constraints.len(),
        "Rebuilt grouped constraints from per-room view"
    );
    out
}

/// Room order: the original's order for rooms it already knew, then new
/// rooms in sorted order. `per_room` holds no special-space keys here.
fn ordered_room_list(
    per_room: &PerRoomConstraints,
    original: Option<&GroupedConstraints>,
) -> Vec<RoomId> {
    let mut list: Vec<RoomId> = original
        .map(|o| {
            o.room_list()
                .iter()
                .filter(|r| per_room.rooms.contains_key(*r))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    let known: HashSet<RoomId> = list.iter().cloned().collect();
    list.extend(per_room.rooms.keys().filter(|r| !known.contains(*r)).cloned());
    list
}

/// Copy over the relations the per-room view cannot represent.
fn carry_forward(
    original: &GroupedConstraints,
    out: &mut GroupedConstraints,
    seen_connections: &mut HashSet<RoomPair>,
) {
    let rooms: HashSet<&str> = out.room_list().iter().map(String::as_str).collect();
    let resolves = |room: &str| is_special(room) || rooms.contains(room);

    let mut carried = Vec::new();
    for entry in &original.soft_constraints.connection.constraints {
        let pair = &entry.room_pair;
        let touches_special = is_special(pair.first()) || is_special(pair.second());
        if touches_special
            && resolves(pair.first())
            && resolves(pair.second())
            && seen_connections.insert(pair.clone())
        {
            carried.push(entry.clone());
        }
    }

    let adjacency: Vec<RelationEntry> = original
        .soft_constraints
        .adjacency
        .constraints
        .iter()
        .filter(|e| resolves(e.room_pair.first()) && resolves(e.room_pair.second()))
        .cloned()
        .collect();

    out.soft_constraints.connection.constraints.extend(carried);
    out.soft_constraints.adjacency = Category {
        weight: out.soft_constraints.adjacency.weight,
        constraints: adjacency,
    };
}

/// Per-item weights (and repulsion distances) indexed from an original set.
#[derive(Default)]
struct Recovered {
    connection: HashMap<RoomPair, f64>,
    area: HashMap<RoomId, f64>,
    orientation: HashMap<RoomId, f64>,
    window_access: HashMap<RoomId, f64>,
    aspect_ratio: HashMap<RoomId, f64>,
    repulsion: HashMap<RoomPair, (f64, f64)>,
}

impl Recovered {
    fn from_original(original: Option<&GroupedConstraints>) -> Self {
        let Some(o) = original else {
            return Self::default();
        };
        let soft = &o.soft_constraints;
        // first entry wins for duplicates
        let mut r = Self::default();
        for e in &soft.connection.constraints {
            r.connection.entry(e.room_pair.clone()).or_insert(e.weight);
        }
        for e in &soft.area.constraints {
            r.area.entry(e.room.clone()).or_insert(e.weight);
        }
        for e in &soft.orientation.constraints {
            r.orientation.entry(e.room.clone()).or_insert(e.weight);
        }
        for e in &soft.window_access.constraints {
            r.window_access.entry(e.room.clone()).or_insert(e.weight);
        }
        for e in &soft.aspect_ratio.constraints {
            r.aspect_ratio.entry(e.room.clone()).or_insert(e.weight);
        }
        for e in &soft.repulsion.constraints {
            r.repulsion
                .entry(e.pair())
                .or_insert((e.min_distance, e.weight));
        }
        r
    }
}
