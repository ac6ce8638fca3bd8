//! Plain-text rendering of a grouped set: a room table and a per-room summary.

use crate::convert::all_to_rooms;
use crate::table::boxed;
use plancraft_core::{Bounds, GroupedConstraints, RoomId};
use std::collections::BTreeMap;
use std::fmt::Write;

const UNSPECIFIED: &str = "unspecified";

fn format_bounds(bounds: &Bounds, unit: &str) -> String {
    match (bounds.min, bounds.max) {
        (Some(min), Some(max)) => format!("{min}-{max}{unit}"),
        (Some(min), None) => format!("at least {min}{unit}"),
        (None, Some(max)) => format!("at most {max}{unit}"),
        (None, None) => UNSPECIFIED.into(),
    }
}

/// Neighbours over `connection` edges, special spaces included.
fn neighbours(constraints: &GroupedConstraints) -> BTreeMap<&str, Vec<&str>> {
    let mut map: BTreeMap<&str, Vec<&str>> = constraints
        .room_list()
        .iter()
        .map(|room| (room.as_str(), Vec::new()))
        .collect();
    for entry in &constraints.soft_constraints.connection.constraints {
        let (a, b) = (entry.room_pair.first(), entry.room_pair.second());
        if let Some(list) = map.get_mut(a) {
            if !list.contains(&b) {
                list.push(b);
            }
        }
        if let Some(list) = map.get_mut(b) {
            if !list.contains(&a) {
                list.push(a);
            }
        }
    }
    map
}

/// One row per listed room, in room-list order.
pub fn room_table(constraints: &GroupedConstraints) -> String {
    let view = all_to_rooms(constraints);
    let links = neighbours(constraints);

    let rows: Vec<Vec<String>> = constraints
        .room_list()
        .iter()
        .map(|room: &RoomId| {
            let bag = view.get(room).cloned().unwrap_or_default();
            let connected = links
                .get(room.as_str())
                .filter(|l| !l.is_empty())
                .map(|l| l.join(", "))
                .unwrap_or_else(|| "-".into());
            vec![
                room.clone(),
                format_bounds(&bag.area, " m²"),
                if bag.orientation.is_empty() {
                    UNSPECIFIED.into()
                } else {
                    bag.orientation.clone()
                },
                if bag.window_access { "yes" } else { "no" }.into(),
                format_bounds(&bag.aspect_ratio, ""),
                connected,
            ]
        })
        .collect();

    if rows.is_empty() {
        return "No rooms\n".into();
    }
    boxed(
        &["Room", "Area", "Orientation", "Window", "Aspect ratio", "Connections"],
        &rows,
    )
}

/// Narrative overview: room count, then area, orientation and connections
/// for each room.
pub fn describe(constraints: &GroupedConstraints) -> String {
    let view = all_to_rooms(constraints);
    let links = neighbours(constraints);
    let rooms = constraints.room_list();

    let mut out = String::from("Constraint overview:\n\n");
    let _ = writeln!(out, "{} rooms: {}\n", rooms.len(), rooms.join(", "));
    out.push_str("Per-room constraints:\n");

    for room in rooms {
        let bag = view.get(room).cloned().unwrap_or_default();
        let _ = writeln!(out, "- {room}:");
        let _ = writeln!(out, "  area: {}", format_bounds(&bag.area, " m²"));
        let orientation = if bag.orientation.is_empty() {
            UNSPECIFIED
        } else {
            bag.orientation.as_str()
        };
        let _ = writeln!(out, "  orientation: {orientation}");
        match links.get(room.as_str()) {
            Some(list) if !list.is_empty() => {
                let _ = writeln!(out, "  connections: {}", list.join(", "));
            }
            _ => out.push_str("  connections: none\n"),
        }
    }

    if constraints.special_spaces.both_active() {
        out.push_str("\nCirculation: path and entrance active\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancraft_core::{OrientationEntry, RangeEntry, RelationEntry, WindowAccessEntry};

    fn sample() -> GroupedConstraints {
        let mut g = GroupedConstraints::template();
        g.hard_constraints.room_list = vec!["kitchen".into(), "bedroom".into(), "study".into()];
        let soft = &mut g.soft_constraints;
        soft.area.constraints.push(RangeEntry {
            room: "kitchen".into(),
            min: Some(10.0),
            max: Some(20.0),
            weight: 0.5,
        });
        soft.area.constraints.push(RangeEntry {
            room: "study".into(),
            min: Some(8.0),
            max: None,
            weight: 0.5,
        });
        soft.orientation.constraints.push(OrientationEntry {
            room: "bedroom".into(),
            direction: "south".into(),
            weight: 0.5,
        });
        soft.window_access.constraints.push(WindowAccessEntry {
            room: "bedroom".into(),
            weight: 0.5,
        });
        soft.connection
            .constraints
            .push(RelationEntry::new("kitchen", "bedroom", 0.5));
        soft.connection
            .constraints
            .push(RelationEntry::new("path", "kitchen", 0.8));
        g.special_spaces.path = true;
        g.special_spaces.entrance = true;
        g
    }

    #[test]
    fn overview_lists_every_room() {
        let text = describe(&sample());
        assert!(text.contains("3 rooms: kitchen, bedroom, study"));
        assert!(text.contains("  area: 10-20 m²"));
        assert!(text.contains("  area: at least 8 m²"));
        assert!(text.contains("  orientation: south"));
        assert!(text.contains("  connections: bedroom, path"));
        assert!(text.contains("Circulation: path and entrance active"));
    }

    #[test]
    fn isolated_room_has_no_connections() {
        let text = describe(&sample());
        let study = text.split("- study:").nth(1).unwrap();
        assert!(study.contains("connections: none"));
    }

    #[test]
    fn table_has_row_per_room() {
        let table = room_table(&sample());
        assert_eq!(table.lines().count(), 3 + 1 + 3);
        assert!(table.contains("south"));
        assert!(table.contains("yes"));
    }

    #[test]
    fn empty_set_renders_placeholder() {
        assert_eq!(room_table(&GroupedConstraints::template()), "No rooms\n");
        assert!(describe(&GroupedConstraints::template()).contains("0 rooms"));
    }
}
