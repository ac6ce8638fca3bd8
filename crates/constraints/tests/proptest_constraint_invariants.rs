//! Property-based invariant tests for the constraint pipeline.
//!
//! 1. Connection pairs survive grouped → per-room → grouped.
//! 2. Rebuilt relations appear exactly once per sorted pair.
//! 3. A set diffed against itself is empty.
//! 4. Diff is anti-symmetric.
//! 5. After repair every room is reachable from the entrance.
//! 6. Repair is idempotent and only adds.

use plancraft_constraints::{
    all_to_rooms, compare, repair, rooms_to_all, unreachable_rooms,
};
use plancraft_core::{
    GroupedConstraints, RangeEntry, RelationEntry, RepulsionEntry, RoomPair,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

// ── Helpers ─────────────────────────────────────────────────────────────

const POOL: [&str; 6] = ["kitchen", "bedroom", "study", "bath", "living", "dining"];

/// Indices 0..6 are rooms, 6 is `path`, 7 is `entrance`.
fn node(i: usize) -> &'static str {
    match i {
        6 => "path",
        7 => "entrance",
        _ => POOL[i % POOL.len()],
    }
}

fn grouped_strategy() -> impl Strategy<Value = GroupedConstraints> {
    (
        prop::sample::subsequence(POOL.to_vec(), 0..=POOL.len()),
        prop::collection::vec((0usize..8, 0usize..8, 0.0f64..=1.0), 0..12),
        prop::collection::vec(
            (
                0usize..6,
                prop::option::of(1.0f64..50.0),
                prop::option::of(1.0f64..50.0),
            ),
            0..6,
        ),
        prop::collection::vec((0usize..6, 0usize..6, 0.5f64..5.0), 0..4),
        0.0f64..=1.0,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(rooms, connections, areas, repulsions, weight, path, entrance)| {
                let mut g = GroupedConstraints::template();
                g.hard_constraints.room_list = rooms.into_iter().map(String::from).collect();
                g.soft_constraints.connection.weight = weight;
                for (a, b, w) in connections {
                    g.soft_constraints
                        .connection
                        .constraints
                        .push(RelationEntry::new(node(a), node(b), w));
                }
                for (r, min, max) in areas {
                    g.soft_constraints.area.constraints.push(RangeEntry {
                        room: node(r).into(),
                        min,
                        max,
                        weight: 0.5,
                    });
                }
                for (a, b, d) in repulsions {
                    g.soft_constraints.repulsion.constraints.push(RepulsionEntry {
                        room1: node(a).into(),
                        room2: node(b).into(),
                        min_distance: d,
                        weight: 0.5,
                    });
                }
                g.special_spaces.path = path;
                g.special_spaces.entrance = entrance;
                g
            },
        )
}

fn room_only_pairs(g: &GroupedConstraints) -> BTreeSet<RoomPair> {
    g.connection_pairs()
        .into_iter()
        .filter(|p| g.has_room(p.first()) && g.has_room(p.second()))
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Connection pairs round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn connection_pairs_round_trip(g in grouped_strategy()) {
        let view = all_to_rooms(&g);
        let rebuilt = rooms_to_all(&view, None);
        prop_assert_eq!(rebuilt.connection_pairs(), room_only_pairs(&g));
    }
}

proptest! {
    #[test]
    fn round_trip_with_original_keeps_resolved_pairs(g in grouped_strategy()) {
        let view = all_to_rooms(&g);
        let rebuilt = rooms_to_all(&view, Some(&g));
        let expected: BTreeSet<RoomPair> = g
            .connection_pairs()
            .into_iter()
            .filter(|p| g.resolves(p.first()) && g.resolves(p.second()))
            .collect();
        prop_assert_eq!(rebuilt.connection_pairs(), expected);
        prop_assert_eq!(rebuilt.room_list(), g.room_list());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Each physical relation exactly once
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rebuilt_relations_are_unique(g in grouped_strategy()) {
        let rebuilt = rooms_to_all(&all_to_rooms(&g), Some(&g));
        let soft = &rebuilt.soft_constraints;
        prop_assert_eq!(soft.connection.constraints.len(), rebuilt.connection_pairs().len());
        let repulsions: BTreeSet<RoomPair> =
            soft.repulsion.constraints.iter().map(|r| r.pair()).collect();
        prop_assert_eq!(soft.repulsion.constraints.len(), repulsions.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. diff(X, X) is empty
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn self_diff_is_empty(g in grouped_strategy()) {
        let diff = compare(&g, &g);
        prop_assert!(diff.is_empty(), "unexpected diff: {:?}", diff);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Anti-symmetry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn diff_is_anti_symmetric(a in grouped_strategy(), b in grouped_strategy()) {
        let forward = compare(&a, &b);
        let backward = compare(&b, &a);
        prop_assert_eq!(forward.len(), backward.len());
        for entry in &forward {
            prop_assert!(
                backward.contains(&entry.inverted()),
                "no inverse for {:?}", entry
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5–6. Repair
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repair_makes_every_room_reachable(g in grouped_strategy()) {
        let (fixed, _) = repair(g);
        prop_assert!(fixed.special_spaces.both_active());
        prop_assert!(unreachable_rooms(&fixed).is_empty());
        prop_assert!(fixed.connection_pairs().contains(&RoomPair::new("path", "entrance")));
        prop_assert!(fixed.soft_constraints.connection.weight >= 0.5);
    }
}

proptest! {
    #[test]
    fn repair_is_idempotent(g in grouped_strategy()) {
        let (once, _) = repair(g);
        let (twice, modified) = repair(once.clone());
        prop_assert!(!modified);
        prop_assert_eq!(once, twice);
    }
}

proptest! {
    #[test]
    fn repair_only_adds(g in grouped_strategy()) {
        let before = g.soft_constraints.connection.constraints.clone();
        let rooms = g.room_list().to_vec();
        let (fixed, _) = repair(g);
        prop_assert_eq!(fixed.room_list(), rooms.as_slice());
        for entry in &before {
            prop_assert!(fixed.soft_constraints.connection.constraints.contains(entry));
        }
    }
}

// ── Scenarios ───────────────────────────────────────────────────────────

#[test]
fn symmetric_connection_in_per_room_view() {
    let g = GroupedConstraints::from_value(&json!({
        "hard_constraints": {"room_list": ["A", "B"]},
        "soft_constraints": {
            "connection": {"weight": 0.5, "constraints": [{"room_pair": ["A", "B"], "weight": 0.5}]},
            "area": {"weight": 0.5, "constraints": []},
            "orientation": {"weight": 0.5, "constraints": []},
            "window_access": {"weight": 0.5, "constraints": []},
            "aspect_ratio": {"weight": 0.5, "constraints": []},
            "repulsion": {"weight": 0.5, "constraints": []}
        }
    }))
    .unwrap();

    let view = all_to_rooms(&g);
    assert_eq!(view.get("A").unwrap().connection, BTreeSet::from(["B".to_string()]));
    assert_eq!(view.get("B").unwrap().connection, BTreeSet::from(["A".to_string()]));
}
