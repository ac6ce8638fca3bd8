//! Ingest pipeline for generator output.
//!
//! `payload text → extract → unwrap → gate → prune → repair → per-room view
//! → diff`. A payload that fails anywhere before the gate leaves the current
//! set untouched.

use plancraft_constraints::{
    ConstraintValidator, DiffEntry, all_to_rooms, compare, grouped_from_payload,
};
use plancraft_core::{
    ConstraintRecord, GroupedConstraints, PerRoomConstraints, RepairPolicy, Snapshot,
};
use tracing::{debug, info, warn};

/// Result of feeding one payload through the pipeline.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Whether the payload replaced the current set.
    pub accepted: bool,
    /// The set now in effect (the previous one when rejected).
    pub constraints: GroupedConstraints,
    pub rooms: PerRoomConstraints,
    /// Whether reachability repair added anything.
    pub repaired: bool,
    /// Entries dropped for referencing unknown rooms.
    pub pruned: usize,
    /// Changes relative to the previous set.
    pub diff: Vec<DiffEntry>,
}

impl IngestOutcome {
    fn rejected(current: &GroupedConstraints) -> Self {
        Self {
            accepted: false,
            constraints: current.clone(),
            rooms: all_to_rooms(current),
            repaired: false,
            pruned: 0,
            diff: Vec::new(),
        }
    }

    /// Write an accepted set into the snapshot. Rejected outcomes leave it
    /// untouched. Returns whether the snapshot changed.
    pub fn apply_to(&self, snapshot: &mut Snapshot) -> bool {
        if !self.accepted {
            return false;
        }
        snapshot.constraints = ConstraintRecord {
            all: self.constraints.clone(),
            rooms: self.rooms.clone(),
        };
        true
    }
}

/// [`ingest_with`] under the default [`RepairPolicy`].
pub fn ingest(current: &GroupedConstraints, payload: &str) -> IngestOutcome {
    ingest_with(current, payload, &RepairPolicy::default())
}

pub fn ingest_with(
    current: &GroupedConstraints,
    payload: &str,
    policy: &RepairPolicy,
) -> IngestOutcome {
    let Some(mut candidate) = grouped_from_payload(payload) else {
        warn!("Keeping previous constraint set");
        return IngestOutcome::rejected(current);
    };

    let pruned = candidate.prune_unresolved();
    if pruned > 0 {
        debug!(pruned, "Dropped entries referencing unknown rooms");
    }

    let (constraints, repaired) = ConstraintValidator::new(*policy).repair(candidate);
    let rooms = all_to_rooms(&constraints);
    let diff = compare(current, &constraints);

    info!(
        rooms = constraints.room_list().len(),
        changes = diff.len(),
        repaired,
        "Accepted new constraint set"
    );

    IngestOutcome {
        accepted: true,
        constraints,
        rooms,
        repaired,
        pruned,
        diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancraft_constraints::ChangeKind;
    use plancraft_core::RoomPair;

    const PAYLOAD: &str = r#"Here are the constraints:
{"constraints": {
    "hard_constraints": {"room_list": ["kitchen", "bedroom"]},
    "soft_constraints": {
        "connection": {"weight": 0.6, "constraints": [{"room_pair": ["kitchen", "bedroom"], "weight": 0.5}]},
        "area": {"weight": 0.5, "constraints": [{"room": "kitchen", "min": 10, "max": 20}, {"room": "garage", "min": 15}]},
        "orientation": {"weight": 0.5, "constraints": []},
        "window_access": {"weight": 0.5, "constraints": []},
        "aspect_ratio": {"weight": 0.5, "constraints": []},
        "repulsion": {"weight": 0.5, "constraints": []}
    },
    "special_spaces": {"path": true, "entrance": true}
}}"#;

    #[test]
    fn accepted_payload_is_repaired_and_diffed() {
        let outcome = ingest(&GroupedConstraints::template(), PAYLOAD);
        assert!(outcome.accepted);
        assert!(outcome.repaired);
        assert_eq!(outcome.pruned, 1);

        let pairs = outcome.constraints.connection_pairs();
        assert!(pairs.contains(&RoomPair::new("path", "entrance")));
        assert!(pairs.contains(&RoomPair::new("path", "kitchen")));
        assert!(pairs.contains(&RoomPair::new("path", "bedroom")));
        assert_eq!(outcome.constraints.soft_constraints.connection.weight, 0.7);

        assert_eq!(outcome.rooms.len(), 2);
        assert!(
            outcome
                .diff
                .iter()
                .any(|e| e.change == ChangeKind::AddedRooms && e.subject == "bedroom, kitchen")
        );
    }

    #[test]
    fn rejected_payload_keeps_previous_set() {
        let previous = ingest(&GroupedConstraints::template(), PAYLOAD).constraints;
        let outcome = ingest(&previous, "{\"rooms\": {}}");
        assert!(!outcome.accepted);
        assert_eq!(outcome.constraints, previous);
        assert!(outcome.diff.is_empty());

        let mut snapshot = Snapshot::default();
        assert!(!outcome.apply_to(&mut snapshot));
        assert!(snapshot.constraints.all.room_list().is_empty());
    }

    #[test]
    fn reingesting_same_payload_yields_no_diff() {
        let first = ingest(&GroupedConstraints::template(), PAYLOAD);
        let second = ingest(&first.constraints, PAYLOAD);
        assert!(second.accepted);
        assert!(second.diff.is_empty(), "{:?}", second.diff);
    }

    #[test]
    fn accepted_outcome_updates_snapshot() {
        let outcome = ingest(&GroupedConstraints::template(), PAYLOAD);
        let mut snapshot = Snapshot::default();
        assert!(outcome.apply_to(&mut snapshot));
        assert_eq!(snapshot.constraints.all, outcome.constraints);
        assert!(snapshot.constraints.rooms.get("kitchen").is_some());
    }
}
