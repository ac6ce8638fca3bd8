//! End-to-end tests for a design session.
//!
//! These drive the same sequence the `session` commands do: create a
//! snapshot, resolve key questions, ingest generator output, advance through
//! the stages, persist, and resume from a freshly opened store.

use plancraft_constraints::{ChangeKind, all_to_rooms, compare, rooms_to_all, unreachable_rooms};
use plancraft_core::{
    IntermediateState, RoomPair, SessionId, Snapshot, SnapshotStore, snapshot::STAGE_CHANGE_STATE,
};
use plancraft_store::FileStore;
use plancraft_workflow::{CATALOGUE, Stage, WorkflowMachine, default_key_questions, ingest};

// ── Generator payloads ───────────────────────────────────────────────────

const FIRST_DRAFT: &str = r#"Based on our conversation, here is the constraint set:
```json
{
  "constraints": {
    "hard_constraints": {"room_list": ["living", "kitchen", "bedroom", "study"]},
    "soft_constraints": {
      "connection": {"weight": 0.4, "constraints": [
        {"room pair": ["living", "kitchen"], "room_weight": 0.9},
        {"room pair": ["entrance", "living"], "room_weight": 1.0},
        {"room pair": ["bedroom", "study"], "room_weight": 0.6}
      ]},
      "area": {"weight": 0.6, "constraints": [
        {"room": "living", "min": 20, "max": 30},
        {"room": "kitchen", "min": 10, "max": 20}
      ]},
      "orientation": {"weight": 0.3, "constraints": [{"room": "bedroom", "direction": "south"}]},
      "window_access": {"weight": 0.5, "constraints": [{"room": "study"}]},
      "aspect_ratio": {"weight": 0.2, "constraints": []},
      "repulsion": {"weight": 0.4, "constraints": [
        {"room1": "bedroom", "room2": "kitchen", "min_distance": 3.0}
      ]}
    },
    "special_spaces": {"path": true, "entrance": true}
  }
}
```
Let me know if you want changes."#;

const REFINED: &str = r#"{"refined_constraints": {
    "hard_constraints": {"room_list": ["living", "kitchen", "bedroom", "study"]},
    "soft_constraints": {
      "connection": {"weight": 0.7, "constraints": [
        {"room_pair": ["living", "kitchen"], "weight": 0.9},
        {"room_pair": ["entrance", "living"], "weight": 1.0},
        {"room_pair": ["path", "entrance"], "weight": 1.0},
        {"room_pair": ["path", "bedroom"], "weight": 0.8},
        {"room_pair": ["path", "study"], "weight": 0.8},
        {"room_pair": ["bedroom", "study"], "weight": 0.6}
      ]},
      "area": {"weight": 0.6, "constraints": [
        {"room": "living", "min": 20, "max": 30},
        {"room": "kitchen", "min": 12, "max": 20}
      ]},
      "orientation": {"weight": 0.3, "constraints": [{"room": "bedroom", "direction": "south"}]},
      "window_access": {"weight": 0.5, "constraints": [{"room": "study"}]},
      "aspect_ratio": {"weight": 0.2, "constraints": []},
      "repulsion": {"weight": 0.4, "constraints": [
        {"room1": "bedroom", "room2": "kitchen", "min_distance": 3.0}
      ]}
    },
    "special_spaces": {"path": true, "entrance": true}
}}"#;

fn resolve_all(snapshot: &mut Snapshot) {
    for (category, _) in CATALOGUE {
        assert!(snapshot.key_questions.mark_known(category));
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let id = SessionId::new();

    // Gathering
    let store = FileStore::new(dir.path());
    let mut snapshot = Snapshot::new(default_key_questions());
    store.save(id, &snapshot).await.unwrap();
    assert_eq!(
        WorkflowMachine::from_snapshot(&snapshot).stage(),
        Stage::RequirementGathering
    );

    resolve_all(&mut snapshot);
    let mut machine = WorkflowMachine::from_snapshot(&snapshot);
    assert_eq!(machine.stage(), Stage::ConstraintGeneration);

    // Generation: the draft leaves bedroom and study unreachable
    let outcome = ingest(&snapshot.constraints.all, FIRST_DRAFT);
    assert!(outcome.accepted);
    assert!(outcome.repaired);
    assert!(unreachable_rooms(&outcome.constraints).is_empty());
    let pairs = outcome.constraints.connection_pairs();
    assert!(pairs.contains(&RoomPair::new("path", "bedroom")));
    assert!(pairs.contains(&RoomPair::new("path", "study")));
    assert!(!pairs.contains(&RoomPair::new("path", "kitchen")));
    assert!(outcome.apply_to(&mut snapshot));

    for expected in [Stage::ConstraintVisualization, Stage::ConstraintRefinement] {
        let change = machine.advance();
        assert_eq!(change.new_stage, expected);
        snapshot.record(change.to_state());
    }
    store.save(id, &snapshot).await.unwrap();

    // Restart: resume lands in constraint refinement
    let reopened = FileStore::new(dir.path());
    let mut snapshot = reopened.load(id).await.unwrap().unwrap();
    let mut machine = WorkflowMachine::from_snapshot(&snapshot);
    assert_eq!(machine.stage(), Stage::ConstraintRefinement);
    assert_eq!(
        snapshot
            .intermediate_states
            .iter()
            .filter(|s| s.name == STAGE_CHANGE_STATE)
            .count(),
        2
    );

    // Refinement: only the kitchen area moves
    let refined = ingest(&snapshot.constraints.all, REFINED);
    assert!(refined.accepted);
    assert!(!refined.repaired);
    assert_eq!(refined.diff.len(), 1, "{:?}", refined.diff);
    assert_eq!(refined.diff[0].change, ChangeKind::ValueChanged);
    assert_eq!(refined.diff[0].subject, "kitchen");
    assert!(refined.apply_to(&mut snapshot));

    // Solve, then record the solver result
    assert_eq!(machine.advance().new_stage, Stage::SolutionGeneration);
    snapshot.record(IntermediateState::now(
        "solution_generation_1",
        serde_json::json!({"solution": {"living": [0, 0, 5, 4]}}),
    ));
    assert_eq!(machine.advance().new_stage, Stage::SolutionRefinement);
    reopened.save(id, &snapshot).await.unwrap();

    let restored = FileStore::new(dir.path()).load(id).await.unwrap().unwrap();
    let resumed = WorkflowMachine::from_snapshot(&restored);
    assert_eq!(resumed.stage(), Stage::SolutionRefinement);
    assert_eq!(resumed.iteration(), 1);
}

#[tokio::test]
async fn rejected_payload_leaves_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let id = SessionId::new();
    let mut snapshot = Snapshot::new(default_key_questions());
    resolve_all(&mut snapshot);
    assert!(ingest(&snapshot.constraints.all, FIRST_DRAFT).apply_to(&mut snapshot));
    store.save(id, &snapshot).await.unwrap();

    let before = store.load(id).await.unwrap().unwrap();
    let outcome = ingest(&before.constraints.all, "I could not produce constraints this time.");
    let mut after = before.clone();
    assert!(!outcome.apply_to(&mut after));
    assert_eq!(after, before);
    assert_eq!(outcome.constraints, before.constraints.all);
}

#[tokio::test]
async fn unknown_question_resumes_gathering_despite_constraints() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let id = SessionId::new();

    let mut snapshot = Snapshot::new(default_key_questions());
    resolve_all(&mut snapshot);
    snapshot
        .key_questions
        .set_status("lifestyle", plancraft_core::QuestionStatus::Unknown);
    assert!(ingest(&snapshot.constraints.all, FIRST_DRAFT).apply_to(&mut snapshot));
    store.save(id, &snapshot).await.unwrap();

    let loaded = store.load(id).await.unwrap().unwrap();
    assert!(!loaded.constraints.all.room_list().is_empty());
    assert_eq!(
        WorkflowMachine::from_snapshot(&loaded).stage(),
        Stage::RequirementGathering
    );
}

#[test]
fn per_room_round_trip_preserves_repaired_set() {
    let outcome = ingest(&Default::default(), FIRST_DRAFT);
    let view = all_to_rooms(&outcome.constraints);
    let rebuilt = rooms_to_all(&view, Some(&outcome.constraints));

    assert_eq!(rebuilt.connection_pairs(), outcome.constraints.connection_pairs());
    assert_eq!(rebuilt.room_list(), outcome.constraints.room_list());
    assert!(compare(&outcome.constraints, &rebuilt).is_empty());
}
