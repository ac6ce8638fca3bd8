//! `plancraft session`: session lifecycle over the configured snapshot store.
//!
//! Every invocation loads the snapshot, runs one pure operation on it, and
//! saves it back. Each `advance` records a `workflow_stage_change` state and
//! the next command continues from the latest one; sessions that never
//! advanced fall back to the resume rules. `resume` always reports the
//! rule-derived stage.

use super::{CmdResult, print_json};
use crate::SessionCommand;
use plancraft_config::AppConfig;
use plancraft_constraints::{render_table, room_table};
use plancraft_core::{IntermediateState, SessionId, Snapshot, SnapshotStore, StoreError};
use plancraft_workflow::{CATALOGUE, WorkflowMachine, default_key_questions, ingest_with};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the intermediate state recorded after each accepted payload.
const CONSTRAINT_UPDATE_STATE: &str = "constraint_update";

pub async fn run(config: &AppConfig, command: SessionCommand) -> CmdResult {
    let store = open_store(config);
    if store.name() == "in_memory" {
        warn!("Session backend is in_memory; nothing will persist after this command");
    }

    match command {
        SessionCommand::New => new(store.as_ref()).await,
        SessionCommand::Show { id } => show(store.as_ref(), parse_id(&id)?).await,
        SessionCommand::Ingest { id, payload } => {
            ingest(config, store.as_ref(), parse_id(&id)?, &payload).await
        }
        SessionCommand::Advance { id } => advance(store.as_ref(), parse_id(&id)?).await,
        SessionCommand::Resume { id } => resume(store.as_ref(), parse_id(&id)?).await,
        SessionCommand::Know { id, category } => {
            know(store.as_ref(), parse_id(&id)?, &category).await
        }
    }
}

fn parse_id(id: &str) -> CmdResult<SessionId> {
    id.parse()
        .map_err(|e| format!("Invalid session id '{id}': {e}").into())
}

async fn load(store: &dyn SnapshotStore, id: SessionId) -> CmdResult<Snapshot> {
    store
        .load(id)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
}

pub async fn new(store: &dyn SnapshotStore) -> CmdResult {
    let id = SessionId::new();
    let snapshot = Snapshot::new(default_key_questions());
    store.save(id, &snapshot).await?;
    info!(session = %id, "Session created");

    println!("{id}");
    eprintln!("{}", WorkflowMachine::restore(&snapshot).describe());
    Ok(())
}

pub async fn show(store: &dyn SnapshotStore, id: SessionId) -> CmdResult {
    let snapshot = load(store, id).await?;
    let machine = WorkflowMachine::restore(&snapshot);

    println!("Session {id}");
    println!("  Stage:      {}", machine.stage());
    println!("  {}", machine.describe());
    println!("\nKey questions:");
    for q in &snapshot.key_questions.questions {
        println!("  [{}] {:<18} {}", q.status, q.category, q.details);
    }
    println!();
    print!("{}", room_table(&snapshot.constraints.all));
    println!("\n{} intermediate state(s) recorded", snapshot.intermediate_states.len());
    Ok(())
}

pub async fn ingest(
    config: &AppConfig,
    store: &dyn SnapshotStore,
    id: SessionId,
    payload: &Path,
) -> CmdResult {
    let mut snapshot = load(store, id).await?;
    let text = std::fs::read_to_string(payload)
        .map_err(|e| format!("Failed to read {}: {e}", payload.display()))?;

    let outcome = ingest_with(&snapshot.constraints.all, &text, &config.repair);
    if !outcome.apply_to(&mut snapshot) {
        eprintln!("Payload rejected; previous constraints kept");
        return Ok(());
    }

    snapshot.record(IntermediateState::now(
        CONSTRAINT_UPDATE_STATE,
        serde_json::json!({
            "repaired": outcome.repaired,
            "pruned": outcome.pruned,
            "diff": outcome.diff,
        }),
    ));
    store.save(id, &snapshot).await?;

    if outcome.repaired {
        eprintln!("Reachability repair applied");
    }
    print!("{}", render_table(&outcome.diff));
    Ok(())
}

pub async fn advance(store: &dyn SnapshotStore, id: SessionId) -> CmdResult {
    let mut snapshot = load(store, id).await?;
    let mut machine = WorkflowMachine::restore(&snapshot);
    if machine.stage() == plancraft_workflow::Stage::RequirementGathering
        && !machine.can_advance_from_requirement_gathering()
    {
        warn!(
            resolved = machine.key_questions().resolved_count(),
            total = machine.key_questions().total(),
            "Advancing with unresolved key questions"
        );
    }

    let change = machine.advance();
    snapshot.record(change.to_state());
    store.save(id, &snapshot).await?;

    println!("{}", change.new_stage);
    eprintln!("{}", machine.describe());
    Ok(())
}

pub async fn resume(store: &dyn SnapshotStore, id: SessionId) -> CmdResult {
    let snapshot = load(store, id).await?;
    let machine = WorkflowMachine::from_snapshot(&snapshot);
    print_json(&serde_json::json!({
        "stage": machine.stage(),
        "iteration": machine.iteration(),
        "description": machine.describe(),
    }))
}

pub async fn know(store: &dyn SnapshotStore, id: SessionId, category: &str) -> CmdResult {
    let mut snapshot = load(store, id).await?;
    if !snapshot.key_questions.mark_known(category) {
        let known: Vec<&str> = CATALOGUE.iter().map(|(c, _)| *c).collect();
        return Err(format!(
            "Unknown key-question category '{category}' (expected one of: {})",
            known.join(", ")
        )
        .into());
    }
    store.save(id, &snapshot).await?;

    let questions = &snapshot.key_questions;
    println!(
        "{}/{} key questions resolved",
        questions.resolved_count(),
        questions.total()
    );
    Ok(())
}

/// The snapshot store selected by `[session]` config.
pub fn open_store(config: &AppConfig) -> Arc<dyn SnapshotStore> {
    plancraft_store::open(&config.session.backend, config.sessions_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancraft_store::InMemoryStore;
    use plancraft_workflow::{Stage, StageChange};

    async fn stage_after_advance(store: &dyn SnapshotStore, id: SessionId) -> Stage {
        advance(store, id).await.unwrap();
        let snapshot = store.load(id).await.unwrap().unwrap();
        StageChange::latest(&snapshot).unwrap().new_stage
    }

    #[tokio::test]
    async fn repeated_advance_walks_every_stage() {
        let store = InMemoryStore::new();
        let id = SessionId::new();
        let mut snapshot = Snapshot::new(default_key_questions());
        for (category, _) in CATALOGUE {
            snapshot.key_questions.mark_known(category);
        }
        store.save(id, &snapshot).await.unwrap();

        let mut stages = Vec::new();
        for _ in 0..5 {
            stages.push(stage_after_advance(&store, id).await);
        }
        assert_eq!(
            stages,
            [
                Stage::ConstraintVisualization,
                Stage::ConstraintRefinement,
                Stage::SolutionGeneration,
                Stage::SolutionRefinement,
                Stage::SolutionGeneration,
            ]
        );

        let snapshot = store.load(id).await.unwrap().unwrap();
        assert_eq!(WorkflowMachine::restore(&snapshot).iteration(), 2);
    }

    #[tokio::test]
    async fn skip_out_of_gathering_sticks() {
        let store = InMemoryStore::new();
        let id = SessionId::new();
        store
            .save(id, &Snapshot::new(default_key_questions()))
            .await
            .unwrap();

        assert_eq!(stage_after_advance(&store, id).await, Stage::ConstraintGeneration);
        assert_eq!(
            stage_after_advance(&store, id).await,
            Stage::ConstraintVisualization
        );
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let store = InMemoryStore::new();
        let err = advance(&store, SessionId::new()).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
