//! Conversation stage machine.
//!
//! Sequences the session through
//! gather → generate → visualize → refine → solve ⇄ refine, and rebuilds its
//! position from a persisted [`Snapshot`] alone. The machine holds no
//! constraint data; the shell passes snapshots in and persists the
//! [`StageChange`] records it emits.

pub mod key_questions;
pub mod pipeline;

use plancraft_core::{IntermediateState, KeyQuestions, Snapshot, snapshot::STAGE_CHANGE_STATE};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

pub use key_questions::{CATALOGUE, default_key_questions, is_known_category};
pub use pipeline::{IngestOutcome, ingest, ingest_with};

/// Conversation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    RequirementGathering,
    ConstraintGeneration,
    ConstraintVisualization,
    ConstraintRefinement,
    SolutionGeneration,
    SolutionRefinement,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::RequirementGathering,
        Stage::ConstraintGeneration,
        Stage::ConstraintVisualization,
        Stage::ConstraintRefinement,
        Stage::SolutionGeneration,
        Stage::SolutionRefinement,
    ];

    /// The stage `advance()` moves to. Solution refinement loops back to
    /// generation; there is no terminal stage.
    pub fn next(self) -> Stage {
        match self {
            Stage::RequirementGathering => Stage::ConstraintGeneration,
            Stage::ConstraintGeneration => Stage::ConstraintVisualization,
            Stage::ConstraintVisualization => Stage::ConstraintRefinement,
            Stage::ConstraintRefinement => Stage::SolutionGeneration,
            Stage::SolutionGeneration => Stage::SolutionRefinement,
            Stage::SolutionRefinement => Stage::SolutionGeneration,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RequirementGathering => "REQUIREMENT_GATHERING",
            Stage::ConstraintGeneration => "CONSTRAINT_GENERATION",
            Stage::ConstraintVisualization => "CONSTRAINT_VISUALIZATION",
            Stage::ConstraintRefinement => "CONSTRAINT_REFINEMENT",
            Stage::SolutionGeneration => "SOLUTION_GENERATION",
            Stage::SolutionRefinement => "SOLUTION_REFINEMENT",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::RequirementGathering => "Requirement gathering",
            Stage::ConstraintGeneration => "Constraint generation",
            Stage::ConstraintVisualization => "Constraint visualization",
            Stage::ConstraintRefinement => "Constraint refinement",
            Stage::SolutionGeneration => "Solution generation",
            Stage::SolutionRefinement => "Solution refinement",
        }
    }

    pub fn is_refinement(&self) -> bool {
        matches!(self, Stage::ConstraintRefinement | Stage::SolutionRefinement)
    }

    /// Stages that run to completion within one turn and are never resumed
    /// into.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Stage::ConstraintGeneration | Stage::ConstraintVisualization | Stage::SolutionGeneration
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted on every transition; persisted as a `workflow_stage_change`
/// intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageChange {
    pub new_stage: Stage,
    pub iteration: u32,
}

impl StageChange {
    /// The most recent readable stage change recorded in a snapshot.
    pub fn latest(snapshot: &Snapshot) -> Option<Self> {
        snapshot
            .intermediate_states
            .iter()
            .rev()
            .filter(|state| state.name == STAGE_CHANGE_STATE)
            .find_map(|state| match serde_json::from_value(state.data.clone()) {
                Ok(change) => Some(change),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable stage change record");
                    None
                }
            })
    }

    pub fn to_state(&self) -> IntermediateState {
        IntermediateState::now(
            STAGE_CHANGE_STATE,
            serde_json::json!({
                "new_stage": self.new_stage,
                "iteration": self.iteration,
            }),
        )
    }
}

/// Stage to resume a session into, judged from persisted state only.
///
/// Rules in priority order:
/// 1. any unknown key question → `REQUIREMENT_GATHERING`
/// 2. empty room list → `CONSTRAINT_GENERATION`
/// 3. no recorded solution → `CONSTRAINT_REFINEMENT`
/// 4. otherwise → `SOLUTION_REFINEMENT`
pub fn resume(snapshot: &Snapshot) -> Stage {
    if snapshot.key_questions.any_unknown() {
        Stage::RequirementGathering
    } else if snapshot.constraints.all.room_list().is_empty() {
        Stage::ConstraintGeneration
    } else if !snapshot.has_solution() {
        Stage::ConstraintRefinement
    } else {
        Stage::SolutionRefinement
    }
}

/// The live stage sequencer for one session.
#[derive(Debug, Clone)]
pub struct WorkflowMachine {
    stage: Stage,
    iteration: u32,
    key_questions: KeyQuestions,
}

impl Default for WorkflowMachine {
    fn default() -> Self {
        Self::new(default_key_questions())
    }
}

impl WorkflowMachine {
    /// A machine at `REQUIREMENT_GATHERING`, iteration 1.
    pub fn new(key_questions: KeyQuestions) -> Self {
        Self {
            stage: Stage::RequirementGathering,
            iteration: 1,
            key_questions,
        }
    }

    /// Rebuild the machine from the resume rules alone.
    ///
    /// Resuming into solution refinement takes the iteration from the latest
    /// recorded solution, so it can read higher than a live machine, which
    /// resets to 1 on entering refinement. Use [`WorkflowMachine::restore`]
    /// to continue exactly where a session left off.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let stage = resume(snapshot);
        let iteration = match stage {
            Stage::SolutionRefinement => snapshot.latest_solution_iteration().unwrap_or(1).max(1),
            _ => 1,
        };
        info!(stage = %stage, iteration, "Resumed workflow");
        Self {
            stage,
            iteration,
            key_questions: snapshot.key_questions.clone(),
        }
    }

    /// Continue a session: the latest recorded [`StageChange`] gives the
    /// stage and iteration. Sessions that never advanced fall back to
    /// [`WorkflowMachine::from_snapshot`].
    pub fn restore(snapshot: &Snapshot) -> Self {
        let Some(change) = StageChange::latest(snapshot) else {
            return Self::from_snapshot(snapshot);
        };
        info!(stage = %change.new_stage, iteration = change.iteration, "Restored workflow");
        Self {
            stage: change.new_stage,
            iteration: change.iteration.max(1),
            key_questions: snapshot.key_questions.clone(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn key_questions(&self) -> &KeyQuestions {
        &self.key_questions
    }

    /// Replace the tracked questions with the latest known state.
    pub fn set_key_questions(&mut self, key_questions: KeyQuestions) {
        self.key_questions = key_questions;
    }

    /// Whether requirement gathering is complete. Advisory only: `advance()`
    /// does not check it.
    pub fn can_advance_from_requirement_gathering(&self) -> bool {
        self.key_questions.all_known()
    }

    /// Move to the next stage.
    pub fn advance(&mut self) -> StageChange {
        let from = self.stage;
        let to = from.next();
        if to.is_refinement() {
            self.iteration = 1;
        } else if from == Stage::SolutionRefinement && to == Stage::SolutionGeneration {
            self.iteration += 1;
        }
        self.stage = to;
        debug!(from = %from, to = %to, iteration = self.iteration, "Stage transition");
        StageChange {
            new_stage: to,
            iteration: self.iteration,
        }
    }

    /// One-line status for the user.
    pub fn describe(&self) -> String {
        let label = self.stage.label();
        match self.stage {
            Stage::RequirementGathering => format!(
                "[{label}] {}/{} key questions resolved",
                self.key_questions.resolved_count(),
                self.key_questions.total()
            ),
            Stage::ConstraintGeneration => {
                format!("[{label}] Generating constraints from your requirements")
            }
            Stage::ConstraintVisualization => format!("[{label}] Presenting the constraint set"),
            Stage::ConstraintRefinement => format!(
                "[{label}] Round {}: suggest changes to the constraints (enter 'skip' to move on)",
                self.iteration
            ),
            Stage::SolutionGeneration => format!(
                "[{label}] Round {}: generating a layout from the constraints",
                self.iteration
            ),
            Stage::SolutionRefinement => format!(
                "[{label}] Round {}: suggest changes to the layout (enter 'skip' to move on)",
                self.iteration
            ),
        }
    }
}
