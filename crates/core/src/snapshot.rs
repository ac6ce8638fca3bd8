//! Persisted session snapshot: the minimum state needed to resume a
//! conversation after a restart.

use crate::per_room::PerRoomConstraints;
use crate::schema::GroupedConstraints;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name prefix of the intermediate states that record a solver result.
pub const SOLUTION_STATE_PREFIX: &str = "solution_generation_";

/// Name of the intermediate state recorded on every stage transition.
pub const STAGE_CHANGE_STATE: &str = "workflow_stage_change";

/// A free-text record maintained by the conversation (spatial understanding,
/// user requirement guess).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Known,
    #[default]
    Unknown,
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionStatus::Known => f.write_str("known"),
            QuestionStatus::Unknown => f.write_str("unknown"),
        }
    }
}

/// One tracked key-question category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyQuestion {
    pub category: String,

    #[serde(default)]
    pub status: QuestionStatus,

    #[serde(default)]
    pub details: String,
}

impl KeyQuestion {
    pub fn unknown(category: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            status: QuestionStatus::Unknown,
            details: details.into(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.status == QuestionStatus::Known
    }
}

/// The tracked key-question categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyQuestions {
    #[serde(default)]
    pub questions: Vec<KeyQuestion>,
}

impl KeyQuestions {
    pub fn new(questions: Vec<KeyQuestion>) -> Self {
        Self { questions }
    }

    /// True only when every tracked category is known. An empty list counts
    /// as fully known.
    pub fn all_known(&self) -> bool {
        self.questions.iter().all(KeyQuestion::is_known)
    }

    pub fn any_unknown(&self) -> bool {
        !self.all_known()
    }

    pub fn resolved_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_known()).count()
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Mark a category as known. Returns `false` if no such category exists.
    pub fn mark_known(&mut self, category: &str) -> bool {
        self.set_status(category, QuestionStatus::Known)
    }

    pub fn set_status(&mut self, category: &str, status: QuestionStatus) -> bool {
        match self.questions.iter_mut().find(|q| q.category == category) {
            Some(q) => {
                q.status = status;
                true
            }
            None => false,
        }
    }
}

/// Both representations of the session's current constraint set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    #[serde(default)]
    pub all: GroupedConstraints,

    #[serde(default)]
    pub rooms: PerRoomConstraints,
}

/// A named checkpoint recorded during the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntermediateState {
    pub name: String,
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub data: serde_json::Value,
}

impl IntermediateState {
    pub fn now(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            timestamp: Utc::now(),
            data,
        }
    }

    /// The iteration number of a recorded solver result, if this is one.
    ///
    /// A solution record is named `solution_generation_<n>` and carries a
    /// `solution` key in its data.
    pub fn solution_iteration(&self) -> Option<u32> {
        let n = self.name.strip_prefix(SOLUTION_STATE_PREFIX)?;
        if self.data.get("solution").is_none() {
            return None;
        }
        n.parse().ok()
    }
}

/// Everything persisted for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub spatial_understanding: TextRecord,

    #[serde(default)]
    pub user_requirements: TextRecord,

    #[serde(default)]
    pub key_questions: KeyQuestions,

    #[serde(default)]
    pub constraints: ConstraintRecord,

    #[serde(default)]
    pub intermediate_states: Vec<IntermediateState>,
}

impl Snapshot {
    /// A fresh session: empty template constraints and the given questions.
    pub fn new(key_questions: KeyQuestions) -> Self {
        Self {
            key_questions,
            ..Self::default()
        }
    }

    pub fn record(&mut self, state: IntermediateState) {
        self.intermediate_states.push(state);
    }

    /// Largest iteration among recorded solver results.
    pub fn latest_solution_iteration(&self) -> Option<u32> {
        self.intermediate_states
            .iter()
            .filter_map(IntermediateState::solution_iteration)
            .max()
    }

    pub fn has_solution(&self) -> bool {
        self.latest_solution_iteration().is_some()
    }
}
