//! # plancraft core
//!
//! Domain types for the architectural constraint pipeline: the grouped and
//! per-room constraint schemas, the persisted session snapshot, and the
//! snapshot store trait. This crate has **no framework dependencies**; the
//! algorithms (convert, repair, diff) live in `plancraft-constraints` and the
//! stage sequencer in `plancraft-workflow`.
//!
//! ## Failure model
//!
//! Nothing in the pipeline is user-fatal. Malformed external payloads are
//! rejected at the boundary ([`is_valid_grouped`]) and the caller keeps its
//! previous state; unresolved room references are dropped; missing snapshots
//! load as defaults.

pub mod error;
pub mod room;
pub mod schema;
pub mod per_room;
pub mod options;
pub mod snapshot;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, StoreError};
pub use room::{RoomId, RoomPair, SpecialSpace, is_special};
pub use schema::{
    Category, CategoryKind, GroupedConstraints, HardConstraints, OrientationEntry, RangeEntry,
    RelationEntry, RepulsionEntry, SoftConstraints, SpecialSpaces, WindowAccessEntry,
    is_valid_grouped,
};
pub use per_room::{Bounds, PerRoomConstraints, RoomConstraints, is_valid_rooms};
pub use options::{ConverterOptions, RepairPolicy};
pub use snapshot::{
    ConstraintRecord, IntermediateState, KeyQuestion, KeyQuestions, QuestionStatus, Snapshot,
    TextRecord,
};
pub use store::{SessionId, SnapshotStore};
