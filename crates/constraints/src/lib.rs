//! # plancraft constraints
//!
//! The pure half of the pipeline. Everything here is synchronous and
//! deterministic, and never fails on malformed input:
//!
//! - [`convert`]: grouped ⇄ per-room transforms
//! - [`validator`]: reachability check and additive repair
//! - [`diff`]: structural comparison between two grouped sets
//! - [`describe`]: plain-text room table and overview
//! - [`payload`]: JSON extraction from generator output

pub mod convert;
pub mod describe;
pub mod diff;
pub mod payload;
mod table;
pub mod validator;

pub use convert::{all_to_rooms, all_to_rooms_value, rooms_to_all, rooms_to_all_with};
pub use describe::{describe, room_table};
pub use diff::{ChangeKind, DiffEntry, compare, is_unchanged, render_table};
pub use payload::{extract_json, grouped_from_payload, parse_payload, unwrap_constraints};
pub use validator::{
    ConstraintValidator, ReachabilityGraph, repair, unreachable_rooms,
    validate_and_add_path_entrance, validate_connectivity,
};
