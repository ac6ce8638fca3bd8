//! Explicit tuning knobs for the converter and the reachability repair.
//!
//! These are plain values passed to the functions that need them; the
//! defaults reproduce the standard pipeline behavior.

use crate::schema::{DEFAULT_ITEM_WEIGHT, DEFAULT_MIN_DISTANCE};
use serde::{Deserialize, Serialize};

/// Defaults used when rebuilding the grouped form from the per-room view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConverterOptions {
    /// Category weight when no original grouped set is supplied.
    #[serde(default = "default_category_weight")]
    pub default_category_weight: f64,

    /// Item weight when it cannot be recovered from an original entry.
    #[serde(default = "default_item_weight")]
    pub default_item_weight: f64,

    /// Repulsion separation when it cannot be recovered.
    #[serde(default = "default_min_distance")]
    pub default_min_distance: f64,
}

fn default_category_weight() -> f64 {
    0.5
}
fn default_item_weight() -> f64 {
    DEFAULT_ITEM_WEIGHT
}
fn default_min_distance() -> f64 {
    DEFAULT_MIN_DISTANCE
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            default_category_weight: default_category_weight(),
            default_item_weight: default_item_weight(),
            default_min_distance: default_min_distance(),
        }
    }
}

/// Weights and thresholds applied by the reachability repair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepairPolicy {
    /// Weight of the guaranteed `path`–`entrance` connection.
    #[serde(default = "default_path_entrance_weight")]
    pub path_entrance_weight: f64,

    /// Weight of each `path`–room connection added for an unreachable room.
    #[serde(default = "default_hub_weight")]
    pub hub_weight: f64,

    /// Connection category weights below this are raised.
    #[serde(default = "default_min_connection_weight")]
    pub min_connection_weight: f64,

    /// Connection category weight after a repair or a raise.
    #[serde(default = "default_raised_connection_weight")]
    pub raised_connection_weight: f64,
}

fn default_path_entrance_weight() -> f64 {
    1.0
}
fn default_hub_weight() -> f64 {
    0.8
}
fn default_min_connection_weight() -> f64 {
    0.5
}
fn default_raised_connection_weight() -> f64 {
    0.7
}

impl Default for RepairPolicy {
    fn default() -> Self {
        Self {
            path_entrance_weight: default_path_entrance_weight(),
            hub_weight: default_hub_weight(),
            min_connection_weight: default_min_connection_weight(),
            raised_connection_weight: default_raised_connection_weight(),
        }
    }
}
