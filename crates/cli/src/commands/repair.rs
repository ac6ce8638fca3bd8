//! `plancraft repair`: reachability repair of a grouped set.

use super::{CmdResult, print_json, read_grouped};
use plancraft_config::AppConfig;
use plancraft_constraints::{ConstraintValidator, unreachable_rooms};
use std::path::Path;

pub fn run(config: &AppConfig, file: &Path, output: Option<&Path>) -> CmdResult {
    let grouped = read_grouped(file)?;
    let unreachable = unreachable_rooms(&grouped);
    let (repaired, modified) = ConstraintValidator::new(config.repair).repair(grouped);

    match output {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(&repaired)?)?;
            if modified {
                eprintln!(
                    "Repaired → {} ({} room(s) attached to path)",
                    path.display(),
                    unreachable.len()
                );
            } else {
                eprintln!("Already valid → {}", path.display());
            }
            Ok(())
        }
        None => print_json(&repaired),
    }
}
