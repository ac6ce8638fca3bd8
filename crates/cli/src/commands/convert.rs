//! `plancraft convert`: grouped ⇄ per-room, direction picked from the input.

use super::{CmdResult, print_json, read_grouped, read_json};
use plancraft_config::AppConfig;
use plancraft_constraints::{all_to_rooms, rooms_to_all_with};
use plancraft_core::{PerRoomConstraints, is_valid_grouped, is_valid_rooms};
use std::path::Path;
use tracing::{info, warn};

pub fn run(config: &AppConfig, file: &Path, original: Option<&Path>) -> CmdResult {
    let value = read_json(file)?;

    if is_valid_grouped(&value) {
        if original.is_some() {
            warn!("--original only applies to per-room input; ignoring");
        }
        let grouped = read_grouped(file)?;
        info!(rooms = grouped.room_list().len(), "Converting grouped → per-room");
        return print_json(&all_to_rooms(&grouped));
    }

    if is_valid_rooms(&value) {
        let per_room = PerRoomConstraints::from_value(&value)
            .ok_or_else(|| format!("{} has an undecodable rooms map", file.display()))?;
        let original = original.map(read_grouped).transpose()?;
        info!(
            rooms = per_room.len(),
            with_original = original.is_some(),
            "Converting per-room → grouped"
        );
        let grouped = rooms_to_all_with(&per_room, original.as_ref(), &config.converter);
        return print_json(&grouped);
    }

    Err(format!(
        "{} is neither a grouped nor a per-room constraint set",
        file.display()
    )
    .into())
}
