pub mod convert;
pub mod describe;
pub mod diff;
pub mod onboard;
pub mod repair;
pub mod session;
pub mod status;

use plancraft_core::GroupedConstraints;
use serde_json::Value;
use std::path::Path;

pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn read_json(path: &Path) -> CmdResult<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not valid JSON: {e}", path.display()))?;
    Ok(value)
}

/// Read and gate a grouped constraint file.
pub fn read_grouped(path: &Path) -> CmdResult<GroupedConstraints> {
    let value = read_json(path)?;
    GroupedConstraints::from_value(&value).ok_or_else(|| {
        format!(
            "{} is not a grouped constraint set (needs hard_constraints.room_list and all soft-constraint categories)",
            path.display()
        )
        .into()
    })
}

pub fn print_json(value: &impl serde::Serialize) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
