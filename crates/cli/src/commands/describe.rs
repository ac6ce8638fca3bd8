//! `plancraft describe`: room table plus overview.

use super::{CmdResult, read_grouped};
use plancraft_constraints::{describe, room_table};
use std::path::Path;

pub fn run(file: &Path) -> CmdResult {
    let grouped = read_grouped(file)?;
    print!("{}", room_table(&grouped));
    println!();
    print!("{}", describe(&grouped));
    Ok(())
}
