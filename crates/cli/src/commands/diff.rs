//! `plancraft diff`: compare two grouped sets.

use super::{CmdResult, print_json, read_grouped};
use plancraft_constraints::{compare, render_table};
use std::path::Path;

pub fn run(old: &Path, new: &Path, json: bool) -> CmdResult {
    let entries = compare(&read_grouped(old)?, &read_grouped(new)?);
    if json {
        return print_json(&entries);
    }
    print!("{}", render_table(&entries));
    Ok(())
}
