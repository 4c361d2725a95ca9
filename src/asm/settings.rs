//! Parse the JSON settings file for batch assembly.
//!
//! Unknown keys are ignored, missing keys keep their defaults.

use serde_json;
use crate::DYNERR;

#[derive(Clone,Debug,PartialEq)]
pub struct Settings {
    /// fail the run if any error was reported
    pub strict: bool,
    /// print the listing to stdout
    pub listing: bool,
    /// add ELF style flags to the export table
    pub elf_flags: bool
}

impl Settings {
    pub fn new() -> Self {
        Self {
            strict: false,
            listing: true,
            elf_flags: false
        }
    }
}

fn update_json_bool(val: &serde_json::Value,key: &str,curr: &mut bool) {
    if let Some(x) = val.get(key) {
        if let Some(b) = x.as_bool() {
            *curr = b;
        }
    }
}

pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    let root = serde_json::from_str::<serde_json::Value>(json)?;
    if root.as_object().is_none() {
        log::warn!("settings should be a JSON object");
        return Ok(ans);
    }
    update_json_bool(&root,"strict",&mut ans.strict);
    update_json_bool(&root,"listing",&mut ans.listing);
    update_json_bool(&root,"elfFlags",&mut ans.elf_flags);
    Ok(ans)
}
