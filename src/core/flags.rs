//! Burn option flags
//!
//! DAO and RAW may both be set; nothing here treats them as exclusive.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Options affecting capacity computation and write behaviour
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct BurnFlags: u32 {
        const EJECT = 1;
        const NOGRACE = 1 << 1;
        const DAO = 1 << 2;
        const RAW = 1 << 3;
        const BURNPROOF = 1 << 4;
        const OVERBURN = 1 << 5;
        const BLANK_BEFORE_WRITE = 1 << 6;
        const FAST_BLANK = 1 << 7;
        const NO_TMP_FILES = 1 << 8;
        const DUMMY = 1 << 9;
        const CHECK_SIZE = 1 << 10;
        const MULTI = 1 << 11;
        const APPEND = 1 << 12;
        const MERGE = 1 << 13;
    }
}

/// Human-readable names, in bit order
const FLAG_NAMES: &[(BurnFlags, &str)] = &[
    (BurnFlags::EJECT, "eject"),
    (BurnFlags::NOGRACE, "nograce"),
    (BurnFlags::DAO, "dao"),
    (BurnFlags::RAW, "raw"),
    (BurnFlags::BURNPROOF, "burnproof"),
    (BurnFlags::OVERBURN, "overburn"),
    (BurnFlags::BLANK_BEFORE_WRITE, "blank before write"),
    (BurnFlags::FAST_BLANK, "fast blank"),
    (BurnFlags::NO_TMP_FILES, "no tmp files"),
    (BurnFlags::DUMMY, "dummy"),
    (BurnFlags::CHECK_SIZE, "check size"),
    (BurnFlags::MULTI, "multi"),
    (BurnFlags::APPEND, "append"),
    (BurnFlags::MERGE, "merge"),
];

/// Format a flag set for diagnostics, e.g. `"dao, append"` or `"none"`
///
/// Unknown bits are reported in hex at the end.
pub fn format_flags(flags: BurnFlags) -> String {
    let mut names: Vec<String> = FLAG_NAMES
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| name.to_string())
        .collect();

    let unknown = flags.bits() & !BurnFlags::all().bits();
    if unknown != 0 {
        names.push(format!("unknown(0x{:x})", unknown));
    }

    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Look up a flag by the name `format_flags` prints for it
pub fn parse_flag(name: &str) -> Option<BurnFlags> {
    let wanted = name.trim().to_lowercase().replace(['_', '-'], " ");
    FLAG_NAMES
        .iter()
        .find(|(_, flag_name)| *flag_name == wanted)
        .map(|(flag, _)| *flag)
}
