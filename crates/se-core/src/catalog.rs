//! Static process catalog.
//!
//! Maps the short process tags used by the estimation methods to the merged
//! dataset and merged process labels under which their histograms are stored.
//! Fixed at compile time; never mutated at runtime.

use crate::error::{Error, Result};

/// Merged labels for one process tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessEntry {
    /// Merged dataset label (first key field).
    pub dataset: &'static str,
    /// Merged process label (selection sub-field).
    pub process: &'static str,
}

/// All known process tags with their merged labels.
pub const CATALOG: &[(&str, ProcessEntry)] = &[
    ("data", ProcessEntry { dataset: "data", process: "data" }),
    ("ZTT", ProcessEntry { dataset: "DY", process: "DY-ZTT" }),
    ("ZL", ProcessEntry { dataset: "DY", process: "DY-ZL" }),
    ("ZJ", ProcessEntry { dataset: "DY", process: "DY-ZJ" }),
    ("TTT", ProcessEntry { dataset: "TT", process: "TT-TTT" }),
    ("TTL", ProcessEntry { dataset: "TT", process: "TT-TTL" }),
    ("TTJ", ProcessEntry { dataset: "TT", process: "TT-TTJ" }),
    ("VVT", ProcessEntry { dataset: "VV", process: "VV-VVT" }),
    ("VVL", ProcessEntry { dataset: "VV", process: "VV-VVL" }),
    ("VVJ", ProcessEntry { dataset: "VV", process: "VV-VVJ" }),
    ("EMB", ProcessEntry { dataset: "EMB", process: "Embedded" }),
    ("W", ProcessEntry { dataset: "W", process: "W" }),
];

/// Look up the merged labels for a process tag.
///
/// The estimation methods only ever pass tags from their fixed contribution
/// sets, so a miss indicates an engine/catalog inconsistency.
pub fn lookup(tag: &str) -> Result<ProcessEntry> {
    CATALOG
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, e)| *e)
        .ok_or_else(|| Error::Config(format!("unknown process tag: {}", tag)))
}
