//! CLI subcommand implementations.

pub mod request;
pub mod upload;

use std::collections::HashMap;

/// Collects repeated `-H KEY=VALUE` flags; `None` when none were given.
pub fn header_overrides(pairs: &[(String, String)]) -> Option<HashMap<String, String>> {
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.iter().cloned().collect())
    }
}
