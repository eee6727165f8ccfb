//! Header alias resolution.
//!
//! Headers are matched against a fixed alias list, case-insensitively,
//! after trimming. Alias order is priority order: when a table carries more
//! than one accepted alias, the earliest alias in the list wins.

pub const LEVEL_ALIASES: &[&str] = &["LEVEL", "LEVEL PLAYED", "TOTALLEVEL", "TOTALLEVELPLAYED"];
pub const USERS_ALIASES: &[&str] = &["USERS"];
pub const EVENT_ALIASES: &[&str] = &["EVENT"];

/// Normalize a header for comparison.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_uppercase()
}

/// Return the index of the column matching the highest-priority alias,
/// or `None` when no header matches any alias.
pub fn resolve_column<S: AsRef<str>>(headers: &[S], aliases: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
    aliases
        .iter()
        .find_map(|alias| normalized.iter().position(|h| h == alias))
}

/// Human-readable alias list for error messages.
pub fn describe_aliases(aliases: &[&str]) -> String {
    aliases.join(" | ")
}
