//! Level-label normalizer.
//!
//! Turns the free-form level column ("Level 20", "20", "LVL_20") into an
//! ascending sequence of integer levels. Rows whose label or user count
//! cannot be parsed are excluded; ties are passed through untouched.

use crate::{
    columns::{describe_aliases, resolve_column, LEVEL_ALIASES, USERS_ALIASES},
    duplicates::CountedRow,
    error::{MetrixError, MetrixResult},
    table::{parse_users, RawTable},
    types::{Level, TableKind, UserCount},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LEVEL_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("level digit pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRow {
    pub level: Level,
    pub users: UserCount,
}

impl CountedRow for LevelRow {
    fn key(&self) -> u64 { self.level }
    fn users(&self) -> UserCount { self.users }
    fn users_mut(&mut self) -> &mut UserCount { &mut self.users }
}

/// First maximal run of decimal digits anywhere in the label.
/// Returns `None` when there is no run or it overflows.
pub fn extract_level(label: &str) -> Option<Level> {
    LEVEL_DIGITS.find(label)?.as_str().parse().ok()
}

/// Resolve the level and users columns, then clean every row.
/// A missing column aborts the run.
pub fn normalize_levels(table: &RawTable) -> MetrixResult<Vec<LevelRow>> {
    let level_col = resolve_column(&table.headers, LEVEL_ALIASES).ok_or_else(|| {
        MetrixError::MissingColumn {
            table:    TableKind::Retention.label(),
            expected: describe_aliases(LEVEL_ALIASES),
        }
    })?;
    let users_col = resolve_column(&table.headers, USERS_ALIASES).ok_or_else(|| {
        MetrixError::MissingColumn {
            table:    TableKind::Retention.label(),
            expected: describe_aliases(USERS_ALIASES),
        }
    })?;

    let rows = normalize_level_pairs(table.pairs(level_col, users_col));
    let dropped = table.rows.len() - rows.len();
    if dropped > 0 {
        log::debug!("Level normalizer excluded {dropped} unparseable rows");
    }
    Ok(rows)
}

/// Clean (label, users) pairs. Output is sorted ascending by level; the
/// sort is stable so tied levels keep their input order.
pub fn normalize_level_pairs<'a, I>(pairs: I) -> Vec<LevelRow>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    let mut rows: Vec<LevelRow> = pairs
        .into_iter()
        .filter_map(|(label, users)| {
            Some(LevelRow {
                level: extract_level(label?)?,
                users: parse_users(users?)?,
            })
        })
        .collect();
    rows.sort_by_key(|r| r.level);
    rows
}
