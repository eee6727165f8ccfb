//! Duplicate collapse for cleaned rows.
//!
//! Two labels can clean to the same number ("Level 20" and "LVL_20").
//! The normalizers pass such ties through; this module decides what
//! happens to them, under an explicit policy.

use crate::{
    error::{MetrixError, MetrixResult},
    types::{TableKind, UserCount},
};
use serde::{Deserialize, Serialize};

/// A cleaned row keyed by its level or ad step.
pub trait CountedRow: Copy {
    fn key(&self) -> u64;
    fn users(&self) -> UserCount;
    fn users_mut(&mut self) -> &mut UserCount;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Abort the run on the first duplicate.
    #[default]
    Reject,
    /// Keep the first row seen in input order.
    KeepFirst,
    /// Add the user counts of all tied rows.
    Sum,
}

impl DuplicatePolicy {
    pub fn name(self) -> &'static str {
        match self {
            DuplicatePolicy::Reject    => "reject",
            DuplicatePolicy::KeepFirst => "keep_first",
            DuplicatePolicy::Sum       => "sum",
        }
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "reject"     => Ok(DuplicatePolicy::Reject),
            "keep_first" => Ok(DuplicatePolicy::KeepFirst),
            "sum"        => Ok(DuplicatePolicy::Sum),
            other        => Err(format!("unknown duplicate policy '{other}'")),
        }
    }
}

/// Collapse tied keys in rows already sorted by key (stable sort, so ties
/// are adjacent and in input order).
pub fn collapse_duplicates<T: CountedRow>(
    rows: Vec<T>,
    policy: DuplicatePolicy,
    table: TableKind,
) -> MetrixResult<Vec<T>> {
    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        let tied = out.last().is_some_and(|prev| prev.key() == row.key());
        if !tied {
            out.push(row);
            continue;
        }

        log::warn!(
            "Duplicate {} value {} collapsed with policy {}",
            table.label(),
            row.key(),
            policy.name()
        );
        match policy {
            DuplicatePolicy::Reject => {
                return Err(MetrixError::DuplicateLevel {
                    table: table.label(),
                    value: row.key(),
                });
            }
            DuplicatePolicy::KeepFirst => {}
            DuplicatePolicy::Sum => {
                if let Some(prev) = out.last_mut() {
                    let users = prev.users_mut();
                    *users = users.saturating_add(row.users());
                }
            }
        }
    }
    Ok(out)
}
