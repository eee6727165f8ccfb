//! Retention and drop calculator.
//!
//! retention % = users / baseline * 100
//! drop %      = (users[i] - users[i+1]) / users[i] * 100
//!
//! Both are rounded to two decimals and never clamped: retention above
//! 100% and negative drops are data anomalies that must stay visible.

use crate::{
    baseline::checked_denominator,
    error::MetrixResult,
    level::LevelRow,
    types::{round2, Level, Percent, UserCount},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionRow {
    pub level:         Level,
    pub users:         UserCount,
    pub retention_pct: Percent,
    pub drop_pct:      Percent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionTable {
    pub rows: Vec<RetentionRow>,
}

impl RetentionTable {
    pub fn retention_at(&self, level: Level) -> Option<Percent> {
        self.rows.iter().find(|r| r.level == level).map(|r| r.retention_pct)
    }

    pub fn drop_at(&self, level: Level) -> Option<Percent> {
        self.rows.iter().find(|r| r.level == level).map(|r| r.drop_pct)
    }

    /// Rows whose drop is at or above `threshold`, for highlighting.
    pub fn rows_with_drop_at_least(&self, threshold: Percent) -> impl Iterator<Item = (usize, &RetentionRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.drop_pct >= threshold)
    }

    /// Rows up to and including `cap`, for the early-game chart.
    pub fn up_to_level(&self, cap: Level) -> Vec<RetentionRow> {
        self.rows.iter().copied().filter(|r| r.level <= cap).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Drop between two consecutive levels. A zero starting count has no
/// meaningful drop and reports 0.
pub fn drop_pct(current: UserCount, next: UserCount) -> Percent {
    if current == 0 {
        return 0.0;
    }
    round2((current as f64 - next as f64) / current as f64 * 100.0)
}

/// Derive retention and drop for ascending, duplicate-free level rows.
pub fn compute_retention(rows: &[LevelRow], baseline: UserCount) -> MetrixResult<RetentionTable> {
    let denominator = checked_denominator(baseline)?;

    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let drop = rows
                .get(i + 1)
                .map(|next| drop_pct(row.users, next.users))
                .unwrap_or(0.0);
            RetentionRow {
                level:         row.level,
                users:         row.users,
                retention_pct: round2(row.users as f64 / denominator * 100.0),
                drop_pct:      drop,
            }
        })
        .collect::<Vec<_>>();

    if let Some(over) = rows.iter().find(|r| r.retention_pct > 100.0) {
        log::warn!(
            "Level {} reports {}% retention; upstream counts exceed the baseline",
            over.level,
            over.retention_pct
        );
    }
    Ok(RetentionTable { rows })
}
