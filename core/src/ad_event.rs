//! Event-label normalizer.
//!
//! Ad events follow a "<prefix>_<N>" naming convention ("ad_watched_10").
//! N is the ad step. Labels without an underscore-digit run are excluded.

use crate::{
    columns::{describe_aliases, resolve_column, EVENT_ALIASES, USERS_ALIASES},
    duplicates::CountedRow,
    error::{MetrixError, MetrixResult},
    table::{parse_users, RawTable},
    types::{AdStep, TableKind, UserCount},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static AD_STEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_([0-9]+)").expect("ad step pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdEventRow {
    pub ad_step: AdStep,
    pub users:   UserCount,
}

impl CountedRow for AdEventRow {
    fn key(&self) -> u64 { self.ad_step }
    fn users(&self) -> UserCount { self.users }
    fn users_mut(&mut self) -> &mut UserCount { &mut self.users }
}

/// Digits following the first underscore-digit run in the label.
pub fn extract_ad_step(label: &str) -> Option<AdStep> {
    AD_STEP.captures(label)?.get(1)?.as_str().parse().ok()
}

/// Resolve the event and users columns, then clean every row.
/// The synthetic step-0 row is not added here; see
/// [`with_baseline_row`].
pub fn normalize_ad_events(table: &RawTable) -> MetrixResult<Vec<AdEventRow>> {
    let event_col = resolve_column(&table.headers, EVENT_ALIASES).ok_or_else(|| {
        MetrixError::MissingColumn {
            table:    TableKind::AdEvents.label(),
            expected: describe_aliases(EVENT_ALIASES),
        }
    })?;
    let users_col = resolve_column(&table.headers, USERS_ALIASES).ok_or_else(|| {
        MetrixError::MissingColumn {
            table:    TableKind::AdEvents.label(),
            expected: describe_aliases(USERS_ALIASES),
        }
    })?;

    let rows = normalize_ad_pairs(table.pairs(event_col, users_col));
    let dropped = table.rows.len() - rows.len();
    if dropped > 0 {
        log::debug!("Event normalizer excluded {dropped} unparseable rows");
    }
    Ok(rows)
}

pub fn normalize_ad_pairs<'a, I>(pairs: I) -> Vec<AdEventRow>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    let mut rows: Vec<AdEventRow> = pairs
        .into_iter()
        .filter_map(|(label, users)| {
            Some(AdEventRow {
                ad_step: extract_ad_step(label?)?,
                users:   parse_users(users?)?,
            })
        })
        .collect();
    rows.sort_by_key(|r| r.ad_step);
    rows
}

/// Prepend the synthetic {ad_step: 0, users: baseline} row standing for
/// every installed user before the first ad. Must be rebuilt whenever the
/// baseline changes. An observed step-0 row is replaced by the synthetic one.
pub fn with_baseline_row(rows: &[AdEventRow], baseline: UserCount) -> Vec<AdEventRow> {
    let observed_zero = rows.iter().filter(|r| r.ad_step == 0).count();
    if observed_zero > 0 {
        log::warn!("Replacing {observed_zero} observed step-0 ad rows with the baseline row");
    }
    std::iter::once(AdEventRow { ad_step: 0, users: baseline })
        .chain(rows.iter().copied().filter(|r| r.ad_step != 0))
        .collect()
}
