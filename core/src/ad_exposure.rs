//! Ad-exposure calculator.
//!
//! Works on ad-event rows that already include the synthetic step-0 row
//! (see `ad_event::with_baseline_row`).
//!
//! Average ads per user is a heuristic integral, not an exact count:
//!
//!   diff_ad[i]    = step[i] - step[i-1]          (diff_ad[0] = step[0])
//!   by_step       = sum(users[i] * diff_ad[i])
//!   avg_gap       = mean(diff_ad[1..])
//!   diff_users[i] = users[i-1] - users[i]        (diff_users[0] = 0)
//!   by_dropoff    = sum(avg_gap * diff_users[i])
//!   avg_ads       = round((by_step + by_dropoff) / baseline, 2)
//!
//! Survivors to a checkpoint are credited the full step gap; users who
//! churned between checkpoints are credited the average gap.

use crate::{
    ad_event::AdEventRow,
    baseline::checked_denominator,
    error::MetrixResult,
    types::{round2, AdStep, Percent, UserCount},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdExposureRow {
    pub ad_step:    AdStep,
    pub users:      UserCount,
    pub pct_at_ad:  Percent,
    pub diff_ad:    u64,
    pub diff_users: i128,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdExposureTable {
    pub rows: Vec<AdExposureRow>,
    pub avg_step_gap: f64,
    pub avg_ads_per_user: f64,
}

impl AdExposureTable {
    pub fn pct_at(&self, ad_step: AdStep) -> Option<Percent> {
        self.rows.iter().find(|r| r.ad_step == ad_step).map(|r| r.pct_at_ad)
    }
}

/// Derive per-step exposure and the average-ads aggregate. A zero
/// baseline is rejected before any division happens.
pub fn compute_ad_exposure(rows: &[AdEventRow], baseline: UserCount) -> MetrixResult<AdExposureTable> {
    let denominator = checked_denominator(baseline)?;

    let mut table_rows = Vec::with_capacity(rows.len());
    let mut prev: Option<&AdEventRow> = None;
    for row in rows {
        let (diff_ad, diff_users) = match prev {
            Some(p) => (
                row.ad_step.saturating_sub(p.ad_step),
                i128::from(p.users) - i128::from(row.users),
            ),
            None => (row.ad_step, 0),
        };
        table_rows.push(AdExposureRow {
            ad_step:   row.ad_step,
            users:     row.users,
            pct_at_ad: round2(row.users as f64 / denominator * 100.0),
            diff_ad,
            diff_users,
        });
        prev = Some(row);
    }

    let gaps: Vec<u64> = table_rows.iter().skip(1).map(|r| r.diff_ad).collect();
    let avg_step_gap = if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<u64>() as f64 / gaps.len() as f64
    };

    let weighted_by_step: f64 = table_rows
        .iter()
        .map(|r| r.users as f64 * r.diff_ad as f64)
        .sum();
    let weighted_by_dropoff: f64 = table_rows
        .iter()
        .map(|r| avg_step_gap * r.diff_users as f64)
        .sum();

    let avg_ads_per_user = round2((weighted_by_step + weighted_by_dropoff) / denominator);
    log::debug!(
        "Ad exposure: {} checkpoints, avg gap {avg_step_gap}, avg ads/user {avg_ads_per_user}",
        table_rows.len()
    );

    Ok(AdExposureTable {
        rows: table_rows,
        avg_step_gap,
        avg_ads_per_user,
    })
}
