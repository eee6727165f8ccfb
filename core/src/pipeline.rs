//! The metrics pipeline — one pure recomputation per input change.
//!
//! EXECUTION ORDER (fixed):
//!   1. Normalize the retention table   (missing column aborts)
//!   2. Normalize the ad-event table    (missing column aborts)
//!   3. Collapse duplicate levels / ad steps under the duplicate policy
//!   4. Resolve baseline users (policy, or manual override)
//!   5. Retention and drop per level
//!   6. Prepend the synthetic step-0 row, then ad exposure
//!   7. Project the summary record
//!
//! RULES:
//!   - No state survives between calls. Same inputs, same output.
//!   - Any error aborts the whole run; no partial output is returned.
//!   - The pipeline knows nothing about sessions. Callers hand it data.

use crate::{
    ad_event::{normalize_ad_events, with_baseline_row},
    ad_exposure::{compute_ad_exposure, AdExposureTable},
    baseline::{resolve_baseline, Baseline, BaselinePolicy},
    config::MetrixConfig,
    dates::ReportHeader,
    duplicates::{collapse_duplicates, DuplicatePolicy},
    error::MetrixResult,
    level::normalize_levels,
    retention::{compute_retention, RetentionTable},
    summary::{project_summary, ManualMetrics, SummaryRecord},
    table::RawTable,
    types::{TableKind, UserCount},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub baseline_policy:   BaselinePolicy,
    pub baseline_override: Option<UserCount>,
    pub duplicates:        DuplicatePolicy,
}

pub struct PipelineInputs<'a> {
    pub retention: &'a RawTable,
    pub ad_events: &'a RawTable,
    pub options:   PipelineOptions,
    pub header:    &'a ReportHeader,
    pub manual:    &'a ManualMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub baseline:    Baseline,
    pub retention:   RetentionTable,
    pub ad_exposure: AdExposureTable,
    pub summary:     SummaryRecord,
}

impl PipelineOutput {
    /// One success line per cleaned table, for hosts to show after a run.
    pub fn status_lines(&self) -> Vec<String> {
        // The synthetic step-0 row is not an observed checkpoint.
        let checkpoints = self.ad_exposure.rows.len().saturating_sub(1);
        vec![
            format!("Retention data cleaned successfully ({} levels)", self.retention.rows.len()),
            format!("Ad data processed successfully ({checkpoints} ad checkpoints)"),
        ]
    }
}

/// Run the full pipeline.
pub fn recompute(inputs: &PipelineInputs<'_>, config: &MetrixConfig) -> MetrixResult<PipelineOutput> {
    let options = inputs.options;

    let levels = normalize_levels(inputs.retention)?;
    log::info!("Retention data cleaned: {} of {} rows kept", levels.len(), inputs.retention.rows.len());
    let ad_rows = normalize_ad_events(inputs.ad_events)?;
    log::info!("Ad data cleaned: {} of {} rows kept", ad_rows.len(), inputs.ad_events.rows.len());

    let levels = collapse_duplicates(levels, options.duplicates, TableKind::Retention)?;
    let ad_rows = collapse_duplicates(ad_rows, options.duplicates, TableKind::AdEvents)?;
    if levels.is_empty() {
        log::warn!("Retention table has no parseable rows");
    }
    if ad_rows.is_empty() {
        log::warn!("Ad event table has no parseable rows");
    }

    let baseline = resolve_baseline(&levels, options.baseline_policy, options.baseline_override)?;

    let retention = compute_retention(&levels, baseline.users)?;
    let ad_exposure = compute_ad_exposure(&with_baseline_row(&ad_rows, baseline.users), baseline.users)?;

    let summary = project_summary(
        inputs.header,
        &baseline,
        &retention,
        &ad_exposure,
        inputs.manual,
        config,
    );

    log::info!(
        "Pipeline complete: {} levels, {} ad checkpoints, baseline {} users",
        retention.rows.len(),
        ad_exposure.rows.len(),
        baseline.users
    );

    Ok(PipelineOutput {
        baseline,
        retention,
        ad_exposure,
        summary,
    })
}
