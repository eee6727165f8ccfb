//! Summary projector.
//!
//! Flattens the derived tables into the ordered metric -> value record the
//! dashboard shows and exports. Milestone lookups are total: every
//! milestone yields a formatted percentage or the literal "N/A".

use crate::{
    ad_exposure::AdExposureTable,
    baseline::Baseline,
    config::{ManualDefaults, MetrixConfig},
    dates::{format_date, ReportHeader},
    retention::RetentionTable,
    types::{format_float, format_percent, Percent},
};
use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub metric: String,
    pub value:  String,
}

/// Ordered metric -> value mapping. Built fresh on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub entries: Vec<SummaryEntry>,
}

impl SummaryRecord {
    /// Insert or replace, keeping the original position on replace.
    pub fn set(&mut self, metric: impl Into<String>, value: impl Into<String>) {
        let metric = metric.into();
        let value = value.into();
        match self.entries.iter_mut().find(|e| e.metric == metric) {
            Some(entry) => entry.value = value,
            None => self.entries.push(SummaryEntry { metric, value }),
        }
    }

    pub fn get(&self, metric: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.metric == metric)
            .map(|e| e.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Manual metrics ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualField {
    Day1Retention,
    Day3Retention,
    SessionLength,
    PlaytimeLength,
}

impl ManualField {
    pub const ALL: [ManualField; 4] = [
        ManualField::Day1Retention,
        ManualField::Day3Retention,
        ManualField::SessionLength,
        ManualField::PlaytimeLength,
    ];

    pub fn metric_name(self) -> &'static str {
        match self {
            ManualField::Day1Retention  => "Day 1 Retention",
            ManualField::Day3Retention  => "Day 3 Retention",
            ManualField::SessionLength  => "Session Length",
            ManualField::PlaytimeLength => "Playtime length",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ManualField::Day1Retention | ManualField::Day3Retention => "%",
            ManualField::SessionLength | ManualField::PlaytimeLength => " s",
        }
    }

    /// Apply the fixed suffix unless the text already carries it in full.
    /// A unit glued straight onto a number ("12s") is respaced to "12 s".
    pub fn format(self, text: &str) -> String {
        let text = text.trim();
        let suffix = self.suffix();
        if text.ends_with(suffix) {
            return text.to_string();
        }
        let bare = match text.strip_suffix(suffix.trim()) {
            Some(number) if number.ends_with(|c: char| c.is_ascii_digit()) => number,
            _ => text,
        };
        format!("{bare}{suffix}")
    }

    fn default_text(self, defaults: &ManualDefaults) -> &str {
        match self {
            ManualField::Day1Retention  => &defaults.day1_retention,
            ManualField::Day3Retention  => &defaults.day3_retention,
            ManualField::SessionLength  => &defaults.session_length,
            ManualField::PlaytimeLength => &defaults.playtime_length,
        }
    }
}

/// Manual metric text. `None` means the field shows its placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualMetrics {
    pub day1_retention:  Option<String>,
    pub day3_retention:  Option<String>,
    pub session_length:  Option<String>,
    pub playtime_length: Option<String>,
}

impl ManualMetrics {
    pub fn get(&self, field: ManualField) -> Option<&str> {
        match field {
            ManualField::Day1Retention  => self.day1_retention.as_deref(),
            ManualField::Day3Retention  => self.day3_retention.as_deref(),
            ManualField::SessionLength  => self.session_length.as_deref(),
            ManualField::PlaytimeLength => self.playtime_length.as_deref(),
        }
    }

    pub fn set(&mut self, field: ManualField, text: Option<String>) {
        let slot = match field {
            ManualField::Day1Retention  => &mut self.day1_retention,
            ManualField::Day3Retention  => &mut self.day3_retention,
            ManualField::SessionLength  => &mut self.session_length,
            ManualField::PlaytimeLength => &mut self.playtime_length,
        };
        *slot = text;
    }
}

// ── Projection ───────────────────────────────────────────────────────────────

pub fn level_metric_name(level: u64) -> String {
    format!("Total Level Retention({level})")
}

pub fn ad_metric_name(step: u64) -> String {
    format!("% of Users at Ad {step}")
}

fn milestone_value(pct: Option<Percent>) -> String {
    pct.map(format_percent).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Build the summary for one run.
pub fn project_summary(
    header: &ReportHeader,
    baseline: &Baseline,
    retention: &RetentionTable,
    ads: &AdExposureTable,
    manual: &ManualMetrics,
    config: &MetrixConfig,
) -> SummaryRecord {
    let mut record = SummaryRecord::default();

    record.set("Version", header.version_label.clone());
    record.set("Date Selected", format_date(header.date_selected, &config.date_format));
    record.set("CHECK DATE", format_date(header.check_date, &config.date_format));
    record.set("LEVEL 1 users", baseline.users.to_string());

    for &level in &config.level_milestones {
        record.set(level_metric_name(level), milestone_value(retention.retention_at(level)));
    }
    for &step in &config.ad_milestones {
        record.set(ad_metric_name(step), milestone_value(ads.pct_at(step)));
    }
    record.set("Avg ads per users", format_float(ads.avg_ads_per_user));

    for field in ManualField::ALL {
        let text = manual
            .get(field)
            .unwrap_or_else(|| field.default_text(&config.manual_defaults));
        record.set(field.metric_name(), field.format(text));
    }

    record
}
