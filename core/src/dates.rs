//! Report header — version label and the two report dates.

use crate::error::{MetrixError, MetrixResult};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const DEFAULT_VERSION_LABEL: &str = "0.58";
const FALLBACK_DATE_FORMAT: &str = "%d-%b-%y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub version_label: String,
    pub date_selected: NaiveDate,
    pub check_date:    NaiveDate,
}

impl ReportHeader {
    /// The check date defaults to the day after the selected date.
    pub fn new(version_label: impl Into<String>, date_selected: NaiveDate, check_date: Option<NaiveDate>) -> Self {
        Self {
            version_label: version_label.into(),
            date_selected,
            check_date: check_date.unwrap_or_else(|| next_day(date_selected)),
        }
    }

    /// Header dated today in local time.
    pub fn today() -> Self {
        Self::new(DEFAULT_VERSION_LABEL, chrono::Local::now().date_naive(), None)
    }

    /// Move the selected date. The check date follows unless given.
    pub fn set_dates(&mut self, date_selected: NaiveDate, check_date: Option<NaiveDate>) {
        self.date_selected = date_selected;
        self.check_date = check_date.unwrap_or_else(|| next_day(date_selected));
    }
}

pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

/// Parse an ISO date ("2026-10-19").
pub fn parse_date(input: &str) -> MetrixResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| MetrixError::InvalidDate { input: input.to_string() })
}

/// Format with a configured chrono pattern. An invalid pattern falls back
/// to the dashboard's `%d-%b-%y`.
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        log::warn!("Invalid date format '{format}', using {FALLBACK_DATE_FORMAT}");
        return date.format(FALLBACK_DATE_FORMAT).to_string();
    }
    out
}
