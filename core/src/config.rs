//! Static metric configuration.
//!
//! Everything here has a built-in default. A JSON file may override any
//! subset of fields; missing fields fall back to the defaults.

use crate::types::{AdStep, Level, Percent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetrixConfig {
    /// Levels reported as "Total Level Retention(N)".
    pub level_milestones: Vec<Level>,
    /// Ad steps reported as "% of Users at Ad N".
    pub ad_milestones: Vec<AdStep>,
    /// Progression rows with a drop at or above this are highlighted.
    pub drop_highlight_pct: Percent,
    /// Highest level shown on the early-game retention chart.
    pub early_chart_level_cap: Level,
    /// chrono format string for report dates.
    pub date_format: String,
    pub manual_defaults: ManualDefaults,
}

/// Placeholder text shown for manual metrics until the user confirms
/// their own values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ManualDefaults {
    pub day1_retention: String,
    pub day3_retention: String,
    pub session_length: String,
    pub playtime_length: String,
}

impl Default for ManualDefaults {
    fn default() -> Self {
        Self {
            day1_retention:  "29.56%".into(),
            day3_retention:  "13.26%".into(),
            session_length:  "264.5".into(),
            playtime_length: "936.6".into(),
        }
    }
}

impl Default for MetrixConfig {
    fn default() -> Self {
        Self {
            level_milestones:      vec![20, 50, 75, 100, 150, 200],
            ad_milestones:         vec![10, 20, 40, 70, 100],
            drop_highlight_pct:    3.0,
            early_chart_level_cap: 100,
            date_format:           "%d-%b-%y".into(),
            manual_defaults:       ManualDefaults::default(),
        }
    }
}

impl MetrixConfig {
    /// Load from a JSON file. Fields absent from the file keep their
    /// defaults. Without a file, use `MetrixConfig::default()`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: MetrixConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::debug!(
            "Loaded config from {path}: {} level milestones, {} ad milestones",
            config.level_milestones.len(),
            config.ad_milestones.len()
        );
        Ok(config)
    }
}
