use crate::{
    baseline::BaselinePolicy,
    duplicates::DuplicatePolicy,
    summary::ManualField,
    types::UserCount,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything a user can do to a session between recomputations.
/// Applied in arrival order; the last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SessionCommand {
    // ── Uploads ───────────────────────────────────
    LoadRetention { path: String },
    LoadAdEvents  { path: String },

    // ── Baseline ──────────────────────────────────
    SetBaselineOverride { users: UserCount },
    ClearBaselineOverride,
    SetBaselinePolicy { policy: BaselinePolicy },
    SetDuplicatePolicy { policy: DuplicatePolicy },

    // ── Report header ─────────────────────────────
    SetVersion { label: String },
    SetDates {
        date_selected: NaiveDate,
        #[serde(default)]
        check_date:    Option<NaiveDate>,
    },

    // ── Manual metrics ────────────────────────────
    /// Keystroke-level edit. Not shown until confirmed.
    EditManualField { field: ManualField, text: String },
    ConfirmManualMetrics,
    DiscardManualDrafts,
}
