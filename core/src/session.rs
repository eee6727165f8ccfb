//! Session-scoped state.
//!
//! LIFECYCLE:
//!   - `SessionState::start()` when the interactive session opens.
//!   - `apply()` for every user action; the last write wins.
//!   - `recompute()` after every relevant change.
//!   - `end()` when the session closes. Nothing is persisted.
//!
//! The session owns the uploads, the baseline override, and the manual
//! metric text. Manual edits stay as drafts until confirmed; re-rendering
//! never reverts a confirmed value.

use crate::{
    command::SessionCommand,
    config::MetrixConfig,
    dates::ReportHeader,
    error::MetrixResult,
    pipeline::{recompute, PipelineInputs, PipelineOptions, PipelineOutput},
    summary::{ManualField, ManualMetrics},
    table::RawTable,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub id:         Uuid,
    pub started_at: DateTime<Utc>,
    pub header:     ReportHeader,
    pub options:    PipelineOptions,
    retention:      Option<RawTable>,
    ad_events:      Option<RawTable>,
    drafts:         ManualMetrics,
    confirmed:      ManualMetrics,
}

/// Serializable view of the session for hosts.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView<'a> {
    pub id:                 Uuid,
    pub header:             &'a ReportHeader,
    pub options:            PipelineOptions,
    pub retention_loaded:   bool,
    pub ad_events_loaded:   bool,
    pub drafts:             &'a ManualMetrics,
    pub confirmed:          &'a ManualMetrics,
}

impl SessionState {
    /// Open a session dated today.
    pub fn start() -> Self {
        Self::with_header(ReportHeader::today())
    }

    pub fn with_header(header: ReportHeader) -> Self {
        let session = Self {
            id:         Uuid::new_v4(),
            started_at: Utc::now(),
            header,
            options:    PipelineOptions::default(),
            retention:  None,
            ad_events:  None,
            drafts:     ManualMetrics::default(),
            confirmed:  ManualMetrics::default(),
        };
        log::debug!("Session {} started", session.id);
        session
    }

    pub fn apply(&mut self, command: SessionCommand) -> MetrixResult<()> {
        match command {
            SessionCommand::LoadRetention { path } => {
                self.retention = Some(RawTable::from_path(&path)?);
            }
            SessionCommand::LoadAdEvents { path } => {
                self.ad_events = Some(RawTable::from_path(&path)?);
            }
            SessionCommand::SetBaselineOverride { users } => {
                self.options.baseline_override = Some(users);
            }
            SessionCommand::ClearBaselineOverride => {
                self.options.baseline_override = None;
            }
            SessionCommand::SetBaselinePolicy { policy } => {
                self.options.baseline_policy = policy;
            }
            SessionCommand::SetDuplicatePolicy { policy } => {
                self.options.duplicates = policy;
            }
            SessionCommand::SetVersion { label } => {
                self.header.version_label = label;
            }
            SessionCommand::SetDates { date_selected, check_date } => {
                self.header.set_dates(date_selected, check_date);
            }
            SessionCommand::EditManualField { field, text } => {
                self.drafts.set(field, Some(text));
            }
            SessionCommand::ConfirmManualMetrics => self.confirm_manual(),
            SessionCommand::DiscardManualDrafts => {
                self.drafts = self.confirmed.clone();
            }
        }
        Ok(())
    }

    pub fn set_retention_table(&mut self, table: RawTable) {
        self.retention = Some(table);
    }

    pub fn set_ad_event_table(&mut self, table: RawTable) {
        self.ad_events = Some(table);
    }

    pub fn has_both_tables(&self) -> bool {
        self.retention.is_some() && self.ad_events.is_some()
    }

    /// Manual values currently shown in the summary.
    pub fn confirmed_manual(&self) -> &ManualMetrics {
        &self.confirmed
    }

    pub fn draft_manual(&self) -> &ManualMetrics {
        &self.drafts
    }

    fn confirm_manual(&mut self) {
        for field in ManualField::ALL {
            if let Some(text) = self.drafts.get(field) {
                self.confirmed.set(field, Some(text.to_string()));
            }
        }
        log::debug!("Session {} confirmed manual metrics", self.id);
    }

    /// Recompute from scratch. `Ok(None)` while an upload is missing.
    pub fn recompute(&self, config: &MetrixConfig) -> MetrixResult<Option<PipelineOutput>> {
        let (Some(retention), Some(ad_events)) = (&self.retention, &self.ad_events) else {
            log::debug!("Session {} waiting for both uploads", self.id);
            return Ok(None);
        };
        let inputs = PipelineInputs {
            retention,
            ad_events,
            options: self.options,
            header:  &self.header,
            manual:  &self.confirmed,
        };
        recompute(&inputs, config).map(Some)
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            id:               self.id,
            header:           &self.header,
            options:          self.options,
            retention_loaded: self.retention.is_some(),
            ad_events_loaded: self.ad_events.is_some(),
            drafts:           &self.drafts,
            confirmed:        &self.confirmed,
        }
    }

    /// Close the session, discarding every override and upload.
    pub fn end(self) {
        log::debug!(
            "Session {} ended after {}s",
            self.id,
            (Utc::now() - self.started_at).num_seconds()
        );
    }
}
