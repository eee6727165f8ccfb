use chrono::NaiveDate;
use dp1_metrix_core::{
    baseline::BaselinePolicy,
    command::SessionCommand,
    config::MetrixConfig,
    dates::ReportHeader,
    error::MetrixError,
    session::SessionState,
    summary::ManualField,
    table::RawTable,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn loaded_session() -> SessionState {
    let header = ReportHeader::new("0.58", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), None);
    let mut session = SessionState::with_header(header);
    session.set_retention_table(
        RawTable::from_reader("LEVEL,USERS\n1,1000\n2,1100\n20,550\n50,300\n".as_bytes()).unwrap(),
    );
    session.set_ad_event_table(
        RawTable::from_reader("EVENT,USERS\nad_watched_10,800\nad_watched_20,500\n".as_bytes()).unwrap(),
    );
    session
}

fn summary_value(session: &SessionState, metric: &str) -> String {
    session
        .recompute(&MetrixConfig::default())
        .expect("recompute")
        .expect("both tables loaded")
        .summary
        .get(metric)
        .unwrap_or_else(|| panic!("{metric} missing"))
        .to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn recompute_waits_for_both_uploads() {
    let mut session = SessionState::start();
    assert!(session.recompute(&MetrixConfig::default()).unwrap().is_none());

    session.set_retention_table(RawTable::from_reader("LEVEL,USERS\n1,10\n".as_bytes()).unwrap());
    assert!(!session.has_both_tables());
    assert!(session.recompute(&MetrixConfig::default()).unwrap().is_none());
}

#[test]
fn confirmed_manual_value_survives_rerender() {
    let mut session = loaded_session();

    session
        .apply(SessionCommand::EditManualField {
            field: ManualField::Day1Retention,
            text:  "41.2%".into(),
        })
        .unwrap();
    session.apply(SessionCommand::ConfirmManualMetrics).unwrap();
    assert_eq!(summary_value(&session, "Day 1 Retention"), "41.2%");

    // Re-render without re-confirming.
    assert_eq!(summary_value(&session, "Day 1 Retention"), "41.2%");

    // A fresh edit is only a draft until confirmed.
    session
        .apply(SessionCommand::EditManualField {
            field: ManualField::Day1Retention,
            text:  "55".into(),
        })
        .unwrap();
    assert_eq!(summary_value(&session, "Day 1 Retention"), "41.2%");
    assert_eq!(session.draft_manual().day1_retention.as_deref(), Some("55"));
}

#[test]
fn unconfirmed_edits_leave_placeholders_in_place() {
    let mut session = loaded_session();
    session
        .apply(SessionCommand::EditManualField {
            field: ManualField::SessionLength,
            text:  "120".into(),
        })
        .unwrap();
    assert_eq!(summary_value(&session, "Session Length"), "264.5 s");

    session.apply(SessionCommand::DiscardManualDrafts).unwrap();
    session.apply(SessionCommand::ConfirmManualMetrics).unwrap();
    assert_eq!(summary_value(&session, "Session Length"), "264.5 s");
}

#[test]
fn baseline_override_applies_until_cleared() {
    let mut session = loaded_session();

    session.apply(SessionCommand::SetBaselineOverride { users: 2000 }).unwrap();
    assert_eq!(summary_value(&session, "Total Level Retention(20)"), "27.5%");

    session.apply(SessionCommand::ClearBaselineOverride).unwrap();
    assert_eq!(summary_value(&session, "Total Level Retention(20)"), "50.0%");
}

#[test]
fn zero_override_reports_invalid_baseline() {
    let mut session = loaded_session();
    session.apply(SessionCommand::SetBaselineOverride { users: 0 }).unwrap();

    let err = session.recompute(&MetrixConfig::default()).unwrap_err();
    assert!(
        matches!(err, MetrixError::InvalidBaseline { baseline: 0 }),
        "expected InvalidBaseline, got {err:?}"
    );
}

#[test]
fn baseline_policy_is_swappable() {
    let mut session = loaded_session();
    session
        .apply(SessionCommand::SetBaselinePolicy { policy: BaselinePolicy::ManualOnly })
        .unwrap();
    assert!(matches!(
        session.recompute(&MetrixConfig::default()),
        Err(MetrixError::BaselineUnavailable { .. })
    ));

    session.apply(SessionCommand::SetBaselineOverride { users: 1100 }).unwrap();
    assert_eq!(summary_value(&session, "LEVEL 1 users"), "1100");
}

#[test]
fn changing_dates_moves_the_check_date() {
    let mut session = loaded_session();
    session
        .apply(SessionCommand::SetDates {
            date_selected: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            check_date:    None,
        })
        .unwrap();
    session.apply(SessionCommand::SetVersion { label: "0.60".into() }).unwrap();

    assert_eq!(summary_value(&session, "Date Selected"), "31-Dec-26");
    assert_eq!(summary_value(&session, "CHECK DATE"), "01-Jan-27");
    assert_eq!(summary_value(&session, "Version"), "0.60");
}

#[test]
fn commands_deserialize_from_ipc_json() {
    let cmd: SessionCommand =
        serde_json::from_str(r#"{"cmd":"set_baseline_override","users":0}"#).unwrap();
    assert_eq!(cmd, SessionCommand::SetBaselineOverride { users: 0 });

    let cmd: SessionCommand = serde_json::from_str(
        r#"{"cmd":"edit_manual_field","field":"day1_retention","text":"41.2%"}"#,
    )
    .unwrap();
    assert_eq!(
        cmd,
        SessionCommand::EditManualField {
            field: ManualField::Day1Retention,
            text:  "41.2%".into(),
        }
    );

    let cmd: SessionCommand =
        serde_json::from_str(r#"{"cmd":"set_dates","date_selected":"2026-10-19"}"#).unwrap();
    assert_eq!(
        cmd,
        SessionCommand::SetDates {
            date_selected: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            check_date:    None,
        }
    );
}

#[test]
fn missing_upload_file_is_an_io_error() {
    let mut session = SessionState::start();
    let err = session
        .apply(SessionCommand::LoadRetention {
            path: "/nonexistent/retention.csv".into(),
        })
        .unwrap_err();
    assert!(matches!(err, MetrixError::Io(_)));
    session.end();
}
