//! Two runs, same inputs, same options.
//! They must produce byte-identical summaries.

use chrono::NaiveDate;
use dp1_metrix_core::{
    config::MetrixConfig,
    dates::ReportHeader,
    pipeline::{recompute, PipelineInputs, PipelineOptions},
    summary::ManualMetrics,
    table::RawTable,
};

fn fixture() -> (RawTable, RawTable) {
    let mut retention = String::from("LEVEL,USERS\n");
    let mut users = 5000u64;
    for level in 1..=220 {
        retention.push_str(&format!("Level {level},{users}\n"));
        users = users * 97 / 100;
    }
    let mut ads = String::from("EVENT,USERS\n");
    let mut viewers = 4200u64;
    for step in (5..=120).step_by(5) {
        ads.push_str(&format!("ad_watched_{step},{viewers}\n"));
        viewers = viewers * 9 / 10;
    }
    (
        RawTable::from_reader(retention.as_bytes()).unwrap(),
        RawTable::from_reader(ads.as_bytes()).unwrap(),
    )
}

#[test]
fn identical_inputs_produce_identical_summaries() {
    let (retention, ad_events) = fixture();
    let header = ReportHeader::new("0.58", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), None);
    let manual = ManualMetrics::default();
    let config = MetrixConfig::default();
    let inputs = PipelineInputs {
        retention: &retention,
        ad_events: &ad_events,
        options:   PipelineOptions::default(),
        header:    &header,
        manual:    &manual,
    };

    let a = recompute(&inputs, &config).expect("run a");
    let b = recompute(&inputs, &config).expect("run b");

    let json_a = serde_json::to_string(&a.summary).unwrap();
    let json_b = serde_json::to_string(&b.summary).unwrap();
    assert_eq!(json_a, json_b, "summary diverged between runs");
    assert_eq!(a, b, "derived tables diverged between runs");
}

#[test]
fn every_milestone_resolves_on_a_full_table() {
    let (retention, ad_events) = fixture();
    let header = ReportHeader::new("0.58", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), None);
    let manual = ManualMetrics::default();
    let inputs = PipelineInputs {
        retention: &retention,
        ad_events: &ad_events,
        options:   PipelineOptions::default(),
        header:    &header,
        manual:    &manual,
    };
    let out = recompute(&inputs, &MetrixConfig::default()).unwrap();

    let na = out
        .summary
        .entries
        .iter()
        .filter(|e| e.value == "N/A")
        .map(|e| e.metric.clone())
        .collect::<Vec<_>>();
    assert!(na.is_empty(), "unexpected N/A milestones: {na:?}");
    assert!(out.ad_exposure.avg_ads_per_user.is_finite());
}
