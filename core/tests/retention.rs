use dp1_metrix_core::{
    baseline::{resolve_baseline, BaselinePolicy, BaselineSource},
    error::MetrixError,
    level::LevelRow,
    retention::{compute_retention, drop_pct},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn rows(pairs: &[(u64, u64)]) -> Vec<LevelRow> {
    pairs
        .iter()
        .map(|&(level, users)| LevelRow { level, users })
        .collect()
}

fn example_levels() -> Vec<LevelRow> {
    rows(&[(1, 1000), (2, 1100), (20, 550), (50, 300)])
}

// ── Baseline ─────────────────────────────────────────────────────────────────

#[test]
fn first_levels_policy_takes_the_larger_of_level_one_and_two() {
    let baseline = resolve_baseline(&example_levels(), BaselinePolicy::FirstLevels, None).unwrap();
    assert_eq!(baseline.users, 1100);
    assert_eq!(
        baseline.source,
        BaselineSource::Computed { policy: BaselinePolicy::FirstLevels }
    );
}

#[test]
fn first_levels_policy_prefers_level_one_when_it_is_larger() {
    let levels = rows(&[(1, 1200), (2, 900), (3, 5000)]);
    assert_eq!(BaselinePolicy::FirstLevels.compute(&levels), Some(1200));
}

#[test]
fn first_levels_policy_falls_back_to_max_without_levels_one_and_two() {
    let levels = rows(&[(5, 400), (6, 700), (7, 300)]);
    assert_eq!(BaselinePolicy::FirstLevels.compute(&levels), Some(700));

    let only_two = rows(&[(2, 800), (3, 900)]);
    assert_eq!(BaselinePolicy::FirstLevels.compute(&only_two), Some(800));
}

#[test]
fn max_observed_policy_uses_the_largest_count() {
    let levels = rows(&[(1, 1000), (2, 900), (7, 1500)]);
    assert_eq!(BaselinePolicy::MaxObserved.compute(&levels), Some(1500));
}

#[test]
fn override_replaces_the_computed_baseline() {
    let baseline = resolve_baseline(&example_levels(), BaselinePolicy::FirstLevels, Some(2000)).unwrap();
    assert_eq!(baseline.users, 2000);
    assert_eq!(baseline.source, BaselineSource::Override);
}

#[test]
fn manual_only_policy_requires_an_override() {
    let err = resolve_baseline(&example_levels(), BaselinePolicy::ManualOnly, None).unwrap_err();
    assert!(matches!(err, MetrixError::BaselineUnavailable { policy: "manual_only" }));

    let ok = resolve_baseline(&example_levels(), BaselinePolicy::ManualOnly, Some(900)).unwrap();
    assert_eq!(ok.users, 900);
}

#[test]
fn empty_table_has_no_computed_baseline() {
    let err = resolve_baseline(&[], BaselinePolicy::FirstLevels, None).unwrap_err();
    assert!(matches!(err, MetrixError::BaselineUnavailable { .. }));
}

#[test]
fn zero_baseline_is_rejected() {
    let err = resolve_baseline(&example_levels(), BaselinePolicy::FirstLevels, Some(0)).unwrap_err();
    assert!(matches!(err, MetrixError::InvalidBaseline { baseline: 0 }));

    let all_zero = rows(&[(1, 0), (2, 0)]);
    assert!(matches!(
        resolve_baseline(&all_zero, BaselinePolicy::FirstLevels, None),
        Err(MetrixError::InvalidBaseline { .. })
    ));
}

// ── Retention and drop ───────────────────────────────────────────────────────

#[test]
fn retention_is_rounded_to_two_decimals() {
    let table = compute_retention(&example_levels(), 1100).unwrap();

    assert_eq!(table.retention_at(1), Some(90.91));
    assert_eq!(table.retention_at(2), Some(100.0));
    assert_eq!(table.retention_at(20), Some(50.0));
    assert_eq!(table.retention_at(50), Some(27.27));
    assert_eq!(table.retention_at(75), None);
}

#[test]
fn drop_between_consecutive_levels() {
    let table = compute_retention(&example_levels(), 1100).unwrap();
    let drops: Vec<f64> = table.rows.iter().map(|r| r.drop_pct).collect();

    // Level 1 -> 2 is an increase: a negative drop, not clamped.
    assert_eq!(drops, vec![-10.0, 50.0, 45.45, 0.0]);
}

#[test]
fn last_row_reports_zero_drop() {
    let table = compute_retention(&rows(&[(1, 100), (2, 40)]), 100).unwrap();
    assert_eq!(table.drop_at(2), Some(0.0));
}

#[test]
fn zero_users_level_reports_zero_drop() {
    assert_eq!(drop_pct(0, 50), 0.0);
    let table = compute_retention(&rows(&[(1, 10), (2, 0), (3, 0)]), 10).unwrap();
    assert_eq!(table.drop_at(2), Some(0.0));
    assert!(table.rows.iter().all(|r| r.drop_pct.is_finite()));
}

#[test]
fn retention_above_one_hundred_is_surfaced_not_clamped() {
    let table = compute_retention(&rows(&[(1, 1000), (2, 1100)]), 1000).unwrap();
    assert_eq!(table.retention_at(2), Some(110.0));
}

#[test]
fn zero_baseline_is_rejected_by_the_calculator() {
    assert!(matches!(
        compute_retention(&example_levels(), 0),
        Err(MetrixError::InvalidBaseline { baseline: 0 })
    ));
}

#[test]
fn highlighted_rows_are_at_or_above_the_threshold() {
    let table = compute_retention(&rows(&[(1, 100), (2, 97), (3, 95), (4, 90)]), 100).unwrap();
    // drops: 3.0, 2.06, 5.26, 0
    let flagged: Vec<u64> = table
        .rows_with_drop_at_least(3.0)
        .map(|(_, r)| r.level)
        .collect();
    assert_eq!(flagged, vec![1, 3]);
}

#[test]
fn halfway_retention_rounds_to_even() {
    // 97 / 800 = 12.125%, 1 / 800 = 0.125%
    let table = compute_retention(&rows(&[(1, 800), (20, 97), (30, 1)]), 800).unwrap();

    assert_eq!(table.retention_at(20), Some(12.12));
    assert_eq!(table.retention_at(30), Some(0.12));
}
