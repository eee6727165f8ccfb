use dp1_metrix_core::config::MetrixConfig;

#[test]
fn shipped_config_matches_the_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/metrix.json");
    let config = MetrixConfig::load(path).expect("shipped config loads");
    assert_eq!(config, MetrixConfig::default());
}

#[test]
fn partial_config_keeps_defaults_for_missing_fields() {
    let path = std::env::temp_dir().join(format!("metrix-config-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, r#"{ "drop_highlight_pct": 5.0, "level_milestones": [10] }"#).unwrap();

    let config = MetrixConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.drop_highlight_pct, 5.0);
    assert_eq!(config.level_milestones, vec![10]);
    assert_eq!(config.ad_milestones, MetrixConfig::default().ad_milestones);
    assert_eq!(config.manual_defaults.day1_retention, "29.56%");

    std::fs::remove_file(&path).ok();
}

#[test]
fn unreadable_config_names_the_path() {
    let err = MetrixConfig::load("/nonexistent/metrix.json").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/metrix.json"), "error was: {err}");
}
