use regime_engine::adaptation::AnchorTables;
use regime_engine::config::{parse_interval_ms, Config};

const FULL_TOML: &str = r#"
[regime]
smoothing_alpha = 0.2
window_days = 20
adapt_threshold = 0.05
refresh_interval = "12h"

[storage]
db_path = "data/regime.sqlite"

[market_data]
returns_path = "data/index_returns.json"

[logging]
level = "debug"
file = "regime.log"
"#;

const MINIMAL_TOML: &str = r#"
[regime]

[storage]
db_path = "regime.sqlite"

[market_data]
returns_path = "returns.json"

[logging]
level = "info"
"#;

#[test]
fn parse_full_toml() {
    let config = Config::from_toml_str(FULL_TOML).unwrap();
    assert!((config.regime.smoothing_alpha - 0.2).abs() < f64::EPSILON);
    assert_eq!(config.regime.window_days, 20);
    assert_eq!(config.regime.refresh_interval_ms().unwrap(), 43_200_000);
    assert_eq!(config.storage.db_path, "data/regime.sqlite");
    assert_eq!(config.market_data.returns_path, "data/index_returns.json");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, "regime.log");

    let settings = config.regime.settings();
    assert_eq!(settings.window_days, 20);
    assert!((settings.adapt_threshold - 0.05).abs() < f64::EPSILON);
    assert!((config.regime.smoother().unwrap().alpha() - 0.2).abs() < f64::EPSILON);
}

#[test]
fn omitted_fields_fall_back_to_defaults() {
    let config = Config::from_toml_str(MINIMAL_TOML).unwrap();
    assert!((config.regime.smoothing_alpha - 0.1).abs() < f64::EPSILON);
    assert_eq!(config.regime.window_days, 30);
    assert!((config.regime.adapt_threshold - 0.1).abs() < f64::EPSILON);
    assert_eq!(config.regime.refresh_interval, "1d");
    assert_eq!(config.logging.file, "regime-engine.log");
    assert_eq!(config.anchors, AnchorTables::default());
}

#[test]
fn anchor_tables_can_be_overridden_per_table() {
    let toml_str = format!(
        "{MINIMAL_TOML}\n[anchors.blend]\nbearish = 0.8\nneutral = 0.5\nbullish = 0.2\n"
    );
    let config = Config::from_toml_str(&toml_str).unwrap();
    assert!((config.anchors.blend.bearish - 0.8).abs() < f64::EPSILON);
    assert!((config.anchors.blend.bullish - 0.2).abs() < f64::EPSILON);
    assert_eq!(
        config.anchors.weights,
        AnchorTables::default().weights,
        "untouched tables keep defaults"
    );
}

#[test]
fn invalid_regime_settings_are_rejected() {
    for (field, value) in [
        ("smoothing_alpha", "0.0"),
        ("smoothing_alpha", "1.5"),
        ("window_days", "0"),
        ("adapt_threshold", "-0.1"),
        ("refresh_interval", "\"1M\""),
    ] {
        let toml_str = MINIMAL_TOML.replace("[regime]\n", &format!("[regime]\n{field} = {value}\n"));
        assert!(
            Config::from_toml_str(&toml_str).is_err(),
            "{field} = {value} should be rejected"
        );
    }
}

#[test]
fn empty_db_path_is_rejected() {
    let toml_str = MINIMAL_TOML.replace("db_path = \"regime.sqlite\"", "db_path = \"  \"");
    assert!(Config::from_toml_str(&toml_str).is_err());
}

fn weight_table(name: &str, long_term: f64) -> String {
    format!(
        "[anchors.weights.{name}]\n\
         long_term = {long_term}\n\
         fundamentals = 0.20\n\
         dividends = 0.12\n\
         opportunity = 0.12\n\
         short_term = 0.08\n\
         technicals = 0.08\n\
         opinion = 0.05\n\
         diversification = 0.10\n"
    )
}

#[test]
fn full_weight_override_is_accepted() {
    let toml_str = format!(
        "{MINIMAL_TOML}\n{}\n{}\n{}",
        weight_table("bearish", 0.25),
        weight_table("neutral", 0.25),
        weight_table("bullish", 0.25)
    );
    let config = Config::from_toml_str(&toml_str).unwrap();
    assert_eq!(config.anchors.weights.bullish.len(), 8);
}

#[test]
fn unbalanced_weight_anchor_is_rejected() {
    let toml_str = format!(
        "{MINIMAL_TOML}\n{}\n{}\n{}",
        weight_table("bearish", 0.75),
        weight_table("neutral", 0.25),
        weight_table("bullish", 0.25)
    );
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("anchors.weights.bearish sums to"), "{msg}");
}

#[test]
fn foreign_weight_categories_are_rejected() {
    let toml_str = format!(
        r#"{MINIMAL_TOML}
[anchors.weights.bearish]
momentum = 0.4
value = 0.6

[anchors.weights.neutral]
momentum = 0.5
value = 0.5

[anchors.weights.bullish]
momentum = 0.6
value = 0.4
"#
    );
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("scoring categories"), "{msg}");
    assert!(msg.contains("momentum"), "{msg}");
}

#[test]
fn missing_section_is_rejected() {
    let toml_str = MINIMAL_TOML.replace("[logging]\nlevel = \"info\"\n", "");
    assert!(Config::from_toml_str(&toml_str).is_err());
}

#[test]
fn load_from_path_reads_file() {
    let dir = std::env::temp_dir().join(format!("regime-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, FULL_TOML).unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.regime.window_days, 20);

    assert!(Config::load_from_path(&dir.join("missing.toml")).is_err());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn interval_parser_matches_config_units() {
    assert_eq!(parse_interval_ms("15m").unwrap(), 900_000);
    assert!(parse_interval_ms("1y").is_err());
}
