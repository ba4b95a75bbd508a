//! Tests for loading `PreviewConfig` from TOML files.

use uigen_core::PreviewConfig;

#[test]
fn test_full_toml_config() {
    let text = r#"
alias_prefix = "~/"
entry_point = "/src/App"
module_extensions = [".tsx", ".jsx"]
cdn_base = "https://cdn.example.com"
react_version = "18.3.1"
tailwind = false
cache_capacity = 32
debounce_ms = 75
"#;
    let config: PreviewConfig = toml::from_str(text).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.alias_prefix, "~/");
    assert_eq!(config.entry_point, "/src/App");
    assert_eq!(config.module_extensions, vec![".tsx", ".jsx"]);
    assert_eq!(config.react_version, "18.3.1");
    assert!(!config.tailwind);
    assert_eq!(config.cache_capacity, 32);
    assert_eq!(config.debounce_ms, 75);
}

#[test]
fn test_empty_toml_is_default() {
    let config: PreviewConfig = toml::from_str("").unwrap();
    assert_eq!(config, PreviewConfig::default());
}

#[test]
fn test_invalid_values_fail_validation_not_parsing() {
    let config: PreviewConfig = toml::from_str("cache_capacity = 0").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn test_round_trip_through_toml() {
    let config = PreviewConfig::builder()
        .entry_point("/Main")
        .react_version("18")
        .build();
    let text = toml::to_string(&config).unwrap();
    let parsed: PreviewConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}
