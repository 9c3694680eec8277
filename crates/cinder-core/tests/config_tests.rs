use cinder_core::{AnalyzerOptions, ConfigError, OptimizationLevel, OptionOverrides};
use indoc::indoc;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_yaml_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cinder.yaml");
    fs::write(
        &path,
        indoc! {"
            static_analysis: true
            directly_access_defined_variables: true
            enable_warnings: true
        "},
    )
    .unwrap();

    let options = AnalyzerOptions::from_file(&path).unwrap();
    assert!(options.static_analysis);
    assert!(options.directly_access_defined_variables);
    assert!(options.enable_warnings);
    assert!(!options.cache_resolved_placeholders);
    assert!(!options.hoist_conditional_aliases);
}

#[test]
fn test_load_json_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cinder.json");
    fs::write(
        &path,
        indoc! {r#"
            {
                "cache_resolved_placeholders": true,
                "cache_filtered_placeholders": true
            }
        "#},
    )
    .unwrap();

    let options = AnalyzerOptions::from_file(&path).unwrap();
    assert!(options.caches_filters());
    assert!(!options.static_analysis);
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cinder.toml");
    fs::write(&path, "static_analysis = true\n").unwrap();

    match AnalyzerOptions::from_file(&path) {
        Err(ConfigError::UnsupportedFormat { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected unsupported format, got {:?}", other),
    }
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cinder.yml");
    fs::write(&path, "static_analysis: [not, a, bool]\n").unwrap();

    assert!(matches!(
        AnalyzerOptions::from_file(&path),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.yaml");
    assert!(matches!(
        AnalyzerOptions::from_file(&path),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_init_file_round_trips_level() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cinder.yaml");

    AnalyzerOptions::init_file(&path, OptimizationLevel::O2).unwrap();
    let options = AnalyzerOptions::from_file(&path).unwrap();
    assert_eq!(options, AnalyzerOptions::for_level(OptimizationLevel::O2));
}

#[test]
fn test_overrides_win_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cinder.yaml");
    fs::write(
        &path,
        indoc! {"
            static_analysis: true
            warnings_as_errors: true
        "},
    )
    .unwrap();

    let mut options = AnalyzerOptions::from_file(&path).unwrap();
    options.apply(&OptionOverrides {
        warnings_as_errors: Some(false),
        hoist_conditional_aliases: Some(true),
        ..OptionOverrides::default()
    });

    assert!(options.static_analysis);
    assert!(!options.warnings_as_errors);
    assert!(options.hoist_conditional_aliases);
}
