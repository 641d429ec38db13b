use materiality::config::{AppConfig, ConfigManager, PaletteConfig};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_user_config(config_manager: &ConfigManager, content: &str) {
    config_manager
        .ensure_config_dir()
        .expect("Failed to create config dir");
    fs::write(config_manager.config_path("config.toml"), content)
        .expect("Failed to write config");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    // Matrix defaults
    assert_eq!(config.matrix.palette, "GRI 标准 (橙/绿/蓝)");
    assert_eq!(config.matrix.background, "GRI 标准绿 (默认)");
    assert_eq!(config.matrix.threshold_financial, 5.0);
    assert_eq!(config.matrix.threshold_impact, 5.0);
    assert_eq!(config.matrix.threshold_step, 0.5);

    assert!(config.export.directory.is_none());
    assert!(config.palettes.is_empty());
    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert_eq!(config.theme.color_mode, "auto");
    assert_eq!(config.theme.colors.sidebar_active, "yellow");
    assert!(!config.debug.enabled);
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[matrix]"));
    assert!(template.contains("[export]"));
    assert!(template.contains("[[palettes]]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[matrix]"));

    // The written template loads back to the defaults
    let config = AppConfig::load_from(&config_manager).expect("Template should load");
    assert_eq!(config.matrix.threshold_step, 0.5);
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");
    fs::write(&first_path, "version = \"0.1\"\n").unwrap();

    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
    let content = fs::read_to_string(&second_path).unwrap();
    assert!(content.contains("[theme.colors]"));
}

#[test]
fn test_load_with_no_file_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).expect("Should load default config");
    assert_eq!(config.version, "0.1");
    assert_eq!(config.matrix.threshold_impact, 5.0);
}

#[test]
fn test_load_minimal_config_keeps_other_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r#"
version = "0.1"

[matrix]
background = "纯净白板 (打印)"
threshold_impact = 6.5

[export]
directory = "/tmp/reports"
"#,
    );

    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");

    assert_eq!(config.matrix.background, "纯净白板 (打印)");
    assert_eq!(config.matrix.threshold_impact, 6.5);
    assert_eq!(
        config.export.directory.as_deref(),
        Some(std::path::Path::new("/tmp/reports"))
    );

    // Unspecified values stay at their defaults
    assert_eq!(config.matrix.threshold_financial, 5.0);
    assert_eq!(config.matrix.palette, "GRI 标准 (橙/绿/蓝)");
    assert_eq!(config.performance.event_poll_interval_ms, 25);
}

#[test]
fn test_custom_palettes_follow_presets() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r##"
[matrix]
palette = "Corporate"

[[palettes]]
name = "Corporate"
social = "#E4572E"
environmental = "#29335C"
governance = "#F3A712"
"##,
    );

    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");
    assert_eq!(config.palettes.len(), 1);

    let palettes = config.palettes();
    assert_eq!(palettes.len(), 6);
    let custom = palettes.last().unwrap();
    assert_eq!(custom.name, "Corporate");
    assert_eq!(custom.get("环境 (E)"), Some("#29335C"));
}

#[test]
fn test_invalid_palette_color_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r##"
[[palettes]]
name = "Broken"
social = "#E4572E"
environmental = "green"
governance = "#F3A712"
"##,
    );

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("environmental"), "{err}");
}

#[test]
fn test_parse_error_names_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[matrix\nthreshold_impact = ");

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_merge_configs() {
    let mut base = AppConfig::default();
    let mut override_config = AppConfig::default();

    override_config.matrix.threshold_financial = 7.0;
    override_config.performance.event_poll_interval_ms = 50;
    override_config.theme.colors.primary = "blue".to_string();
    override_config.palettes.push(PaletteConfig {
        name: "Mine".to_string(),
        social: "#010101".to_string(),
        environmental: "#020202".to_string(),
        governance: "#030303".to_string(),
    });

    base.merge(override_config);

    assert_eq!(base.matrix.threshold_financial, 7.0);
    assert_eq!(base.performance.event_poll_interval_ms, 50);
    assert_eq!(base.theme.colors.primary, "blue");
    assert_eq!(base.palettes.len(), 1);

    // Unmodified values remain default
    assert_eq!(base.matrix.threshold_impact, 5.0);
    assert_eq!(base.theme.colors.error, "red");
}

#[test]
fn test_validate_config_valid() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "1.0".to_string(),
        ..Default::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Unsupported config version"));
}

#[test]
fn test_validate_threshold_range() {
    let mut config = AppConfig::default();
    config.matrix.threshold_financial = 10.5;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.matrix.threshold_step = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_color_mode_and_colors() {
    let mut config = AppConfig::default();
    config.theme.color_mode = "sepia".to_string();
    assert!(config.validate().is_err());

    // NO_COLOR turns every color into Reset, so nothing fails to parse
    if std::env::var("NO_COLOR").is_err() {
        let mut config = AppConfig::default();
        config.theme.colors.table_border = "not-a-color".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("table_border"));
    }
}

#[test]
fn test_validate_poll_interval() {
    let mut config = AppConfig::default();
    config.performance.event_poll_interval_ms = 0;
    assert!(config.validate().is_err());
}
