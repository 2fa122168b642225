//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("logfeed_test_{}_{}.toml", name, std::process::id()));
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
/// Removes the var on drop, preventing test pollution in parallel execution.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

// ===== File loading =====

#[test]
fn default_config_path_contains_logfeed_config_toml() {
    let Some(path) = default_config_path() else {
        return;
    };
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("logfeed") && path_str.ends_with("config.toml"),
        "Path should contain 'logfeed' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = temp_config(
        "valid",
        r#"
base_url = "http://bjorn.local:8000"
autostart = true
reconnect_delay_ms = 500
max_reconnect_attempts = 3
buffer_capacity = 50
max_visible_lines = 80
bottom_threshold = 2
scroll_debounce_ms = 300
platform = "mobile"
"#,
    );

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.base_url, Some("http://bjorn.local:8000".to_string()));
    assert_eq!(config.autostart, Some(true));
    assert_eq!(config.reconnect_delay_ms, Some(500));
    assert_eq!(config.max_reconnect_attempts, Some(3));
    assert_eq!(config.buffer_capacity, Some(50));
    assert_eq!(config.max_visible_lines, Some(80));
    assert_eq!(config.bottom_threshold, Some(2));
    assert_eq!(config.scroll_debounce_ms, Some(300));
    assert_eq!(config.platform, Some(Platform::Mobile));

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = temp_config("invalid", "this is not valid TOML ][}{");

    let result = load_config_file(&config_path);

    match result {
        Err(ConfigError::ParseError { path, reason: _ }) => {
            assert_eq!(path, config_path);
        }
        _ => panic!("Expected ParseError, got {:?}", result),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_rejects_zero_capacities() {
    let visible_path = temp_config("zero_visible", "max_visible_lines = 0\n");
    let result = load_config_file(&visible_path);
    assert_eq!(
        result,
        Err(ConfigError::InvalidValue {
            path: visible_path.clone(),
            field: "max_visible_lines",
            reason: "must be at least 1".to_string(),
        })
    );

    let buffer_path = temp_config("zero_buffer", "buffer_capacity = 0\nmax_visible_lines = 5\n");
    match load_config_file(&buffer_path) {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "buffer_capacity"),
        other => panic!("Expected InvalidValue, got {:?}", other),
    }

    fs::remove_file(visible_path).ok();
    fs::remove_file(buffer_path).ok();
}

#[test]
fn load_config_file_accepts_single_line_caps() {
    let config_path = temp_config("one_line_caps", "max_visible_lines = 1\nbuffer_capacity = 1\n");

    let config = load_config_file(&config_path)
        .expect("Caps of one are valid")
        .expect("File exists");
    assert_eq!(config.max_visible_lines, Some(1));
    assert_eq!(config.buffer_capacity, Some(1));

    fs::remove_file(config_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("theme = \"dark\"");
    assert!(result.is_err(), "Unknown fields should be rejected");
}

#[test]
fn config_file_rejects_unknown_platform() {
    let result: Result<ConfigFile, _> = toml::from_str("platform = \"tablet\"");
    assert!(result.is_err());
}

// ===== Merge =====

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_uses_defaults_for_none_fields() {
    let config_file = ConfigFile {
        base_url: Some("http://other:9000".to_string()),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.base_url, "http://other:9000");
    assert_eq!(resolved.autostart, None);
    assert_eq!(resolved.reconnect_delay_ms, defaults.reconnect_delay_ms);
    assert_eq!(resolved.buffer_capacity, defaults.buffer_capacity);
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.reconnect_delay_ms, 2000);
    assert_eq!(config.max_reconnect_attempts, 5);
    assert_eq!(config.buffer_capacity, 1000);
    assert_eq!(config.max_visible_lines, 200);
    assert_eq!(config.scroll_debounce_ms, 150);
    assert_eq!(config.platform, Platform::Desktop);
}

#[test]
fn console_settings_carry_config_values() {
    let config = ResolvedConfig {
        reconnect_delay_ms: 750,
        max_reconnect_attempts: 2,
        bottom_threshold: 3,
        ..ResolvedConfig::default()
    };

    let settings = config.console_settings();

    assert_eq!(settings.reconnect.delay, Duration::from_millis(750));
    assert_eq!(settings.reconnect.max_attempts, 2);
    assert_eq!(settings.bottom_threshold, 3);
    assert_eq!(settings.scroll_debounce, Duration::from_millis(150));
}

#[test]
fn default_log_path_ends_with_logfeed_log() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("logfeed.log"),
        "Default log path should end with 'logfeed.log', got: {:?}",
        path
    );
}

// ===== Environment =====

#[test]
#[serial(logfeed_url)]
fn apply_env_overrides_respects_logfeed_url() {
    let _guard = EnvGuard::new(URL_ENV);
    env::set_var(URL_ENV, "http://env-host:8000");

    let config = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(config.base_url, "http://env-host:8000");
}

#[test]
#[serial(logfeed_url)]
fn apply_env_overrides_ignores_blank_url() {
    let _guard = EnvGuard::new(URL_ENV);
    env::set_var(URL_ENV, "  ");

    let config = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
#[serial(logfeed_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    let explicit = temp_config("explicit", "base_url = \"http://explicit\"");
    let from_env = temp_config("env", "base_url = \"http://from-env\"");
    env::set_var(CONFIG_ENV, from_env.to_str().unwrap());

    let config = load_config_with_precedence(Some(explicit.clone()))
        .unwrap()
        .unwrap();

    assert_eq!(config.base_url, Some("http://explicit".to_string()));
    fs::remove_file(explicit).ok();
    fs::remove_file(from_env).ok();
}

#[test]
#[serial(logfeed_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    let from_env = temp_config("env_only", "autostart = false");
    env::set_var(CONFIG_ENV, from_env.to_str().unwrap());

    let config = load_config_with_precedence(None).unwrap().unwrap();

    assert_eq!(config.autostart, Some(false));
    fs::remove_file(from_env).ok();
}

#[test]
#[serial(logfeed_config)]
fn load_config_with_precedence_rejects_empty_env_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    env::set_var(CONFIG_ENV, "");

    assert!(matches!(
        load_config_with_precedence(None),
        Err(ConfigError::InvalidPath(_))
    ));
}

// ===== CLI =====

#[test]
fn apply_cli_overrides_no_overrides() {
    let base = ResolvedConfig::default();
    assert_eq!(apply_cli_overrides(base.clone(), None, None), base);
}

#[test]
#[serial(logfeed_url)]
fn precedence_chain_full_defaults_to_cli() {
    let _guard = EnvGuard::new(URL_ENV);
    let file = ConfigFile {
        base_url: Some("http://file".to_string()),
        autostart: Some(true),
        ..ConfigFile::default()
    };

    let merged = merge_config(Some(file));
    assert_eq!(merged.base_url, "http://file");

    env::set_var(URL_ENV, "http://env");
    let with_env = apply_env_overrides(merged);
    assert_eq!(with_env.base_url, "http://env");

    let with_cli = apply_cli_overrides(with_env, Some("http://cli".to_string()), Some(false));
    assert_eq!(with_cli.base_url, "http://cli");
    assert_eq!(with_cli.autostart, Some(false));
}
