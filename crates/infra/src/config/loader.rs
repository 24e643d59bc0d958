//! Configuration loader
//!
//! Loads [`ClientConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `BOXAPI_BASE_URL` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. JSON and TOML are both accepted, chosen by file extension
//!
//! ## Environment Variables
//! - `BOXAPI_BASE_URL`: REST API base URL (required for this source)
//! - `BOXAPI_UPLOAD_URL`: upload base URL
//! - `BOXAPI_OAUTH_URL`: OAuth2 endpoint base URL
//! - `BOXAPI_LEGACY_URL`: legacy ticket-auth base URL
//! - `BOXAPI_TIMEOUT_SECS`: per-request timeout in seconds
//! - `BOXAPI_RETRY_ON_SERVER_ERROR`: retry once on transport failure (true/false)
//! - `BOXAPI_PROXY`: web proxy URL
//! - `BOXAPI_USER_AGENT`: User-Agent override
//!
//! Unset optional variables keep their [`ClientConfig::default`] values.
//!
//! ## File Locations
//! Probed in order:
//! 1. `./boxapi.{json,toml}`, then `./config.{json,toml}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use boxapi_domain::{BoxError, ClientConfig, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["boxapi.json", "boxapi.toml", "config.json", "config.toml"];

/// Load configuration, preferring the environment over files.
///
/// # Errors
/// Returns `BoxError::Config` if neither source yields a configuration.
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `BOXAPI_*` environment variables.
///
/// # Errors
/// Returns `BoxError::Config` if `BOXAPI_BASE_URL` is missing or a value
/// cannot be parsed.
pub fn load_from_env() -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    let base_url = env_var("BOXAPI_BASE_URL")?;
    let timeout_secs = match optional_env("BOXAPI_TIMEOUT_SECS") {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| BoxError::Config(format!("Invalid timeout: {e}")))?,
        None => defaults.timeout_secs,
    };

    Ok(ClientConfig {
        base_url,
        upload_url: optional_env("BOXAPI_UPLOAD_URL").unwrap_or(defaults.upload_url),
        oauth_url: optional_env("BOXAPI_OAUTH_URL").unwrap_or(defaults.oauth_url),
        legacy_url: optional_env("BOXAPI_LEGACY_URL").unwrap_or(defaults.legacy_url),
        timeout_secs,
        retry_on_server_error: env_bool(
            "BOXAPI_RETRY_ON_SERVER_ERROR",
            defaults.retry_on_server_error,
        ),
        proxy: optional_env("BOXAPI_PROXY"),
        user_agent: optional_env("BOXAPI_USER_AGENT"),
    })
}

/// Load configuration from a file, or from the first probed file when
/// `path` is `None`.
///
/// # Errors
/// Returns `BoxError::Config` if the file is missing, unreadable, or not
/// valid JSON/TOML.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BoxError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BoxError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BoxError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BoxError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BoxError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(BoxError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
#[must_use]
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    optional_env(key)
        .ok_or_else(|| BoxError::Config(format!("Missing required environment variable: {key}")))
}

/// Set, non-blank variable.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 8] = [
        "BOXAPI_BASE_URL",
        "BOXAPI_UPLOAD_URL",
        "BOXAPI_OAUTH_URL",
        "BOXAPI_LEGACY_URL",
        "BOXAPI_TIMEOUT_SECS",
        "BOXAPI_RETRY_ON_SERVER_ERROR",
        "BOXAPI_PROXY",
        "BOXAPI_USER_AGENT",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    fn config_file(extension: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(extension).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("BOXAPI_TEST_BOOL_ON", "on");
        std::env::set_var("BOXAPI_TEST_BOOL_UPPER", "TRUE");
        std::env::set_var("BOXAPI_TEST_BOOL_OFF", "0");

        assert!(env_bool("BOXAPI_TEST_BOOL_ON", false));
        assert!(env_bool("BOXAPI_TEST_BOOL_UPPER", false));
        assert!(!env_bool("BOXAPI_TEST_BOOL_OFF", true));
        assert!(env_bool("BOXAPI_TEST_BOOL_MISSING", true));

        std::env::remove_var("BOXAPI_TEST_BOOL_ON");
        std::env::remove_var("BOXAPI_TEST_BOOL_UPPER");
        std::env::remove_var("BOXAPI_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOXAPI_BASE_URL", "http://localhost:9000/2.0");
        std::env::set_var("BOXAPI_UPLOAD_URL", "http://localhost:9001/2.0");
        std::env::set_var("BOXAPI_OAUTH_URL", "http://localhost:9002/oauth2");
        std::env::set_var("BOXAPI_LEGACY_URL", "http://localhost:9003/1.0");
        std::env::set_var("BOXAPI_TIMEOUT_SECS", "5");
        std::env::set_var("BOXAPI_RETRY_ON_SERVER_ERROR", "false");
        std::env::set_var("BOXAPI_PROXY", "http://proxy.local:3128");
        std::env::set_var("BOXAPI_USER_AGENT", "boxapi-tests");

        let result = load_from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/2.0");
        assert_eq!(config.upload_url, "http://localhost:9001/2.0");
        assert_eq!(config.oauth_url, "http://localhost:9002/oauth2");
        assert_eq!(config.legacy_url, "http://localhost:9003/1.0");
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.retry_on_server_error);
        assert_eq!(config.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(config.user_agent.as_deref(), Some("boxapi-tests"));
    }

    #[test]
    fn test_load_from_env_fills_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("BOXAPI_BASE_URL", "http://localhost:9000");

        let result = load_from_env();
        clear_env();

        let config = result.unwrap();
        let defaults = ClientConfig::default();
        assert_eq!(config.upload_url, defaults.upload_url);
        assert_eq!(config.timeout_secs, defaults.timeout_secs);
        assert!(config.retry_on_server_error);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        assert!(matches!(load_from_env(), Err(BoxError::Config(_))));
    }

    #[test]
    fn test_load_from_env_invalid_timeout() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("BOXAPI_BASE_URL", "http://localhost:9000");
        std::env::set_var("BOXAPI_TIMEOUT_SECS", "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(BoxError::Config(_))));
    }

    #[test]
    fn test_load_from_file_json() {
        let file = config_file(
            ".json",
            r#"{"base_url": "https://box.internal/2.0", "timeout_secs": 12, "proxy": "http://p:8080"}"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.base_url, "https://box.internal/2.0");
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.proxy.as_deref(), Some("http://p:8080"));
        assert!(config.retry_on_server_error);
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = config_file(
            ".toml",
            r#"
base_url = "https://box.internal/2.0"
retry_on_server_error = false
user_agent = "sync-agent/1.0"
"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.base_url, "https://box.internal/2.0");
        assert!(!config.retry_on_server_error);
        assert_eq!(config.user_agent.as_deref(), Some("sync-agent/1.0"));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/boxapi.json")));
        assert!(matches!(result, Err(BoxError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let file = config_file(".json", r#"{ "base_url": "#);
        assert!(matches!(
            load_from_file(Some(file.path().to_path_buf())),
            Err(BoxError::Config(_))
        ));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("base_url: x", Path::new("boxapi.yaml"));
        assert!(matches!(result, Err(BoxError::Config(_))));
    }

    #[test]
    fn test_parse_config_defaults_to_json_without_extension() {
        let config = parse_config(r#"{"timeout_secs": 3}"#, Path::new("boxapi")).unwrap();
        assert_eq!(config.timeout_secs, 3);
    }
}
