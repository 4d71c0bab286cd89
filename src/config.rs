use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";
pub const CONFIG_PATH_ENV: &str = "MARQUEE_CONFIG";
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";
pub const DEFAULT_SEARCH_TERM: &str = "batman";
pub const DEFAULT_CACHE_DIR: &str = ".marquee_cache";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POSTER_WORKERS: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no OMDb API key: set `omdb_api_key` in config.json or the OMDB_API_KEY environment variable")]
    MissingApiKey,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    pub default_search_term: String,
    pub cache_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub poster_workers: usize,
}

impl AppConfig {
    /// Defaults around an already-known key.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            omdb_api_key: key.into(),
            omdb_base_url: DEFAULT_BASE_URL.to_string(),
            default_search_term: DEFAULT_SEARCH_TERM.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            poster_workers: DEFAULT_POSTER_WORKERS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(alias = "api_key")]
    omdb_api_key: Option<String>,
    omdb_base_url: Option<String>,
    default_search_term: Option<String>,
    cache_dir: Option<String>,
    request_timeout_secs: Option<u64>,
    poster_workers: Option<usize>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Load `config.json` (or `$MARQUEE_CONFIG`) and apply the `OMDB_API_KEY` override.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_path(), env::var(API_KEY_ENV).ok())
}

pub fn load_config_from(path: &Path, env_api_key: Option<String>) -> Result<AppConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(txt) => {
            let parsed = serde_json::from_str::<RawConfig>(&txt).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            info!("Loaded config from {}", path.display());
            parsed
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No {} found; using defaults", path.display());
            RawConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let key = match non_blank(env_api_key) {
        Some(k) => {
            if raw.omdb_api_key.is_some() {
                info!("{API_KEY_ENV} overrides the key in {}", path.display());
            }
            k
        }
        None => non_blank(raw.omdb_api_key).ok_or(ConfigError::MissingApiKey)?,
    };

    let mut cfg = AppConfig::with_api_key(key);
    if let Some(url) = non_blank(raw.omdb_base_url) {
        cfg.omdb_base_url = url;
    }
    if let Some(term) = non_blank(raw.default_search_term) {
        cfg.default_search_term = term;
    }
    if let Some(dir) = non_blank(raw.cache_dir) {
        cfg.cache_dir = PathBuf::from(dir);
    }
    if let Some(secs) = raw.request_timeout_secs {
        if secs == 0 {
            warn!("request_timeout_secs = 0 ignored; keeping {DEFAULT_TIMEOUT_SECS}s");
        } else {
            cfg.request_timeout_secs = secs;
        }
    }
    if let Some(n) = raw.poster_workers {
        cfg.poster_workers = n.clamp(1, 16);
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_uses_defaults_with_env_key() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join(CONFIG_FILE), Some("envkey".into())).unwrap();
        assert_eq!(cfg.omdb_api_key, "envkey");
        assert_eq!(cfg.omdb_base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.default_search_term, "batman");
        assert_eq!(cfg.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.poster_workers, DEFAULT_POSTER_WORKERS);
    }

    #[test]
    fn missing_key_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(&dir.path().join(CONFIG_FILE), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let path = write_config(&dir, r#"{ "omdb_api_key": "   " }"#);
        let err = load_config_from(&path, Some(String::new())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "omdb_api_key": "filekey" }"#);
        assert_eq!(load_config_from(&path, None).unwrap().omdb_api_key, "filekey");
        assert_eq!(
            load_config_from(&path, Some("envkey".into())).unwrap().omdb_api_key,
            "envkey"
        );
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "api_key": "k",
                "omdb_base_url": "http://127.0.0.1:8080/",
                "default_search_term": "  ",
                "cache_dir": "/tmp/marquee",
                "request_timeout_secs": 0,
                "poster_workers": 64
            }"#,
        );
        let cfg = load_config_from(&path, None).unwrap();
        assert_eq!(cfg.omdb_api_key, "k");
        assert_eq!(cfg.omdb_base_url, "http://127.0.0.1:8080/");
        assert_eq!(cfg.default_search_term, DEFAULT_SEARCH_TERM);
        assert_eq!(cfg.cache_dir, PathBuf::from("/tmp/marquee"));
        assert_eq!(cfg.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.poster_workers, 16);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "{ not json");
        let err = load_config_from(&path, Some("k".into())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
