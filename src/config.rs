//! Environment configuration.
//!
//! Read once at start-up. Unparsable values fall back to their defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_WKHTMLTOPDF: &str = "wkhtmltopdf";
const DEFAULT_CODE_FORMATTER: &str = "black";
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub database_url: String,
    /// Whether admins may download the raw database file.
    pub enable_admin_export: bool,
    pub admin_api_keys: Vec<String>,
    /// Overrides the built-in PDF stylesheet.
    pub pdf_stylesheet: Option<PathBuf>,
    pub wkhtmltopdf_path: PathBuf,
    pub code_formatter_path: PathBuf,
    pub tool_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or_default(&get, "PORT", DEFAULT_PORT);
        let data_dir = PathBuf::from(get("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let database_url = get("DATABASE_URL")
            .unwrap_or_else(|| format!("sqlite:{}", data_dir.join("webui.db").display()));

        let enable_admin_export = match get("ENABLE_ADMIN_EXPORT") {
            Some(value) => parse_bool(&value).unwrap_or_else(|| {
                warn!(%value, "ENABLE_ADMIN_EXPORT is not a boolean, using true");
                true
            }),
            None => true,
        };

        let admin_api_keys = get("ADMIN_API_KEYS")
            .map(|keys| {
                keys.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            port,
            data_dir,
            database_url,
            enable_admin_export,
            admin_api_keys,
            pdf_stylesheet: get("PDF_STYLESHEET").map(PathBuf::from),
            wkhtmltopdf_path: PathBuf::from(
                get("WKHTMLTOPDF_PATH").unwrap_or_else(|| DEFAULT_WKHTMLTOPDF.to_string()),
            ),
            code_formatter_path: PathBuf::from(
                get("CODE_FORMATTER_PATH").unwrap_or_else(|| DEFAULT_CODE_FORMATTER.to_string()),
            ),
            tool_timeout: Duration::from_secs(parse_or_default(
                &get,
                "EXTERNAL_TOOL_TIMEOUT_SECS",
                DEFAULT_TOOL_TIMEOUT_SECS,
            )),
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn litellm_config_path(&self) -> PathBuf {
        self.data_dir.join("litellm").join("config.yaml")
    }
}

fn parse_or_default<T, G>(get: &G, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(key, %value, "invalid value, using default");
            default
        }),
        None => default,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.database_url, "sqlite:data/webui.db");
        assert!(config.enable_admin_export);
        assert!(config.admin_api_keys.is_empty());
        assert!(config.pdf_stylesheet.is_none());
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
        assert_eq!(config.litellm_config_path(), PathBuf::from("data/litellm/config.yaml"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("DATA_DIR", "/srv/webui"),
            ("ENABLE_ADMIN_EXPORT", "False"),
            ("ADMIN_API_KEYS", " alpha, ,beta "),
            ("EXTERNAL_TOOL_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(config.server_addr().port(), 9000);
        assert_eq!(config.database_url, "sqlite:/srv/webui/webui.db");
        assert!(!config.enable_admin_export);
        assert_eq!(config.admin_api_keys, vec!["alpha", "beta"]);
        assert_eq!(config.tool_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("ENABLE_ADMIN_EXPORT", "maybe")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.enable_admin_export);
    }
}
