//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use domain::DEFAULT_MAX_PICTURE_BYTES;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables (a `.env` file is loaded first if present):
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset keeps pets in memory
/// - `UPLOAD_DIR`: directory for pet pictures (default: `"./uploads/pets"`)
/// - `UPLOAD_URL_PREFIX`: public path pictures are served under (default: `"/uploads/pets"`)
/// - `MAX_UPLOAD_BYTES`: largest accepted picture (default: 10 MiB)
/// - `JWT_SECRET`: token signing secret; unset gives a random one per process
/// - `JWT_EXPIRATION_HOURS`: token lifetime (default: `24`)
/// - `BCRYPT_COST`: password hashing cost, 4 to 31 (default: `12`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub upload_dir: PathBuf,
    pub upload_url_prefix: String,
    pub max_upload_bytes: usize,
    pub jwt_secret: Option<String>,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            upload_url_prefix: lookup("UPLOAD_URL_PREFIX")
                .map(|p| p.trim_end_matches('/').to_string())
                .filter(|p| p.starts_with('/'))
                .unwrap_or(defaults.upload_url_prefix),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|b| b.parse().ok())
                .filter(|b| *b > 0)
                .unwrap_or(defaults.max_upload_bytes),
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()),
            jwt_expiration_hours: lookup("JWT_EXPIRATION_HOURS")
                .and_then(|h| h.parse().ok())
                .filter(|h| *h > 0)
                .unwrap_or(defaults.jwt_expiration_hours),
            bcrypt_cost: lookup("BCRYPT_COST")
                .and_then(|c| c.parse().ok())
                .filter(|c| (4..=31).contains(c))
                .unwrap_or(defaults.bcrypt_cost),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request body limit: the largest picture plus room for the other form fields.
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_add(64 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            upload_dir: PathBuf::from("./uploads/pets"),
            upload_url_prefix: "/uploads/pets".to_string(),
            max_upload_bytes: DEFAULT_MAX_PICTURE_BYTES,
            jwt_secret: None,
            jwt_expiration_hours: 24,
            bcrypt_cost: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.database_url.is_none());
        assert_eq!(config.upload_url_prefix, "/uploads/pets");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.jwt_expiration_hours, 24);
        assert_eq!(config.bcrypt_cost, 12);
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.upload_dir, PathBuf::from("./uploads/pets"));
    }

    #[test]
    fn test_reads_variables() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LOG_FORMAT", "JSON"),
            ("DATABASE_URL", "postgres://localhost/pets"),
            ("UPLOAD_DIR", "/var/lib/pets"),
            ("UPLOAD_URL_PREFIX", "/media/"),
            ("MAX_UPLOAD_BYTES", "2048"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRATION_HOURS", "2"),
            ("BCRYPT_COST", "10"),
        ]);
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/pets")
        );
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/pets"));
        assert_eq!(config.upload_url_prefix, "/media");
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.jwt_expiration_hours, 2);
        assert_eq!(config.bcrypt_cost, 10);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("DATABASE_URL", "  "),
            ("UPLOAD_URL_PREFIX", "relative"),
            ("MAX_UPLOAD_BYTES", "0"),
            ("JWT_SECRET", ""),
            ("JWT_EXPIRATION_HOURS", "-1"),
            ("BCRYPT_COST", "99"),
        ]);
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
        assert_eq!(config.upload_url_prefix, "/uploads/pets");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.jwt_expiration_hours, 24);
        assert_eq!(config.bcrypt_cost, 12);
    }
}
