use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::config::OidcConfig;

/// Where documents, users and sessions are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongo,
    /// Process memory; everything is lost on restart.
    Memory,
}

/// Server settings.
///
/// Layered as: built-in defaults, then `docgraph.toml` (or the file given
/// with `--config`), then `DOCGRAPH__*` environment variables, then
/// command-line overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub listen_addr: String,
    pub storage: StorageBackend,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Enables `/api/auth/demo-login` and seeds demo documents.
    pub demo_mode: bool,
    pub session_ttl_hours: i64,
    /// Mark session cookies `Secure` (requires HTTPS).
    pub secure_cookies: bool,
    /// Directory served under `/public`.
    pub public_dir: String,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    #[serde(default)]
    pub oidc: Option<OidcConfig>,
}

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen_addr: Option<String>,
    pub storage: Option<String>,
    pub demo_mode: Option<bool>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("listen_addr", "127.0.0.1:3000")?
            .set_default("storage", "mongo")?
            .set_default("mongodb_uri", "mongodb://localhost:27017")?
            .set_default("mongodb_database", "docgraph")?
            .set_default("demo_mode", false)?
            .set_default("session_ttl_hours", 24 * 30)?
            .set_default("secure_cookies", false)?
            .set_default("public_dir", "public")?
            .set_default("log_filter", "docgraph=info,tower_http=info")?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("docgraph").required(false)),
        };

        builder
            .add_source(
                Environment::with_prefix("DOCGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("listen_addr", overrides.listen_addr)?
            .set_override_option("storage", overrides.storage)?
            .set_override_option("demo_mode", overrides.demo_mode)?
            .build()?
            .try_deserialize()
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_apply_when_file_is_minimal() {
        let file = write_toml("");
        let config = AppConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.storage, StorageBackend::Mongo);
        assert_eq!(config.mongodb_database, "docgraph");
        assert_eq!(config.session_ttl(), chrono::Duration::hours(720));
        assert!(config.oidc.is_none());
    }

    #[test]
    fn test_file_values_and_oidc_table() {
        let file = write_toml(
            r#"
storage = "memory"
demo_mode = true

[oidc]
issuer_url = "https://accounts.example.com"
client_id = "client"
client_secret = "secret"
redirect_uri = "http://localhost:3000/api/auth/callback"
"#,
        );
        let config = AppConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.demo_mode);
        let oidc = config.oidc.unwrap();
        assert_eq!(oidc.client_id, "client");
        assert_eq!(oidc.provider_name, "oidc");
    }

    #[test]
    fn test_overrides_win() {
        let file = write_toml("listen_addr = \"0.0.0.0:8080\"\n");
        let overrides = ConfigOverrides {
            listen_addr: Some("127.0.0.1:9999".into()),
            storage: Some("memory".into()),
            demo_mode: Some(true),
        };
        let config = AppConfig::load(Some(file.path()), overrides).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9999");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.demo_mode);
    }

    #[test]
    fn test_unknown_storage_rejected() {
        let file = write_toml("storage = \"postgres\"\n");
        assert!(AppConfig::load(Some(file.path()), ConfigOverrides::default()).is_err());
    }
}
