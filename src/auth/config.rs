use serde::Deserialize;

use crate::error::AppError;

/// OIDC configuration (the `[oidc]` table of the settings).
#[derive(Debug, Clone, Deserialize)]
pub struct OidcConfig {
    /// The OIDC issuer URL (e.g., `https://accounts.google.com`).
    pub issuer_url: String,
    /// The OAuth2 client ID.
    pub client_id: String,
    /// The OAuth2 client secret.
    pub client_secret: String,
    /// The redirect URI after OIDC login completes
    /// (must route to `/api/auth/callback`).
    pub redirect_uri: String,
    /// Name recorded as the account provider on user records.
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
}

fn default_provider_name() -> String {
    "oidc".to_string()
}

impl OidcConfig {
    /// Build with explicit values (useful for testing).
    pub fn new(
        issuer_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            issuer_url,
            client_id,
            client_secret,
            redirect_uri,
            provider_name: default_provider_name(),
        }
    }

    /// Reject obviously incomplete configurations before contacting the provider.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("issuer_url", &self.issuer_url),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Auth(format!("oidc.{name} is empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_fields() {
        let config = OidcConfig::new(
            "https://accounts.example.com".into(),
            "".into(),
            "secret".into(),
            "http://localhost:3000/api/auth/callback".into(),
        );
        match config.validate().unwrap_err() {
            AppError::Auth(msg) => assert!(msg.contains("client_id")),
            other => panic!("Expected Auth error, got: {:?}", other),
        }
    }

    #[test]
    fn test_provider_name_default() {
        let config: OidcConfig = serde_json::from_str(
            r#"{
                "issuer_url": "https://accounts.example.com",
                "client_id": "id",
                "client_secret": "secret",
                "redirect_uri": "http://localhost:3000/api/auth/callback"
            }"#,
        )
        .unwrap();
        assert_eq!(config.provider_name, "oidc");
        assert!(config.validate().is_ok());
    }
}
