//! Server configuration from the environment.

/// Runtime configuration for the VisaHub API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Document store connection string, e.g. mongodb://127.0.0.1:27017
    pub mongodb_uri: String,
    /// Database holding the visa collections.
    pub db_name: String,
    /// Secret used to sign and verify auth tokens.
    pub token_secret: String,
    /// Origin allowed to call the API with credentials.
    pub allowed_origin: String,
}

impl ServerConfig {
    /// Read configuration from `VISAHUB_*` environment variables.
    ///
    /// Everything has a local-development default except the token
    /// signing secret, which must be supplied.
    pub fn from_env() -> anyhow::Result<Self> {
        let mongodb_uri = std::env::var("VISAHUB_MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());

        let db_name =
            std::env::var("VISAHUB_DB_NAME").unwrap_or_else(|_| "VisaDB".to_string());

        let token_secret = std::env::var("VISAHUB_ACCESS_TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("VISAHUB_ACCESS_TOKEN_SECRET is required"))?;
        if token_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("VISAHUB_ACCESS_TOKEN_SECRET must not be empty"));
        }

        let allowed_origin = std::env::var("VISAHUB_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            mongodb_uri,
            db_name,
            token_secret,
            allowed_origin,
        })
    }
}
