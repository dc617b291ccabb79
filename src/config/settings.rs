//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// In-memory store configuration
    pub store: StoreSettings,

    /// Marketplace (eBay) sync configuration
    pub marketplace: MarketplaceSettings,

    /// Payment processor configuration
    pub payments: PaymentSettings,

    /// Image processing proxy configuration
    pub images: ImageSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 64KB)
    pub max_message_size: usize,

    /// Liveness sweep interval in seconds (default: 30)
    pub heartbeat_interval_secs: u64,

    /// Seconds a new connection has to send its auth frame (default: 10)
    pub auth_timeout_secs: u64,
}

/// In-memory store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Insert the sample catalog, users and demo order on startup
    pub seed_sample_data: bool,
}

/// Marketplace sync configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceSettings {
    /// eBay API base URL
    pub api_base_url: String,

    /// OAuth access token; sync is disabled without it
    #[serde(default)]
    pub access_token: Option<String>,

    /// Seller username used to filter Browse API searches
    #[serde(default)]
    pub seller_id: Option<String>,

    /// Marketplace id header value (e.g. EBAY_US)
    pub marketplace_id: String,

    /// Listings requested per call
    pub page_size: u32,

    /// Directory receiving the JSON/CSV snapshots
    pub snapshot_dir: String,
}

/// Payment processor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSettings {
    /// Payment API base URL
    pub api_base_url: String,

    /// Secret key; payments are disabled without it
    #[serde(default)]
    pub secret_key: Option<String>,

    /// ISO currency code charged at checkout
    pub currency: String,
}

/// Image processing proxy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSettings {
    /// Background removal endpoint; the proxy is disabled without it
    #[serde(default)]
    pub endpoint: Option<String>,

    /// API key sent as `X-Api-Key`
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("jwt.access_token_expiry_minutes", 60)?
            .set_default("jwt.refresh_token_expiry_days", 30)?
            .set_default("cors.allowed_origins", vec!["http://localhost:5173"])?
            .set_default("websocket.max_message_size", 65536_i64)?
            .set_default("websocket.heartbeat_interval_secs", 30_i64)?
            .set_default("websocket.auth_timeout_secs", 10_i64)?
            .set_default("store.seed_sample_data", true)?
            .set_default("marketplace.api_base_url", "https://api.ebay.com")?
            .set_default("marketplace.marketplace_id", "EBAY_US")?
            .set_default("marketplace.page_size", 100_i64)?
            .set_default("marketplace.snapshot_dir", "data")?
            .set_default("payments.api_base_url", "https://api.stripe.com")?
            .set_default("payments.currency", "usd")?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=5000 -> server.port = 5000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option(
                "marketplace.access_token",
                std::env::var("EBAY_ACCESS_TOKEN").ok(),
            )?
            .set_override_option(
                "marketplace.seller_id",
                std::env::var("EBAY_SELLER_ID").ok(),
            )?
            .set_override_option(
                "payments.secret_key",
                std::env::var("STRIPE_SECRET_KEY").ok(),
            )?
            .set_override_option("images.api_key", std::env::var("REMOVE_BG_API_KEY").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.validate()?;
                Ok(settings)
            })
    }

    /// Check cross-field constraints the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }
        if self.websocket.heartbeat_interval_secs == 0 {
            return Err(ConfigError::Message(
                "websocket.heartbeat_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl MarketplaceSettings {
    /// Whether the sync pipeline can reach eBay at all.
    pub fn is_configured(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl PaymentSettings {
    pub fn is_configured(&self) -> bool {
        self.secret_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl ImageSettings {
    pub fn is_configured(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".into(),
                port: 5000,
            },
            jwt: JwtSettings {
                secret: "x".repeat(MIN_JWT_SECRET_LENGTH),
                access_token_expiry_minutes: 60,
                refresh_token_expiry_days: 30,
            },
            cors: CorsSettings {
                allowed_origins: vec![],
            },
            websocket: WebSocketSettings {
                max_message_size: 65536,
                heartbeat_interval_secs: 30,
                auth_timeout_secs: 10,
            },
            store: StoreSettings {
                seed_sample_data: false,
            },
            marketplace: MarketplaceSettings {
                api_base_url: "https://api.ebay.com".into(),
                access_token: None,
                seller_id: None,
                marketplace_id: "EBAY_US".into(),
                page_size: 100,
                snapshot_dir: "data".into(),
            },
            payments: PaymentSettings {
                api_base_url: "https://api.stripe.com".into(),
                secret_key: Some(String::new()),
                currency: "usd".into(),
            },
            images: ImageSettings {
                endpoint: None,
                api_key: None,
            },
            environment: "test".into(),
        }
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut settings = sample();
        settings.jwt.secret = "short".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_keys_count_as_unconfigured() {
        let settings = sample();
        assert!(settings.validate().is_ok());
        assert!(!settings.payments.is_configured());
        assert!(!settings.marketplace.is_configured());
        assert!(!settings.images.is_configured());
        assert_eq!(settings.server_addr(), "127.0.0.1:5000");
    }
}
