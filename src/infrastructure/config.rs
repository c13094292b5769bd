use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub stripe_secret_key: String,
    pub server_host: String,
    pub server_port: u16,
    /// ISO currency code sent with payment intents.
    pub currency: String,
    /// Bearer token for car moderation endpoints.
    pub admin_token: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("OWNCARS").separator("_"))
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8080)?
            .set_default("currency", "usd")?
            .build()?;

        config.try_deserialize()
    }
}
