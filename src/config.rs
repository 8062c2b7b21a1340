use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Static key every business endpoint is gated on.
    pub api_key: String,
    /// Declared for signed client tokens; no route reads it yet.
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        let database_url = std::env::var("DATABASE_URL")?;
        let api_key = std::env::var("API_KEY")?;
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-me".into());
        Ok(Self {
            host,
            port,
            database_url,
            api_key,
            jwt_secret,
        })
    }
}
