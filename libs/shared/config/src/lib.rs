use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub portal_db_url: String,
    pub portal_db_api_key: String,
    pub portal_jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            portal_db_url: env::var("PORTAL_DB_URL")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_DB_URL not set, using empty value");
                    String::new()
                }),
            portal_db_api_key: env::var("PORTAL_DB_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_DB_API_KEY not set, using empty value");
                    String::new()
                }),
            portal_jwt_secret: env::var("PORTAL_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_JWT_SECRET not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.portal_db_url.is_empty()
            && !self.portal_db_api_key.is_empty()
            && !self.portal_jwt_secret.is_empty()
    }
}
