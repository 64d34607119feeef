use std::env;

/// Runtime settings read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub export_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:../data/fixtureforge.db".to_string(),
            port: 3000,
            export_dir: "../data/exports".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid PORT '{}', using {}", raw, defaults.port);
                defaults.port
            }),
            Err(_) => defaults.port,
        };

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port,
            export_dir: env::var("EXPORT_DIR").unwrap_or(defaults.export_dir),
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}
