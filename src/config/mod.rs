use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub auth: AuthConfig,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Identity resolution settings. `public_routes` holds regex patterns
/// anchored at the start of the request path; `auth_url` is the identity
/// service used when the proxy does not forward `X-Auth-Url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub enable_authentication: bool,
    pub auth_url: String,
    pub public_routes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_limit: i64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment presets first, then specific env var overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Auth overrides
        if let Ok(v) = env::var("AUTH_ENABLE_AUTHENTICATION") {
            self.auth.enable_authentication = v.parse().unwrap_or(self.auth.enable_authentication);
        }
        if let Ok(v) = env::var("AUTH_URL") {
            self.auth.auth_url = v;
        }
        if let Ok(v) = env::var("AUTH_PUBLIC_ROUTES") {
            self.auth.public_routes = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_LIMIT") {
            self.api.max_limit = v.parse().unwrap_or(self.api.max_limit);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            auth: AuthConfig {
                enable_authentication: true,
                auth_url: "http://localhost:5000/v3".to_string(),
                public_routes: vec![],
            },
            api: ApiConfig {
                max_limit: 1000,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            auth: AuthConfig {
                enable_authentication: true,
                auth_url: "https://identity.staging.example.com/v3".to_string(),
                public_routes: vec![],
            },
            api: ApiConfig {
                max_limit: 500,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            auth: AuthConfig {
                enable_authentication: true,
                auth_url: "https://identity.example.com/v3".to_string(),
                public_routes: vec![],
            },
            api: ApiConfig {
                max_limit: 100,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
