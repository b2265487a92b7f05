use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "rango.duckdb".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserCredential {
    pub username: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub users: Vec<UserCredential>,
    /// Where anonymous requests for protected routes are sent.
    pub login_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            login_url: "/accounts/login/".to_string(),
        }
    }
}

impl AuthConfig {
    /// Finds the user owning `key`. An empty key never matches, so a user
    /// whose key variable is unset cannot be logged in as.
    pub fn user_for_key(&self, key: &str) -> Option<&UserCredential> {
        if key.is_empty() {
            return None;
        }
        self.users.iter().find(|u| u.api_key == key)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub max_age_days: i64,
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sessionid".to_string(),
            max_age_days: 14,
            secure: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BingConfig {
    pub api_base: String,
    pub api_key: String,
}

impl Default for BingConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.bing.microsoft.com/v7.0".to_string(),
            api_key: "${BING_API_KEY}".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub provider: String,
    pub max_results: usize,
    pub bing: BingConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: "bing".to_string(),
            max_results: 10,
            bing: BingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("RANGO").separator("__"))
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${BING_API_KEY}
        app_config.server.host = expand_env(&app_config.server.host);
        app_config.database.path = expand_env(&app_config.database.path);
        app_config.search.bing.api_key = expand_env(&app_config.search.bing.api_key);

        for user in app_config.auth.users.iter_mut() {
            user.api_key = expand_env(&user.api_key);
            if user.api_key.is_empty() {
                warn!("User {} has an empty api_key and cannot log in", user.username);
            }
        }

        Ok(app_config)
    }
}

fn expand_env(val: &str) -> String {
    match val.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).unwrap_or_default(),
        None => val.to_string(),
    }
}
