pub mod visits;

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use duckdb::{Connection, Result as DbResult};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::db::service::DbService;

/// String key/value storage scoped to one client.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// A session that lives only as long as the value, for tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    data: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: values.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.data.insert(key.to_string(), value);
    }
}

/// The session of the current HTTP request, persisted in the `web_sessions` table
/// and addressed by the session cookie.
#[derive(Debug, Clone)]
pub struct WebSession {
    id: Uuid,
    data: HashMap<String, String>,
}

impl WebSession {
    /// Loads the session named by the request cookie. A missing, malformed or
    /// expired cookie starts a fresh session with a new id.
    pub fn load(req: &HttpRequest, conn: &Connection, config: &SessionConfig) -> DbResult<Self> {
        let cookie_id = req
            .cookie(&config.cookie_name)
            .and_then(|c| Uuid::parse_str(c.value()).ok());

        if let Some(id) = cookie_id {
            if let Some(data) = DbService::load_session(conn, id, Utc::now().timestamp())? {
                return Ok(Self { id, data });
            }
            debug!("Session {} expired or unknown, starting a new one", id);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            data: HashMap::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Persists the data and pushes the expiry `max_age_days` into the future.
    pub fn save(&self, conn: &Connection, config: &SessionConfig) -> DbResult<()> {
        let expires_at = Utc::now() + Duration::days(config.max_age_days);
        DbService::save_session(conn, self.id, &self.data, expires_at.timestamp())
    }

    pub fn cookie(&self, config: &SessionConfig) -> Cookie<'static> {
        Cookie::build(config.cookie_name.clone(), self.id.to_string())
            .path("/")
            .http_only(true)
            .secure(config.secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::days(config.max_age_days))
            .finish()
    }
}

impl SessionStore for WebSession {
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.data.insert(key.to_string(), value);
    }
}
