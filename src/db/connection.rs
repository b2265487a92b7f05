use crate::config::DatabaseConfig;
use duckdb::{Connection, Result as DbResult};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::error::RangoError;

pub type DbPool = Arc<Mutex<Connection>>;

const SCHEMA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS seq_categories_id;
CREATE SEQUENCE IF NOT EXISTS seq_pages_id;

CREATE TABLE IF NOT EXISTS categories (
    id BIGINT PRIMARY KEY DEFAULT nextval('seq_categories_id'),
    name VARCHAR NOT NULL UNIQUE,
    slug VARCHAR NOT NULL UNIQUE,
    views BIGINT NOT NULL DEFAULT 0,
    likes BIGINT NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS pages (
    id BIGINT PRIMARY KEY DEFAULT nextval('seq_pages_id'),
    category_id BIGINT NOT NULL,
    title VARCHAR NOT NULL,
    url VARCHAR NOT NULL,
    views BIGINT NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_pages_category ON pages(category_id);

CREATE TABLE IF NOT EXISTS user_profiles (
    username VARCHAR PRIMARY KEY,
    website VARCHAR,
    picture VARCHAR
);

CREATE TABLE IF NOT EXISTS web_sessions (
    id VARCHAR PRIMARY KEY,
    data VARCHAR NOT NULL DEFAULT '{}',
    expires_at BIGINT NOT NULL
);
"#;

pub fn get_connection(config: &DatabaseConfig) -> DbResult<DbPool> {
    info!("Connecting to DuckDB at {}", config.path);
    let conn = if config.path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(&config.path)?
    };

    init_schema(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}

pub fn init_schema(conn: &Connection) -> DbResult<()> {
    info!("Initializing database schema");
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn lock(pool: &DbPool) -> Result<MutexGuard<'_, Connection>, RangoError> {
    pool.lock().map_err(|_| RangoError::LockPoisoned)
}
