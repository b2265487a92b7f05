use crate::db::models::{Category, Page, UserProfile};
use crate::forms::slugify;
use duckdb::types::Type;
use duckdb::{params, Connection, Error as DbError, Result as DbResult, Row};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = "id, name, slug, views, likes";
const PAGE_COLUMNS: &str = "id, category_id, title, url, views";

fn no_rows<T>(e: DbError) -> DbResult<Option<T>> {
    match e {
        DbError::QueryReturnedNoRows => Ok(None),
        e => Err(e),
    }
}

pub struct DbService;

impl DbService {
    fn row_to_category(row: &Row) -> DbResult<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            views: row.get(3)?,
            likes: row.get(4)?,
        })
    }

    fn row_to_page(row: &Row) -> DbResult<Page> {
        Ok(Page {
            id: row.get(0)?,
            category_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            views: row.get(4)?,
        })
    }

    fn query_categories(conn: &Connection, sql: &str, args: &[&dyn duckdb::ToSql]) -> DbResult<Vec<Category>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, Self::row_to_category)?;
        rows.collect()
    }

    fn query_pages(conn: &Connection, sql: &str, args: &[&dyn duckdb::ToSql]) -> DbResult<Vec<Page>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, Self::row_to_page)?;
        rows.collect()
    }

    // --- Category Operations ---

    pub fn top_categories(conn: &Connection, limit: usize) -> DbResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY likes DESC, id ASC LIMIT ?");
        Self::query_categories(conn, &sql, params![limit as i64])
    }

    pub fn list_categories(conn: &Connection) -> DbResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id ASC");
        Self::query_categories(conn, &sql, params![])
    }

    pub fn get_category(conn: &Connection, id: i64) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?");
        conn.query_row(&sql, params![id], Self::row_to_category).map(Some).or_else(no_rows)
    }

    pub fn get_category_by_slug(conn: &Connection, slug: &str) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = ?");
        conn.query_row(&sql, params![slug], Self::row_to_category).map(Some).or_else(no_rows)
    }

    pub fn get_category_by_name(conn: &Connection, name: &str) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?");
        conn.query_row(&sql, params![name], Self::row_to_category).map(Some).or_else(no_rows)
    }

    pub fn insert_category(conn: &Connection, name: &str, views: i64, likes: i64) -> DbResult<Category> {
        let sql = format!(
            "INSERT INTO categories (name, slug, views, likes) VALUES (?, ?, ?, ?) RETURNING {CATEGORY_COLUMNS}"
        );
        conn.query_row(&sql, params![name, slugify(name), views, likes], Self::row_to_category)
    }

    pub fn get_or_create_category(conn: &Connection, name: &str, views: i64, likes: i64) -> DbResult<(Category, bool)> {
        match Self::get_category_by_name(conn, name)? {
            Some(category) => Ok((category, false)),
            None => Ok((Self::insert_category(conn, name, views, likes)?, true)),
        }
    }

    pub fn like_category(conn: &Connection, id: i64) -> DbResult<Option<Category>> {
        let sql = format!("UPDATE categories SET likes = likes + 1 WHERE id = ? RETURNING {CATEGORY_COLUMNS}");
        conn.query_row(&sql, params![id], Self::row_to_category).map(Some).or_else(no_rows)
    }

    // --- Page Operations ---

    pub fn top_pages(conn: &Connection, limit: usize) -> DbResult<Vec<Page>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages ORDER BY views DESC, id ASC LIMIT ?");
        Self::query_pages(conn, &sql, params![limit as i64])
    }

    pub fn pages_for_category(conn: &Connection, category_id: i64) -> DbResult<Vec<Page>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE category_id = ? ORDER BY views DESC, id ASC");
        Self::query_pages(conn, &sql, params![category_id])
    }

    /// Pages of a category in insertion order, as the page-list tag shows them.
    pub fn list_pages(conn: &Connection, category_id: i64) -> DbResult<Vec<Page>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE category_id = ? ORDER BY id ASC");
        Self::query_pages(conn, &sql, params![category_id])
    }

    pub fn get_page(conn: &Connection, id: i64) -> DbResult<Option<Page>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = ?");
        conn.query_row(&sql, params![id], Self::row_to_page).map(Some).or_else(no_rows)
    }

    pub fn insert_page(conn: &Connection, category_id: i64, title: &str, url: &str, views: i64) -> DbResult<Page> {
        let sql = format!(
            "INSERT INTO pages (category_id, title, url, views) VALUES (?, ?, ?, ?) RETURNING {PAGE_COLUMNS}"
        );
        conn.query_row(&sql, params![category_id, title, url, views], Self::row_to_page)
    }

    pub fn get_or_create_page(
        conn: &Connection,
        category_id: i64,
        title: &str,
        url: &str,
        views: i64,
    ) -> DbResult<(Page, bool)> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE category_id = ? AND title = ?");
        let existing = conn
            .query_row(&sql, params![category_id, title], Self::row_to_page)
            .map(Some)
            .or_else(no_rows)?;

        match existing {
            Some(page) => Ok((page, false)),
            None => Ok((Self::insert_page(conn, category_id, title, url, views)?, true)),
        }
    }

    /// Bumps the view counter and returns the updated page, or `None` if no page has this id.
    pub fn increment_page_views(conn: &Connection, id: i64) -> DbResult<Option<Page>> {
        let sql = format!("UPDATE pages SET views = views + 1 WHERE id = ? RETURNING {PAGE_COLUMNS}");
        conn.query_row(&sql, params![id], Self::row_to_page).map(Some).or_else(no_rows)
    }

    // --- User Profile Operations ---

    pub fn get_user_profile(conn: &Connection, username: &str) -> DbResult<Option<UserProfile>> {
        conn.query_row(
            "SELECT username, website, picture FROM user_profiles WHERE username = ?",
            params![username],
            |row| {
                Ok(UserProfile {
                    username: row.get(0)?,
                    website: row.get(1)?,
                    picture: row.get(2)?,
                })
            },
        )
        .map(Some)
        .or_else(no_rows)
    }

    pub fn insert_user_profile(
        conn: &Connection,
        username: &str,
        website: Option<&str>,
        picture: Option<&str>,
    ) -> DbResult<UserProfile> {
        conn.execute(
            "INSERT INTO user_profiles (username, website, picture) VALUES (?, ?, ?)",
            params![username, website, picture],
        )?;

        Ok(UserProfile {
            username: username.to_string(),
            website: website.map(str::to_string),
            picture: picture.map(str::to_string),
        })
    }

    // --- Session Operations ---

    /// Loads the data of a session that has not expired at `now` (unix seconds).
    /// Data that does not decode to a string map is an error; the row is kept.
    pub fn load_session(conn: &Connection, id: Uuid, now: i64) -> DbResult<Option<HashMap<String, String>>> {
        conn.query_row(
            "SELECT data FROM web_sessions WHERE id = ? AND expires_at > ?",
            params![id.to_string(), now],
            |row| {
                let data: String = row.get(0)?;
                serde_json::from_str(&data).map_err(|e| {
                    warn!("Session {} holds undecodable data: {}", id, e);
                    DbError::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                })
            },
        )
        .map(Some)
        .or_else(no_rows)
    }

    pub fn save_session(
        conn: &Connection,
        id: Uuid,
        data: &HashMap<String, String>,
        expires_at: i64,
    ) -> DbResult<()> {
        let data = serde_json::to_string(data).map_err(|e| DbError::ToSqlConversionFailure(Box::new(e)))?;

        conn.execute(
            "INSERT INTO web_sessions (id, data, expires_at) VALUES (?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET data = excluded.data, expires_at = excluded.expires_at",
            params![id.to_string(), data, expires_at],
        )?;
        Ok(())
    }

    pub fn delete_expired_sessions(conn: &Connection, now: i64) -> DbResult<usize> {
        conn.execute("DELETE FROM web_sessions WHERE expires_at <= ?", params![now])
    }
}
