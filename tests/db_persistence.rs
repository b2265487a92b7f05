#[cfg(test)]
mod tests {
    use rango::cli::populate;
    use rango::db::connection;
    use rango::db::service::DbService;
    use std::collections::HashMap;
    use uuid::Uuid;

    // In memory database just for tests
    fn get_test_db() -> duckdb::Connection {
        let conn = duckdb::Connection::open_in_memory().unwrap();
        connection::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_category_lifecycle() {
        let conn = get_test_db();

        // 1. Insert Category
        let category = DbService::insert_category(&conn, "Other Frameworks", 0, 0).unwrap();
        assert_eq!(category.name, "Other Frameworks");
        assert_eq!(category.slug, "other-frameworks");
        assert_eq!(category.likes, 0);

        // 2. Lookups
        let by_slug = DbService::get_category_by_slug(&conn, "other-frameworks").unwrap().unwrap();
        assert_eq!(by_slug.id, category.id);
        let by_name = DbService::get_category_by_name(&conn, "Other Frameworks").unwrap().unwrap();
        assert_eq!(by_name.id, category.id);
        let by_id = DbService::get_category(&conn, category.id).unwrap().unwrap();
        assert_eq!(by_id.slug, "other-frameworks");
        assert!(DbService::get_category_by_slug(&conn, "missing").unwrap().is_none());

        // 3. Likes
        let liked = DbService::like_category(&conn, category.id).unwrap().unwrap();
        assert_eq!(liked.likes, 1);
        assert!(DbService::like_category(&conn, category.id + 100).unwrap().is_none());

        // 4. Names are unique
        assert!(DbService::insert_category(&conn, "Other Frameworks", 0, 0).is_err());
    }

    #[test]
    fn test_top_categories_orders_by_likes() {
        let conn = get_test_db();
        DbService::insert_category(&conn, "Low", 0, 1).unwrap();
        DbService::insert_category(&conn, "High", 0, 50).unwrap();
        DbService::insert_category(&conn, "Mid", 0, 10).unwrap();

        let top = DbService::top_categories(&conn, 2).unwrap();
        let names: Vec<_> = top.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid"]);
    }

    #[test]
    fn test_page_lifecycle() {
        let conn = get_test_db();
        let category = DbService::insert_category(&conn, "Python", 0, 0).unwrap();

        // 1. Insert Pages
        let tutorial = DbService::insert_page(&conn, category.id, "Tutorial", "http://docs.python.org/", 3).unwrap();
        let book = DbService::insert_page(&conn, category.id, "Book", "http://greenteapress.com/", 10).unwrap();
        assert_eq!(tutorial.category_id, category.id);

        // 2. Pages by views
        let pages = DbService::pages_for_category(&conn, category.id).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].id, book.id);
        assert_eq!(pages[1].id, tutorial.id);

        // 3. Insertion order for the page list tag
        let listed = DbService::list_pages(&conn, category.id).unwrap();
        assert_eq!(listed[0].id, tutorial.id);

        // 4. View counter
        let bumped = DbService::increment_page_views(&conn, tutorial.id).unwrap().unwrap();
        assert_eq!(bumped.views, 4);
        let fetched = DbService::get_page(&conn, tutorial.id).unwrap().unwrap();
        assert_eq!(fetched.views, 4);
        assert!(DbService::increment_page_views(&conn, 9999).unwrap().is_none());
    }

    #[test]
    fn test_top_pages_spans_categories() {
        let conn = get_test_db();
        let a = DbService::insert_category(&conn, "A", 0, 0).unwrap();
        let b = DbService::insert_category(&conn, "B", 0, 0).unwrap();
        DbService::insert_page(&conn, a.id, "a1", "http://a1", 1).unwrap();
        DbService::insert_page(&conn, b.id, "b1", "http://b1", 7).unwrap();
        DbService::insert_page(&conn, a.id, "a2", "http://a2", 5).unwrap();

        let top = DbService::top_pages(&conn, 5).unwrap();
        let titles: Vec<_> = top.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["b1", "a2", "a1"]);
    }

    #[test]
    fn test_populate_is_idempotent() {
        let conn = get_test_db();

        let first = populate(&conn).unwrap();
        let second = populate(&conn).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(DbService::list_categories(&conn).unwrap().len(), 3);
        assert_eq!(first[0].0.id, second[0].0.id);

        let python = DbService::get_category_by_slug(&conn, "python").unwrap().unwrap();
        assert_eq!(python.likes, 64);
        assert_eq!(DbService::pages_for_category(&conn, python.id).unwrap().len(), 3);
    }

    #[test]
    fn test_user_profiles() {
        let conn = get_test_db();
        assert!(DbService::get_user_profile(&conn, "leifos").unwrap().is_none());

        DbService::insert_user_profile(&conn, "leifos", Some("http://www.leifos.com"), None).unwrap();

        let profile = DbService::get_user_profile(&conn, "leifos").unwrap().unwrap();
        assert_eq!(profile.website.as_deref(), Some("http://www.leifos.com"));
        assert_eq!(profile.picture, None);
        assert!(DbService::insert_user_profile(&conn, "leifos", None, None).is_err());
    }

    #[test]
    fn test_session_round_trip_and_expiry() {
        let conn = get_test_db();
        let id = Uuid::new_v4();
        let mut data = HashMap::new();
        data.insert("visits".to_string(), "3".to_string());

        DbService::save_session(&conn, id, &data, 1_000).unwrap();
        assert_eq!(DbService::load_session(&conn, id, 999).unwrap(), Some(data.clone()));

        // Saving again replaces the data
        data.insert("visits".to_string(), "4".to_string());
        DbService::save_session(&conn, id, &data, 2_000).unwrap();
        let loaded = DbService::load_session(&conn, id, 1_500).unwrap().unwrap();
        assert_eq!(loaded["visits"], "4");

        // Expired sessions are invisible and can be swept
        assert!(DbService::load_session(&conn, id, 2_000).unwrap().is_none());
        assert_eq!(DbService::delete_expired_sessions(&conn, 2_500).unwrap(), 1);
        assert!(DbService::load_session(&conn, id, 0).unwrap().is_none());
    }

    #[test]
    fn test_undecodable_session_data_is_an_error() {
        let conn = get_test_db();
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO web_sessions (id, data, expires_at) VALUES (?, ?, ?)",
            duckdb::params![id.to_string(), r#"{"visits": 7}"#, 1_000],
        )
        .unwrap();

        assert!(DbService::load_session(&conn, id, 0).is_err());

        // The row is left alone
        let data: String = conn
            .query_row(
                "SELECT data FROM web_sessions WHERE id = ?",
                duckdb::params![id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(data, r#"{"visits": 7}"#);
    }
}
