//! Context fragments shared by several templates: the category sidebar and
//! the page list of a category.

use duckdb::{Connection, Result as DbResult};
use serde::Serialize;

use crate::db::{service::DbService, Category, Page};

#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
    pub current_category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageList {
    pub pages: Vec<Page>,
}

pub fn get_category_list(conn: &Connection, current_category: Option<&str>) -> DbResult<CategoryList> {
    Ok(CategoryList {
        categories: DbService::list_categories(conn)?,
        current_category: current_category.map(str::to_string),
    })
}

pub fn get_page_list(conn: &Connection, category: &Category) -> DbResult<PageList> {
    Ok(PageList {
        pages: DbService::list_pages(conn, category.id)?,
    })
}
