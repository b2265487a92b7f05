use actix_web::{get, post, web, HttpRequest, HttpResponse, Result as WebResult};
use chrono::Local;
use duckdb::Connection;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::middleware::CurrentUser;
use crate::api::models::{FormContext, GotoQuery, LikeQuery, SearchForm};
use crate::api::render::{redirect, render};
use crate::api::tags;
use crate::config::{AppConfig, SessionConfig};
use crate::db::{lock, service::DbService, Category, DbPool};
use crate::error::RangoError;
use crate::forms::{CategoryForm, FormErrors, PageForm, UserProfileForm};
use crate::search::{self, SearchProvider, SearchResult};
use crate::session::visits::{visitor_cookie_handler, VisitState};
use crate::session::WebSession;

const TOP_N: usize = 5;
const BOLD_MESSAGE: &str = "Crunchy, creamy, cookie, candy, cupcake!";

type HandlerResult = Result<HttpResponse, RangoError>;

/// Runs the visit tracker against the request's session and saves the session.
fn track_visit(
    req: &HttpRequest,
    conn: &Connection,
    config: &SessionConfig,
) -> Result<(WebSession, VisitState), RangoError> {
    let mut session = WebSession::load(req, conn, config)?;
    let state = visitor_cookie_handler(&mut session, Local::now().naive_local())?;
    session.save(conn, config)?;
    Ok((session, state))
}

/// Search failures are logged and shown as an empty result list.
async fn run_search(provider: &dyn SearchProvider, query: &str) -> Vec<SearchResult> {
    match search::search(provider, query).await {
        Ok(results) => results,
        Err(e) => {
            error!("Search for {:?} failed: {}", query, e);
            Vec::new()
        }
    }
}

fn category_context(conn: &Connection, slug: &str) -> Result<serde_json::Value, RangoError> {
    let category_list = tags::get_category_list(conn, Some(slug))?;

    let context = match DbService::get_category_by_slug(conn, slug)? {
        Some(category) => {
            let pages = DbService::pages_for_category(conn, category.id)?;
            json!({ "category": category, "pages": pages, "category_list": category_list })
        }
        None => json!({ "category": null, "pages": null, "category_list": category_list }),
    };

    Ok(context)
}

// --- Directory ---

#[get("/")]
pub async fn index(req: HttpRequest, pool: web::Data<DbPool>, config: web::Data<AppConfig>) -> HandlerResult {
    let conn = lock(&pool)?;

    let categories = DbService::top_categories(&conn, TOP_N)?;
    let pages = DbService::top_pages(&conn, TOP_N)?;
    let category_list = tags::get_category_list(&conn, None)?;

    let (session, _) = track_visit(&req, &conn, &config.session)?;

    Ok(HttpResponse::Ok().cookie(session.cookie(&config.session)).json(render(
        "rango/index.html",
        json!({
            "boldmessage": BOLD_MESSAGE,
            "categories": categories,
            "pages": pages,
            "category_list": category_list,
        }),
    )))
}

#[get("/about")]
pub async fn about(req: HttpRequest, pool: web::Data<DbPool>, config: web::Data<AppConfig>) -> HandlerResult {
    let conn = lock(&pool)?;
    let (session, state) = track_visit(&req, &conn, &config.session)?;

    Ok(HttpResponse::Ok()
        .cookie(session.cookie(&config.session))
        .json(render("rango/about.html", json!({ "visits": state.visits }))))
}

#[get("/category/{slug}")]
pub async fn show_category(pool: web::Data<DbPool>, slug: web::Path<String>) -> HandlerResult {
    let conn = lock(&pool)?;
    let context = category_context(&conn, &slug)?;

    Ok(HttpResponse::Ok().json(render("rango/category.html", context)))
}

#[post("/category/{slug}")]
pub async fn search_in_category(
    pool: web::Data<DbPool>,
    provider: web::Data<Arc<dyn SearchProvider>>,
    slug: web::Path<String>,
    form: web::Form<SearchForm>,
) -> HandlerResult {
    let mut context = {
        let conn = lock(&pool)?;
        category_context(&conn, &slug)?
    };

    let query = form.query.trim().to_string();
    let result_list = run_search(provider.get_ref().as_ref(), &query).await;

    context["query"] = json!(query);
    context["result_list"] = json!(result_list);

    Ok(HttpResponse::Ok().json(render("rango/category.html", context)))
}

// --- Creating categories and pages ---

fn category_form_response(form: FormContext<CategoryForm>) -> HttpResponse {
    HttpResponse::Ok().json(render("rango/add_category.html", json!({ "form": form })))
}

#[get("/add_category")]
pub async fn add_category_form() -> HandlerResult {
    Ok(category_form_response(FormContext::blank(CategoryForm::default())))
}

#[post("/add_category")]
pub async fn add_category(pool: web::Data<DbPool>, form: web::Form<CategoryForm>) -> HandlerResult {
    let conn = lock(&pool)?;
    let form = form.into_inner();

    match form.validate(&conn)? {
        Ok(valid) => {
            let category = DbService::insert_category(&conn, &valid.name, 0, 0)?;
            info!("Created category {} ({})", category.name, category.slug);
            Ok(redirect("/"))
        }
        Err(errors) => {
            warn!("Invalid category form: {:?}", errors);
            Ok(category_form_response(FormContext::with_errors(form, errors)))
        }
    }
}

fn page_form_response(
    conn: &Connection,
    category: &Category,
    form: FormContext<PageForm>,
) -> HandlerResult {
    let page_list = tags::get_page_list(conn, category)?;

    Ok(HttpResponse::Ok().json(render(
        "rango/add_page.html",
        json!({ "form": form, "category": category, "pages": page_list.pages }),
    )))
}

#[get("/add_page/{slug}")]
pub async fn add_page_form(pool: web::Data<DbPool>, slug: web::Path<String>) -> HandlerResult {
    let conn = lock(&pool)?;

    // You cannot add a page to a category that does not exist.
    let Some(category) = DbService::get_category_by_slug(&conn, &slug)? else {
        return Ok(redirect("/"));
    };

    page_form_response(&conn, &category, FormContext::blank(PageForm::default()))
}

#[post("/add_page/{slug}")]
pub async fn add_page(pool: web::Data<DbPool>, slug: web::Path<String>, form: web::Form<PageForm>) -> HandlerResult {
    let conn = lock(&pool)?;

    let Some(category) = DbService::get_category_by_slug(&conn, &slug)? else {
        return Ok(redirect("/"));
    };

    let form = form.into_inner();
    match form.validate() {
        Ok(valid) => {
            let page = DbService::insert_page(&conn, category.id, &valid.title, &valid.url, 0)?;
            info!("Added page {} to category {}", page.title, category.slug);
            Ok(redirect(&format!("/category/{}", category.slug)))
        }
        Err(errors) => {
            warn!("Invalid page form: {:?}", errors);
            page_form_response(&conn, &category, FormContext::with_errors(form, errors))
        }
    }
}

#[get("/like_category")]
pub async fn like_category(pool: web::Data<DbPool>, query: web::Query<LikeQuery>) -> HandlerResult {
    let Some(id) = query.category_id.as_deref().and_then(|id| id.trim().parse::<i64>().ok()) else {
        return Ok(HttpResponse::BadRequest().body("Invalid category id"));
    };

    let conn = lock(&pool)?;
    match DbService::like_category(&conn, id)? {
        Some(category) => Ok(HttpResponse::Ok().body(category.likes.to_string())),
        None => Err(RangoError::NotFound(format!("category {}", id))),
    }
}

// --- Accounts ---

#[get("/restricted")]
pub async fn restricted(user: web::ReqData<CurrentUser>) -> HandlerResult {
    Ok(HttpResponse::Ok().json(render(
        "rango/restricted.html",
        json!({ "username": user.username }),
    )))
}

fn profile_form_response(user: &CurrentUser, form: FormContext<UserProfileForm>) -> HttpResponse {
    HttpResponse::Ok().json(render(
        "rango/profile_registration.html",
        json!({ "form": form, "username": user.username }),
    ))
}

#[get("/register_profile")]
pub async fn register_profile_form(user: web::ReqData<CurrentUser>) -> HandlerResult {
    Ok(profile_form_response(&user, FormContext::blank(UserProfileForm::default())))
}

#[post("/register_profile")]
pub async fn register_profile(
    pool: web::Data<DbPool>,
    user: web::ReqData<CurrentUser>,
    form: web::Form<UserProfileForm>,
) -> HandlerResult {
    let conn = lock(&pool)?;
    let form = form.into_inner();

    let mut result = form.validate();
    if result.is_ok() && DbService::get_user_profile(&conn, &user.username)?.is_some() {
        let mut errors = FormErrors::new();
        errors.insert("user".to_string(), vec!["User profile with this User already exists.".to_string()]);
        result = Err(errors);
    }

    match result {
        Ok(valid) => {
            DbService::insert_user_profile(&conn, &user.username, valid.website.as_deref(), valid.picture.as_deref())?;
            info!("Registered profile for {}", user.username);
            Ok(redirect("/"))
        }
        Err(errors) => {
            warn!("Invalid profile form: {:?}", errors);
            Ok(profile_form_response(&user, FormContext::with_errors(form, errors)))
        }
    }
}

// --- Search and redirects ---

#[get("/search")]
pub async fn search_form() -> HandlerResult {
    Ok(HttpResponse::Ok().json(render(
        "rango/search.html",
        json!({ "query": "", "result_list": Vec::<SearchResult>::new() }),
    )))
}

#[post("/search")]
pub async fn search_results(
    provider: web::Data<Arc<dyn SearchProvider>>,
    form: web::Form<SearchForm>,
) -> HandlerResult {
    let query = form.query.trim().to_string();
    let result_list = run_search(provider.get_ref().as_ref(), &query).await;

    Ok(HttpResponse::Ok().json(render(
        "rango/search.html",
        json!({ "query": query, "result_list": result_list }),
    )))
}

#[get("/goto")]
pub async fn goto_url(pool: web::Data<DbPool>, query: web::Query<GotoQuery>) -> HandlerResult {
    let Some(id) = query.page_id.as_deref().and_then(|id| id.trim().parse::<i64>().ok()) else {
        return Ok(redirect("/"));
    };

    let conn = lock(&pool)?;
    match DbService::increment_page_views(&conn, id)? {
        Some(page) => Ok(redirect(&page.url)),
        None => Ok(redirect("/")),
    }
}

#[post("/goto")]
pub async fn goto_post() -> HandlerResult {
    Ok(redirect("/"))
}

#[get("/health")]
pub async fn health() -> WebResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({"status": "healthy"})))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(about)
        .service(show_category)
        .service(search_in_category)
        .service(add_category_form)
        .service(add_category)
        .service(add_page_form)
        .service(add_page)
        .service(like_category)
        .service(restricted)
        .service(register_profile_form)
        .service(register_profile)
        .service(search_form)
        .service(search_results)
        .service(goto_url)
        .service(goto_post)
        .service(health);
}
