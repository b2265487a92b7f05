use actix_web::{http::header, HttpResponse};
use serde::Serialize;

/// A template name and the context it should be rendered with. HTML
/// rendering happens outside this service, so responses carry both as JSON.
#[derive(Debug, Serialize)]
pub struct Rendered {
    pub template: String,
    pub context: serde_json::Value,
}

pub fn render(template: &str, context: serde_json::Value) -> Rendered {
    Rendered {
        template: template.to_string(),
        context,
    }
}

pub fn redirect(target: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, target.to_string()))
        .finish()
}
