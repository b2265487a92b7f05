//! Validation for the category, page and profile submissions.
//!
//! Each form deserializes from an urlencoded body with every field optional,
//! so a missing field turns into a validation error instead of a 400.

use duckdb::Connection;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::db::service::DbService;

pub const MAX_NAME_LENGTH: usize = 128;
pub const MAX_URL_LENGTH: usize = 200;

static SLUG_STRIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid slug regex"));
static SLUG_HYPHENATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid slug regex"));

/// Folds `value` to ASCII, lowercases it, drops anything that is not a word
/// character, space or hyphen, and joins the remaining words with single
/// hyphens.
pub fn slugify(value: &str) -> String {
    let folded: String = value.nfkd().filter(char::is_ascii).collect();
    let lowered = folded.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lowered, "");
    let hyphenated = SLUG_HYPHENATE.replace_all(&stripped, "-");
    hyphenated.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Prefixes `http://` unless the url already names a scheme.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Field name to error messages.
pub type FormErrors = BTreeMap<String, Vec<String>>;

fn add_error(errors: &mut FormErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

fn check_length(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        add_error(
            errors,
            field,
            format!("Ensure this value has at most {} characters (it has {}).", max, len),
        );
    }
}

fn check_required(errors: &mut FormErrors, field: &str, value: &str) {
    if value.is_empty() {
        add_error(errors, field, "This field is required.");
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCategory {
    pub name: String,
}

impl CategoryForm {
    pub fn validate(&self, conn: &Connection) -> duckdb::Result<Result<ValidCategory, FormErrors>> {
        let name = self.name.trim();
        let mut errors = FormErrors::new();

        check_required(&mut errors, "name", name);
        check_length(&mut errors, "name", name, MAX_NAME_LENGTH);

        if errors.is_empty() {
            let slug = slugify(name);
            if slug.is_empty() {
                add_error(&mut errors, "name", "Enter a name containing letters or numbers.");
            } else if DbService::get_category_by_name(conn, name)?.is_some() {
                add_error(&mut errors, "name", "Category with this Name already exists.");
            } else if DbService::get_category_by_slug(conn, &slug)?.is_some() {
                add_error(&mut errors, "name", "Category with this Slug already exists.");
            }
        }

        if errors.is_empty() {
            Ok(Ok(ValidCategory {
                name: name.to_string(),
            }))
        } else {
            Ok(Err(errors))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPage {
    pub title: String,
    pub url: String,
}

impl PageForm {
    pub fn validate(&self) -> Result<ValidPage, FormErrors> {
        let title = self.title.trim();
        let url = self.url.trim();
        let mut errors = FormErrors::new();

        check_required(&mut errors, "title", title);
        check_length(&mut errors, "title", title, MAX_NAME_LENGTH);
        check_required(&mut errors, "url", url);

        let url = if url.is_empty() { String::new() } else { normalize_url(url) };
        check_length(&mut errors, "url", &url, MAX_URL_LENGTH);

        if errors.is_empty() {
            Ok(ValidPage {
                title: title.to_string(),
                url,
            })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileForm {
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub picture: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUserProfile {
    pub website: Option<String>,
    pub picture: Option<String>,
}

impl UserProfileForm {
    pub fn validate(&self) -> Result<ValidUserProfile, FormErrors> {
        let website = self.website.trim();
        let picture = self.picture.trim();
        let mut errors = FormErrors::new();

        let website = (!website.is_empty()).then(|| normalize_url(website));
        if let Some(ref w) = website {
            check_length(&mut errors, "website", w, MAX_URL_LENGTH);
        }

        if errors.is_empty() {
            Ok(ValidUserProfile {
                website,
                picture: (!picture.is_empty()).then(|| picture.to_string()),
            })
        } else {
            Err(errors)
        }
    }
}
