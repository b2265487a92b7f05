use serde::{Deserialize, Serialize};

use crate::forms::FormErrors;

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GotoQuery {
    pub page_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LikeQuery {
    pub category_id: Option<String>,
}

/// What a form template gets: the submitted values and any errors.
#[derive(Debug, Serialize)]
pub struct FormContext<T: Serialize> {
    #[serde(flatten)]
    pub values: T,
    pub errors: FormErrors,
}

impl<T: Serialize> FormContext<T> {
    pub fn blank(values: T) -> Self {
        Self {
            values,
            errors: FormErrors::new(),
        }
    }

    pub fn with_errors(values: T, errors: FormErrors) -> Self {
        Self { values, errors }
    }
}
