// src/app/table/csrf.rs
// Resolves the CSRF token from the page meta tags: `csrf_field_name` names the tag that
// holds the token.

use std::collections::HashMap;

/// Header every POST to the ajax endpoint carries.
pub const CSRF_HEADER: &str = "X-CSRFToken";

const FIELD_NAME_META: &str = "csrf_field_name";

/// `<meta name=... content=...>` pairs of the table page.
#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    entries: HashMap<String, String>,
}

impl PageMeta {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn content(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn csrf_token(&self) -> Option<String> {
        let field_name = self.content(FIELD_NAME_META)?;
        self.content(field_name).map(str::to_string)
    }
}
