// src/app/table/i18n.rs
// Localization lookup used for every user-visible string the controller produces.

use serde_json::{json, Value};
use std::collections::HashMap;

/// `_(msgid)` lookup provided by the host.
pub trait Translator {
    fn gettext(&self, msgid: &str) -> String;
}

/// Message catalog loaded from the table description; unknown ids fall through untranslated.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl Translator for Catalog {
    fn gettext(&self, msgid: &str) -> String {
        self.entries
            .get(msgid)
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }
}

/// Translates `msgid` and substitutes `{name}` placeholders.
pub fn tr(translator: &dyn Translator, msgid: &str, args: &[(&str, &str)]) -> String {
    let mut text = translator.gettext(msgid);
    for (name, value) in args {
        text = text.replace(&format!("{{{}}}", name), value);
    }
    text
}

/// Localized pagination labels in the grid's `langs` layout.
pub fn pagination_labels(translator: &dyn Translator) -> Value {
    let t = |s: &str| translator.gettext(s);
    json!({
        "default": {
            "pagination": {
                "page_size": t("Page Size"),
                "page_title": t("Show Page"),
                "first": t("First"),
                "first_title": t("First Page"),
                "last": t("Last"),
                "last_title": t("Last Page"),
                "prev": t("Prev"),
                "prev_title": t("Prev Page"),
                "next": t("Next"),
                "next_title": t("Next Page"),
                "all": t("All"),
                "counter": {
                    "showing": t("Showing"),
                    "of": t("of"),
                    "rows": t("rows"),
                    "pages": t("pages"),
                }
            }
        }
    })
}
