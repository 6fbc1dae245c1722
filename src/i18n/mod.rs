//! Render-time lookup of UI strings.
//!
//! Keys are dotted paths into per-language JSON tables (`"admin.users.title"`).
//! Lookup falls back from the active language to the reference language and
//! finally to the key itself, so a missing string is visible but never fatal.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const EN_TABLE: &str = include_str!("locales/en.json");
const PT_TABLE: &str = include_str!("locales/pt.json");

static BUNDLED: Lazy<Translator> = Lazy::new(Translator::bundled);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pt,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Pt];

    /// The language every other table falls back to.
    pub const REFERENCE: Language = Language::En;

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Pt => "pt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Pt => "Português",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "pt" | "pt-br" => Some(Language::Pt),
            _ => None,
        }
    }
}

/// A named `{placeholder}` substitution.
pub type Param<'a> = (&'a str, &'a str);

#[derive(Clone, Debug, Default)]
pub struct Translator {
    tables: HashMap<Language, Value>,
}

impl Translator {
    /// Tables compiled into the binary.
    pub fn bundled() -> Self {
        let mut translator = Self::default();
        for (language, raw) in [(Language::En, EN_TABLE), (Language::Pt, PT_TABLE)] {
            match serde_json::from_str(raw) {
                Ok(table) => {
                    translator.tables.insert(language, table);
                }
                Err(err) => {
                    tracing::error!(language = language.code(), %err, "bundled translation table is invalid");
                }
            }
        }
        translator
    }

    pub fn with_table(mut self, language: Language, table: Value) -> Self {
        self.tables.insert(language, table);
        self
    }

    /// Resolves `key` for `language`. Unresolvable keys come back unchanged.
    pub fn resolve(&self, language: Language, key: &str, params: &[Param<'_>]) -> String {
        let found = self
            .lookup(language, key)
            .or_else(|| self.lookup(Language::REFERENCE, key));

        match found {
            Some(template) => interpolate(template, params),
            None => key.to_string(),
        }
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        let mut node = self.tables.get(&language)?;
        for segment in key.split('.') {
            node = node.get(segment)?;
        }
        // A key naming a subtree is not a string and does not resolve.
        node.as_str()
    }
}

/// Literal `{name}` replacement; unknown placeholders are left as written.
/// Inserted values are never rescanned.
fn interpolate(template: &str, params: &[Param<'_>]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let token = after
            .find('}')
            .map(|close| &after[..close])
            .and_then(|name| {
                params
                    .iter()
                    .find(|(param, _)| *param == name)
                    .map(|(_, value)| (name.len(), *value))
            });
        match token {
            Some((len, value)) => {
                out.push_str(value);
                rest = &after[len + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Shorthand over the bundled tables.
pub fn t(language: Language, key: &str) -> String {
    BUNDLED.resolve(language, key, &[])
}

pub fn t_with(language: Language, key: &str, params: &[Param<'_>]) -> String {
    BUNDLED.resolve(language, key, params)
}
