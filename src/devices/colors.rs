//! Color name table.
//!
//! Maps canonical color names (lowercase, spaces removed) to 6-digit hex
//! codes stored uppercase without a leading `#`, and back.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

fn hex_code_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[0-9a-fA-F]{6}$").ok())
        .as_ref()
}

/// Returns true if `value` is exactly six hex digits.
pub fn is_hex_code(value: &str) -> bool {
    hex_code_pattern().is_some_and(|pattern| pattern.is_match(value))
}

/// Canonical form used for color-name lookups.
pub fn canonical_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

/// Bidirectional color name / hex code table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ColorTable {
    by_name: BTreeMap<String, String>,
    by_code: HashMap<String, String>,
}

impl ColorTable {
    /// Builds a table from `(name, code)` pairs. Codes may carry a `#`.
    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut table = Self::default();
        for (name, code) in pairs {
            table.insert(name.as_ref(), code.as_ref());
        }
        table
    }

    /// Builds a table from the public color-names document, which maps
    /// `"#rrggbb"` codes to display names.
    ///
    /// Entries are applied in code order: when several codes fold to the
    /// same name, the last one wins the name lookup.
    pub fn from_names_document(document: &BTreeMap<String, String>) -> Self {
        Self::from_pairs(document.iter().map(|(code, name)| (name, code)))
    }

    fn insert(&mut self, name: &str, code: &str) {
        let name = canonical_name(name);
        let code = code.trim_start_matches('#').to_uppercase();
        self.by_code.entry(code.clone()).or_insert_with(|| name.clone());
        self.by_name.insert(name, code);
    }

    /// Resolves user input to a hex code.
    ///
    /// Hex input passes through uppercased; names are looked up in canonical
    /// form. Unknown names resolve to an empty string.
    pub fn resolve(&self, input: &str) -> String {
        let name = canonical_name(input);
        if is_hex_code(&name) {
            return name.to_uppercase();
        }
        self.by_name.get(&name).cloned().unwrap_or_default()
    }

    /// Returns the canonical name for a hex code, if known.
    pub fn name_for(&self, code: &str) -> Option<&str> {
        let code = code.trim_start_matches('#').to_uppercase();
        self.by_code.get(&code).map(String::as_str)
    }

    /// Canonical names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl From<BTreeMap<String, String>> for ColorTable {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self::from_pairs(entries)
    }
}

impl From<ColorTable> for BTreeMap<String, String> {
    fn from(table: ColorTable) -> Self {
        table.by_name
    }
}
