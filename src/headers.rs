//! Header canonicalization, deduplication, and the input header index.
//!
//! Every header read from a file passes through [`canonicalize_header`] and then
//! [`dedupe_names`], so the names held by a [`HeaderIndex`] are always unique and
//! stable across runs.

use std::collections::{HashMap, HashSet};

use crate::transform::string_ops::canonical_form;

/// Placeholder used when a header canonicalizes to nothing.
pub const EMPTY_HEADER_PLACEHOLDER: &str = "column";

/// Lowercases, treats underscores as spaces, collapses whitespace and trims.
/// Blank results become [`EMPTY_HEADER_PLACEHOLDER`].
pub fn canonicalize_header(raw: &str) -> String {
    let canonical = canonical_form(raw);
    if canonical.is_empty() {
        EMPTY_HEADER_PLACEHOLDER.to_string()
    } else {
        canonical
    }
}

/// Makes names unique left to right. The first occurrence keeps its name; the
/// Nth occurrence becomes `<name>_N`, skipping any suffix that is already taken.
pub fn dedupe_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for name in names {
        let name = name.into();
        let seen = occurrences.entry(name.clone()).or_insert(0);
        *seen += 1;
        let resolved = if *seen == 1 && !taken.contains(&name) {
            name
        } else {
            let mut suffix = (*seen).max(2);
            let mut candidate = format!("{name}_{suffix}");
            while taken.contains(&candidate) {
                suffix += 1;
                candidate = format!("{name}_{suffix}");
            }
            *seen = suffix;
            candidate
        };
        taken.insert(resolved.clone());
        unique.push(resolved);
    }
    unique
}

/// Normalized, deduplicated input headers and their positions in the source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_raw(raw_headers: &[String]) -> Self {
        let names = dedupe_names(raw_headers.iter().map(|h| canonicalize_header(h)));
        let positions = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        HeaderIndex { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}
