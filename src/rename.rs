//! Parsing of `input=output` rename lists and their application to headers.

use std::collections::HashMap;

use log::warn;

use crate::{
    error::{IngestError, Result},
    headers::dedupe_names,
    transform::string_ops::canonical_form,
};

/// Canonical input header name to canonical output header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    entries: HashMap<String, String>,
}

impl RenameMap {
    /// Parses a comma-separated `input=output` list. Blank input yields an empty map.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut map = RenameMap::default();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (source, target) =
                entry
                    .split_once('=')
                    .ok_or_else(|| IngestError::MalformedRename {
                        entry: entry.to_string(),
                        reason: "expected input=output".to_string(),
                    })?;
            map.insert_pair(entry, source, target)?;
        }
        Ok(map)
    }

    /// Builds a map from already separated pairs, e.g. a profile's `rename` table.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = RenameMap::default();
        for (source, target) in pairs {
            let entry = format!("{source}={target}");
            map.insert_pair(&entry, source, target)?;
        }
        Ok(map)
    }

    fn insert_pair(&mut self, entry: &str, source: &str, target: &str) -> Result<()> {
        let source = canonical_form(source);
        let target = canonical_form(target);
        if source.is_empty() {
            return Err(IngestError::MalformedRename {
                entry: entry.to_string(),
                reason: "input column name is empty".to_string(),
            });
        }
        if target.is_empty() {
            return Err(IngestError::MalformedRename {
                entry: entry.to_string(),
                reason: "output column name is empty".to_string(),
            });
        }
        if let Some(previous) = self.entries.insert(source.clone(), target.clone()) {
            warn!("Rename for '{source}' given twice; using '{target}' instead of '{previous}'");
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Output name for an input header: its rename when one exists, else itself.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Pairs sorted by input name.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<Vec<_>>();
        pairs.sort_unstable();
        pairs
    }
}

/// Renames headers through `map` and deduplicates the result, since renames may
/// collide with each other or with headers left untouched.
pub fn apply_renames(headers: &[String], map: &RenameMap) -> Vec<String> {
    dedupe_names(headers.iter().map(|h| map.resolve(h).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_happens_on_first_equals_only() {
        let map = RenameMap::parse("a=b=c").expect("parse");
        assert_eq!(map.get("a"), Some("b=c"));
    }

    #[test]
    fn later_entry_wins_for_duplicate_keys() {
        let map = RenameMap::parse("a=x, A=y").expect("parse");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Some("y"));
    }

    #[test]
    fn pairs_are_sorted_by_input() {
        let map = RenameMap::parse("b=2,a=1").expect("parse");
        assert_eq!(map.pairs(), vec![("a", "1"), ("b", "2")]);
    }
}
