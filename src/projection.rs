//! Schema parsing, output-to-input column resolution, strict validation and
//! row projection.

use std::collections::HashMap;

use crate::{
    error::{IngestError, Result},
    headers::{HeaderIndex, dedupe_names},
    rename::RenameMap,
    transform::string_ops::{canonical_form, clean_value},
};

/// Parses a comma-separated schema into canonical, unique output headers.
pub fn parse_schema(raw: &str) -> Result<Vec<String>> {
    let schema = parse_schema_parts(raw.split(','));
    if schema.is_empty() {
        return Err(IngestError::EmptySchema {
            raw: raw.to_string(),
        });
    }
    Ok(schema)
}

/// Canonicalizes each part, drops blanks and deduplicates in original order.
pub fn parse_schema_parts<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dedupe_names(
        parts
            .into_iter()
            .map(|part| canonical_form(part.as_ref()))
            .filter(|name| !name.is_empty()),
    )
}

/// An input column whose output name was already claimed by an earlier column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub input: String,
    pub output: String,
    pub kept_position: usize,
    pub dropped_position: usize,
}

/// Output header name to the position of the input column that supplies it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceIndex {
    sources: HashMap<String, usize>,
    collisions: Vec<Collision>,
}

impl SourceIndex {
    /// Walks input headers left to right; the first column landing on an output
    /// name owns it and later ones are recorded as collisions.
    pub fn build(input: &HeaderIndex, renames: &RenameMap) -> Self {
        let mut index = SourceIndex::default();
        for name in input.names() {
            let Some(position) = input.position(name) else {
                continue;
            };
            let output = renames.resolve(name);
            match index.sources.get(output) {
                Some(&kept_position) => index.collisions.push(Collision {
                    input: name.clone(),
                    output: output.to_string(),
                    kept_position,
                    dropped_position: position,
                }),
                None => {
                    index.sources.insert(output.to_string(), position);
                }
            }
        }
        index
    }

    pub fn get(&self, output: &str) -> Option<usize> {
        self.sources.get(output).copied()
    }

    pub fn contains(&self, output: &str) -> bool {
        self.sources.contains_key(output)
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Output headers with no source column, in the given order.
    pub fn missing<'a>(&self, headers: &'a [String]) -> Vec<&'a str> {
        headers
            .iter()
            .filter(|name| !self.contains(name))
            .map(String::as_str)
            .collect()
    }
}

/// Fails with every schema column that has no source, in schema order.
pub fn validate_strict(schema: &[String], sources: &SourceIndex) -> Result<()> {
    let missing = sources.missing(schema);
    if missing.is_empty() {
        return Ok(());
    }
    Err(IngestError::StrictSource {
        missing: missing.into_iter().map(str::to_string).collect(),
    })
}

/// Builds one output row. Unresolved columns and positions past the end of a
/// short row yield an empty string.
pub fn project_row(headers: &[String], sources: &SourceIndex, row: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|name| {
            sources
                .get(name)
                .and_then(|position| row.get(position))
                .map(|value| clean_value(value).into_owned())
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> HeaderIndex {
        HeaderIndex::from_raw(&names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn collisions_report_both_positions() {
        let renames = RenameMap::parse("a=x,b=x").expect("parse");
        let index = SourceIndex::build(&headers(&["a", "b"]), &renames);
        assert_eq!(
            index.collisions(),
            &[Collision {
                input: "b".to_string(),
                output: "x".to_string(),
                kept_position: 0,
                dropped_position: 1,
            }]
        );
    }

    #[test]
    fn blank_schema_parts_are_dropped() {
        assert_eq!(parse_schema_parts([" ", "Id", "", "id"]), vec!["id", "id_2"]);
    }
}
