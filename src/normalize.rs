//! The `normalize` command: header canonicalization, optional schema projection,
//! rename resolution, strict validation and value cleaning.
//!
//! The pipeline is pure: [`NormalizeOptions`] is built once from flags (and an
//! optional profile), [`NormalizePlan::build`] analyses the header row, and
//! [`NormalizePlan::project`] maps each data row. Only [`execute`] performs I/O.

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    cli::NormalizeArgs,
    config::NormalizeProfile,
    error::IngestError,
    headers::HeaderIndex,
    io_utils::{self, Table},
    projection::{SourceIndex, parse_schema, parse_schema_parts, project_row, validate_strict},
    rename::{RenameMap, apply_renames},
};

/// Immutable settings for one normalization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    renames: RenameMap,
    schema: Option<Vec<String>>,
    strict: bool,
}

impl NormalizeOptions {
    pub fn new(renames: RenameMap, schema: Option<Vec<String>>, strict: bool) -> Self {
        NormalizeOptions {
            renames,
            schema,
            strict,
        }
    }

    /// Parses the raw `map` and `schema` flag values.
    pub fn parse(
        map: Option<&str>,
        schema: Option<&str>,
        strict: bool,
    ) -> crate::error::Result<Self> {
        let renames = match map {
            Some(raw) => RenameMap::parse(raw)?,
            None => RenameMap::default(),
        };
        let schema = schema.map(parse_schema).transpose()?;
        Ok(NormalizeOptions::new(renames, schema, strict))
    }

    /// Combines command-line flags with a profile; a flag that is present
    /// replaces the profile's value for that setting.
    pub fn resolve(
        args: &NormalizeArgs,
        profile: Option<&NormalizeProfile>,
    ) -> crate::error::Result<Self> {
        let renames = match (&args.map, profile) {
            (Some(raw), _) => RenameMap::parse(raw)?,
            (None, Some(profile)) => RenameMap::from_pairs(
                profile
                    .rename
                    .iter()
                    .map(|(source, target)| (source.as_str(), target.as_str())),
            )?,
            (None, None) => RenameMap::default(),
        };
        let schema = match (&args.schema, profile) {
            (Some(raw), _) => Some(parse_schema(raw)?),
            (None, Some(profile)) if !profile.schema.is_empty() => {
                let schema = parse_schema_parts(&profile.schema);
                if schema.is_empty() {
                    return Err(IngestError::EmptySchema {
                        raw: profile.schema.join(","),
                    });
                }
                Some(schema)
            }
            _ => None,
        };
        let strict = args.strict || profile.is_some_and(|p| p.strict);
        Ok(NormalizeOptions::new(renames, schema, strict))
    }

    pub fn renames(&self) -> &RenameMap {
        &self.renames
    }

    pub fn schema(&self) -> Option<&[String]> {
        self.schema.as_deref()
    }

    pub fn strict(&self) -> bool {
        self.strict
    }
}

/// Header analysis for one input file, reused for every data row.
#[derive(Debug, Clone)]
pub struct NormalizePlan {
    input: HeaderIndex,
    output_headers: Vec<String>,
    sources: SourceIndex,
}

impl NormalizePlan {
    /// Fails only when strict mode finds schema columns without a source.
    pub fn build(
        raw_headers: &[String],
        options: &NormalizeOptions,
    ) -> crate::error::Result<Self> {
        let input = HeaderIndex::from_raw(raw_headers);
        let output_headers = match options.schema() {
            Some(schema) => schema.to_vec(),
            None => apply_renames(input.names(), options.renames()),
        };
        let sources = SourceIndex::build(&input, options.renames());
        if options.strict()
            && let Some(schema) = options.schema()
        {
            validate_strict(schema, &sources)?;
        }
        Ok(NormalizePlan {
            input,
            output_headers,
            sources,
        })
    }

    pub fn input(&self) -> &HeaderIndex {
        &self.input
    }

    pub fn output_headers(&self) -> &[String] {
        &self.output_headers
    }

    pub fn sources(&self) -> &SourceIndex {
        &self.sources
    }

    /// Output columns that will always be empty.
    pub fn unresolved(&self) -> Vec<&str> {
        self.sources.missing(&self.output_headers)
    }

    pub fn project(&self, row: &[String]) -> Vec<String> {
        project_row(&self.output_headers, &self.sources, row)
    }

    fn log_hazards(&self) {
        for collision in self.sources.collisions() {
            warn!(
                "Input column '{}' (position {}) also maps to '{}', already supplied by position {}; its values are dropped",
                collision.input,
                collision.dropped_position + 1,
                collision.output,
                collision.kept_position + 1
            );
        }
        let unresolved = self.unresolved();
        if !unresolved.is_empty() {
            warn!(
                "No input column supplies {}; output will be empty there",
                unresolved.iter().map(|name| format!("'{name}'")).join(", ")
            );
        }
    }
}

/// Normalizes a whole in-memory table whose first row is the header.
pub fn normalize_table(
    rows: &[Vec<String>],
    options: &NormalizeOptions,
) -> crate::error::Result<Table> {
    let Some((header, data)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    let plan = NormalizePlan::build(header, options)?;
    Ok(project_all(&plan, data))
}

fn project_all(plan: &NormalizePlan, data: &[Vec<String>]) -> Table {
    let mut table = Vec::with_capacity(data.len() + 1);
    table.push(plan.output_headers().to_vec());
    table.extend(data.iter().map(|row| plan.project(row)));
    table
}

pub fn execute(args: &NormalizeArgs) -> Result<()> {
    let profile = args
        .config
        .as_deref()
        .map(NormalizeProfile::load)
        .transpose()
        .with_context(|| format!("Loading normalization profile {:?}", args.config))?;
    let options = NormalizeOptions::resolve(args, profile.as_ref())?;
    if options.strict() && options.schema().is_none() {
        warn!("--strict has no effect without --schema");
    }
    debug!("Rename pairs: {:?}", options.renames().pairs());
    debug!("Schema: {:?}", options.schema());

    let output = args
        .out
        .clone()
        .or_else(|| profile.as_ref().and_then(|p| p.out.clone()))
        .unwrap_or_else(|| io_utils::default_output_path(&args.input));
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Normalizing '{}' -> '{}' (delimiter '{}')",
        args.input.display(),
        output.display(),
        crate::printable_delimiter(delimiter)
    );

    let rows = io_utils::read_all_rows(&args.input, delimiter, encoding)
        .with_context(|| format!("Reading rows from {:?}", args.input))?;
    if rows.len() < 2 {
        return Err(IngestError::TooFewRows {
            path: args.input.clone(),
            found: rows.len(),
        }
        .into());
    }

    let plan = NormalizePlan::build(&rows[0], &options)
        .with_context(|| format!("Resolving output columns for {:?}", args.input))?;
    debug!(
        "Input headers {:?} -> output headers {:?}",
        plan.input().names(),
        plan.output_headers()
    );
    plan.log_hazards();

    let table = project_all(&plan, &rows[1..]);
    io_utils::write_all_rows(&output, delimiter, &table)
        .with_context(|| format!("Writing normalized output to {output:?}"))?;

    info!(
        "Normalized {} row(s) across {} column(s) -> {:?} (delimiter '{}')",
        table.len() - 1,
        plan.output_headers().len(),
        output,
        crate::printable_delimiter(delimiter)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> NormalizeArgs {
        NormalizeArgs {
            input: PathBuf::from("in.csv"),
            out: None,
            strict: false,
            schema: None,
            map: None,
            config: None,
            delimiter: None,
            input_encoding: None,
        }
    }

    #[test]
    fn flags_replace_profile_values() {
        let profile = NormalizeProfile {
            schema: vec!["id".into(), "total".into()],
            rename: [("amount".to_string(), "total".to_string())].into(),
            strict: true,
            out: None,
        };
        let mut args = args();
        args.map = Some("cost=total".into());

        let options = NormalizeOptions::resolve(&args, Some(&profile)).expect("resolve");
        assert_eq!(options.renames().pairs(), vec![("cost", "total")]);
        assert_eq!(options.schema(), Some(&["id".to_string(), "total".to_string()][..]));
        assert!(options.strict());
    }

    #[test]
    fn blank_profile_schema_is_an_error() {
        let profile = NormalizeProfile {
            schema: vec![" ".into(), "__".into()],
            ..NormalizeProfile::default()
        };
        let err = NormalizeOptions::resolve(&args(), Some(&profile)).expect_err("empty schema");
        assert!(matches!(err, IngestError::EmptySchema { .. }));
    }
}
