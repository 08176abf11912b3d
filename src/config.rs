//! Normalization profiles loaded from YAML.
//!
//! A profile carries the same settings as the `normalize` flags so repeated
//! clean-ups of the same export do not need long command lines:
//!
//! ```yaml
//! schema: [id, date, amount]
//! rename:
//!   txn date: date
//! strict: true
//! out: cleaned.csv
//! ```

use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeProfile {
    #[serde(default)]
    pub schema: Vec<String>,
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub out: Option<PathBuf>,
}

impl NormalizeProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| IngestError::InputAccess {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| IngestError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(path: &Path, yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|source| IngestError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
