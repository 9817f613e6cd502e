use std::path::Path;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::read_to_string;

/// The layout git uses for dates by default, e.g. `Mon Jan 3 10:00:00 2022 +0200`.
pub const DEFAULT_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

/// Options for turning a log into a [`Repository`](crate::repository::Repository).
///
/// ```toml
/// compute_annotated_lines = false
/// date_format = "%Y-%m-%d %H:%M:%S %z"
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Track per-line blame for every change.
    pub compute_annotated_lines: bool,

    /// A chrono format string for author and committer dates.
    pub date_format: String
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            compute_annotated_lines: true,
            date_format: DEFAULT_DATE_FORMAT.to_string()
        }
    }
}

impl TransformConfig {
    /// Same as the default, but without blame.
    pub fn without_blame() -> TransformConfig {
        TransformConfig {
            compute_annotated_lines: false,
            ..TransformConfig::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<TransformConfig> {
        toml::from_str(text).wrap_err("failed to parse transform config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<TransformConfig> {
        let text = read_to_string(&path)?;

        TransformConfig::from_toml_str(&text)
            .wrap_err_with(|| format!("in config file {}", path.as_ref().display()))
    }
}
