//! JSON settings for the command table.
//!
//! ```json
//! {
//!   "labeling_commands": ["\\label;1;false", "\\mylabel;2;true"],
//!   "bibliography_items": ["\\bibitem"],
//!   "label_references": ["\\ref"],
//!   "bibliography_references": ["\\cite"]
//! }
//! ```
//!
//! Every field is optional; a missing field keeps the default entries for
//! that role. A present field replaces them.

use crate::classify::{CommandTable, LabelingCommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the settings file.
    #[error("failed to read settings file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The settings are not valid JSON for [`Settings`].
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// A labeling command record that is not `name;position;bool`.
    #[error("invalid labeling command '{record}': {reason}")]
    InvalidLabelingCommand {
        /// The record as written.
        record: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An empty command name in one of the name lists.
    #[error("empty command name in {field}")]
    EmptyCommandName {
        /// The settings field holding it.
        field: &'static str,
    },
}

/// Settings as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// `name;position;labels_previous_command` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labeling_commands: Option<Vec<String>>,
    /// Label-defining commands whose keys are bibliography items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bibliography_items: Option<Vec<String>>,
    /// Label-referencing command names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_references: Option<Vec<String>>,
    /// Bibliography-referencing command names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bibliography_references: Option<Vec<String>>,
}

impl Settings {
    /// Parse settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| {
            warn!("rejected settings: {e}");
            ConfigError::Json(e)
        })
    }

    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("loading settings from {}", path.display());
        Self::from_json(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Settings that list every entry of `table` explicitly.
    pub fn from_table(table: &CommandTable) -> Self {
        let owned = |names: Vec<&str>| Some(names.into_iter().map(str::to_string).collect());
        Self {
            labeling_commands: Some(
                table
                    .labeling_commands()
                    .into_iter()
                    .map(ToString::to_string)
                    .collect(),
            ),
            bibliography_items: owned(table.bibliography_items()),
            label_references: owned(table.label_references()),
            bibliography_references: owned(table.bibliography_references()),
        }
    }

    /// Build the command table these settings describe.
    pub fn to_table(&self) -> Result<CommandTable, ConfigError> {
        let defaults = CommandTable::default();
        let mut table = CommandTable::empty();

        table = match &self.labeling_commands {
            Some(records) => records.iter().try_fold(table, |table, record| {
                let command = record.parse::<LabelingCommand>().map_err(|e| {
                    warn!("{e}");
                    e
                })?;
                Ok::<_, ConfigError>(table.with_labeling_command(command))
            })?,
            None => defaults
                .labeling_commands()
                .into_iter()
                .filter(|cmd| defaults.label_kind(&cmd.name) == texref_core::LabelKind::Label)
                .fold(table, |table, cmd| table.with_labeling_command(cmd.clone())),
        };

        let items = names("bibliography_items", self.bibliography_items.as_deref(), || {
            defaults.bibliography_items()
        })?;
        table = items
            .iter()
            .fold(table, |table, name| table.with_bibliography_item(name));

        let refs = names("label_references", self.label_references.as_deref(), || {
            defaults.label_references()
        })?;
        table = refs
            .iter()
            .fold(table, |table, name| table.with_label_reference(name));

        let cites = names(
            "bibliography_references",
            self.bibliography_references.as_deref(),
            || defaults.bibliography_references(),
        )?;
        table = cites
            .iter()
            .fold(table, |table, name| table.with_bibliography_reference(name));

        Ok(table)
    }
}

/// The configured names for one role, or the defaults if not configured.
fn names<'a>(
    field: &'static str,
    configured: Option<&'a [String]>,
    defaults: impl FnOnce() -> Vec<&'a str>,
) -> Result<Vec<&'a str>, ConfigError> {
    let Some(configured) = configured else {
        return Ok(defaults());
    };

    configured
        .iter()
        .map(|name| {
            let name = name.trim();
            if name.trim_start_matches('\\').is_empty() {
                warn!("empty command name in {field}");
                Err(ConfigError::EmptyCommandName { field })
            } else {
                Ok(name)
            }
        })
        .collect()
}
