//! Command classification.
//!
//! A [`CommandTable`] maps command names to their [`CommandRole`]. The
//! [`Classifier`] holds the current table behind a lock and hands out
//! immutable snapshots; updates swap the whole table, so a reader never sees
//! a half-applied configuration.

use crate::settings::ConfigError;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use texref_core::{CommandRole, LabelKind};

const DEFAULT_LABEL_REFERENCES: &[&str] = &[
    r"\ref",
    r"\eqref",
    r"\pageref",
    r"\nameref",
    r"\autoref",
    r"\autopageref",
    r"\vref",
    r"\Vref",
    r"\fullref",
    r"\cref",
    r"\Cref",
    r"\cpageref",
    r"\Cpageref",
    r"\labelcref",
    r"\crefrange",
    r"\Crefrange",
];

const DEFAULT_BIBLIOGRAPHY_REFERENCES: &[&str] = &[
    r"\cite",
    r"\cite*",
    r"\nocite",
    r"\citep",
    r"\citep*",
    r"\citet",
    r"\citet*",
    r"\Citep",
    r"\Citet",
    r"\citeauthor",
    r"\citeauthor*",
    r"\Citeauthor",
    r"\citeyear",
    r"\citeyearpar",
    r"\parencite",
    r"\Parencite",
    r"\footcite",
    r"\textcite",
    r"\Textcite",
    r"\autocite",
    r"\Autocite",
    r"\citetitle",
    r"\fullcite",
    r"\supercite",
];

/// Add the leading backslash if missing.
pub fn normalize_name(name: &str) -> Cow<'_, str> {
    if name.starts_with('\\') {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\\{name}"))
    }
}

/// A label-defining command and where its key lives.
///
/// The text form is `name;position;labels_previous_command`, for example
/// `\label;1;false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelingCommand {
    /// Command name, with its backslash.
    pub name: String,
    /// 1-based required parameter holding the key.
    pub position: usize,
    /// Whether the label names the command that precedes it
    /// (`\section{Intro}\label{sec:intro}`).
    pub labels_previous_command: bool,
}

impl LabelingCommand {
    /// Create a record. The name is normalized to start with a backslash.
    pub fn new(name: &str, position: usize, labels_previous_command: bool) -> Self {
        Self {
            name: normalize_name(name).into_owned(),
            position,
            labels_previous_command,
        }
    }
}

impl fmt::Display for LabelingCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{}",
            self.name, self.position, self.labels_previous_command
        )
    }
}

impl FromStr for LabelingCommand {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidLabelingCommand {
            record: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.split(';').collect();
        let [name, position, previous] = parts.as_slice() else {
            return Err(invalid("expected three ';'-separated parts"));
        };

        let name = name.trim();
        if name.trim_start_matches('\\').is_empty() {
            return Err(invalid("empty command name"));
        }
        let position = position
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid("position is not a non-negative integer"))?;
        let labels_previous_command = previous.trim().eq_ignore_ascii_case("true");

        Ok(Self::new(name, position, labels_previous_command))
    }
}

/// Command name to role mapping.
///
/// A name listed in several roles classifies as label-defining first, then
/// label-referencing, then bibliography-referencing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    labeling: HashMap<String, LabelingCommand>,
    bibliography_items: HashSet<String>,
    label_references: HashSet<String>,
    bibliography_references: HashSet<String>,
}

impl CommandTable {
    /// A table that classifies every command as [`CommandRole::None`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            labeling: HashMap::new(),
            bibliography_items: HashSet::new(),
            label_references: HashSet::new(),
            bibliography_references: HashSet::new(),
        }
    }

    /// Add or replace a label-defining command.
    #[must_use]
    pub fn with_labeling_command(mut self, command: LabelingCommand) -> Self {
        self.labeling.insert(command.name.clone(), command);
        self
    }

    /// Mark a command as a bibliography item (`\bibitem`). Its keys are
    /// offered to `\cite`-like commands. Adds a `name;1;false` record if the
    /// command is not label-defining yet.
    #[must_use]
    pub fn with_bibliography_item(mut self, name: &str) -> Self {
        let name = normalize_name(name).into_owned();
        self.labeling
            .entry(name.clone())
            .or_insert_with(|| LabelingCommand::new(&name, 1, false));
        self.bibliography_items.insert(name);
        self
    }

    /// Add a label-referencing command.
    #[must_use]
    pub fn with_label_reference(mut self, name: &str) -> Self {
        self.label_references
            .insert(normalize_name(name).into_owned());
        self
    }

    /// Add a bibliography-referencing command.
    #[must_use]
    pub fn with_bibliography_reference(mut self, name: &str) -> Self {
        self.bibliography_references
            .insert(normalize_name(name).into_owned());
        self
    }

    /// The role of a command. Unknown names are [`CommandRole::None`].
    pub fn classify(&self, name: &str) -> CommandRole {
        let name = normalize_name(name);
        let name = name.as_ref();
        if self.labeling.contains_key(name) {
            CommandRole::LabelDefining
        } else if self.label_references.contains(name) {
            CommandRole::LabelReferencing
        } else if self.bibliography_references.contains(name) {
            CommandRole::BibliographyReferencing
        } else {
            CommandRole::None
        }
    }

    /// The 1-based parameter holding the key of a label-defining command.
    pub fn key_parameter_index(&self, name: &str) -> Option<usize> {
        self.labeling_command(name).map(|cmd| cmd.position)
    }

    /// The record of a label-defining command.
    pub fn labeling_command(&self, name: &str) -> Option<&LabelingCommand> {
        self.labeling.get(normalize_name(name).as_ref())
    }

    /// Kind of the labels a label-defining command produces.
    pub fn label_kind(&self, name: &str) -> LabelKind {
        if self.bibliography_items.contains(normalize_name(name).as_ref()) {
            LabelKind::BibItem
        } else {
            LabelKind::Label
        }
    }

    /// Label-defining records, sorted by name.
    pub fn labeling_commands(&self) -> Vec<&LabelingCommand> {
        let mut commands: Vec<_> = self.labeling.values().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    /// Bibliography item names, sorted.
    pub fn bibliography_items(&self) -> Vec<&str> {
        sorted(&self.bibliography_items)
    }

    /// Label-referencing names, sorted.
    pub fn label_references(&self) -> Vec<&str> {
        sorted(&self.label_references)
    }

    /// Bibliography-referencing names, sorted.
    pub fn bibliography_references(&self) -> Vec<&str> {
        sorted(&self.bibliography_references)
    }
}

fn sorted(names: &HashSet<String>) -> Vec<&str> {
    let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
    names.sort_unstable();
    names
}

impl Default for CommandTable {
    /// `\label` and `\bibitem` define keys; the usual `\ref` and `\cite`
    /// families (including cleveref, natbib and biblatex) look them up.
    fn default() -> Self {
        let table = Self::empty()
            .with_labeling_command(LabelingCommand::new(r"\label", 1, false))
            .with_bibliography_item(r"\bibitem");
        let table = DEFAULT_LABEL_REFERENCES
            .iter()
            .fold(table, |t, name| t.with_label_reference(name));
        DEFAULT_BIBLIOGRAPHY_REFERENCES
            .iter()
            .fold(table, |t, name| t.with_bibliography_reference(name))
    }
}

/// Holds the current [`CommandTable`].
#[derive(Debug, Default)]
pub struct Classifier {
    table: RwLock<Arc<CommandTable>>,
}

impl Classifier {
    /// Create a classifier with the given table.
    pub fn new(table: CommandTable) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// The current table. Later [`replace`](Self::replace) calls do not
    /// affect a snapshot already taken.
    pub fn snapshot(&self) -> Arc<CommandTable> {
        Arc::clone(&*self.table.read())
    }

    /// Swap in a new table, returning the previous one.
    pub fn replace(&self, table: CommandTable) -> Arc<CommandTable> {
        std::mem::replace(&mut *self.table.write(), Arc::new(table))
    }

    /// Classify against the current table.
    pub fn classify(&self, name: &str) -> CommandRole {
        self.snapshot().classify(name)
    }

    /// Key parameter index against the current table.
    pub fn key_parameter_index(&self, name: &str) -> Option<usize> {
        self.snapshot().key_parameter_index(name)
    }
}

/// The process-wide classifier, starting from the default table.
pub fn global() -> &'static Classifier {
    static GLOBAL: OnceLock<Classifier> = OnceLock::new();
    GLOBAL.get_or_init(Classifier::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roles() {
        let table = CommandTable::default();
        assert_eq!(table.classify(r"\label"), CommandRole::LabelDefining);
        assert_eq!(table.classify(r"\bibitem"), CommandRole::LabelDefining);
        assert_eq!(table.classify(r"\ref"), CommandRole::LabelReferencing);
        assert_eq!(table.classify(r"\Cref"), CommandRole::LabelReferencing);
        assert_eq!(table.classify(r"\cite"), CommandRole::BibliographyReferencing);
        assert_eq!(table.classify(r"\citep*"), CommandRole::BibliographyReferencing);
        assert_eq!(table.classify(r"\section"), CommandRole::None);
    }

    #[test]
    fn test_lookup_without_backslash() {
        let table = CommandTable::default();
        assert_eq!(table.classify("ref"), CommandRole::LabelReferencing);
        assert_eq!(table.key_parameter_index("label"), Some(1));
    }

    #[test]
    fn test_key_parameter_index() {
        let table = CommandTable::default()
            .with_labeling_command(LabelingCommand::new(r"\mylabel", 2, true));
        assert_eq!(table.key_parameter_index(r"\mylabel"), Some(2));
        assert_eq!(table.key_parameter_index(r"\ref"), None);
    }

    #[test]
    fn test_label_kind() {
        let table = CommandTable::default();
        assert_eq!(table.label_kind(r"\label"), LabelKind::Label);
        assert_eq!(table.label_kind(r"\bibitem"), LabelKind::BibItem);
    }

    #[test]
    fn test_labeling_command_text_form() {
        let cmd: LabelingCommand = r"\label;1;false".parse().unwrap();
        assert_eq!(cmd, LabelingCommand::new(r"\label", 1, false));
        assert_eq!(cmd.to_string(), r"\label;1;false");

        let cmd: LabelingCommand = r"\mylabel;2;TRUE".parse().unwrap();
        assert!(cmd.labels_previous_command);
        assert_eq!(cmd.to_string(), r"\mylabel;2;true");
    }

    #[test]
    fn test_labeling_command_text_form_normalizes_name() {
        let cmd: LabelingCommand = "label;1;false".parse().unwrap();
        assert_eq!(cmd.name, r"\label");
    }

    #[test]
    fn test_labeling_command_third_part_defaults_to_false() {
        let cmd: LabelingCommand = r"\label;1;yes".parse().unwrap();
        assert!(!cmd.labels_previous_command);
    }

    #[test]
    fn test_labeling_command_rejects_malformed() {
        for bad in [
            r"\label",
            r"\label;1",
            r"\label;1;false;extra",
            r"\label;one;false",
            r"\label;-1;false",
            r";1;false",
            r"\;1;false",
        ] {
            let err = bad.parse::<LabelingCommand>().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidLabelingCommand { ref record, .. } if record == bad),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn test_precedence_when_listed_twice() {
        let table = CommandTable::empty()
            .with_label_reference(r"\weird")
            .with_bibliography_reference(r"\weird");
        assert_eq!(table.classify(r"\weird"), CommandRole::LabelReferencing);
    }

    #[test]
    fn test_empty_table() {
        let table = CommandTable::empty();
        assert_eq!(table.classify(r"\label"), CommandRole::None);
        assert!(table.labeling_commands().is_empty());
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let classifier = Classifier::default();
        let before = classifier.snapshot();

        let old = classifier.replace(CommandTable::empty());
        assert_eq!(*old, *before);
        assert_eq!(before.classify(r"\label"), CommandRole::LabelDefining);
        assert_eq!(classifier.classify(r"\label"), CommandRole::None);
        assert_eq!(classifier.key_parameter_index(r"\label"), None);
    }

    #[test]
    fn test_concurrent_readers_see_whole_tables() {
        let classifier = Arc::new(Classifier::default());
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let classifier = Arc::clone(&classifier);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let table = classifier.snapshot();
                        // Either table is fine; a mix of the two is not.
                        let label = table.classify(r"\label");
                        let reference = table.classify(r"\ref");
                        assert_eq!(
                            label == CommandRole::LabelDefining,
                            reference == CommandRole::LabelReferencing
                        );
                    }
                })
            })
            .collect();

        for i in 0..50 {
            if i % 2 == 0 {
                classifier.replace(CommandTable::empty());
            } else {
                classifier.replace(CommandTable::default());
            }
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_global_defaults() {
        assert_eq!(global().snapshot().classify(r"\eqref"), CommandRole::LabelReferencing);
    }
}
