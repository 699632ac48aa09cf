//! Include commands found in LaTeX documents.

use texref_core::{CommandNode, Document, DocumentKind};

/// Commands that pull another file into the project, with the extension
/// assumed when the target has none.
const INCLUDE_COMMANDS: &[(&str, &str)] = &[
    (r"\input", "tex"),
    (r"\include", "tex"),
    (r"\subfile", "tex"),
    (r"\bibliography", "bib"),
    (r"\addbibresource", "bib"),
];

/// Commands whose argument is a comma-separated list of files.
const LIST_COMMANDS: &[&str] = &[r"\bibliography"];

/// A file named by an include command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeTarget {
    /// The include command, with its backslash.
    pub command: String,
    /// The target as written, with the default extension appended if it had none.
    pub path: String,
    /// Node index of the include command.
    pub node: usize,
}

/// Every include target of a document, in document order.
///
/// BibTeX files never include anything.
pub fn includes_in(document: &Document) -> Vec<IncludeTarget> {
    if document.kind() == DocumentKind::Bibtex {
        return Vec::new();
    }

    document
        .commands()
        .flat_map(|(index, cmd)| targets_of(index, cmd))
        .collect()
}

fn targets_of(index: usize, cmd: &CommandNode) -> Vec<IncludeTarget> {
    let Some(&(_, extension)) = INCLUDE_COMMANDS.iter().find(|(name, _)| *name == cmd.name) else {
        return Vec::new();
    };
    let Some(param) = cmd.required_parameter(1) else {
        return Vec::new();
    };

    let values: Vec<&str> = if LIST_COMMANDS.contains(&cmd.name.as_str()) {
        param.value.split(',').collect()
    } else {
        vec![param.value.as_str()]
    };

    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| IncludeTarget {
            command: cmd.name.clone(),
            path: with_default_extension(v, extension),
            node: index,
        })
        .collect()
}

fn with_default_extension(target: &str, extension: &str) -> String {
    let has_extension = std::path::Path::new(target)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if has_extension {
        target.to_string()
    } else {
        format!("{target}.{extension}")
    }
}
