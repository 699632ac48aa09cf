//! Label collection.
//!
//! Walks the documents of a scope in order and turns every label-defining
//! node into a [`LabelOccurrence`]. Nodes whose key cannot be extracted are
//! skipped; collection itself never fails except by cancellation.

use crate::cancel::{CancellationToken, Cancelled};
use crate::classify::CommandTable;
use texref_core::{
    Document, FileId, KeySource, LabelKind, LabelOccurrence, Node, NodeRef, Project, Scope,
};
use tracing::debug;

/// Collect every label occurrence in `scope`.
///
/// Occurrences come in scope order, then document order within a file.
pub fn collect_labels(
    project: &Project,
    scope: Scope,
    table: &CommandTable,
    token: &CancellationToken,
) -> Result<Vec<LabelOccurrence>, Cancelled> {
    let mut labels = Vec::new();

    for file in project.files_in(scope) {
        token.check()?;
        if let Some(document) = project.get(file) {
            collect_document(file, document, table, &mut labels);
        }
    }

    debug!(count = labels.len(), ?scope, "collected labels");
    Ok(labels)
}

/// Collect the occurrences defining `key`.
pub fn find_labels(
    project: &Project,
    scope: Scope,
    table: &CommandTable,
    key: &str,
    token: &CancellationToken,
) -> Result<Vec<LabelOccurrence>, Cancelled> {
    let mut labels = collect_labels(project, scope, table, token)?;
    labels.retain(|label| label.key == key);
    Ok(labels)
}

fn collect_document(
    file: FileId,
    document: &Document,
    table: &CommandTable,
    labels: &mut Vec<LabelOccurrence>,
) {
    let file_name = document.name();
    // Index of the most recent command node, for labels of the previous command.
    let mut previous_command = None;

    for (index, node) in document.nodes().iter().enumerate() {
        let found = match node {
            Node::Command(cmd) => {
                let labeled = previous_command;
                previous_command = Some(index);

                table.labeling_command(&cmd.name).and_then(|record| {
                    let key = cmd.extract_key(record.position)?;
                    let labeled = if record.labels_previous_command {
                        labeled.map(|i| NodeRef::new(file, i))
                    } else {
                        None
                    };
                    Some((key, table.label_kind(&cmd.name), labeled))
                })
            }
            Node::BibEntry(entry) => entry
                .extract_key(1)
                .map(|key| (key, LabelKind::BibEntry, None)),
        };

        if let Some((key, kind, labeled)) = found {
            labels.push(LabelOccurrence {
                key: key.to_string(),
                kind,
                source: NodeRef::new(file, index),
                file_name: file_name.clone(),
                line: document.line_of(node.text_offset()),
                labeled,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::Revision;
    use crate::classify::LabelingCommand;

    fn project_of(files: &[(&str, &str)]) -> Project {
        let mut project = Project::new();
        for (path, source) in files {
            project.add_document(texref_parser::parse(*path, *source).document);
        }
        project
    }

    fn keys(labels: &[LabelOccurrence]) -> Vec<&str> {
        labels.iter().map(|l| l.key.as_str()).collect()
    }

    fn collect(project: &Project, scope: Scope, table: &CommandTable) -> Vec<LabelOccurrence> {
        collect_labels(project, scope, table, &CancellationToken::never()).unwrap()
    }

    #[test]
    fn test_collects_label_commands_in_order() {
        let project = project_of(&[(
            "main.tex",
            "\\section{A}\\label{sec:a}\n\\ref{sec:a}\n\\label{sec:b}\n",
        )]);
        let labels = collect(&project, Scope::Project, &CommandTable::default());

        assert_eq!(keys(&labels), vec!["sec:a", "sec:b"]);
        assert_eq!(labels[0].line, 1);
        assert_eq!(labels[1].line, 3);
        assert_eq!(labels[0].file_name, "main.tex");
        assert_eq!(labels[0].kind, LabelKind::Label);
        assert_eq!(labels[0].source, NodeRef::new(FileId(0), 1));
    }

    #[test]
    fn test_bibtex_entry_and_bibitem() {
        let project = project_of(&[
            ("refs.bib", "@article{smith2020,\n  title = {T}\n}\n"),
            ("main.tex", "\\begin{thebibliography}{9}\n\\bibitem{smith2020} Smith.\n"),
        ]);
        let labels = collect(&project, Scope::Project, &CommandTable::default());

        assert_eq!(keys(&labels), vec!["smith2020", "smith2020"]);
        assert_eq!(labels[0].kind, LabelKind::BibEntry);
        assert_eq!(labels[0].provenance(), "refs.bib:1");
        assert_eq!(labels[1].kind, LabelKind::BibItem);
        assert_eq!(labels[1].provenance(), "main.tex:2");
    }

    #[test]
    fn test_unextractable_keys_skipped() {
        let project = project_of(&[
            ("main.tex", "\\label{} \\label{  } \\label \\label{ok}"),
            ("refs.bib", "@misc{}\n@misc{ , note = {x}}\n"),
        ]);
        let labels = collect(&project, Scope::Project, &CommandTable::default());
        assert_eq!(keys(&labels), vec!["ok"]);
    }

    #[test]
    fn test_key_is_trimmed() {
        let project = project_of(&[("main.tex", "\\label{ fig:1 }")]);
        let labels = collect(&project, Scope::Project, &CommandTable::default());
        assert_eq!(keys(&labels), vec!["fig:1"]);
    }

    #[test]
    fn test_configured_position() {
        let table = CommandTable::empty()
            .with_labeling_command(LabelingCommand::new(r"\newtheorem", 2, false));
        let project = project_of(&[("main.tex", "\\newtheorem{thm}{Theorem}")]);
        let labels = collect(&project, Scope::Project, &table);
        assert_eq!(keys(&labels), vec!["Theorem"]);
    }

    #[test]
    fn test_out_of_range_position_yields_nothing() {
        let table = CommandTable::empty()
            .with_labeling_command(LabelingCommand::new(r"\label", 5, false))
            .with_labeling_command(LabelingCommand::new(r"\tag", 0, false));
        let project = project_of(&[("main.tex", "\\label{a} \\tag{b}")]);
        assert!(collect(&project, Scope::Project, &table).is_empty());
    }

    #[test]
    fn test_labels_previous_command() {
        let table = CommandTable::empty()
            .with_labeling_command(LabelingCommand::new(r"\label", 1, true));
        let project = project_of(&[("main.tex", "\\label{first}\n\\section{Intro}\n\\label{sec:intro}")]);
        let labels = collect(&project, Scope::Project, &table);

        assert_eq!(labels[0].labeled, None);
        assert_eq!(labels[1].labeled, Some(NodeRef::new(FileId(0), 1)));
        let labeled = project.node(labels[1].labeled.unwrap()).unwrap();
        assert_eq!(labeled.as_command().unwrap().name, r"\section");
    }

    #[test]
    fn test_labeled_not_recorded_when_not_configured() {
        let project = project_of(&[("main.tex", "\\section{Intro}\\label{sec:intro}")]);
        let labels = collect(&project, Scope::Project, &CommandTable::default());
        assert_eq!(labels[0].labeled, None);
    }

    #[test]
    fn test_scopes() {
        let mut project = project_of(&[
            ("main.tex", "\\input{a}\\label{main}"),
            ("a.tex", "\\label{a}"),
            ("other.tex", "\\label{other}"),
        ]);
        project.add_include(FileId(0), FileId(1));
        let table = CommandTable::default();

        assert_eq!(keys(&collect(&project, Scope::File(FileId(0)), &table)), vec!["main"]);
        assert_eq!(
            keys(&collect(&project, Scope::IncludeClosure(FileId(0)), &table)),
            vec!["main", "a"]
        );
        assert_eq!(
            keys(&collect(&project, Scope::Project, &table)),
            vec!["main", "a", "other"]
        );
        assert!(collect(&project, Scope::File(FileId(9)), &table).is_empty());
    }

    #[test]
    fn test_collection_is_idempotent() {
        let project = project_of(&[
            ("main.tex", "\\label{a}\\label{b}\\bibitem{c}"),
            ("refs.bib", "@book{d, title={x}}"),
        ]);
        let table = CommandTable::default();
        assert_eq!(
            collect(&project, Scope::Project, &table),
            collect(&project, Scope::Project, &table)
        );
    }

    #[test]
    fn test_find_labels() {
        let project = project_of(&[("main.tex", "\\label{a}\\label{b}\\label{a}")]);
        let found = find_labels(
            &project,
            Scope::Project,
            &CommandTable::default(),
            "a",
            &CancellationToken::never(),
        )
        .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|l| l.key == "a"));
    }

    #[test]
    fn test_cancelled_collection() {
        let project = project_of(&[("main.tex", "\\label{a}")]);
        let revision = Revision::new();
        let token = revision.token();
        revision.bump();

        let result = collect_labels(&project, Scope::Project, &CommandTable::default(), &token);
        assert_eq!(result, Err(Cancelled));
    }
}
