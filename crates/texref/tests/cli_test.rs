//! End-to-end tests for the command-line tools.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use tempfile::TempDir;
use texref::cmd::{check, complete, labels, resolve};

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// A small thesis: one chapter, a bibliography, one undefined reference,
/// one undefined citation and one duplicate label.
fn thesis() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let main = write(
        dir.path(),
        "thesis.tex",
        "\\documentclass{book}\n\
         \\begin{document}\n\
         \\input{chapters/intro}\n\
         See \\ref{sec:intro} and \\ref{sec:missing}.\n\
         Cited \\cite{knuth84, nobody}.\n\
         \\bibliography{refs}\n\
         \\end{document}\n",
    );
    write(
        dir.path(),
        "chapters/intro.tex",
        "\\chapter{Intro}\\label{sec:intro}\n\\label{sec:intro}\n",
    );
    write(dir.path(), "refs.bib", "@book{knuth84,\n  title = {The TeXbook}\n}\n");
    (dir, main)
}

fn output<F>(run: F) -> (ExitCode, String)
where
    F: FnOnce(&mut Vec<u8>) -> anyhow::Result<ExitCode>,
{
    let mut out = Vec::new();
    let code = run(&mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

/// `ExitCode` has no `PartialEq` on older toolchains.
fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(expected)));
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_labels_text() {
    let (_dir, main) = thesis();
    let args = labels::Args::try_parse_from(["texref-labels", &arg(&main)]).unwrap();
    let (code, text) = output(|out| labels::run(&args, out));

    assert_exit(code, 0);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3, "{text}");
    assert!(lines[0].starts_with("sec:intro"));
    assert!(lines[0].ends_with("intro.tex:1"));
    assert!(lines[1].ends_with("intro.tex:2"));
    assert!(lines[2].contains("entry"));
    assert!(lines[2].ends_with("refs.bib:1"));
}

#[test]
fn test_labels_json_bibliography_only() {
    let (_dir, main) = thesis();
    let args = labels::Args::try_parse_from([
        "texref-labels",
        &arg(&main),
        "--bibliography",
        "--format",
        "json",
    ])
    .unwrap();
    let (_, text) = output(|out| labels::run(&args, out));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["key"], "knuth84");
    assert_eq!(json[0]["kind"], "BibEntry");
    assert_eq!(json[0]["file"], "refs.bib");
}

#[test]
fn test_labels_file_scope() {
    let (_dir, main) = thesis();
    let args =
        labels::Args::try_parse_from(["texref-labels", &arg(&main), "--scope", "file"]).unwrap();
    let (_, text) = output(|out| labels::run(&args, out));
    assert!(text.is_empty(), "{text}");
}

#[test]
fn test_resolve_reports_each_key() {
    let (_dir, main) = thesis();
    let args = resolve::Args::try_parse_from(["texref-resolve", &arg(&main)]).unwrap();
    let (code, text) = output(|out| resolve::run(&args, out));

    assert_exit(code, 1);
    assert!(text.contains("\\ref{sec:intro} -> ambiguous: intro.tex:1, intro.tex:2"), "{text}");
    assert!(text.contains("\\ref{sec:missing} -> unresolved"), "{text}");
    assert!(text.contains("\\cite{knuth84} -> refs.bib:1"), "{text}");
    assert!(text.contains("\\cite{nobody} -> unresolved"), "{text}");
    assert!(text.contains("thesis.tex:4:"), "{text}");
}

#[test]
fn test_resolve_at_position() {
    let (dir, main) = thesis();
    let args = resolve::Args::try_parse_from([
        "texref-resolve",
        &arg(&main),
        "--focus",
        &arg(&dir.path().join("thesis.tex")),
        "--at",
        "5:15",
        "--format",
        "json",
    ])
    .unwrap();
    let (code, text) = output(|out| resolve::run(&args, out));

    assert_exit(code, 0);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1, "{text}");
    assert_eq!(json[0]["key"], "knuth84");
    assert_eq!(json[0]["status"], "unique");
    assert_eq!(json[0]["labels"][0]["file_name"], "refs.bib");
}

#[test]
fn test_complete_command() {
    let (_dir, main) = thesis();
    let args =
        complete::Args::try_parse_from(["texref-complete", &arg(&main), "--command", "citep"])
            .unwrap();
    let (_, text) = output(|out| complete::run(&args, out));
    assert_eq!(text, "knuth84\trefs.bib:1\n");
}

#[test]
fn test_complete_at_position_with_prefix() {
    let (_dir, main) = thesis();
    let args = complete::Args::try_parse_from([
        "texref-complete",
        &arg(&main),
        "--at",
        "4:12",
        "--prefix",
        "sec:",
        "--format",
        "json",
    ])
    .unwrap();
    let (_, text) = output(|out| complete::run(&args, out));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let keys: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["key"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys, vec!["sec:intro", "sec:intro"]);
}

#[test]
fn test_complete_at_argument_without_key() {
    let dir = TempDir::new().unwrap();
    let main = write(
        dir.path(),
        "main.tex",
        "\\bibitem{knuth84} Knuth.\n\\label{sec:a}\n\\cite{}\n\\cite{knuth84, }\n",
    );

    for position in ["3:7", "4:16"] {
        let args = complete::Args::try_parse_from([
            "texref-complete",
            &arg(&main),
            "--at",
            position,
        ])
        .unwrap();
        let (code, text) = output(|out| complete::run(&args, out));
        assert_exit(code, 0);
        assert_eq!(text, "knuth84\tmain.tex:1\n", "at {position}");
    }
}

#[test]
fn test_check_json() {
    let (_dir, main) = thesis();
    let args =
        check::Args::try_parse_from(["texref-check", &arg(&main), "--format", "json"]).unwrap();
    let (code, text) = output(|out| check::run(&args, out, false));

    assert_exit(code, 1);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error_count"], 2);
    assert_eq!(json["warning_count"], 1);

    let messages: Vec<_> = json["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["message"].as_str().unwrap().to_string())
        .collect();
    assert!(messages.contains(&"undefined reference 'sec:missing'".to_string()));
    assert!(messages.contains(&"undefined citation 'nobody'".to_string()));
    assert!(messages.contains(&"'sec:intro' is defined more than once".to_string()));
}

#[test]
fn test_check_text_and_allow_duplicates() {
    let (_dir, main) = thesis();
    let args =
        check::Args::try_parse_from(["texref-check", &arg(&main), "--allow-duplicates"]).unwrap();
    let (_, text) = output(|out| check::run(&args, out, false));

    assert!(text.contains("undefined reference 'sec:missing'"), "{text}");
    assert!(!text.contains("defined more than once"), "{text}");
    assert!(text.contains("2 errors"), "{text}");
}

#[test]
fn test_check_clean_project() {
    let dir = TempDir::new().unwrap();
    let main = write(dir.path(), "main.tex", "\\label{a}\n\\ref{a}\n");
    let args = check::Args::try_parse_from(["texref-check", &arg(&main)]).unwrap();
    let (code, text) = output(|out| check::run(&args, out, false));

    assert_exit(code, 0);
    assert!(text.contains("No problems found"));
}

#[test]
fn test_settings_file_next_to_root() {
    let dir = TempDir::new().unwrap();
    let main = write(dir.path(), "main.tex", "\\mylabel{a}\n\\myref{a} \\ref{b}\n");
    write(
        dir.path(),
        "texref.json",
        r#"{"labeling_commands": ["\\mylabel;1;false"], "label_references": ["\\myref"]}"#,
    );
    let args = check::Args::try_parse_from(["texref-check", &arg(&main)]).unwrap();
    let (code, _) = output(|out| check::run(&args, out, false));
    assert_exit(code, 0);
}

#[test]
fn test_bad_settings_are_fatal() {
    let dir = TempDir::new().unwrap();
    let main = write(dir.path(), "main.tex", "\\label{a}\n");
    let config = write(dir.path(), "custom.json", r#"{"labeling_commands": ["\\label;x"]}"#);
    let args = labels::Args::try_parse_from([
        "texref-labels",
        &arg(&main),
        "--config",
        &arg(&config),
    ])
    .unwrap();

    let err = labels::run(&args, &mut Vec::new()).unwrap_err();
    assert!(format!("{err:#}").contains("invalid labeling command"), "{err:#}");
}

#[test]
fn test_binary_exit_codes() {
    let (dir, main) = thesis();

    let status = Command::new(env!("CARGO_BIN_EXE_texref-check"))
        .arg(&main)
        .arg("--quiet")
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));

    let status = Command::new(env!("CARGO_BIN_EXE_texref"))
        .args(["labels", &arg(&main)])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));

    let status = Command::new(env!("CARGO_BIN_EXE_texref"))
        .args(["check", &arg(&dir.path().join("missing.tex"))])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
}
