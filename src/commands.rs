//! CLI commands: split, extract, diff, history, export.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::config::{self, Config};
use crate::conversation::{Conversation, Message};
use crate::decoder;
use crate::error::{self, Error};
use crate::export::{self, Framework};
use crate::materialize::materialize;
use crate::scanner;
use crate::template::{Conventions, PreviewLayout, Template};
use crate::tracker::{self, ChangeTracker};
use crate::types::{FileChange, Filename, Project, ProjectFile, SegmentKind};
use crate::version::{self, Selection, Version, VersionCursor};

/// Selector value meaning "the in-flight streaming turn".
const LIVE: &str = "live";

/// JSON view of one version in `history`.
#[derive(Serialize)]
struct HistoryEntry<'a> {
    /// Changes recorded when this version was observed.
    changes: &'a [FileChange],
    /// Entry path of this version's project.
    entry_path: String,
    /// Turn id, or `live`.
    id: String,
    /// One-based version number.
    version: usize,
}

/// JSON view of the `history` command.
#[derive(Serialize)]
struct HistoryReport<'a> {
    /// Id of the displayed version.
    current: String,
    /// Navigation state.
    cursor: VersionCursor,
    /// `Version X of Y`.
    label: String,
    /// Id of the next version, if any.
    next: Option<String>,
    /// Id of the previous version, if any.
    previous: Option<String>,
    /// Every version with the changes it introduced.
    versions: Vec<HistoryEntry<'a>>,
}

/// JSON view of a materialized project.
#[derive(Serialize)]
struct ProjectReport<'a> {
    /// Resolved entry file.
    entry_path: &'a str,
    /// Files in order of first appearance.
    files: &'a [ProjectFile],
    /// Content fingerprint.
    fingerprint: String,
    /// More than one file.
    is_multi_file: bool,
    /// Preview layout for the primary block's language.
    layout: PreviewLayout,
    /// `<status>` messages found in the text.
    status: Vec<String>,
}

/// Compare the projects materialized from two markdown files.
/// Exit code 1 when anything changed, like `diff(1)`.
///
/// # Errors
///
/// Returns errors from reading either file or loading config.
pub fn diff(old: &Path, new: &Path, json: bool, dependents: bool, template: Option<&str>) -> Result<ExitCode, Error> {
    let conventions = load_conventions(template)?;
    let previous = materialize_file(old, &conventions)?;
    let next = materialize_file(new, &conventions)?;

    let mut changes = tracker::diff(&previous, &next);
    if dependents {
        tracker::annotate_dependents(&mut changes, &next);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else if changes.is_empty() {
        println!("No changes");
    } else {
        print_changes(&changes);
    }

    if changes.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    return Ok(ExitCode::from(1));
}

/// Materialize a markdown file and write it out as a framework app.
///
/// # Errors
///
/// Returns errors from reading the input, loading config, or writing output files.
pub fn export(file: &Path, framework: Framework, out: &Path, name: Option<&str>, template: Option<&str>) -> Result<(), Error> {
    let conventions = load_conventions(template)?;
    let project = materialize_file(file, &conventions)?;
    let name = name.map_or_else(|| return default_project_name(file), str::to_string);

    let files = export::scaffold(&project, framework, &name);
    for (relative, content) in &files {
        let target = out.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, content)?;
    }

    eprintln!("Wrote {} files to {}", files.len(), out.display());
    return Ok(());
}

/// Materialize a markdown file and print the project.
///
/// # Errors
///
/// Returns errors from reading the file or loading config.
pub fn extract(file: &Path, json: bool, template: Option<&str>) -> Result<(), Error> {
    let markdown = error::read_text(file)?;
    let conventions = load_conventions(template)?;
    let project = materialize(&decoder::extract_all(&markdown, &conventions), &conventions);

    let language = scanner::primary_block(&markdown).map(|p| return p.block.language).unwrap_or_default();
    let report = ProjectReport {
        entry_path: &project.entry_path,
        files: project.files(),
        fingerprint: project.fingerprint(),
        is_multi_file: project.is_multi_file(),
        layout: PreviewLayout::for_language(&language),
        status: scanner::status_messages(&markdown),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for status in &report.status {
        println!("STATUS  {status}");
    }
    println!("ENTRY   {}", report.entry_path);
    for file in report.files {
        let lines = file.content.lines().count();
        println!("FILE    {} ({lines} lines)", file.path);
    }
    println!();
    println!("{} files, fingerprint {}", project.len(), report.fingerprint);
    return Ok(());
}

/// Walk a conversation's versions, show the cursor for the selected one and the change
/// log of every version.
///
/// # Errors
///
/// Returns errors from loading the conversation or config.
pub fn history(path: &Path, select: Option<&str>, json: bool, template: Option<&str>) -> Result<(), Error> {
    let conversation = Conversation::load(path)?;
    let stored = conversation.template.as_deref().filter(|id| {
        let known = Template::parse(id).is_some();
        if !known {
            log::warn!("conversation names unknown template `{id}`, using the default");
        }
        return known;
    });
    let conventions = load_conventions(template.or(stored))?;
    let turns = conversation.assistant_turns();
    let streaming = conversation.stream.is_some();

    let newest = Selection::Turn(turns.last().map_or("", |t| return t.id.as_str()));
    let selection = match select {
        Some(LIVE) if streaming => Selection::Live,
        Some(LIVE) => {
            log::warn!("conversation has no live stream, showing the newest turn");
            newest
        },
        Some(id) => Selection::Turn(id),
        None if streaming => Selection::Live,
        None => newest,
    };
    let cursor = version::locate(&turns, selection, streaming);

    let mut tracker = ChangeTracker::default();
    let mut observed: Vec<(String, String, usize, usize)> = Vec::new();
    let texts = turns
        .iter()
        .map(|t| return (t.id.clone(), t.content.as_str()))
        .chain(conversation.stream.as_deref().map(|s| return (LIVE.to_string(), s)));
    for (id, text) in texts {
        let project = materialize(&decoder::extract_all(text, &conventions), &conventions);
        let entry_path = project.entry_path.clone();
        let start = tracker.log().len();
        let added = tracker.observe(project).len();
        observed.push((id, entry_path, start, added));
    }

    let entries = tracker.log().entries();
    let versions: Vec<HistoryEntry<'_>> = observed
        .into_iter()
        .zip(1_usize..)
        .map(|((id, entry_path, start, added), version)| {
            let changes = entries.get(start..start.saturating_add(added)).unwrap_or_default();
            return HistoryEntry { changes, entry_path, id, version };
        })
        .collect();

    let current = versions
        .get(cursor.current_index)
        .map(|v| return v.id.clone())
        .unwrap_or_default();
    let report = HistoryReport {
        current,
        cursor,
        label: cursor.label(),
        next: cursor.next(&turns).map(|v| return version_id(&v)),
        previous: cursor.previous(&turns).map(|v| return version_id(&v)),
        versions,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}  ({})", report.label, report.current);
    println!("previous: {}", report.previous.as_deref().unwrap_or("-"));
    println!("next:     {}", report.next.as_deref().unwrap_or("-"));
    for entry in &report.versions {
        println!();
        println!("## v{} {} (entry {})", entry.version, entry.id, entry.entry_path);
        if entry.changes.is_empty() {
            println!("no changes");
        } else {
            print_changes(entry.changes);
        }
    }
    return Ok(());
}

/// Scan a markdown file and print its segments.
///
/// # Errors
///
/// Returns errors from reading the file.
pub fn split(file: &Path, json: bool) -> Result<(), Error> {
    let markdown = error::read_text(file)?;
    let segments = scanner::scan(&markdown);

    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    for segment in &segments {
        let header = match segment.kind {
            SegmentKind::Text => format!("-- text ({} lines)", segment.line_count),
            SegmentKind::CodeComplete | SegmentKind::CodeStreaming => {
                let state = if segment.kind == SegmentKind::CodeStreaming { "streaming" } else { "complete" };
                let name = segment.filename.as_ref().map(Filename::joined).unwrap_or_default();
                format!("-- code {name} [{}] {state} ({} lines)", segment.language, segment.line_count)
            },
        };
        println!("{header}");
        println!("{}", segment.content);
    }
    return Ok(());
}

/// Project name derived from the input file's stem.
fn default_project_name(file: &Path) -> String {
    return file
        .file_stem()
        .map(|s| return s.to_string_lossy().to_lowercase().replace(' ', "-"))
        .filter(|s| return !s.is_empty())
        .unwrap_or_else(|| return "generated-app".to_string());
}

/// Load `.codefence.toml` from the working directory and build conventions.
/// An unknown template identifier is an error.
///
/// # Errors
///
/// Returns config loading errors or `Error::UnknownTemplate`.
pub(crate) fn load_conventions(template: Option<&str>) -> Result<Conventions, Error> {
    let config = Config::load(&PathBuf::from("."))?;
    let template: Option<Template> = template.map(config::parse_template).transpose()?;
    return Ok(config.conventions(template));
}

/// Read and materialize one markdown file.
///
/// # Errors
///
/// Returns `Error::FileNotFound` or `Error::Io` from reading.
pub(crate) fn materialize_file(path: &Path, conventions: &Conventions) -> Result<Project, Error> {
    let markdown = error::read_text(path)?;
    return Ok(materialize(&decoder::extract_all(&markdown, conventions), conventions));
}

/// Print one line per change, with dependents when known.
pub(crate) fn print_changes(changes: &[FileChange]) {
    for change in changes {
        let label = change.change_type.label();
        match &change.dependents {
            None => println!("{label}  {}", change.path),
            Some(deps) => {
                let list: Vec<&str> = deps.iter().map(String::as_str).collect();
                println!("{label}  {}  (imported by {})", change.path, list.join(", "));
            },
        }
    }
}

/// Id of a navigation target.
fn version_id(target: &Version<'_, &Message>) -> String {
    return match target {
        Version::Live => LIVE.to_string(),
        Version::Turn(message) => message.id.clone(),
    };
}
