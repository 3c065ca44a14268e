//! Promote decoded blocks into a project with a resolved entry point.
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::template::Conventions;
use crate::types::{CodeBlock, Project, ProjectFile};

/// Matches an entry marker comment such as `// @entry` or `<!-- @entry ./Main.vue -->`.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static ENTRY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^\s*(?://|#|/\*|\{/\*|<!--)\s*@entry\b(?:[ \t]*[:=]?[ \t]*([./\w@~][^\s*>]*))?")
        .expect("valid regex");
});

/// Find the first usable entry marker across files, in file order.
///
/// A marker without a target names its own file. A marker whose target is not in the
/// project is skipped.
fn find_marked_entry(files: &[ProjectFile], index: &HashMap<String, usize>, window: usize) -> Option<String> {
    for file in files {
        for line in file.content.lines().take(window) {
            let Some(cap) = ENTRY_MARKER.captures(line) else {
                continue;
            };
            let target = match cap.get(1) {
                None => return Some(file.path.clone()),
                Some(m) => resolve_marker_target(&file.path, m.as_str()),
            };
            if index.contains_key(&target) {
                return Some(target);
            }
            log::debug!("entry marker in {} points at missing {target}", file.path);
        }
    }
    return None;
}

/// Whether `path` is `/App.<ext>` at the project root.
fn is_root_app_file(path: &str) -> bool {
    return path
        .strip_prefix("/App.")
        .is_some_and(|ext| return !ext.is_empty() && !ext.contains('/'));
}

/// Turn decoded blocks into a project.
///
/// Duplicate paths are last-write-wins and keep their first position. An empty block
/// list yields a single placeholder file at the conventions' entry path. This never
/// fails and is deterministic for a given input.
pub fn materialize(blocks: &[CodeBlock], conventions: &Conventions) -> Project {
    let mut files: Vec<ProjectFile> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for block in blocks {
        let path = normalize_path(&block.filename.joined());
        if let Some(existing) = index.get(&path).and_then(|&i| return files.get_mut(i)) {
            log::debug!("duplicate block for {path}, keeping the later content");
            existing.content.clone_from(&block.code);
            continue;
        }
        index.insert(path.clone(), files.len());
        files.push(ProjectFile { content: block.code.clone(), path });
    }

    if files.is_empty() {
        let path = normalize_path(&conventions.entry_path);
        log::debug!("no blocks, materializing placeholder at {path}");
        let placeholder = ProjectFile { content: conventions.placeholder.clone(), path: path.clone() };
        return Project::from_parts(vec![placeholder], path);
    }

    let entry_path = resolve_entry(&files, &index, conventions);
    return Project::from_parts(files, entry_path);
}

/// Normalize a project path: leading `/`, no empty or `.` segments, `..` popped.
/// A `..` with nothing left to pop is dropped, since nothing sits above the root.
pub fn normalize_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(['/', '\\']) {
        push_normalized_segment(&mut segments, segment);
    }
    return format!("/{}", segments.join("/"));
}

/// Handle one path segment during normalization.
fn push_normalized_segment<'a>(segments: &mut Vec<&'a str>, segment: &'a str) {
    match segment.trim() {
        "" | "." => {},
        ".." => {
            segments.pop();
        },
        _ => segments.push(segment.trim()),
    }
}

/// Resolve an entry marker's target against the marking file's directory.
fn resolve_marker_target(marking_file: &str, target: &str) -> String {
    if target.starts_with("./") || target.starts_with("../") {
        let dir = marking_file.rsplit_once('/').map_or("", |(dir, _)| return dir);
        return normalize_path(&format!("{dir}/{target}"));
    }
    return normalize_path(target);
}

/// Pick the entry file: marker, then the conventional entry, then a root `App.*`, then the first file.
fn resolve_entry(files: &[ProjectFile], index: &HashMap<String, usize>, conventions: &Conventions) -> String {
    if let Some(marked) = find_marked_entry(files, index, conventions.marker_window) {
        log::debug!("entry resolved by marker: {marked}");
        return marked;
    }

    let conventional = normalize_path(&conventions.entry_path);
    if index.contains_key(&conventional) {
        return conventional;
    }

    if let Some(app) = files.iter().find(|f| return is_root_app_file(&f.path)) {
        return app.path.clone();
    }

    return files.first().map(|f| return f.path.clone()).unwrap_or(conventional);
}
