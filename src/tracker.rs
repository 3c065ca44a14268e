//! Snapshot differencing and the append-only change log.

use serde::Serialize;

use crate::imports;
use crate::types::{ChangeType, FileChange, Project};

/// Append-only record of every change seen in a session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeLog {
    /// Changes in the order they were recorded.
    entries: Vec<FileChange>,
}

impl ChangeLog {
    /// Recorded changes, oldest first.
    pub fn entries(&self) -> &[FileChange] {
        return &self.entries;
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Number of recorded changes.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Append a batch of changes. Returns how many were appended.
    pub fn record(&mut self, changes: Vec<FileChange>) -> usize {
        let added = changes.len();
        self.entries.extend(changes);
        return added;
    }
}

/// Change log plus the last observed snapshot.
///
/// Each `observe` call receives a full re-materialization, never a delta, so replaying
/// the same text twice records nothing the second time.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    /// Every change recorded so far.
    log: ChangeLog,
    /// Last observed project, or the absent snapshot.
    previous: Project,
}

impl ChangeTracker {
    /// The session's change log.
    pub const fn log(&self) -> &ChangeLog {
        return &self.log;
    }

    /// Diff `next` against the last snapshot, annotate dependents, and record the result.
    /// Returns the newly recorded batch.
    pub fn observe(&mut self, next: Project) -> &[FileChange] {
        let mut changes = diff(&self.previous, &next);
        annotate_dependents(&mut changes, &next);
        let start = self.log.len();
        self.log.record(changes);
        self.previous = next;
        return self.log.entries().get(start..).unwrap_or_default();
    }

    /// Last observed project.
    pub const fn snapshot(&self) -> &Project {
        return &self.previous;
    }
}

/// Attach importer paths to each change. Importers are looked up in `next`, so a
/// deletion lists the files that still import the removed path.
/// Empty sets are left as `None`.
pub fn annotate_dependents(changes: &mut [FileChange], next: &Project) {
    for change in changes {
        let found = imports::dependents_of(&change.path, next);
        change.dependents = if found.is_empty() { None } else { Some(found) };
    }
}

/// Classify `next` against `previous`.
///
/// Emits creates (in `next` order), then modifications (in `next` order), then
/// deletions (in `previous` order). Unchanged paths are omitted. Content is compared
/// by exact equality.
pub fn diff(previous: &Project, next: &Project) -> Vec<FileChange> {
    let mut creates = Vec::new();
    let mut modifies = Vec::new();

    for file in next.files() {
        match previous.get(&file.path) {
            None => creates.push(change(ChangeType::Create, &file.path, Some(&file.content))),
            Some(old) if old.content != file.content => {
                modifies.push(change(ChangeType::Modify, &file.path, Some(&file.content)));
            },
            Some(_) => {},
        }
    }

    let deletes = previous
        .files()
        .iter()
        .filter(|file| return !next.contains(&file.path))
        .map(|file| return change(ChangeType::Delete, &file.path, None));

    let mut changes = creates;
    changes.append(&mut modifies);
    changes.extend(deletes);

    log::debug!("diff: {} changes across {} -> {} files", changes.len(), previous.len(), next.len());
    return changes;
}

/// Build an unannotated change record.
fn change(change_type: ChangeType, path: &str, content: Option<&str>) -> FileChange {
    return FileChange {
        change_type,
        content: content.map(str::to_string),
        dependents: None,
        path: path.to_string(),
    };
}
