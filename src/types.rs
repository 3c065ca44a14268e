//! Core domain types: segments, decoded blocks, projects, and file changes.
use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use sha2::{Digest as _, Sha256};

/// Type of change recorded between two project snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Path exists in the next snapshot only.
    Create,
    /// Path exists in the previous snapshot only.
    Delete,
    /// Path exists in both snapshots with different content.
    Modify,
}

impl ChangeType {
    /// Fixed-width label used in plain-text output.
    pub const fn label(self) -> &'static str {
        return match self {
            ChangeType::Create => "CREATE",
            ChangeType::Delete => "DELETE",
            ChangeType::Modify => "MODIFY",
        };
    }
}

/// A completed fence after decoding its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Fence body with the fence lines stripped.
    pub code: String,
    /// Declared or synthesized file name.
    pub filename: Filename,
    /// Language token from the fence tag, possibly empty.
    pub language: String,
}

/// One record in the change log. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// Create, modify, or delete.
    pub change_type: ChangeType,
    /// New content. `None` for deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Paths whose content appears to import this path. Display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependents: Option<BTreeSet<String>>,
    /// Normalized project path with a leading `/`.
    pub path: String,
}

/// A `{name, extension}` pair from a `filename=` attribute or synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filename {
    /// Text after the last dot, or empty.
    pub extension: String,
    /// Text before the last dot. May contain `/` separators.
    pub name: String,
}

impl Filename {
    /// Join name and extension with a dot, omitting the dot when there is no extension.
    pub fn joined(&self) -> String {
        if self.extension.is_empty() {
            return self.name.clone();
        }
        return format!("{}.{}", self.name, self.extension);
    }
}

/// The materialization result.
///
/// Keeps files in order of first appearance plus a path index for O(1) lookup.
/// `Project::default()` is the absent snapshot: no files and no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Path of the resolved entry file.
    pub entry_path: String,
    /// Files in order of first appearance.
    files: Vec<ProjectFile>,
    /// Position of each path inside `files`.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Project {
    /// Build a project from already-deduplicated files.
    pub(crate) fn from_parts(files: Vec<ProjectFile>, entry_path: String) -> Self {
        let index = files
            .iter()
            .enumerate()
            .map(|(i, f)| return (f.path.clone(), i))
            .collect();
        return Self { entry_path, files, index };
    }

    /// Whether a file exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        return self.index.contains_key(path);
    }

    /// Files in order of first appearance.
    pub fn files(&self) -> &[ProjectFile] {
        return &self.files;
    }

    /// Stable SHA-256 over the entry path and ordered file contents, as lowercase hex.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.entry_path.as_bytes());
        for file in &self.files {
            hasher.update([0_u8]);
            hasher.update(file.path.as_bytes());
            hasher.update([0_u8]);
            hasher.update(file.content.as_bytes());
        }
        return format!("{:x}", hasher.finalize());
    }

    /// Look up a file by path.
    pub fn get(&self, path: &str) -> Option<&ProjectFile> {
        return self.index.get(path).and_then(|&i| return self.files.get(i));
    }

    /// True iff the project holds more than one file.
    pub fn is_multi_file(&self) -> bool {
        return self.files.len() > 1;
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        return self.files.len();
    }

    /// True for the absent snapshot.
    pub fn is_empty(&self) -> bool {
        return self.files.is_empty();
    }
}

/// One file of a materialized project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFile {
    /// File body.
    pub content: String,
    /// Normalized path with a leading `/`.
    pub path: String,
}

/// A typed slice of markdown produced by the fence scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Raw text after the closing backticks, such as a trailing `\r`. Empty unless complete.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub closing_tag: String,
    /// Text inside the segment. Code segments hold the body only.
    pub content: String,
    /// Raw text after the opening backticks. Empty for text.
    pub fence_tag: String,
    /// Declared or synthesized filename. `None` for text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<Filename>,
    /// Text, completed code, or still-streaming code.
    pub kind: SegmentKind,
    /// Language token from the fence tag. Empty for text.
    pub language: String,
    /// Number of source lines joined into `content`.
    pub line_count: usize,
}

impl Segment {
    /// Whether this segment holds code, complete or not.
    pub const fn is_code(&self) -> bool {
        return matches!(self.kind, SegmentKind::CodeComplete | SegmentKind::CodeStreaming);
    }
}

/// Classification of a scanner segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// The first fence, closed.
    CodeComplete,
    /// The first fence, still open at end of input.
    CodeStreaming,
    /// Plain markdown, including any fences after the first.
    Text,
}
