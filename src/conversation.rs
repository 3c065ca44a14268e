//! Conversation input for the CLI: a JSON export or a directory of turn files.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{self, Error};
use crate::version::Turn;

/// A conversation: ordered messages, an optional live stream, an optional template.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Conversation {
    /// Messages, sorted by `position` after loading.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Text of a turn that is still streaming, if any.
    #[serde(default)]
    pub stream: Option<String>,
    /// Template identifier, e.g. `react-ts`.
    #[serde(default)]
    pub template: Option<String>,
}

impl Conversation {
    /// Assistant messages in position order.
    pub fn assistant_turns(&self) -> Vec<&Message> {
        return self.messages.iter().filter(|m| return m.role == Role::Assistant).collect();
    }

    /// Load a conversation from a JSON file, or from a directory of `*.md` turn files.
    ///
    /// In a directory, each markdown file is one assistant turn, ordered by file name,
    /// with the file stem as its id.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` for a missing path, `Error::Io` for read failures,
    /// or `Error::ConversationCorrupt` if the JSON does not describe a conversation.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if path.is_dir() {
            return load_turn_directory(path);
        }
        let content = error::read_text(path)?;
        let mut conversation: Self = serde_json::from_str(&content).map_err(|e| {
            return Error::ConversationCorrupt { path: path.to_path_buf(), reason: e.to_string() };
        })?;
        conversation.messages.sort_by_key(|m| return m.position);
        return Ok(conversation);
    }
}

/// One persisted message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    /// Raw markdown text.
    pub content: String,
    /// Stable identifier.
    pub id: String,
    /// Ordering key. Ties keep file order.
    #[serde(default)]
    pub position: i64,
    /// Author of the message.
    #[serde(default)]
    pub role: Role,
}

impl Turn for Message {
    fn turn_id(&self) -> &str {
        return &self.id;
    }
}

/// Author of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Model output. The only role that produces versions.
    #[default]
    Assistant,
    System,
    User,
}

/// Read every `*.md` file directly under `dir` as an assistant turn.
///
/// # Errors
///
/// Returns `Error::Io` if a file cannot be read, or `Error::ConversationCorrupt` if the
/// directory holds no markdown files.
fn load_turn_directory(dir: &Path) -> Result<Conversation, Error> {
    let paths: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file() && e.path().extension().is_some_and(|ext| return ext == "md"))
        .map(walkdir::DirEntry::into_path)
        .collect();

    if paths.is_empty() {
        return Err(Error::ConversationCorrupt {
            path: dir.to_path_buf(),
            reason: "directory contains no .md turn files".to_string(),
        });
    }

    let mut messages = Vec::with_capacity(paths.len());
    for (position, path) in (0_i64..).zip(&paths) {
        let id = path
            .file_stem()
            .map_or_else(|| return position.to_string(), |s| return s.to_string_lossy().into_owned());
        messages.push(Message {
            content: std::fs::read_to_string(path)?,
            id,
            position,
            role: Role::Assistant,
        });
    }

    log::debug!("loaded {} turns from {}", messages.len(), dir.display());
    return Ok(Conversation { messages, stream: None, template: None });
}
