//! Code-fence extraction and project materialization for AI-generated markdown.
//!
//! A response is scanned into text and code segments as it streams, its fences are
//! decoded into file blocks, and the blocks are folded into a virtual project with a
//! resolved entry file. Successive projects are diffed into a change log, and a cursor
//! tracks which version of a conversation is on display.

pub mod commands;
pub mod config;
pub mod conversation;
pub mod decoder;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod imports;
pub mod materialize;
pub mod scanner;
pub mod template;
pub mod tracker;
pub mod types;
pub mod version;
pub mod watch;

pub use decoder::extract_all;
pub use error::Error;
pub use materialize::materialize;
pub use scanner::{primary_block, reconstruct, scan};
pub use template::{Conventions, Template};
pub use tracker::{ChangeTracker, diff};
pub use types::{ChangeType, CodeBlock, FileChange, Project, ProjectFile, Segment, SegmentKind};
pub use version::{Selection, VersionCursor, locate};
