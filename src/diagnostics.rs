use std::fmt::Write as _;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::template::Template;

/// ANSI bold, used for markdown headings.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where possible, how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::UnknownTemplate { name } => render_unknown_template(name),
        Error::ConversationCorrupt { path, reason } => render_conversation_corrupt(&path.display().to_string(), reason),
        Error::ConfigInvalid { reason } => render_config_invalid(reason),
        Error::TomlDe(inner) => render_config_invalid(&inner.to_string()),
        _ => render_generic(e),
    };
}

/// Render variants that need no extra guidance beyond their message.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON

{e}
"),
        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}

## Fix

Check that the watched file's directory exists and is readable.
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

/// Render a config problem with the list of accepted keys.
fn render_config_invalid(reason: &str) -> String {
    return format!("\
# Error: Invalid Config

{reason}

## Fix

Correct `{CONFIG_FILE}`. Known keys:

    template = \"react-ts\"
    entry = \"/App.tsx\"
    placeholder = \"// no code available\"
    marker_window = 5
");
}

/// Render an unreadable conversation with the expected JSON shape.
fn render_conversation_corrupt(path: &str, reason: &str) -> String {
    return format!("\
# Error: Conversation Corrupt

`{path}`: {reason}

## Expected shape

    {{\"template\": \"react-ts\", \"messages\": [{{\"id\": \"m1\", \"role\": \"assistant\", \"position\": 1, \"content\": \"...\"}}]}}

Or a directory of `*.md` files, one assistant turn per file.
");
}

/// Render an unknown template with a suggestion and the known identifiers.
fn render_unknown_template(name: &str) -> String {
    let mut out = format!("\
# Error: Unknown Template

`{name}` is not a known template.
");

    if let Some(suggestion) = find_closest_template(name) {
        let _ = write!(out, "\n## Did you mean `{}`?\n", suggestion.identifier());
    }

    out.push_str("\n## Known templates\n\n");
    for template in Template::ALL {
        let _ = writeln!(out, "- `{}` (entry `{}`)", template.identifier(), template.entry_path());
    }
    return out;
}

/// Find the template `name` most likely meant, ignoring case and separators.
/// An exact match wins over a shared prefix.
pub(crate) fn find_closest_template(name: &str) -> Option<Template> {
    let wanted = strip_separators(name);
    if wanted.is_empty() {
        return None;
    }
    let exact = Template::ALL
        .into_iter()
        .find(|t| return strip_separators(t.identifier()) == wanted);
    return exact.or_else(|| {
        return Template::ALL.into_iter().find(|t| {
            let known = strip_separators(t.identifier());
            return known.starts_with(&wanted) || wanted.starts_with(&known);
        });
    });
}

/// Lowercase and drop `-`, `_`, and spaces for fuzzy comparison.
fn strip_separators(s: &str) -> String {
    return s
        .chars()
        .filter(|c| return !matches!(c, '-' | '_' | ' '))
        .map(|c| return c.to_ascii_lowercase())
        .collect();
}
