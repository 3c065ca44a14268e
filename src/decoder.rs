//! Fence tag decoding and exhaustive multi-block extraction.
use std::sync::LazyLock;

use regex::Regex;

use crate::scanner;
use crate::template::Conventions;
use crate::types::{CodeBlock, Filename};

/// Matches a `filename=` attribute. Quoted values may contain spaces and commas.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static FILENAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r#"filename\s*=\s*(?:"([^"]*)"|'([^']*)'|([^,}]+))"#).expect("valid regex");
});

/// Three backticks that open or close a fence.
const FENCE: &str = "```";

/// Extension used when a fence declares neither a filename nor a language.
const FALLBACK_EXTENSION: &str = "txt";

/// Decode a fence tag into its language and filename.
///
/// The language is the trimmed text before the first `{`. The filename comes from a
/// `filename=` attribute inside the first `{...}` block. Without one, the name is
/// synthesized as `file<ordinal>` and the extension defaults to the language or `txt`.
pub fn decode_tag(tag: &str, ordinal: usize) -> (String, Filename) {
    let (head, attributes) = match tag.split_once('{') {
        None => (tag, None),
        Some((head, rest)) => (head, Some(rest.split_once('}').map_or(rest, |(inner, _)| return inner))),
    };
    let language = head.trim().to_string();

    let declared = attributes
        .and_then(|attrs| return FILENAME_ATTR.captures(attrs))
        .and_then(|cap| return cap.get(1).or_else(|| return cap.get(2)).or_else(|| return cap.get(3)))
        .map(|m| return parse_filename(m.as_str()))
        .filter(|f| return !f.name.is_empty() || !f.extension.is_empty());

    let filename = declared.unwrap_or_else(|| return synthesize_filename(&language, ordinal));
    return (language, filename);
}

/// Find every complete fence in document order.
///
/// Unterminated trailing fences are ignored. When no fence is complete, the whole
/// input (or the body of a still-streaming fence) becomes one implicit block named
/// after the conventions' entry file. Blank input yields nothing.
pub fn extract_all(markdown: &str, conventions: &Conventions) -> Vec<CodeBlock> {
    let mut blocks: Vec<CodeBlock> = Vec::new();
    let mut open: Option<(&str, Vec<&str>)> = None;

    for line in markdown.split('\n') {
        let fence = fence_tag(line);
        match (open.take(), fence) {
            (None, Some(tag)) => open = Some((tag, Vec::new())),
            (None, None) => {},
            (Some((tag, body)), Some(closing)) if closing.trim().is_empty() => {
                let ordinal = blocks.len().saturating_add(1);
                let (language, filename) = decode_tag(tag, ordinal);
                log::trace!("fence #{ordinal} closed: {}", filename.joined());
                blocks.push(CodeBlock { code: body.join("\n"), filename, language });
            },
            (Some((tag, mut body)), _) => {
                body.push(line);
                open = Some((tag, body));
            },
        }
    }

    if !blocks.is_empty() {
        return blocks;
    }
    return implicit_block(markdown, conventions).into_iter().collect();
}

/// If `line` is a fence line, return the tag text that follows the backticks.
pub(crate) fn fence_tag(line: &str) -> Option<&str> {
    return line.strip_prefix(FENCE);
}

/// Fallback for text without any complete fence.
fn implicit_block(markdown: &str, conventions: &Conventions) -> Option<CodeBlock> {
    if markdown.trim().is_empty() {
        return None;
    }
    let filename = parse_filename(conventions.entry_path.trim_start_matches('/'));

    if let Some(primary) = scanner::primary_block(markdown) {
        log::debug!("no complete fence, using in-progress block as {}", filename.joined());
        return Some(CodeBlock { code: primary.block.code, filename, language: primary.block.language });
    }

    log::debug!("no fence at all, treating whole input as {}", filename.joined());
    return Some(CodeBlock {
        code: markdown.to_string(),
        language: filename.extension.clone(),
        filename,
    });
}

/// Split a declared filename at its last dot. Surrounding quotes and whitespace are dropped.
pub fn parse_filename(raw: &str) -> Filename {
    let cleaned = raw.trim().trim_matches(|c| return c == '"' || c == '\'').trim();
    return match cleaned.rsplit_once('.') {
        None => Filename { extension: String::new(), name: cleaned.to_string() },
        Some((name, extension)) => Filename {
            extension: extension.to_string(),
            name: name.to_string(),
        },
    };
}

/// Build `file<ordinal>.<language or txt>`.
pub(crate) fn synthesize_filename(language: &str, ordinal: usize) -> Filename {
    let extension = if language.is_empty() { FALLBACK_EXTENSION } else { language };
    return Filename {
        extension: extension.to_string(),
        name: format!("file{ordinal}"),
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::template::Template;

    fn conventions() -> Conventions {
        return Conventions::new(Some(Template::ReactTs));
    }

    #[test]
    fn decodes_language_and_declared_filename() {
        let (language, filename) = decode_tag("tsx{filename=App.tsx}", 1);
        assert_eq!(language, "tsx");
        assert_eq!(filename, Filename { extension: "tsx".into(), name: "App".into() });
    }

    #[test]
    fn synthesizes_filename_from_ordinal_and_language() {
        let (language, filename) = decode_tag("python", 3);
        assert_eq!(language, "python");
        assert_eq!(filename.joined(), "file3.python");

        let (language, filename) = decode_tag("", 1);
        assert_eq!(language, "");
        assert_eq!(filename.joined(), "file1.txt");
    }

    #[test]
    fn filename_attribute_tolerates_spacing_and_quotes() {
        let (_, filename) = decode_tag("tsx { filename = \"components/Nav Bar.tsx\" }", 1);
        assert_eq!(filename.name, "components/Nav Bar");
        assert_eq!(filename.extension, "tsx");

        let (_, filename) = decode_tag("ts{filename=utils.ts, title=helpers}", 1);
        assert_eq!(filename.joined(), "utils.ts");
    }

    #[test]
    fn only_the_first_attribute_block_is_read() {
        let (_, filename) = decode_tag("ts{title=x}{filename=Other.ts}", 2);
        assert_eq!(filename.joined(), "file2.ts");
    }

    #[test]
    fn filename_without_dot_has_empty_extension() {
        assert_eq!(parse_filename("Dockerfile"), Filename { extension: String::new(), name: "Dockerfile".into() });
        assert_eq!(parse_filename(".env"), Filename { extension: "env".into(), name: String::new() });
    }

    #[test]
    fn extracts_every_complete_fence_in_order() {
        let md = "Intro\n```tsx{filename=App.tsx}\nimport Button from './components/Button';\n```\n\
                  Then\n```tsx{filename=components/Button.tsx}\nexport default 1;\n```\n```css\nbody {}\n```\n";
        let blocks = extract_all(md, &conventions());
        let names: Vec<String> = blocks.iter().map(|b| return b.filename.joined()).collect();
        assert_eq!(names, vec!["App.tsx", "components/Button.tsx", "file3.css"]);
        assert_eq!(blocks[1].code, "export default 1;");
    }

    #[test]
    fn ignores_unterminated_trailing_fence() {
        let md = "```js\na\n```\n```js{filename=b.js}\nstill typing";
        let blocks = extract_all(md, &conventions());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "a");
    }

    #[test]
    fn tagged_fence_line_inside_a_block_is_body() {
        let md = "```md\n```js\ninner\n```";
        let blocks = extract_all(md, &conventions());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "```js\ninner");
    }

    #[test]
    fn falls_back_to_whole_input_without_fences() {
        let blocks = extract_all("export default function App() {}", &conventions());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].filename.joined(), "App.tsx");
        assert_eq!(blocks[0].code, "export default function App() {}");
    }

    #[test]
    fn falls_back_to_streaming_body_when_nothing_closed() {
        let blocks = extract_all("Sure!\n```tsx\nconst x = ", &conventions());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].filename.joined(), "App.tsx");
        assert_eq!(blocks[0].code, "const x = ");
        assert_eq!(blocks[0].language, "tsx");
    }

    #[test]
    fn blank_input_yields_no_blocks() {
        assert!(extract_all("", &conventions()).is_empty());
        assert!(extract_all("  \n\n", &conventions()).is_empty());
    }
}
