//! Line-oriented scanner that splits markdown around its first code fence.
use std::sync::LazyLock;

use regex::Regex;

use crate::decoder::{self, fence_tag};
use crate::types::{CodeBlock, Filename, Segment, SegmentKind};

/// Matches `<status>...</status>` tags, across lines.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static STATUS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"(?s)<status>(.*?)</status>").expect("valid regex");
});

/// The document's first fence, decoded, with its streaming state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryBlock {
    /// Decoded block. For a streaming fence this is a best-effort snapshot.
    pub block: CodeBlock,
    /// True while the fence has not been closed yet.
    pub generating: bool,
}

/// Scanner position relative to the first fence.
enum State<'a> {
    /// First fence closed. Everything else is text.
    Done,
    /// Inside the first fence, with its tag and body lines so far.
    InFence(&'a str, Vec<&'a str>),
    /// Before the first fence.
    Outside,
}

/// Build a code segment from the first fence's tag and body lines.
/// `closing` is the text after the closing backticks, `None` while streaming.
fn code_segment(tag: &str, body: &[&str], closing: Option<&str>) -> Segment {
    let (language, filename) = decoder::decode_tag(tag, 1);
    let kind = if closing.is_some() { SegmentKind::CodeComplete } else { SegmentKind::CodeStreaming };
    return Segment {
        closing_tag: closing.unwrap_or_default().to_string(),
        content: body.join("\n"),
        fence_tag: tag.to_string(),
        filename: Some(filename),
        kind,
        language,
        line_count: body.len(),
    };
}

/// Push the pending text lines as one segment, if there are any.
fn flush_text(lines: &mut Vec<&str>, segments: &mut Vec<Segment>) {
    if lines.is_empty() {
        return;
    }
    segments.push(Segment {
        closing_tag: String::new(),
        content: lines.join("\n"),
        fence_tag: String::new(),
        filename: None,
        kind: SegmentKind::Text,
        language: String::new(),
        line_count: lines.len(),
    });
    lines.clear();
}

/// Return the document's first fence as a block, closed or still streaming.
pub fn primary_block(markdown: &str) -> Option<PrimaryBlock> {
    return scan(markdown).into_iter().find(Segment::is_code).map(|segment| {
        let generating = segment.kind == SegmentKind::CodeStreaming;
        return PrimaryBlock {
            block: CodeBlock {
                code: segment.content,
                filename: segment.filename.unwrap_or_else(Filename::default),
                language: segment.language,
            },
            generating,
        };
    });
}

/// Rebuild the scanned text from its segments.
///
/// Segments are joined with newlines and code segments get their fence lines back.
/// `reconstruct(&scan(s)) == s` holds for every input.
pub fn reconstruct(segments: &[Segment]) -> String {
    let rendered: Vec<String> = segments
        .iter()
        .map(|segment| {
            return match segment.kind {
                SegmentKind::Text => segment.content.clone(),
                SegmentKind::CodeComplete | SegmentKind::CodeStreaming => {
                    let mut out = format!("```{}", segment.fence_tag);
                    if segment.line_count > 0 {
                        out.push('\n');
                        out.push_str(&segment.content);
                    }
                    if segment.kind == SegmentKind::CodeComplete {
                        out.push_str("\n```");
                        out.push_str(&segment.closing_tag);
                    }
                    out
                },
            };
        })
        .collect();
    return rendered.join("\n");
}

/// Split markdown into text and first-fence segments.
///
/// Only the first fence is segmented. Fences after it stay folded into the trailing
/// text segment. If the input ends inside the first fence, the fence is emitted as
/// `CodeStreaming`. Empty input yields no segments.
pub fn scan(markdown: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    if markdown.is_empty() {
        return segments;
    }

    let mut text: Vec<&str> = Vec::new();
    let mut state = State::Outside;

    for line in markdown.split('\n') {
        state = match state {
            State::Done => {
                text.push(line);
                State::Done
            },
            State::Outside => match fence_tag(line) {
                None => {
                    text.push(line);
                    State::Outside
                },
                Some(tag) => {
                    log::trace!("first fence opened with tag `{tag}`");
                    flush_text(&mut text, &mut segments);
                    State::InFence(tag, Vec::new())
                },
            },
            State::InFence(tag, mut body) => match fence_tag(line) {
                Some(closing) if closing.trim().is_empty() => {
                    log::trace!("first fence closed after {} lines", body.len());
                    segments.push(code_segment(tag, &body, Some(closing)));
                    State::Done
                },
                _ => {
                    body.push(line);
                    State::InFence(tag, body)
                },
            },
        };
    }

    if let State::InFence(tag, body) = state {
        segments.push(code_segment(tag, &body, None));
    } else {
        flush_text(&mut text, &mut segments);
    }
    return segments;
}

/// Extract the trimmed bodies of all `<status>...</status>` tags.
pub fn status_messages(markdown: &str) -> Vec<String> {
    return STATUS_TAG
        .captures_iter(markdown)
        .filter_map(|cap| return cap.get(1))
        .map(|m| return m.as_str().trim().to_string())
        .collect();
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn splits_text_code_text() {
        let segments = scan("Hello\n```tsx{filename=App.tsx}\nconst x = 1;\n```\nDone");
        assert_eq!(segments.len(), 3);

        assert_eq!(segments[0].kind, SegmentKind::Text);
        assert_eq!(segments[0].content, "Hello");

        assert_eq!(segments[1].kind, SegmentKind::CodeComplete);
        assert_eq!(segments[1].language, "tsx");
        assert_eq!(segments[1].fence_tag, "tsx{filename=App.tsx}");
        assert_eq!(
            segments[1].filename,
            Some(Filename { extension: "tsx".into(), name: "App".into() })
        );
        assert_eq!(segments[1].content, "const x = 1;");

        assert_eq!(segments[2].kind, SegmentKind::Text);
        assert_eq!(segments[2].content, "Done");
    }

    #[test]
    fn unterminated_fence_is_streaming() {
        let segments = scan("```tsx\nconst x = ");
        assert_eq!(segments.len(), 1);
        let only = &segments[0];
        assert_eq!(only.kind, SegmentKind::CodeStreaming);
        assert_eq!(only.content, "const x = ");
        assert_eq!(only.language, "tsx");
        assert_eq!(only.filename.as_ref().map(Filename::joined).as_deref(), Some("file1.tsx"));
    }

    #[test]
    fn no_fence_is_one_text_segment() {
        let input = "just prose\nover two lines\n";
        let segments = scan(input);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Text);
        assert_eq!(segments[0].content, input);
    }

    #[test]
    fn empty_input_has_no_segments() {
        assert!(scan("").is_empty());
    }

    #[test]
    fn later_fences_fold_into_text() {
        let input = "```js\na\n```\nmiddle\n```css\nb\n```";
        let segments = scan(input);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].kind, SegmentKind::Text);
        assert_eq!(segments[1].content, "middle\n```css\nb\n```");
    }

    #[test]
    fn reconstruct_reproduces_input() {
        let inputs = [
            "",
            "\n",
            "plain",
            "Hello\n```tsx{filename=App.tsx}\nconst x = 1;\n```\nDone",
            "```tsx",
            "```tsx\n",
            "```\n```",
            "```\n\n```",
            "a\n```py\nprint(1)\n```",
            "a\n```py\nprint(1)\n```\n",
            "```js\n```ts\nnested tag\n```\n```js\nsecond\n```\ntail",
            "windows\r\n```js\r\nx\r\n```\r\n",
            "```\n``` ",
            "```\n``` \n",
            "a\n```js\nx\n```  \nafter",
        ];
        for input in inputs {
            assert_eq!(reconstruct(&scan(input)), input, "round trip of {input:?}");
        }
    }

    #[test]
    fn closing_fence_keeps_trailing_text() {
        let segments = scan("```js\r\nx\r\n```\r\nnext");
        assert_eq!(segments[0].kind, SegmentKind::CodeComplete);
        assert_eq!(segments[0].closing_tag, "\r");
        assert_eq!(segments[0].content, "x\r");
        assert_eq!(segments[1].closing_tag, "");
    }

    #[test]
    fn primary_block_reports_generating_state() {
        let done = primary_block("```py\nprint(1)\n```").unwrap();
        assert!(!done.generating);
        assert_eq!(done.block.code, "print(1)");

        let live = primary_block("Working on it\n```py\nprint(").unwrap();
        assert!(live.generating);
        assert_eq!(live.block.filename.joined(), "file1.py");

        assert!(primary_block("no code here").is_none());
    }

    #[test]
    fn extracts_status_messages() {
        let input = "<status>Planning</status>\ntext <status>\n  Writing App.tsx \n</status>";
        assert_eq!(status_messages(input), vec!["Planning", "Writing App.tsx"]);
    }
}
