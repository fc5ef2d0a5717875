use crate::dispatcher::ChatOutcome;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentStyle {
    Plain,
    /// Level 1 to 3.
    Heading(u8),
    Bold,
    Italic,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSegment {
    pub text: String,
    pub style: SegmentStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// The whole outcome as one plain segment.
    Plain,
    #[default]
    Markdown,
}

pub type LineLayout = Vec<Vec<(Range<usize>, SegmentStyle)>>;

const MAX_HEADING_LEVEL: u8 = 3;

/// Errors are never parsed as markdown.
pub fn render(outcome: &ChatOutcome, mode: RenderMode) -> Vec<RenderedSegment> {
    match (outcome, mode) {
        (ChatOutcome::Success(text), RenderMode::Markdown) => render_markdown(text),
        _ => {
            let mut segments = Vec::new();
            push(&mut segments, SegmentStyle::Plain, outcome.text());
            segments
        }
    }
}

/// Line-oriented markdown scan: code fences, `#` headings, and inline code,
/// bold and italic markers. Markers are dropped from the output text;
/// unmatched markers stay literal.
pub fn render_markdown(text: &str) -> Vec<RenderedSegment> {
    let mut segments = Vec::new();
    let mut in_code_block = false;
    let mut lines = text.split('\n').peekable();

    while let Some(raw) = lines.next() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let newline = if lines.peek().is_some() { "\n" } else { "" };

        if let Some(after_fence) = line.trim().strip_prefix("```") {
            if !in_code_block {
                if let Some(body) = one_line_code(after_fence) {
                    push(&mut segments, SegmentStyle::Code, body);
                    push(&mut segments, SegmentStyle::Plain, newline);
                } else {
                    in_code_block = true;
                }
                continue;
            }
            if after_fence.trim_start_matches('`').is_empty() {
                in_code_block = false;
                continue;
            }
        }

        if in_code_block {
            push(&mut segments, SegmentStyle::Code, line);
            push(&mut segments, SegmentStyle::Code, newline);
            continue;
        }

        if let Some((level, title)) = heading(line) {
            push(&mut segments, SegmentStyle::Heading(level), title);
        } else {
            scan_inline(line, &mut segments);
        }
        push(&mut segments, SegmentStyle::Plain, newline);
    }

    segments
}

pub fn display_text(segments: &[RenderedSegment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Splits segments into per-line style runs with byte ranges relative to the
/// start of each line of [`display_text`].
pub fn line_layout(segments: &[RenderedSegment]) -> LineLayout {
    let mut lines = vec![Vec::new()];
    let mut column = 0;

    for segment in segments {
        let mut pieces = segment.text.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                if let Some(current) = lines.last_mut() {
                    current.push((column..column + piece.len(), segment.style));
                }
                column += piece.len();
            }
            if pieces.peek().is_some() {
                lines.push(Vec::new());
                column = 0;
            }
        }
    }

    lines
}

fn push(segments: &mut Vec<RenderedSegment>, style: SegmentStyle, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => segments.push(RenderedSegment {
            text: text.to_string(),
            style,
        }),
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(' ') {
        return None;
    }
    let level = (hashes as u8).min(MAX_HEADING_LEVEL);
    Some((level, rest.trim()))
}

/// "```ls -la```" on its own line is a code span, not a fence.
fn one_line_code(after_fence: &str) -> Option<&str> {
    let body = after_fence.strip_suffix("```")?.trim();
    (!body.is_empty() && !body.contains("```")).then_some(body)
}

fn marker_at(line: &str, at: usize) -> Option<(&'static str, SegmentStyle)> {
    let rest = &line[at..];
    let after_word = line[..at]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric());

    if rest.starts_with("```") {
        Some(("```", SegmentStyle::Code))
    } else if rest.starts_with('`') {
        Some(("`", SegmentStyle::Code))
    } else if rest.starts_with("**") {
        Some(("**", SegmentStyle::Bold))
    } else if rest.starts_with('*') {
        Some(("*", SegmentStyle::Italic))
    } else if after_word {
        // `snake_case_names` stay literal.
        None
    } else if rest.starts_with("__") {
        Some(("__", SegmentStyle::Bold))
    } else if rest.starts_with('_') {
        Some(("_", SegmentStyle::Italic))
    } else {
        None
    }
}

/// Finds the closing `marker` for a body starting at `body_start`. The body
/// must be non-empty and must not start or end with whitespace. A single
/// character marker never closes inside a longer run, so `*a **b** c*`
/// closes at the last star.
fn closing_marker(line: &str, body_start: usize, marker: &str) -> Option<usize> {
    let body = &line[body_start..];
    if body.starts_with(char::is_whitespace) {
        return None;
    }

    let mut from = 0;
    while let Some(rel) = body[from..].find(marker) {
        let end = from + rel;
        let run = if marker.len() == 1 {
            body[end..].bytes().take_while(|&b| b == marker.as_bytes()[0]).count()
        } else {
            marker.len()
        };
        if run == marker.len() && end > 0 && !body[..end].ends_with(char::is_whitespace) {
            return Some(body_start + end);
        }
        from = end + run;
    }
    None
}

fn scan_inline(line: &str, segments: &mut Vec<RenderedSegment>) {
    let mut plain_start = 0;
    let mut i = 0;

    while i < line.len() {
        if let Some((marker, style)) = marker_at(line, i) {
            let body_start = i + marker.len();
            match closing_marker(line, body_start, marker) {
                Some(body_end) => {
                    push(segments, SegmentStyle::Plain, &line[plain_start..i]);
                    let body = &line[body_start..body_end];
                    if style == SegmentStyle::Code {
                        push(segments, style, body);
                    } else {
                        // Nested emphasis keeps its own style; the rest takes the outer one.
                        let mut inner = Vec::new();
                        scan_inline(body, &mut inner);
                        for segment in inner {
                            let nested = match segment.style {
                                SegmentStyle::Plain => style,
                                other => other,
                            };
                            push(segments, nested, &segment.text);
                        }
                    }
                    i = body_end + marker.len();
                    plain_start = i;
                }
                None => i = body_start,
            }
            continue;
        }
        i += line[i..].chars().next().map_or(1, char::len_utf8);
    }

    push(segments, SegmentStyle::Plain, &line[plain_start..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seg(text: &str, style: SegmentStyle) -> RenderedSegment {
        RenderedSegment {
            text: text.to_string(),
            style,
        }
    }

    #[test]
    fn plain_mode_is_one_segment() {
        let outcome = ChatOutcome::Success("# Title\n**bold** and `code`".to_string());
        assert_eq!(
            render(&outcome, RenderMode::Plain),
            vec![seg("# Title\n**bold** and `code`", SegmentStyle::Plain)]
        );
    }

    #[test]
    fn failures_stay_plain() {
        let outcome = ChatOutcome::Failure("Error 400: **bad** request".to_string());
        assert_eq!(
            render(&outcome, RenderMode::Markdown),
            vec![seg("Error 400: **bad** request", SegmentStyle::Plain)]
        );
    }

    #[test]
    fn empty_outcome_has_no_segments() {
        let outcome = ChatOutcome::Success(String::new());
        assert!(render(&outcome, RenderMode::Plain).is_empty());
        assert!(render(&outcome, RenderMode::Markdown).is_empty());
    }

    #[test]
    fn headings() {
        assert_eq!(
            render_markdown("# One\n## Two\n### Three\n#### Four\n#nope"),
            vec![
                seg("One", SegmentStyle::Heading(1)),
                seg("\n", SegmentStyle::Plain),
                seg("Two", SegmentStyle::Heading(2)),
                seg("\n", SegmentStyle::Plain),
                seg("Three", SegmentStyle::Heading(3)),
                seg("\n", SegmentStyle::Plain),
                seg("Four", SegmentStyle::Heading(3)),
                seg("\n#nope", SegmentStyle::Plain),
            ]
        );
    }

    #[test]
    fn code_fences_drop_fence_lines() {
        let text = "Run this:\n```rust\nfn main() {}\n  let x = 1;\n```\nDone.";
        assert_eq!(
            render_markdown(text),
            vec![
                seg("Run this:\n", SegmentStyle::Plain),
                seg("fn main() {}\n  let x = 1;\n", SegmentStyle::Code),
                seg("Done.", SegmentStyle::Plain),
            ]
        );
    }

    #[test]
    fn markers_inside_code_blocks_are_literal() {
        assert_eq!(
            render_markdown("```\n# not a heading **x**\n```"),
            vec![seg("# not a heading **x**\n", SegmentStyle::Code)]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_the_end() {
        assert_eq!(
            render_markdown("```\nlet a = 1;"),
            vec![seg("let a = 1;", SegmentStyle::Code)]
        );
    }

    #[test]
    fn inline_markers() {
        assert_eq!(
            render_markdown("Use `cargo` with **care** and *style*, __really__ _now_."),
            vec![
                seg("Use ", SegmentStyle::Plain),
                seg("cargo", SegmentStyle::Code),
                seg(" with ", SegmentStyle::Plain),
                seg("care", SegmentStyle::Bold),
                seg(" and ", SegmentStyle::Plain),
                seg("style", SegmentStyle::Italic),
                seg(", ", SegmentStyle::Plain),
                seg("really", SegmentStyle::Bold),
                seg(" ", SegmentStyle::Plain),
                seg("now", SegmentStyle::Italic),
                seg(".", SegmentStyle::Plain),
            ]
        );
    }

    #[test]
    fn triple_backtick_spans_keep_their_text() {
        let segments = render_markdown("Run ```ls -la``` now\n```ls -la```\nafter");
        assert_eq!(display_text(&segments), "Run ls -la now\nls -la\nafter");
        assert_eq!(
            segments,
            vec![
                seg("Run ", SegmentStyle::Plain),
                seg("ls -la", SegmentStyle::Code),
                seg(" now\n", SegmentStyle::Plain),
                seg("ls -la", SegmentStyle::Code),
                seg("\nafter", SegmentStyle::Plain),
            ]
        );
    }

    #[test]
    fn fence_line_with_text_inside_a_block_is_code() {
        assert_eq!(
            render_markdown("```\n```not a close\n```\nout"),
            vec![
                seg("```not a close\n", SegmentStyle::Code),
                seg("out", SegmentStyle::Plain),
            ]
        );
    }

    #[test]
    fn nested_emphasis() {
        assert_eq!(
            render_markdown("*a **b** c*"),
            vec![
                seg("a ", SegmentStyle::Italic),
                seg("b", SegmentStyle::Bold),
                seg(" c", SegmentStyle::Italic),
            ]
        );
        assert_eq!(
            render_markdown("**bold *it* bold**"),
            vec![
                seg("bold ", SegmentStyle::Bold),
                seg("it", SegmentStyle::Italic),
                seg(" bold", SegmentStyle::Bold),
            ]
        );
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(
            render_markdown("2 * 3 = 6, a ** b, `open, ****"),
            vec![seg("2 * 3 = 6, a ** b, `open, ****", SegmentStyle::Plain)]
        );
    }

    #[test]
    fn snake_case_is_not_italic() {
        assert_eq!(
            render_markdown("call my_long_function_name now"),
            vec![seg("call my_long_function_name now", SegmentStyle::Plain)]
        );
    }

    #[test]
    fn multibyte_text_around_markers() {
        assert_eq!(
            render_markdown("héllo **wörld** ✓"),
            vec![
                seg("héllo ", SegmentStyle::Plain),
                seg("wörld", SegmentStyle::Bold),
                seg(" ✓", SegmentStyle::Plain),
            ]
        );
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(
            render_markdown("## Hi\r\nthere"),
            vec![
                seg("Hi", SegmentStyle::Heading(2)),
                seg("\nthere", SegmentStyle::Plain),
            ]
        );
    }

    #[test]
    fn layout_follows_display_lines() {
        let segments = render_markdown("# Title\nsome **bold** text\n```\ncode\n```");
        let text = display_text(&segments);
        assert_eq!(text, "Title\nsome bold text\ncode\n");

        let layout = line_layout(&segments);
        assert_eq!(
            layout,
            vec![
                vec![(0..5, SegmentStyle::Heading(1))],
                vec![
                    (0..5, SegmentStyle::Plain),
                    (5..9, SegmentStyle::Bold),
                    (9..14, SegmentStyle::Plain),
                ],
                vec![(0..4, SegmentStyle::Code)],
                vec![],
            ]
        );
        assert_eq!(layout.len(), text.split('\n').count());
    }
}
