//! Turns raw per-path hunk text into pre-highlighted diff lines.
//!
//! Runs on the git worker thread so the renderer only ever slices ready-made
//! `Line<'static>` values. Code is highlighted with `syntect`; consecutive
//! `-`/`+` pairs additionally get word-level emphasis from `similar`.

use std::sync::LazyLock;

use coi_core::ChangedPath;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use similar::{ChangeTag, TextDiff};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntaxTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::git::types::DiffContent;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Forces the lazy syntax and theme sets to load.
///
/// Called once when the worker starts so the first diff is not slowed down.
pub fn warm_up() {
    let _ = &*PS;
    let _ = &*TS;
}

/// One parsed line of hunk text.
struct HunkLine<'a> {
    /// `'+'`, `'-'`, `' '`, `'H'` (hunk header) or `'\\'` (other marker).
    origin: char,
    code: &'a str,
}

fn parse_hunk_text(text: &str) -> Vec<HunkLine<'_>> {
    text.lines()
        .map(|line| {
            if line.starts_with("@@") {
                HunkLine { origin: 'H', code: line }
            } else if let Some(code) = line.strip_prefix('+') {
                HunkLine { origin: '+', code }
            } else if let Some(code) = line.strip_prefix('-') {
                HunkLine { origin: '-', code }
            } else if let Some(code) = line.strip_prefix(' ') {
                HunkLine { origin: ' ', code }
            } else {
                HunkLine { origin: '\\', code: line }
            }
        })
        .collect()
}

/// Builds the highlighted diff of one commit from its per-path hunk text.
///
/// Each path gets a header line; paths whose content is unavailable get an
/// inline placeholder instead of hunks and are counted in `unavailable`.
pub fn render_commit_diff(sections: &[(ChangedPath, coi_core::Result<String>)]) -> DiffContent {
    let theme = TS.themes.get("base16-ocean.dark").or_else(|| TS.themes.values().next());
    let mut out = DiffContent::default();

    for (idx, (change, text)) in sections.iter().enumerate() {
        if idx > 0 {
            out.lines.push(Line::raw(""));
        }
        out.file_offsets.push(out.lines.len());
        out.lines.push(file_header(change));

        match text {
            Ok(text) if text.trim().is_empty() => {
                out.lines.push(Line::styled(
                    "  (no textual changes)",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Ok(text) => {
                let syntax = PS
                    .find_syntax_by_extension(file_ext(&change.path))
                    .unwrap_or_else(|| PS.find_syntax_plain_text());
                highlight_hunks(&parse_hunk_text(text), syntax, theme, &mut out);
            }
            Err(err) => {
                out.unavailable += 1;
                out.lines.push(Line::styled(
                    format!("  ⚠ {err}"),
                    Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
                ));
            }
        }
    }

    out
}

fn file_header(change: &ChangedPath) -> Line<'static> {
    let badge_color = match change.kind.badge() {
        'A' => Color::Green,
        'D' => Color::Red,
        'R' => Color::Cyan,
        _ => Color::Yellow,
    };
    Line::from(vec![
        Span::styled(
            format!("[{}] ", change.kind.badge()),
            Style::default().fg(badge_color),
        ),
        Span::styled(
            change.display(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Converts a syntect (Style, &str) pair to an owned ratatui Span.
///
/// Rebuilds color and modifier fields by hand so no adapter crate has to agree
/// with this crate's ratatui version.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    use syntect::highlighting::Color as SC;
    use syntect::highlighting::FontStyle;
    let to_color = |c: SC| -> Option<Color> {
        if c.a > 0 { Some(Color::Rgb(c.r, c.g, c.b)) } else { None }
    };
    let mut ratatui_style = Style::default();
    if let Some(fg) = to_color(style.foreground) {
        ratatui_style = ratatui_style.fg(fg);
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    Span::styled(content.to_owned(), ratatui_style)
}

/// Highlights a single line of code. Falls back to one plain span on error.
fn build_syntect_spans(code: &str, h: &mut HighlightLines, ps: &SyntaxSet) -> Vec<Span<'static>> {
    let ranges = h.highlight_line(code, ps).unwrap_or_default();
    let spans: Vec<Span<'static>> =
        ranges.into_iter().map(|(style, text)| syntect_to_span(style, text)).collect();
    if spans.is_empty() {
        vec![Span::raw(code.to_owned())]
    } else {
        spans
    }
}

/// Word-level spans for a removed/added line pair; changed words are bold.
fn word_diff_spans(old_line: &str, new_line: &str) -> (Vec<Span<'static>>, Vec<Span<'static>>) {
    let diff = TextDiff::from_words(old_line, new_line);
    let mut old_spans: Vec<Span<'static>> = Vec::new();
    let mut new_spans: Vec<Span<'static>> = Vec::new();

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            for (emphasized, value) in change.iter_strings_lossy() {
                let text = value.into_owned();
                match change.tag() {
                    ChangeTag::Delete => {
                        let style = if emphasized {
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Red)
                        };
                        old_spans.push(Span::styled(text, style));
                    }
                    ChangeTag::Insert => {
                        let style = if emphasized {
                            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Green)
                        };
                        new_spans.push(Span::styled(text, style));
                    }
                    ChangeTag::Equal => {
                        let span = Span::styled(text.clone(), Style::default().fg(Color::DarkGray));
                        old_spans.push(span.clone());
                        new_spans.push(span);
                    }
                }
            }
        }
    }
    (old_spans, new_spans)
}

fn prefixed(prefix: &'static str, color: Color, body: Vec<Span<'static>>) -> Line<'static> {
    let mut spans = vec![Span::styled(prefix, Style::default().fg(color))];
    spans.extend(body);
    Line::from(spans)
}

/// Appends the highlighted lines of one file's hunks to `out`.
fn highlight_hunks(
    lines: &[HunkLine<'_>],
    syntax: &SyntaxReference,
    theme: Option<&SyntaxTheme>,
    out: &mut DiffContent,
) {
    let Some(theme) = theme else {
        emit_plain_lines(lines, out);
        return;
    };
    let mut h = HighlightLines::new(syntax, theme);
    // A removed line waits here until we know whether an added line pairs with it.
    let mut pending_removed: Option<(&str, Vec<Span<'static>>)> = None;

    for line in lines {
        match line.origin {
            'H' => {
                if let Some((_, spans)) = pending_removed.take() {
                    out.lines.push(prefixed("- ", Color::Red, spans));
                }
                out.hunk_offsets.push(out.lines.len());
                out.lines.push(Line::styled(
                    line.code.to_owned(),
                    Style::default().fg(Color::Cyan),
                ));
                // Fresh highlighter per hunk: hunks are not contiguous code.
                h = HighlightLines::new(syntax, theme);
            }
            '-' => {
                if let Some((_, spans)) = pending_removed.take() {
                    out.lines.push(prefixed("- ", Color::Red, spans));
                }
                let spans = build_syntect_spans(line.code, &mut h, &PS);
                pending_removed = Some((line.code, spans));
            }
            '+' => {
                if let Some((old_code, _)) = pending_removed.take() {
                    let (old_words, new_words) = word_diff_spans(old_code, line.code);
                    out.lines.push(prefixed("- ", Color::Red, old_words));
                    out.lines.push(prefixed("+ ", Color::Green, new_words));
                } else {
                    let spans = build_syntect_spans(line.code, &mut h, &PS);
                    out.lines.push(prefixed("+ ", Color::Green, spans));
                }
            }
            origin => {
                if let Some((_, spans)) = pending_removed.take() {
                    out.lines.push(prefixed("- ", Color::Red, spans));
                }
                if origin == ' ' {
                    let spans = build_syntect_spans(line.code, &mut h, &PS);
                    out.lines.push(prefixed("  ", Color::DarkGray, spans));
                } else {
                    out.lines.push(Line::styled(
                        line.code.to_owned(),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    ));
                }
            }
        }
    }
    if let Some((_, spans)) = pending_removed.take() {
        out.lines.push(prefixed("- ", Color::Red, spans));
    }
}

/// Plain colored lines, used when the theme set is empty.
fn emit_plain_lines(lines: &[HunkLine<'_>], out: &mut DiffContent) {
    for line in lines {
        let color = match line.origin {
            '+' => Color::Green,
            '-' => Color::Red,
            'H' => Color::Cyan,
            _ => Color::DarkGray,
        };
        if line.origin == 'H' {
            out.hunk_offsets.push(out.lines.len());
        }
        let text = match line.origin {
            '+' | '-' => format!("{} {}", line.origin, line.code),
            'H' | '\\' => line.code.to_owned(),
            _ => format!("  {}", line.code),
        };
        out.lines.push(Line::styled(text, Style::default().fg(color)));
    }
}

/// Extension of a repository-relative path, or `"txt"` when there is none.
fn file_ext(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "txt",
    }
}
