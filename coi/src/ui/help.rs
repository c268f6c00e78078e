//! Help overlay renderer for coi.
//!
//! Draws a centred modal over the current view, using ratatui's `Clear` widget
//! to erase the background first. It is rendered inside the same
//! `terminal.draw()` closure as everything else, so no second draw is needed.
//!
//! Rows are clipped, never wrapped: one help line is one overlay row, so the
//! scroll bound is `HELP_LINE_COUNT - visible_rows`.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph},
};

use crate::theme::Theme;

/// Help text, one entry per row. Section titles have no leading spaces.
const HELP_LINES: &[&str] = &[
    "Commit list",
    "  j / k, Down / Up    Select next / previous commit",
    "  g / G               First / last commit",
    "  Ctrl-d / Ctrl-u     Move half a page",
    "  Enter / l / Right   Open the selected commit's diff",
    "",
    "Diff view",
    "  j / k, Down / Up    Scroll one line",
    "  Ctrl-d / Ctrl-u     Scroll half a page",
    "  Ctrl-f / Ctrl-b     Scroll a full page (also PageDown / PageUp)",
    "  g / G               Top / bottom of the diff",
    "  ] / [               Next / previous hunk",
    "  } / {               Next / previous file",
    "  n / p               Next / previous commit",
    "  h / Left / Esc      Back to the list",
    "",
    "General",
    "  Mouse wheel         Scroll three lines",
    "  ?                   Open / close this help",
    "  s                   Quit and write proposed_changelog.md",
    "  q / Ctrl-c          Quit (Esc quits from the list)",
    "",
    "Paths inside filtered components (tests, fixtures, ...) are hidden.",
    "Add components in .filtered_components.txt at the repository root.",
];

/// Number of rows in the help text; bounds the overlay scroll offset.
pub const HELP_LINE_COUNT: usize = HELP_LINES.len();

/// Where the overlay sits within `area`: as wide as the longest row and as
/// tall as the text, capped to 80% of the height and to the width of `area`.
pub fn overlay_area(area: Rect) -> Rect {
    let widest = HELP_LINES.iter().map(|row| row.len()).max().unwrap_or(0);
    let width = u16::try_from(widest + 2).unwrap_or(u16::MAX).min(area.width);
    let height = u16::try_from(HELP_LINE_COUNT + 2)
        .unwrap_or(u16::MAX)
        .min(area.height.saturating_mul(4) / 5);
    area.centered(Constraint::Length(width), Constraint::Length(height))
}

/// Help rows visible inside the overlay's border for a frame of `area`.
pub fn visible_rows(area: Rect) -> usize {
    usize::from(overlay_area(area).height.saturating_sub(2)).max(1)
}

/// Renders the help overlay as a centred modal, scrolled by `scroll` rows.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, scroll: usize) {
    let overlay_area = overlay_area(frame.area());
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  (j/k scroll, ? or Esc to dismiss) ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(help_text())
            .block(block)
            .style(Style::default().bg(theme.background))
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
        overlay_area,
    );
}

fn help_text() -> Text<'static> {
    Text::from(
        HELP_LINES
            .iter()
            .map(|&row| {
                if row.is_empty() || row.starts_with(' ') {
                    Line::from(row)
                } else {
                    Line::styled(row, Style::default().add_modifier(Modifier::BOLD))
                }
            })
            .collect::<Vec<_>>(),
    )
}
