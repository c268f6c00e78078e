//! Body of the diff view.
//!
//! Lines are pre-highlighted by the git worker; the view only slices
//! `lines[scroll..scroll + viewport]`, so drawing is O(viewport) rather than
//! O(total lines) even for very large commits.

use ratatui::{
    style::{Modifier, Style},
    text::Line,
};

use crate::session::{DiffState, ReviewSession};
use crate::theme::Theme;

/// Builds the visible window of the selected commit's diff.
pub fn visible_lines(
    session: &ReviewSession,
    theme: &Theme,
    viewport: usize,
) -> Vec<Line<'static>> {
    match session.diff(session.selected()) {
        Some(DiffState::Ready(diff)) => {
            let total = diff.lines.len();
            let start = session.scroll().min(total);
            let end = (start + viewport).min(total);
            diff.lines[start..end].to_vec()
        }
        Some(DiffState::Failed(message)) => vec![Line::styled(
            format!("⚠ content unavailable: {message}"),
            Style::default().fg(theme.error).add_modifier(Modifier::ITALIC),
        )],
        Some(DiffState::Loading) | None => vec![Line::styled(
            "Loading diff...",
            Style::default().fg(theme.muted),
        )],
    }
}

/// Total line count of the selected diff, once it is loaded.
pub fn total_lines(session: &ReviewSession) -> Option<usize> {
    match session.diff(session.selected()) {
        Some(DiffState::Ready(diff)) => Some(diff.lines.len()),
        _ => None,
    }
}

/// Number of paths of the selected diff that could not be loaded.
pub fn unavailable_paths(session: &ReviewSession) -> usize {
    match session.diff(session.selected()) {
        Some(DiffState::Ready(diff)) => diff.unavailable,
        _ => 0,
    }
}
