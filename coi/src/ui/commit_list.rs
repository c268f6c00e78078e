//! Rows of the commit list view.
//!
//! Each row shows the short id, the summary, and the author with the number
//! of surviving paths. Once any pull request is known, every row starts with
//! a `#N` (or `??`) column. Only the visible window is built.

use coi_core::{ClassifiedCommit, PullRequests};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::session::ReviewSession;
use crate::theme::Theme;

/// Builds the visible rows; the selected one carries the selection style.
pub fn visible_rows(
    session: &ReviewSession,
    theme: &Theme,
    viewport: usize,
) -> Vec<Line<'static>> {
    let commits = session.commits().commits();
    let pulls = session.commits().pull_requests();
    let start = session.list_offset().min(commits.len());
    let end = (start + viewport).min(commits.len());

    commits[start..end]
        .iter()
        .enumerate()
        .map(|(row, commit)| {
            let line = commit_row(commit, pulls, theme);
            if start + row == session.selected() {
                line.style(
                    Style::default()
                        .bg(theme.selection_bg)
                        .fg(theme.selection_fg)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                line
            }
        })
        .collect()
}

fn commit_row(commit: &ClassifiedCommit, pulls: &PullRequests, theme: &Theme) -> Line<'static> {
    let meta = commit.meta();
    let files = commit.surviving().len();
    let noun = if files == 1 { "file" } else { "files" };
    let mut spans = Vec::with_capacity(5);
    if !pulls.is_empty() {
        let label = pulls.label(&meta.id);
        let width = pulls.label_width();
        spans.push(Span::styled(
            format!("{label:<width$} "),
            Style::default().fg(theme.pull_request),
        ));
    }
    spans.extend([
        Span::styled(meta.id.short().to_owned(), Style::default().fg(theme.commit_id)),
        Span::raw("  "),
        Span::raw(meta.summary.clone()),
        Span::styled(
            format!("  ({}, {files} {noun})", meta.author),
            Style::default().fg(theme.commit_meta),
        ),
    ]);
    Line::from(spans)
}
