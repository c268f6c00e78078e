//! Frame geometry: one bordered panel above a single status row.
//!
//! Recomputed inside every draw, so resizes need no bookkeeping.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Paragraph},
};

use crate::theme::Theme;

/// Splits the frame into `[panel, status]`.
pub fn compute_layout(frame: &Frame) -> [Rect; 2] {
    frame
        .area()
        .layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]))
}

/// Area left inside the panel border; its height is the scroll viewport.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Panel frame. The diff view uses the thick, highlighted border.
pub fn panel_block<'a>(title: &'a str, emphasized: bool, theme: &Theme) -> Block<'a> {
    let (border_type, color) = if emphasized {
        (BorderType::Thick, theme.border_active)
    } else {
        (BorderType::Rounded, theme.border_inactive)
    };
    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(Style::default().fg(color))
}

/// Paints the status row built by the view.
pub fn render_status_bar(frame: &mut Frame, area: Rect, status: Line<'static>, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(status)
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
