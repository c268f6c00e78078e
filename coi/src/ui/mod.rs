//! UI rendering module for coi.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. It records the viewport and help overlay
//! heights, asks the pure [`view::build_screen`] for a [`view::Screen`], and
//! paints it. Layout arithmetic lives in `layout.rs`.

mod commit_list;
mod diff_view;
mod layout;
pub mod help;
pub mod keybindings;
pub mod view;

use ratatui::{Frame, style::Style, widgets::Paragraph};

use crate::app::App;
use crate::session::ViewMode;
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, panel_block, render_status_bar};

/// Renders one complete frame: the main panel, the status bar, and the help
/// overlay when it is open.
///
/// Called exactly once per `AppEvent::Render`. The viewport height is written
/// back into the session before the screen is built, so scroll distances for
/// the next keypress match what is on screen.
pub fn render(frame: &mut Frame, app: &mut App, theme: &Theme) {
    let [main, status_bar] = compute_layout(frame);
    let viewport = usize::from(inner_rect(main).height).max(1);
    if let Some(session) = app.session_mut() {
        session.set_viewport_height(viewport);
        session.set_help_height(help::visible_rows(frame.area()));
    }

    let screen = view::build_screen(app, theme, viewport);

    let reading = app.session().is_some_and(|s| s.mode() == ViewMode::Diff);
    let block = panel_block(&screen.title, reading, theme);
    frame.render_widget(
        Paragraph::new(screen.body)
            .block(block)
            .style(Style::default().bg(theme.background)),
        main,
    );

    render_status_bar(frame, status_bar, screen.status, theme);

    if let Some(scroll) = screen.help {
        help::render_help_overlay(frame, theme, scroll);
    }
}
