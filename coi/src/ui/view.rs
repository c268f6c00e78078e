//! Pure mapping from application state to a [`Screen`].
//!
//! Nothing here touches the terminal, so every view can be checked in tests
//! by comparing plain text.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::app::{App, Stage, SPINNER};
use crate::session::{ReviewSession, ViewMode};
use crate::theme::Theme;
use crate::ui::{commit_list, diff_view};

/// Everything one frame shows.
#[derive(Debug, Clone)]
pub struct Screen {
    /// Title of the main panel.
    pub title: String,
    /// Visible rows of the main panel, already sliced to the viewport.
    pub body: Vec<Line<'static>>,
    pub status: Line<'static>,
    /// Scroll offset of the help overlay, when it is open.
    pub help: Option<usize>,
}

/// Builds the screen for `viewport` body rows.
pub fn build_screen(app: &App, theme: &Theme, viewport: usize) -> Screen {
    match &app.stage {
        Stage::Loading(progress) => {
            let spinner = SPINNER[app.spinner % SPINNER.len()];
            let mut body = vec![
                Line::raw(format!(
                    "{spinner} Looking for commits of interest since {}",
                    app.base
                )),
                Line::raw(format!(
                    "  {}/{} commits scanned, {} of interest",
                    progress.scanned, progress.total, progress.interesting
                )),
            ];
            if app.looking_up_pulls {
                body.push(Line::raw("  looking up pull requests with gh"));
            }
            body.push(Line::raw(""));
            body.push(Line::styled("Press q to abort", Style::default().fg(theme.muted)));
            Screen {
                title: format!(" Scanning {}..HEAD ", app.base),
                body,
                status: status_line(
                    app,
                    theme,
                    " LOADING ",
                    theme.status_mode_list,
                    Vec::new(),
                    false,
                ),
                help: None,
            }
        }
        Stage::Review(session) if session.is_empty() => Screen {
            title: " Commits of interest (0) ".to_owned(),
            body: vec![
                Line::styled(
                    format!("No commits of interest between {} and HEAD", app.base),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Line::raw(format!(
                    "{} commits scanned; every change touched filtered paths only.",
                    session.commits().scanned()
                )),
                Line::raw(""),
                Line::styled("Press q to quit", Style::default().fg(theme.muted)),
            ],
            status: status_line(app, theme, " EMPTY ", theme.status_mode_list, Vec::new(), false),
            help: None,
        },
        Stage::Review(session) => match session.mode() {
            ViewMode::List => list_screen(app, session, theme, viewport),
            ViewMode::Diff => diff_screen(app, session, theme, viewport),
        },
    }
}

fn list_screen(app: &App, session: &ReviewSession, theme: &Theme, viewport: usize) -> Screen {
    let body = commit_list::visible_rows(session, theme, viewport);
    let position = position_spans(session);
    Screen {
        title: format!(
            " Commits of interest since {} ({}) ",
            app.base,
            session.commits().len()
        ),
        body,
        status: status_line(app, theme, " LIST ", theme.status_mode_list, position, true),
        help: session.help_scroll(),
    }
}

fn diff_screen(app: &App, session: &ReviewSession, theme: &Theme, viewport: usize) -> Screen {
    let title = match session.selected_commit() {
        Some(commit) => format!(
            " {} {} ({} of {} paths) ",
            commit.id().short(),
            commit.meta().summary,
            commit.surviving().len(),
            commit.commit().changes.len()
        ),
        None => String::new(),
    };

    let mut extra = position_spans(session);
    if let Some(total) = diff_view::total_lines(session) {
        let first = if total == 0 { 0 } else { session.scroll() + 1 };
        extra.push(Span::raw(format!(" line {first}/{total} ")));
    }
    let unavailable = diff_view::unavailable_paths(session);
    if unavailable > 0 {
        extra.push(Span::styled(
            format!(" {unavailable} path(s) unavailable "),
            Style::default().fg(theme.error),
        ));
    }

    Screen {
        title,
        body: diff_view::visible_lines(session, theme, viewport),
        status: status_line(app, theme, " DIFF ", theme.status_mode_diff, extra, true),
        help: session.help_scroll(),
    }
}

fn position_spans(session: &ReviewSession) -> Vec<Span<'static>> {
    vec![
        Span::raw(format!(
            " {}/{} ",
            session.selected() + 1,
            session.commits().len()
        )),
        Span::raw(format!("({} scanned) ", session.commits().scanned())),
    ]
}

fn status_line(
    app: &App,
    theme: &Theme,
    mode: &'static str,
    mode_fg: ratatui::style::Color,
    extra: Vec<Span<'static>>,
    help_hint: bool,
) -> Line<'static> {
    let mut spans = vec![Span::styled(
        mode,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];
    spans.extend(extra);
    for warning in &app.warnings {
        spans.push(Span::styled(
            format!(" ⚠ {warning} "),
            Style::default().fg(theme.warning),
        ));
    }
    // Loading and empty screens have no help overlay to open.
    if help_hint {
        spans.push(Span::styled(" ? help ", Style::default().fg(theme.muted)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::types::GitEvent;
    use crate::session::tests::{commits, diff_with};
    use crate::session::{Command, ScrollAmount};
    use coi_core::{Progress, PullRequests};

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn body(screen: &Screen) -> Vec<String> {
        screen.body.iter().map(text).collect()
    }

    fn review(n: usize, viewport: usize) -> App {
        let mut app = App::new("v1.2.0", Vec::new());
        app.apply_git_event(GitEvent::Materialized(Ok(commits(n))));
        if let Some(session) = app.session_mut() {
            session.set_viewport_height(viewport);
        }
        app
    }

    #[test]
    fn loading_screen_shows_progress() {
        let mut app = App::new("v1.2.0", Vec::new());
        app.apply_git_event(GitEvent::Progress(Progress { scanned: 4, total: 10, interesting: 2 }));
        let screen = build_screen(&app, &Theme::dark(), 20);

        assert_eq!(
            body(&screen),
            vec![
                "| Looking for commits of interest since v1.2.0",
                "  4/10 commits scanned, 2 of interest",
                "",
                "Press q to abort",
            ]
        );
        assert!(text(&screen.status).starts_with(" LOADING "));
        assert!(!text(&screen.status).contains("? help"));
    }

    #[test]
    fn loading_screen_mentions_pull_request_lookup() {
        let mut app = App::new("v1.2.0", Vec::new());
        app.apply_git_event(GitEvent::LookingUpPullRequests);
        let screen = build_screen(&app, &Theme::dark(), 20);
        assert_eq!(body(&screen)[2], "  looking up pull requests with gh");
        assert_eq!(body(&screen)[4], "Press q to abort");
    }

    #[test]
    fn empty_list_has_explicit_message() {
        let app = review(0, 20);
        let screen = build_screen(&app, &Theme::dark(), 20);
        assert_eq!(body(&screen)[0], "No commits of interest between v1.2.0 and HEAD");
        assert_eq!(body(&screen)[3], "Press q to quit");
        assert!(!text(&screen.status).contains("? help"));
    }

    #[test]
    fn list_rows_are_windowed_around_selection() {
        let mut app = review(6, 3);
        app.handle_command(Command::Down(ScrollAmount::Line(4)));
        let screen = build_screen(&app, &Theme::dark(), 3);

        assert_eq!(
            body(&screen),
            vec![
                "0000002  Change number 2  (Ada, 1 file)",
                "0000003  Change number 3  (Ada, 1 file)",
                "0000004  Change number 4  (Ada, 1 file)",
            ]
        );
        let highlighted: Vec<bool> = screen
            .body
            .iter()
            .map(|line| line.style.bg == Some(Theme::dark().selection_bg))
            .collect();
        assert_eq!(highlighted, vec![false, false, true]);
        assert_eq!(screen.title, " Commits of interest since v1.2.0 (6) ");
        assert!(text(&screen.status).starts_with(" LIST  5/6 (6 scanned) "));
        assert!(text(&screen.status).ends_with(" ? help "));
    }

    #[test]
    fn list_rows_carry_pull_request_column() {
        let mut list = commits(3);
        let ids: Vec<_> = list.commits().iter().map(|c| c.id().clone()).collect();
        list.annotate(PullRequests::from_iter([(ids[0].clone(), 7), (ids[2].clone(), 1234)]));
        let mut app = App::new("v1.2.0", Vec::new());
        app.apply_git_event(GitEvent::Materialized(Ok(list)));
        if let Some(session) = app.session_mut() {
            session.set_viewport_height(5);
        }
        let screen = build_screen(&app, &Theme::dark(), 5);

        assert_eq!(
            body(&screen),
            vec![
                "#7    0000000  Change number 0  (Ada, 1 file)",
                "??    0000001  Change number 1  (Ada, 1 file)",
                "#1234 0000002  Change number 2  (Ada, 1 file)",
            ]
        );
    }

    #[test]
    fn diff_view_slices_cached_lines() {
        let mut app = review(2, 4);
        app.handle_command(Command::Open);
        app.apply_git_event(GitEvent::DiffLoaded { index: 0, diff: Ok(diff_with(10, &[0])) });
        app.handle_command(Command::Down(ScrollAmount::Line(2)));
        let screen = build_screen(&app, &Theme::dark(), 4);

        assert_eq!(body(&screen), vec!["line 2", "line 3", "line 4", "line 5"]);
        assert_eq!(screen.title, " 0000000 Change number 0 (1 of 2 paths) ");
        assert!(text(&screen.status).contains(" line 3/10 "));
    }

    #[test]
    fn diff_view_placeholders() {
        let mut app = review(2, 4);
        app.handle_command(Command::Open);
        let loading = build_screen(&app, &Theme::dark(), 4);
        assert_eq!(body(&loading), vec!["Loading diff..."]);

        app.apply_git_event(GitEvent::DiffLoaded { index: 0, diff: Err("bad object".to_owned()) });
        let failed = build_screen(&app, &Theme::dark(), 4);
        assert_eq!(body(&failed), vec!["⚠ content unavailable: bad object"]);
    }

    #[test]
    fn warnings_appear_in_status_line() {
        let mut app = App::new("v1.2.0", vec!["config.toml: bad order".to_owned()]);
        app.apply_git_event(GitEvent::Materialized(Ok(commits(1))));
        let screen = build_screen(&app, &Theme::dark(), 5);
        assert!(text(&screen.status).contains("⚠ config.toml: bad order"));
    }

    #[test]
    fn help_overlay_is_reported() {
        let mut app = review(1, 5);
        app.handle_command(Command::ToggleHelp);
        assert_eq!(build_screen(&app, &Theme::dark(), 5).help, Some(0));
    }
}
