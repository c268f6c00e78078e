//! Review session state machine.
//!
//! [`ReviewSession`] owns the commits of interest, the current selection, the
//! view mode and the per-commit scroll offsets. It is mutated only through
//! [`ReviewSession::handle`] (user commands) and [`ReviewSession::apply_diff`]
//! (completed diff fetches, merged by the main loop). No rendering and no I/O
//! happen here; side effects are requested by returning an [`Effect`].

use std::collections::HashMap;

use coi_core::{ClassifiedCommit, CommitsOfInterest};

use crate::git::types::DiffContent;
use crate::ui::help::HELP_LINE_COUNT;

/// Which view the session is showing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Browsing the list of commits of interest.
    #[default]
    List,
    /// Reading one commit's filtered diff.
    Diff,
}

/// How far a scroll or move command travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAmount {
    Line(usize),
    HalfPage,
    Page,
}

/// Logical commands produced by the key and mouse mapping.
///
/// `Down`/`Up` move the selection in the list and scroll the text in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Down(ScrollAmount),
    Up(ScrollAmount),
    Top,
    Bottom,
    Open,
    Back,
    /// `Esc`: back in the diff view or the help overlay, quit in the list.
    Escape,
    NextCommit,
    PrevCommit,
    NextHunk,
    PrevHunk,
    NextFile,
    PrevFile,
    ToggleHelp,
    /// Quit and write the proposed changelog afterwards.
    SaveChangelog,
    Quit,
}

/// Side effect requested by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Fetch the diffs of these commit indices; they are already marked loading.
    Fetch(Vec<usize>),
    Quit,
}

/// Cached diff of one commit.
#[derive(Debug, Clone)]
pub enum DiffState {
    Loading,
    Ready(DiffContent),
    /// The whole commit could not be loaded.
    Failed(String),
}

impl DiffState {
    /// Number of lines the diff view shows for this state.
    fn line_count(&self) -> usize {
        match self {
            DiffState::Ready(diff) => diff.lines.len(),
            DiffState::Loading | DiffState::Failed(_) => 1,
        }
    }
}

/// Interactive state of one review run.
#[derive(Debug)]
pub struct ReviewSession {
    commits: CommitsOfInterest,
    selected: usize,
    mode: ViewMode,
    /// Scroll offset per commit index, created on first visit.
    scroll: HashMap<usize, usize>,
    diffs: HashMap<usize, DiffState>,
    /// First visible row of the list view.
    list_offset: usize,
    /// Body rows available, recorded by the renderer after each draw.
    viewport_height: usize,
    /// Scroll offset of the help overlay while it is open.
    help: Option<usize>,
    /// Help rows the overlay shows, recorded by the renderer.
    help_height: usize,
    quit: bool,
    save_changelog: bool,
}

impl ReviewSession {
    pub fn new(commits: CommitsOfInterest) -> Self {
        Self {
            commits,
            selected: 0,
            mode: ViewMode::List,
            scroll: HashMap::new(),
            diffs: HashMap::new(),
            list_offset: 0,
            viewport_height: 1,
            help: None,
            help_height: 1,
            quit: false,
            save_changelog: false,
        }
    }

    pub fn commits(&self) -> &CommitsOfInterest {
        &self.commits
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Index of the selected commit; meaningless when the list is empty.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_commit(&self) -> Option<&ClassifiedCommit> {
        self.commits.get(self.selected)
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn list_offset(&self) -> usize {
        self.list_offset
    }

    /// Scroll offset of the selected commit's diff.
    pub fn scroll(&self) -> usize {
        self.scroll.get(&self.selected).copied().unwrap_or(0)
    }

    pub fn diff(&self, index: usize) -> Option<&DiffState> {
        self.diffs.get(&index)
    }

    pub fn help_scroll(&self) -> Option<usize> {
        self.help
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn wants_changelog(&self) -> bool {
        self.save_changelog
    }

    /// Records the number of body rows and re-clamps every offset to it.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.clamp_scroll(self.selected);
        self.keep_selection_visible();
    }

    /// Records the rows of the help overlay and re-clamps its offset.
    pub fn set_help_height(&mut self, height: usize) {
        self.help_height = height.max(1);
        let max = self.max_help_scroll();
        if let Some(offset) = self.help.as_mut() {
            *offset = (*offset).min(max);
        }
    }

    /// Applies one user command and returns the side effect it requires.
    pub fn handle(&mut self, command: Command) -> Effect {
        if self.quit {
            return Effect::None;
        }
        if matches!(command, Command::Quit) {
            return self.request_quit(false);
        }
        if self.commits.is_empty() {
            // The empty state accepts nothing but quit.
            return match command {
                Command::Escape => self.request_quit(false),
                _ => Effect::None,
            };
        }
        if let Some(offset) = self.help {
            return self.handle_help(command, offset);
        }
        match command {
            Command::ToggleHelp => {
                self.help = Some(0);
                Effect::None
            }
            Command::SaveChangelog => self.request_quit(true),
            _ => match self.mode {
                ViewMode::List => self.handle_list(command),
                ViewMode::Diff => self.handle_diff(command),
            },
        }
    }

    /// Merges a completed diff fetch.
    ///
    /// Results for commits that are not waiting on a fetch are stale and ignored.
    pub fn apply_diff(&mut self, index: usize, result: Result<DiffContent, String>) {
        if !matches!(self.diffs.get(&index), Some(DiffState::Loading)) {
            tracing::debug!(index, "ignoring stale diff result");
            return;
        }
        let state = match result {
            Ok(diff) => DiffState::Ready(diff),
            Err(message) => DiffState::Failed(message),
        };
        self.diffs.insert(index, state);
        self.clamp_scroll(index);
    }

    fn request_quit(&mut self, save_changelog: bool) -> Effect {
        self.quit = true;
        self.save_changelog = save_changelog;
        Effect::Quit
    }

    fn max_help_scroll(&self) -> usize {
        HELP_LINE_COUNT.saturating_sub(self.help_height)
    }

    fn handle_help(&mut self, command: Command, offset: usize) -> Effect {
        let max = self.max_help_scroll();
        let rows = self.help_height;
        let step = |amount| match amount {
            ScrollAmount::Line(n) => n,
            ScrollAmount::HalfPage => (rows / 2).max(1),
            ScrollAmount::Page => rows,
        };
        self.help = match command {
            Command::ToggleHelp | Command::Escape | Command::Back => None,
            Command::Down(amount) => Some(offset.saturating_add(step(amount)).min(max)),
            Command::Up(amount) => Some(offset.saturating_sub(step(amount))),
            Command::Top => Some(0),
            Command::Bottom => Some(max),
            _ => Some(offset),
        };
        Effect::None
    }

    fn handle_list(&mut self, command: Command) -> Effect {
        match command {
            Command::Down(amount) => {
                self.select(self.selected.saturating_add(self.distance(amount)));
            }
            Command::Up(amount) => {
                self.select(self.selected.saturating_sub(self.distance(amount)));
            }
            Command::NextCommit => self.select(self.selected.saturating_add(1)),
            Command::PrevCommit => self.select(self.selected.saturating_sub(1)),
            Command::Top => self.select(0),
            Command::Bottom => self.select(usize::MAX),
            Command::Open => {
                self.mode = ViewMode::Diff;
                return self.fetch_around_selection();
            }
            Command::Escape => return self.request_quit(false),
            _ => {}
        }
        Effect::None
    }

    fn handle_diff(&mut self, command: Command) -> Effect {
        match command {
            Command::Down(amount) => {
                let offset = self.scroll().saturating_add(self.distance(amount));
                self.set_scroll(offset);
            }
            Command::Up(amount) => {
                let offset = self.scroll().saturating_sub(self.distance(amount));
                self.set_scroll(offset);
            }
            Command::Top => self.set_scroll(0),
            Command::Bottom => self.set_scroll(usize::MAX),
            Command::NextHunk => self.jump(|diff| &diff.hunk_offsets, true),
            Command::PrevHunk => self.jump(|diff| &diff.hunk_offsets, false),
            Command::NextFile => self.jump(|diff| &diff.file_offsets, true),
            Command::PrevFile => self.jump(|diff| &diff.file_offsets, false),
            Command::NextCommit | Command::PrevCommit => {
                let before = self.selected;
                if command == Command::NextCommit {
                    self.select(self.selected.saturating_add(1));
                } else {
                    self.select(self.selected.saturating_sub(1));
                }
                if self.selected != before {
                    return self.fetch_around_selection();
                }
            }
            Command::Back | Command::Escape => self.mode = ViewMode::List,
            _ => {}
        }
        Effect::None
    }

    fn distance(&self, amount: ScrollAmount) -> usize {
        match amount {
            ScrollAmount::Line(n) => n,
            ScrollAmount::HalfPage => (self.viewport_height / 2).max(1),
            ScrollAmount::Page => self.viewport_height.max(1),
        }
    }

    /// Moves the selection, clamped to the list.
    fn select(&mut self, index: usize) {
        self.selected = index.min(self.commits.len().saturating_sub(1));
        self.keep_selection_visible();
    }

    fn keep_selection_visible(&mut self) {
        if self.selected < self.list_offset {
            self.list_offset = self.selected;
        } else if self.selected >= self.list_offset + self.viewport_height {
            self.list_offset = self.selected + 1 - self.viewport_height;
        }
    }

    /// Scrolls to the next (or previous) offset of the loaded diff, if any.
    fn jump(&mut self, offsets: fn(&DiffContent) -> &Vec<usize>, forward: bool) {
        let Some(DiffState::Ready(diff)) = self.diffs.get(&self.selected) else {
            return;
        };
        let current = self.scroll();
        let target = if forward {
            offsets(diff).iter().find(|&&o| o > current)
        } else {
            offsets(diff).iter().rev().find(|&&o| o < current)
        };
        if let Some(&target) = target {
            self.set_scroll(target);
        }
    }

    fn max_scroll(&self, index: usize) -> usize {
        let lines = self.diffs.get(&index).map_or(1, DiffState::line_count);
        lines.saturating_sub(self.viewport_height)
    }

    fn set_scroll(&mut self, offset: usize) {
        let offset = offset.min(self.max_scroll(self.selected));
        self.scroll.insert(self.selected, offset);
    }

    fn clamp_scroll(&mut self, index: usize) {
        let max = self.max_scroll(index);
        if let Some(offset) = self.scroll.get_mut(&index) {
            *offset = (*offset).min(max);
        }
    }

    /// Marks the selected commit and its neighbours as loading when not cached.
    fn fetch_around_selection(&mut self) -> Effect {
        self.scroll.entry(self.selected).or_insert(0);
        let first = self.selected.saturating_sub(1);
        let last = (self.selected + 1).min(self.commits.len() - 1);
        let wanted: Vec<usize> = (first..=last)
            .filter(|index| !self.diffs.contains_key(index))
            .collect();
        for &index in &wanted {
            self.diffs.insert(index, DiffState::Loading);
        }
        if wanted.is_empty() {
            Effect::None
        } else {
            Effect::Fetch(wanted)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use coi_core::classify::classify;
    use coi_core::{ChangeKind, ChangedPath, Commit, CommitId, CommitMeta, FilterSet};
    use ratatui::text::Line;

    pub(crate) fn commits(n: usize) -> CommitsOfInterest {
        let filters = FilterSet::defaults();
        let list = (0..n)
            .map(|i| {
                classify(
                    Commit {
                        meta: CommitMeta {
                            id: CommitId::new(format!("{i:07}abcdef")),
                            parents: Vec::new(),
                            author: "Ada".to_owned(),
                            timestamp: i as i64,
                            summary: format!("Change number {i}"),
                        },
                        changes: vec![
                            ChangedPath::new(format!("src/file{i}.rs"), ChangeKind::Modified),
                            ChangedPath::new("tests/it.rs", ChangeKind::Modified),
                        ],
                    },
                    &filters,
                )
            })
            .collect();
        CommitsOfInterest::new(list, Vec::new(), n)
    }

    pub(crate) fn diff_with(lines: usize, hunks: &[usize]) -> DiffContent {
        DiffContent {
            lines: (0..lines).map(|i| Line::raw(format!("line {i}"))).collect(),
            hunk_offsets: hunks.to_vec(),
            file_offsets: vec![0],
            unavailable: 0,
        }
    }

    fn session(n: usize) -> ReviewSession {
        let mut session = ReviewSession::new(commits(n));
        session.set_viewport_height(10);
        session
    }

    #[test]
    fn selection_clamps_to_list_bounds() {
        let mut s = session(3);
        s.handle(Command::Up(ScrollAmount::Line(1)));
        assert_eq!(s.selected(), 0);
        for _ in 0..10 {
            s.handle(Command::Down(ScrollAmount::Line(1)));
        }
        assert_eq!(s.selected(), 2);
        s.handle(Command::Top);
        assert_eq!(s.selected(), 0);
        s.handle(Command::Bottom);
        assert_eq!(s.selected(), 2);
        s.handle(Command::Down(ScrollAmount::Page));
        assert_eq!(s.selected(), 2);
    }

    #[test]
    fn empty_list_accepts_only_quit() {
        let mut s = session(0);
        for command in [
            Command::Down(ScrollAmount::Line(1)),
            Command::Open,
            Command::NextCommit,
            Command::ToggleHelp,
            Command::SaveChangelog,
        ] {
            assert_eq!(s.handle(command), Effect::None);
            assert_eq!(s.mode(), ViewMode::List);
            assert!(!s.should_quit());
        }
        assert_eq!(s.handle(Command::Quit), Effect::Quit);
        assert!(s.should_quit());
        assert!(!s.wants_changelog());
    }

    #[test]
    fn open_prefetches_neighbours_once() {
        let mut s = session(5);
        s.handle(Command::Down(ScrollAmount::Line(2)));
        assert_eq!(s.handle(Command::Open), Effect::Fetch(vec![1, 2, 3]));
        assert_eq!(s.mode(), ViewMode::Diff);
        assert!(matches!(s.diff(2), Some(DiffState::Loading)));

        // 1..=3 are cached; only 4 is new.
        assert_eq!(s.handle(Command::NextCommit), Effect::Fetch(vec![4]));
        assert_eq!(s.selected(), 3);
        assert_eq!(s.mode(), ViewMode::Diff);

        // Last commit: nothing new to fetch and selection does not move.
        s.handle(Command::NextCommit);
        assert_eq!(s.handle(Command::NextCommit), Effect::None);
        assert_eq!(s.selected(), 4);
    }

    #[test]
    fn open_then_back_preserves_selection() {
        let mut s = session(4);
        s.handle(Command::Down(ScrollAmount::Line(1)));
        s.handle(Command::Open);
        s.handle(Command::Back);
        assert_eq!(s.mode(), ViewMode::List);
        assert_eq!(s.selected(), 1);

        s.handle(Command::Open);
        s.handle(Command::Escape);
        assert_eq!(s.mode(), ViewMode::List);
        assert!(!s.should_quit(), "escape in the diff view goes back");
        assert_eq!(s.handle(Command::Escape), Effect::Quit);
    }

    #[test]
    fn diff_scroll_is_clamped_and_restored_per_commit() {
        let mut s = session(3);
        s.handle(Command::Open);
        s.apply_diff(0, Ok(diff_with(25, &[0, 12, 20])));
        s.apply_diff(1, Ok(diff_with(5, &[0])));

        s.handle(Command::Down(ScrollAmount::Page));
        assert_eq!(s.scroll(), 10);
        s.handle(Command::Bottom);
        assert_eq!(s.scroll(), 15, "25 lines in a 10 row viewport");

        s.handle(Command::NextCommit);
        assert_eq!(s.scroll(), 0);
        s.handle(Command::Down(ScrollAmount::Line(3)));
        assert_eq!(s.scroll(), 0, "5 lines fit without scrolling");

        s.handle(Command::PrevCommit);
        assert_eq!(s.scroll(), 15);
    }

    #[test]
    fn hunk_navigation_jumps_between_headers() {
        let mut s = session(1);
        s.handle(Command::Open);
        s.apply_diff(0, Ok(diff_with(40, &[0, 8, 30])));

        s.handle(Command::NextHunk);
        assert_eq!(s.scroll(), 8);
        s.handle(Command::NextHunk);
        assert_eq!(s.scroll(), 30);
        s.handle(Command::NextHunk);
        assert_eq!(s.scroll(), 30);
        s.handle(Command::PrevHunk);
        assert_eq!(s.scroll(), 8);
    }

    #[test]
    fn file_navigation_jumps_between_file_headers() {
        let mut s = session(1);
        s.handle(Command::Open);
        let mut diff = diff_with(50, &[1, 6, 16, 34]);
        diff.file_offsets = vec![0, 15, 33];
        s.apply_diff(0, Ok(diff));

        s.handle(Command::NextFile);
        assert_eq!(s.scroll(), 15);
        s.handle(Command::NextFile);
        assert_eq!(s.scroll(), 33);
        s.handle(Command::NextFile);
        assert_eq!(s.scroll(), 33);
        s.handle(Command::PrevHunk);
        assert_eq!(s.scroll(), 16);
        s.handle(Command::PrevFile);
        assert_eq!(s.scroll(), 15);
        s.handle(Command::PrevFile);
        assert_eq!(s.scroll(), 0);
    }

    #[test]
    fn file_jumps_wait_for_the_diff() {
        let mut s = session(1);
        s.handle(Command::Open);
        assert_eq!(s.handle(Command::NextFile), Effect::None);
        assert_eq!(s.scroll(), 0);
    }

    #[test]
    fn failed_and_stale_results() {
        let mut s = session(2);
        s.handle(Command::Open);
        s.apply_diff(0, Err("object not found".to_owned()));
        assert!(matches!(s.diff(0), Some(DiffState::Failed(m)) if m == "object not found"));

        // Never requested, so never merged.
        s.apply_diff(7, Ok(diff_with(3, &[])));
        assert!(s.diff(7).is_none());

        // Session stays usable after a failure.
        s.handle(Command::NextCommit);
        assert_eq!(s.selected(), 1);
    }

    #[test]
    fn help_overlay_swallows_navigation() {
        let mut s = session(3);
        s.handle(Command::ToggleHelp);
        assert_eq!(s.help_scroll(), Some(0));
        s.handle(Command::Down(ScrollAmount::Line(1)));
        assert_eq!(s.selected(), 0);
        assert_eq!(s.handle(Command::Open), Effect::None);
        assert_eq!(s.mode(), ViewMode::List);
        s.handle(Command::Escape);
        assert_eq!(s.help_scroll(), None);
        assert!(!s.should_quit());
    }

    #[test]
    fn help_scroll_is_bounded_by_the_overlay() {
        let mut s = session(3);
        s.set_viewport_height(40);
        s.set_help_height(HELP_LINE_COUNT - 4);
        s.handle(Command::ToggleHelp);

        s.handle(Command::Bottom);
        assert_eq!(s.help_scroll(), Some(4));
        s.handle(Command::Down(ScrollAmount::Page));
        assert_eq!(s.help_scroll(), Some(4));
        s.handle(Command::Up(ScrollAmount::Line(1)));
        assert_eq!(s.help_scroll(), Some(3));

        // The overlay grew tall enough to show every row.
        s.set_help_height(HELP_LINE_COUNT + 10);
        assert_eq!(s.help_scroll(), Some(0));
        s.handle(Command::Down(ScrollAmount::Line(1)));
        assert_eq!(s.help_scroll(), Some(0));
    }

    #[test]
    fn save_changelog_quits_with_flag() {
        let mut s = session(2);
        assert_eq!(s.handle(Command::SaveChangelog), Effect::Quit);
        assert!(s.should_quit());
        assert!(s.wants_changelog());
        assert_eq!(s.handle(Command::Down(ScrollAmount::Line(1))), Effect::None);
    }

    #[test]
    fn list_offset_follows_selection() {
        let mut s = session(30);
        s.handle(Command::Down(ScrollAmount::Line(12)));
        assert_eq!(s.list_offset(), 3);
        s.handle(Command::Top);
        assert_eq!(s.list_offset(), 0);
        s.set_viewport_height(4);
        s.handle(Command::Bottom);
        assert_eq!(s.list_offset(), 26);
    }
}
