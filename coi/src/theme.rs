//! Color theme system for coi.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every surface
//! the review UI renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` is the Catppuccin Mocha palette in RGB; requires truecolor.
//!
//! Diff line colors are baked in by the git worker's highlighter; the theme
//! covers the chrome around them.

use ratatui::style::Color;

/// Names accepted by [`Theme::from_name`], for diagnostics.
pub const THEME_NAMES: &[&str] = &["dark", "catppuccin-mocha"];

/// All color values used across coi's UI surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Commit list
    /// Short commit id column.
    pub commit_id: Color,
    /// Author and file-count column.
    pub commit_meta: Color,
    /// `#N` pull-request column.
    pub pull_request: Color,
    /// Background of the selected row.
    pub selection_bg: Color,
    /// Foreground of the selected row.
    pub selection_fg: Color,

    // Messages
    /// Placeholders such as "loading" and the empty state.
    pub muted: Color,
    /// Non-fatal warnings in the status line.
    pub warning: Color,
    /// Inline error placeholders.
    pub error: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode badge while browsing the list.
    pub status_mode_list: Color,
    /// Mode badge while reading a diff.
    pub status_mode_diff: Color,

    /// Panel background.
    pub background: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            commit_id: Color::Yellow,
            commit_meta: Color::DarkGray,
            pull_request: Color::Magenta,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,

            muted: Color::DarkGray,
            warning: Color::Yellow,
            error: Color::Red,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_list: Color::Cyan,
            status_mode_diff: Color::Green,

            background: Color::Reset,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// On non-truecolor terminals colors degrade to the nearest 256-color
    /// approximation. Use `dark()` on SSH or 256-color terminals.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let peach = Color::Rgb(250, 179, 135);    // #fab387
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let mauve = Color::Rgb(203, 166, 247);     // #cba6f7
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let base = Color::Rgb(30, 30, 46);        // #1e1e2e
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            commit_id: peach,
            commit_meta: overlay1,
            pull_request: mauve,
            selection_bg: surface1,
            selection_fg: text,

            muted: overlay1,
            warning: yellow,
            error: red,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_list: lavender,
            status_mode_diff: green,

            background: base,
        }
    }

    /// Resolves a theme name from the CLI or config file.
    ///
    /// Returns `None` for unknown names; the caller falls back to `dark()` and
    /// surfaces a warning, since stderr belongs to the TUI by then.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Some(Self::catppuccin_mocha()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }
}
