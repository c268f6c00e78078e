//! Key and mouse mapping for coi.
//!
//! Translates raw crossterm events into logical [`Command`]s. The mapping is
//! context-free; what a command means in the current view (move the selection
//! or scroll the diff, go back or quit on `Esc`) is decided by the session.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::session::{Command, ScrollAmount};

/// Rows moved per mouse-wheel notch.
const WHEEL_LINES: usize = 3;

/// Maps a key press to a command, or `None` for unbound keys.
pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            KeyCode::Char('d') => Some(Command::Down(ScrollAmount::HalfPage)),
            KeyCode::Char('u') => Some(Command::Up(ScrollAmount::HalfPage)),
            KeyCode::Char('f') => Some(Command::Down(ScrollAmount::Page)),
            KeyCode::Char('b') => Some(Command::Up(ScrollAmount::Page)),
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::Char('j') | KeyCode::Down => Command::Down(ScrollAmount::Line(1)),
        KeyCode::Char('k') | KeyCode::Up => Command::Up(ScrollAmount::Line(1)),
        KeyCode::PageDown => Command::Down(ScrollAmount::Page),
        KeyCode::PageUp => Command::Up(ScrollAmount::Page),
        KeyCode::Char('g') | KeyCode::Home => Command::Top,
        KeyCode::Char('G') | KeyCode::End => Command::Bottom,
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Command::Open,
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => Command::Back,
        KeyCode::Esc => Command::Escape,
        KeyCode::Char('n') => Command::NextCommit,
        KeyCode::Char('p') => Command::PrevCommit,
        KeyCode::Char('}') => Command::NextFile,
        KeyCode::Char('{') => Command::PrevFile,
        KeyCode::Char(']') => Command::NextHunk,
        KeyCode::Char('[') => Command::PrevHunk,
        KeyCode::Char('?') => Command::ToggleHelp,
        KeyCode::Char('s') => Command::SaveChangelog,
        KeyCode::Char('q') => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Maps mouse-wheel scrolling to line moves; other mouse events are ignored.
pub fn map_mouse(mouse: MouseEvent) -> Option<Command> {
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Command::Down(ScrollAmount::Line(WHEEL_LINES))),
        MouseEventKind::ScrollUp => Some(Command::Up(ScrollAmount::Line(WHEEL_LINES))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn vim_and_arrow_keys_agree() {
        assert_eq!(map_key(key(KeyCode::Char('j'))), map_key(key(KeyCode::Down)));
        assert_eq!(map_key(key(KeyCode::Char('k'))), map_key(key(KeyCode::Up)));
        assert_eq!(map_key(key(KeyCode::Char('l'))), Some(Command::Open));
        assert_eq!(map_key(key(KeyCode::Enter)), Some(Command::Open));
        assert_eq!(map_key(key(KeyCode::Left)), Some(Command::Back));
    }

    #[test]
    fn control_chords_scroll_by_pages() {
        assert_eq!(map_key(ctrl('d')), Some(Command::Down(ScrollAmount::HalfPage)));
        assert_eq!(map_key(ctrl('b')), Some(Command::Up(ScrollAmount::Page)));
        assert_eq!(map_key(ctrl('c')), Some(Command::Quit));
        assert_eq!(map_key(ctrl('x')), None);
    }

    #[test]
    fn shifted_capital_g_is_bottom() {
        let event = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(map_key(event), Some(Command::Bottom));
    }

    #[test]
    fn braces_move_between_files_and_brackets_between_hunks() {
        let shifted = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);
        assert_eq!(map_key(shifted('}')), Some(Command::NextFile));
        assert_eq!(map_key(shifted('{')), Some(Command::PrevFile));
        assert_eq!(map_key(key(KeyCode::Char(']'))), Some(Command::NextHunk));
        assert_eq!(map_key(key(KeyCode::Char('n'))), Some(Command::NextCommit));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(map_key(key(KeyCode::Char('z'))), None);
        assert_eq!(map_key(key(KeyCode::Tab)), None);
    }

    #[test]
    fn wheel_scrolls_three_lines() {
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(map_mouse(wheel), Some(Command::Down(ScrollAmount::Line(3))));
    }
}
