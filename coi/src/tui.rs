//! Terminal setup and teardown.
//!
//! The UI is drawn on stderr. stdout carries only the changelog note printed
//! after the session, so `coi | …` stays clean.

use std::io::{self, stderr, BufWriter, Stderr};
use std::panic;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

/// Buffered so each frame goes out in a handful of writes.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Switches to raw mode on the alternate screen with mouse capture.
///
/// Every exit path must call [`restore_tui`], including a failure here.
pub fn init_tui() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut surface = BufWriter::new(stderr());
    execute!(surface, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(surface))?;
    terminal.clear()?;
    Ok(terminal)
}

/// Leaves the alternate screen and raw mode. Safe to call more than once.
///
/// Both steps are attempted; the first error is returned.
pub fn restore_tui() -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(stderr(), LeaveAlternateScreen, DisableMouseCapture);
    raw.and(screen)
}

/// Restores the terminal before the previous panic hook prints its message.
///
/// Install before [`init_tui`].
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_tui();
        previous(info);
    }));
}

/// Returns a flag that becomes `true` when SIGTERM arrives.
///
/// The handler only stores to the flag; the main loop polls it.
pub fn register_sigterm() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&flag))?;
    Ok(flag)
}
