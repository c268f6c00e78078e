//! Single event bus feeding the review loop.
//!
//! Terminal input, timers and git worker results all arrive as [`AppEvent`]s on
//! one unbounded channel, and the main loop handles them one at a time. Worker
//! results are completed values; nothing outside the loop mutates the session.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, MissedTickBehavior};

use crate::git::types::GitEvent;

/// Frame cadence, roughly 30 FPS.
pub const RENDER_INTERVAL: Duration = Duration::from_millis(33);
/// Spinner cadence while the list is being built.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum AppEvent {
    /// Key press. Release and repeat events never reach the bus.
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    /// New terminal size as (columns, rows).
    Resize(u16, u16),
    Tick,
    Render,
    /// Result handed back by the git worker thread.
    Git(Box<GitEvent>),
}

/// Both ends of the event channel. `tx` is cloned into every producer.
pub struct EventHandler {
    pub tx: UnboundedSender<AppEvent>,
    pub rx: UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a raw terminal event onto the bus, dropping what the loop ignores.
///
/// Only presses are kept: some platforms report a release for every key.
pub fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(columns, rows) => Some(AppEvent::Resize(columns, rows)),
        _ => None,
    }
}

/// Spawns the task producing input, tick and render events.
///
/// The task ends on its own once the receiver is dropped.
pub fn spawn_event_task(tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut ticks = interval(TICK_INTERVAL);
        let mut frames = interval(RENDER_INTERVAL);
        // A stalled draw should not be followed by a burst of catch-up frames.
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut input = EventStream::new();

        loop {
            let next = tokio::select! {
                _ = ticks.tick() => Some(AppEvent::Tick),
                _ = frames.tick() => Some(AppEvent::Render),
                raw = input.next().fuse() => match raw {
                    Some(Ok(event)) => translate(event),
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "terminal input error");
                        None
                    }
                    None => None,
                },
            };
            if let Some(event) = next {
                if tx.send(event).is_err() {
                    tracing::debug!("event receiver dropped; input task exiting");
                    break;
                }
            }
        }
    });
}
