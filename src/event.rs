//! Application events decoded from the terminal.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

/// Events that can occur in the application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEvent {
    /// A key went down (or auto-repeated).
    Key(KeyEvent),

    /// One mouse wheel notch; `page` is set while Shift or Ctrl is held.
    Wheel { down: bool, page: bool },

    /// The terminal was resized.
    Resize,
}

impl AppEvent {
    /// Keeps the events the dashboard reacts to, dropping key releases.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                Some(Self::Key(key))
            }
            Event::Mouse(MouseEvent {
                kind, modifiers, ..
            }) => {
                let page = modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::CONTROL);
                match kind {
                    MouseEventKind::ScrollDown => Some(Self::Wheel { down: true, page }),
                    MouseEventKind::ScrollUp => Some(Self::Wheel { down: false, page }),
                    _ => None,
                }
            }
            Event::Resize(..) => Some(Self::Resize),
            _ => None,
        }
    }
}

/// Reads every event that is already queued without blocking.
pub fn drain() -> io::Result<Vec<AppEvent>> {
    let mut events = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Some(ev) = AppEvent::from_terminal(event::read()?) {
            events.push(ev);
        }
    }
    Ok(events)
}
