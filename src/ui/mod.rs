//! Interactive picker: one input event per turn, background results folded
//! in before every draw.

pub mod layout;
pub mod render;
pub mod terminal;

use std::time::Duration;

use crossterm::event;

use crate::error::Result;
use crate::session::{Outcome, Session};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the picker until a path is chosen (`Some`) or the user cancels.
pub fn run(session: &mut Session) -> Result<Option<String>> {
    let (mut terminal, _guard) = terminal::setup()?;

    loop {
        session.drain_worker();
        session.sync_preview();

        let size = terminal.size()?;
        let ui = layout::compute_ui_layout(size.into(), session.panels().git_visible());
        terminal.draw(|frame| render::draw(frame, session, &ui))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match session.handle_event(event::read()?, &ui) {
            Outcome::Continue => {}
            Outcome::Select(path) => {
                terminal.show_cursor()?;
                return Ok(Some(path));
            }
            Outcome::Cancel => {
                terminal.show_cursor()?;
                return Ok(None);
            }
        }
    }
}
