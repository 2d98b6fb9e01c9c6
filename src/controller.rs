use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode};

use crate::domain::{Message, OpsConfig, OpsError};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &OpsConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, OpsError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            // While the search line is being edited every key goes to the
            // line editor unmapped.
            if model.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::MoveUp),
            KeyCode::Char('h') | KeyCode::Left => Some(Message::PrevColumn),
            KeyCode::Char('l') | KeyCode::Right => Some(Message::NextColumn),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Char('s') => Some(Message::ToggleSort),
            KeyCode::Char('/') => Some(Message::EnterSearch),
            KeyCode::Char('c') => Some(Message::ClearSearch),
            KeyCode::Char('f') => Some(Message::CycleFilter),
            KeyCode::Char('y') => Some(Message::CopyRow),
            KeyCode::Char('[') => Some(Message::PrevPage),
            KeyCode::Char(']') => Some(Message::NextPage),
            KeyCode::Tab => Some(Message::ToggleSidebar),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Enter => Some(Message::Activate),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEvent, KeyModifiers};

    fn map(code: KeyCode) -> Option<Message> {
        let controller = Controller::new(&OpsConfig::default());
        controller.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn maps_navigation_keys() {
        assert_eq!(map(KeyCode::Char('j')), Some(Message::MoveDown));
        assert_eq!(map(KeyCode::Down), Some(Message::MoveDown));
        assert_eq!(map(KeyCode::Char('G')), Some(Message::MoveEnd));
        assert_eq!(map(KeyCode::Tab), Some(Message::ToggleSidebar));
    }

    #[test]
    fn maps_table_actions() {
        assert_eq!(map(KeyCode::Char('s')), Some(Message::ToggleSort));
        assert_eq!(map(KeyCode::Char('/')), Some(Message::EnterSearch));
        assert_eq!(map(KeyCode::Char('y')), Some(Message::CopyRow));
        assert_eq!(map(KeyCode::Enter), Some(Message::Activate));
        assert_eq!(map(KeyCode::F(5)), None);
    }
}
