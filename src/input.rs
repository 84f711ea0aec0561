use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::runtime::AppEvent;

/// What a raw terminal event means to a typing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Char(char),
    Backspace,
    DeleteWord,
    Cancel,
    Escape,
    Next,
    Previous,
    Resize,
    Redraw,
    Tick,
}

impl Input {
    /// Keys that change the typed buffer, and so start the session clock.
    pub fn is_editing(self) -> bool {
        matches!(self, Input::Char(_) | Input::Backspace | Input::DeleteWord)
    }

    pub fn from_event(event: &AppEvent) -> Option<Input> {
        match event {
            AppEvent::Key(key) => Input::from_key(*key),
            AppEvent::Resize(_, _) => Some(Input::Resize),
            AppEvent::Tick => Some(Input::Tick),
        }
    }

    pub fn from_key(key: KeyEvent) -> Option<Input> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => Some(Input::Escape),
            KeyCode::Right => Some(Input::Next),
            KeyCode::Left => Some(Input::Previous),
            KeyCode::Backspace if ctrl || alt => Some(Input::DeleteWord),
            KeyCode::Backspace => Some(Input::Backspace),
            KeyCode::Char(c) if ctrl => match c {
                'c' => Some(Input::Cancel),
                'l' => Some(Input::Redraw),
                // terminals report ctrl+backspace as ^H
                'w' | 'h' => Some(Input::DeleteWord),
                _ => None,
            },
            KeyCode::Char(_) if alt => None,
            KeyCode::Char(c) => Some(Input::Char(c)),
            _ => None,
        }
    }
}
