/// Keyboard mapping and the inline text editor
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Radians queued per orbit key press
pub const ORBIT_STEP: f32 = 0.15;
/// Zoom factor per key press
pub const ZOOM_STEP: f32 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    /// Move the selected slider by this many steps
    Nudge(i32),
    Toggle,
    BeginEdit,
    Orbit { left: f32, up: f32 },
    Zoom(f32),
}

/// Map a key press outside of text editing to an action
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Tab => Action::SelectNext,
        KeyCode::BackTab => Action::SelectPrevious,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Nudge(1),
        KeyCode::Char('-') | KeyCode::Char('_') => Action::Nudge(-1),
        KeyCode::Char('>') | KeyCode::Char('.') => Action::Nudge(10),
        KeyCode::Char('<') | KeyCode::Char(',') => Action::Nudge(-10),
        KeyCode::Char(' ') => Action::Toggle,
        KeyCode::Enter => Action::BeginEdit,
        KeyCode::Left | KeyCode::Char('a') => Action::Orbit {
            left: ORBIT_STEP,
            up: 0.0,
        },
        KeyCode::Right | KeyCode::Char('d') => Action::Orbit {
            left: -ORBIT_STEP,
            up: 0.0,
        },
        KeyCode::Up | KeyCode::Char('w') => Action::Orbit {
            left: 0.0,
            up: ORBIT_STEP,
        },
        KeyCode::Down | KeyCode::Char('s') => Action::Orbit {
            left: 0.0,
            up: -ORBIT_STEP,
        },
        KeyCode::Char('z') => Action::Zoom(ZOOM_STEP),
        KeyCode::Char('x') => Action::Zoom(1.0 / ZOOM_STEP),
        _ => return None,
    };
    Some(action)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Editing,
    Commit(String),
    Cancel,
}

/// Single-line editor for the text control. `\n` is typed as Alt+Enter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditor {
    buffer: String,
}

impl TextEditor {
    pub fn new(initial: &str) -> Self {
        Self {
            buffer: initial.to_string(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn handle(&mut self, key: KeyEvent) -> EditOutcome {
        if key.kind == KeyEventKind::Release {
            return EditOutcome::Editing;
        }
        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => self.buffer.push('\n'),
            KeyCode::Enter => return EditOutcome::Commit(self.buffer.clone()),
            KeyCode::Esc => return EditOutcome::Cancel,
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Char(ch) => self.buffer.push(ch),
            _ => {}
        }
        EditOutcome::Editing
    }
}
