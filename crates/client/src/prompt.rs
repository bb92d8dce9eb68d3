//! Masked terminal input for secrets.

use std::io::Write;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

use crate::error::{AppError, Result};

/// What a key press did to the buffer.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Pushed,
    Popped,
    Ignored,
    Done,
    Interrupted,
}

#[derive(Default)]
struct SecretInput {
    buf: String,
}

impl SecretInput {
    /// Only presses count. Repeats and releases are reported separately on
    /// some terminals.
    fn apply(&mut self, key: KeyEvent) -> Step {
        if key.kind != KeyEventKind::Press {
            return Step::Ignored;
        }
        match key.code {
            KeyCode::Enter => Step::Done,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Step::Interrupted
            }
            KeyCode::Esc => Step::Interrupted,
            KeyCode::Backspace => match self.buf.pop() {
                Some(_) => Step::Popped,
                None => Step::Ignored,
            },
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buf.push(ch);
                Step::Pushed
            }
            _ => Step::Ignored,
        }
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads a line without echoing it; each character shows as `*`.
pub fn read_secret(prompt: &str) -> Result<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;

    let mut input = SecretInput::default();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match input.apply(key) {
            Step::Pushed => execute!(out, Print("*"))?,
            Step::Popped => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?
            }
            Step::Ignored => {}
            Step::Done => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            Step::Interrupted => {
                execute!(out, Print("\r\n"))?;
                return Err(AppError::Terminal("interrupted".to_string()));
            }
        }
        out.flush()?;
    }

    Ok(input.buf)
}
