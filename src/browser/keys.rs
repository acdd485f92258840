//! Single key reads.
//!
//! The browser only ever sees [`Key`]; where keys come from is behind
//! [`KeySource`]. [`TerminalKeys`] reads one key press from the terminal in
//! raw mode, [`ScriptedKeys`] replays a fixed sequence.

use std::collections::VecDeque;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::error::{Error, Result};

/// Browser input, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    PrevPage,
    NextPage,
    Confirm,
    Back,
    Cancel,
    /// Ctrl-C.
    Interrupt,
    Other,
}

/// Map a terminal key event to a browser key.
#[must_use]
pub fn map_key(event: KeyEvent) -> Key {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c' | 'C') => Key::Interrupt,
            _ => Key::Other,
        };
    }

    match event.code {
        KeyCode::Up | KeyCode::Char('w' | 'k') => Key::Up,
        KeyCode::Down | KeyCode::Char('s' | 'j') => Key::Down,
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('a') => Key::PrevPage,
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char('d') => Key::NextPage,
        KeyCode::Enter => Key::Confirm,
        KeyCode::Backspace => Key::Back,
        KeyCode::Esc | KeyCode::Char('q') => Key::Cancel,
        _ => Key::Other,
    }
}

/// Something that yields one key at a time.
pub trait KeySource {
    /// Block until the next key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`] on Ctrl-C, or an IO error if the
    /// input cannot be read.
    fn read_key(&mut self) -> Result<Key>;

    /// Wait for any key ("press any key to continue").
    ///
    /// # Errors
    ///
    /// Same as [`KeySource::read_key`].
    fn wait_any(&mut self) -> Result<()> {
        self.read_key().map(|_| ())
    }
}

/// Reads key presses from the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalKeys;

/// Keeps raw mode on for as long as it lives.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

impl KeySource for TerminalKeys {
    fn read_key(&mut self) -> Result<Key> {
        let _raw = RawModeGuard::enable()?;
        loop {
            // Release and repeat events are reported on some platforms
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                return match map_key(key) {
                    Key::Interrupt => Err(Error::Interrupted),
                    other => Ok(other),
                };
            }
        }
    }
}

/// Replays a fixed key sequence; running out counts as an interrupt.
#[derive(Debug, Default, Clone)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> Result<Key> {
        match self.keys.pop_front() {
            Some(Key::Interrupt) | None => Err(Error::Interrupted),
            Some(key) => Ok(key),
        }
    }
}
