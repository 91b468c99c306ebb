// SPDX-License-Identifier: GPL-3.0-only

//! What the scan loop talks to on the user's side

use crate::backends::camera::types::CameraFrame;
use crate::errors::DisplayError;
use crate::frame_processor::types::SymbolOverlay;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// A key press the loop may react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKey {
    Esc,
    Char(char),
    /// Ctrl+C, either as a key or as SIGINT
    Interrupt,
    Other,
}

impl ScanKey {
    /// Esc, `q`/`Q` and Ctrl+C end the scan
    pub fn is_exit(&self) -> bool {
        match self {
            ScanKey::Esc | ScanKey::Interrupt => true,
            ScanKey::Char(c) => c.eq_ignore_ascii_case(&'q'),
            ScanKey::Other => false,
        }
    }

    /// Map a crossterm key event; releases and repeats are ignored
    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        Some(match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                ScanKey::Interrupt
            }
            KeyCode::Esc => ScanKey::Esc,
            KeyCode::Char(c) => ScanKey::Char(c),
            _ => ScanKey::Other,
        })
    }
}

/// Display, console and keyboard of one run
///
/// They share the controlling terminal, so one value owns all three.
pub trait ScanSurface {
    /// Show an annotated frame with its labels
    fn show(&mut self, frame: &CameraFrame, overlays: &[SymbolOverlay])
    -> Result<(), DisplayError>;

    /// Print one console line
    fn print_line(&mut self, line: &str) -> Result<(), DisplayError>;

    /// Wait up to `timeout` for a key press
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<ScanKey>, DisplayError>;

    /// Restore the terminal; safe to call more than once
    fn close(&mut self) -> Result<(), DisplayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_keys() {
        assert!(ScanKey::Esc.is_exit());
        assert!(ScanKey::Char('q').is_exit());
        assert!(ScanKey::Char('Q').is_exit());
        assert!(ScanKey::Interrupt.is_exit());
        assert!(!ScanKey::Char('c').is_exit());
        assert!(!ScanKey::Char('x').is_exit());
        assert!(!ScanKey::Other.is_exit());
    }

    #[test]
    fn test_key_event_mapping() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(ScanKey::from_key_event(&ctrl_c), Some(ScanKey::Interrupt));

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(ScanKey::from_key_event(&esc), Some(ScanKey::Esc));

        let shifted_q = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(ScanKey::from_key_event(&shifted_q), Some(ScanKey::Char('Q')));

        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(ScanKey::from_key_event(&release), None);

        let f1 = KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(ScanKey::from_key_event(&f1), Some(ScanKey::Other));
    }
}
