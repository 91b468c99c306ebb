// SPDX-License-Identifier: GPL-3.0-only

//! Plain console surface for runs without a preview
//!
//! Values are printed one per line. When stdin is a terminal the keyboard
//! is read in raw mode; otherwise (piped, under a service manager) only
//! Ctrl+C ends the run.

use crate::backends::camera::types::CameraFrame;
use crate::errors::DisplayError;
use crate::frame_processor::types::SymbolOverlay;
use crate::scanner::surface::{ScanKey, ScanSurface};
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, trace, warn};

enum KeyInput {
    /// Raw-mode keyboard on the controlling terminal
    Terminal,
    /// Set by the SIGINT handler
    Interrupt(Arc<AtomicBool>),
}

/// Line-oriented console without a preview
pub struct HeadlessConsole<W: Write> {
    out: W,
    input: KeyInput,
    closed: bool,
}

impl HeadlessConsole<io::Stdout> {
    /// Console on stdout, reading keys from stdin if it is a terminal
    pub fn stdout() -> Result<Self, DisplayError> {
        let input = if io::stdin().is_terminal() {
            enable_raw_mode().map_err(|e| DisplayError::Terminal(e.to_string()))?;
            KeyInput::Terminal
        } else {
            let flag = Arc::new(AtomicBool::new(false));
            let handler_flag = Arc::clone(&flag);
            if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
                warn!(error = %e, "Could not install Ctrl+C handler");
            }
            KeyInput::Interrupt(flag)
        };

        Ok(Self {
            out: io::stdout(),
            input,
            closed: false,
        })
    }
}

impl<W: Write> HeadlessConsole<W> {
    /// Console on any writer that quits when `interrupted` is set
    pub fn with_interrupt_flag(out: W, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            out,
            input: KeyInput::Interrupt(interrupted),
            closed: false,
        }
    }

    fn line_ending(&self) -> &'static str {
        // Raw mode disables the terminal's newline translation
        match self.input {
            KeyInput::Terminal if !self.closed => "\r\n",
            _ => "\n",
        }
    }
}

impl<W: Write> ScanSurface for HeadlessConsole<W> {
    fn show(
        &mut self,
        frame: &CameraFrame,
        overlays: &[SymbolOverlay],
    ) -> Result<(), DisplayError> {
        trace!(
            sequence = frame.sequence,
            symbols = overlays.len(),
            "Frame not displayed (headless)"
        );
        Ok(())
    }

    fn print_line(&mut self, line: &str) -> Result<(), DisplayError> {
        let ending = self.line_ending();
        write!(self.out, "{}{}", line, ending)?;
        self.out.flush()?;
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<ScanKey>, DisplayError> {
        match &self.input {
            KeyInput::Terminal => {
                let input_failed = |e: io::Error| DisplayError::Input(e.to_string());
                if event::poll(timeout).map_err(input_failed)?
                    && let Event::Key(key) = event::read().map_err(input_failed)?
                {
                    return Ok(ScanKey::from_key_event(&key));
                }
                Ok(None)
            }
            KeyInput::Interrupt(flag) => {
                if flag.swap(false, Ordering::SeqCst) {
                    Ok(Some(ScanKey::Interrupt))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let flushed = self.out.flush();
        if let KeyInput::Terminal = self.input {
            disable_raw_mode().map_err(|e| DisplayError::Terminal(e.to_string()))?;
        }
        flushed?;

        debug!("Console closed");
        Ok(())
    }
}

impl<W: Write> Drop for HeadlessConsole<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_line_uses_plain_newlines() {
        let mut out = Vec::new();
        {
            let flag = Arc::new(AtomicBool::new(false));
            let mut console = HeadlessConsole::with_interrupt_flag(&mut out, flag);
            console.print_line("QR_CODE: A1").unwrap();
            console.print_line("QR_CODE: B2").unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "QR_CODE: A1\nQR_CODE: B2\n");
    }

    #[test]
    fn test_interrupt_flag_quits_once() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut console = HeadlessConsole::with_interrupt_flag(io::sink(), Arc::clone(&flag));
        let timeout = Duration::from_millis(1);

        assert_eq!(console.poll_key(timeout).unwrap(), None);
        flag.store(true, Ordering::SeqCst);
        assert_eq!(console.poll_key(timeout).unwrap(), Some(ScanKey::Interrupt));
        assert_eq!(console.poll_key(timeout).unwrap(), None);
    }

    #[test]
    fn test_close_is_idempotent() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut console = HeadlessConsole::with_interrupt_flag(io::sink(), flag);
        console.close().unwrap();
        console.close().unwrap();
    }
}
