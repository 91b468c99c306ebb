// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based scan preview
//!
//! Renders the annotated camera feed in an inline viewport at the bottom of
//! the terminal using Unicode half-block characters for improved vertical
//! resolution. Reported values are inserted above the viewport so they stay
//! in the scrollback after the scanner exits.

use crate::backends::camera::types::CameraFrame;
use crate::constants::preview::VIEWPORT_HEIGHT;
use crate::errors::DisplayError;
use crate::frame_processor::types::SymbolOverlay;
use crate::scanner::surface::{ScanKey, ScanSurface};

use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use image::RgbaImage;
use ratatui::{
    Terminal, TerminalOptions, Viewport,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::Duration;
use tracing::debug;

/// Inline half-block preview with console lines above it
pub struct TerminalPreview {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    found: usize,
    closed: bool,
}

impl TerminalPreview {
    /// Put the terminal into raw mode and reserve the preview rows
    pub fn new() -> Result<Self, DisplayError> {
        enable_raw_mode().map_err(|e| DisplayError::Terminal(e.to_string()))?;

        let backend = CrosstermBackend::new(stdout());
        let options = TerminalOptions {
            viewport: Viewport::Inline(VIEWPORT_HEIGHT),
        };
        let terminal = match Terminal::with_options(backend, options) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(DisplayError::Terminal(e.to_string()));
            }
        };

        debug!(rows = VIEWPORT_HEIGHT, "Terminal preview started");
        Ok(Self {
            terminal,
            found: 0,
            closed: false,
        })
    }
}

impl ScanSurface for TerminalPreview {
    fn show(
        &mut self,
        frame: &CameraFrame,
        overlays: &[SymbolOverlay],
    ) -> Result<(), DisplayError> {
        let status_message = build_status_message(self.found);

        self.terminal
            .draw(|f| {
                let area = f.area();

                // Reserve bottom line for status
                let camera_area = Rect {
                    height: area.height.saturating_sub(1),
                    ..area
                };
                f.render_widget(
                    FrameWidget {
                        image: &frame.image,
                        overlays,
                    },
                    camera_area,
                );

                let status_area = Rect {
                    y: area.y + area.height.saturating_sub(1),
                    height: 1,
                    ..area
                };
                f.render_widget(
                    StatusBar {
                        message: &status_message,
                    },
                    status_area,
                );
            })
            .map(|_| ())
            .map_err(|e| DisplayError::Output(e.to_string()))
    }

    fn print_line(&mut self, line: &str) -> Result<(), DisplayError> {
        self.found += 1;

        let cols = self
            .terminal
            .size()
            .map(|size| size.width.max(1) as usize)
            .unwrap_or(80);
        let rows = wrap_cells(line, cols);

        self.terminal
            .insert_before(rows.len() as u16, |buf| {
                let area = buf.area;
                for (y, row) in (area.y..area.y + area.height).zip(&rows) {
                    buf.set_string(area.x, y, row, Style::default());
                }
            })
            .map_err(|e| DisplayError::Output(e.to_string()))
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<ScanKey>, DisplayError> {
        let input_failed = |e: io::Error| DisplayError::Input(e.to_string());

        if event::poll(timeout).map_err(input_failed)?
            && let Event::Key(key) = event::read().map_err(input_failed)?
        {
            return Ok(ScanKey::from_key_event(&key));
        }
        Ok(None)
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Restore the terminal even if clearing the viewport fails
        let cleared = self.terminal.clear();
        let cursor = self.terminal.show_cursor();
        disable_raw_mode().map_err(|e| DisplayError::Terminal(e.to_string()))?;
        cleared
            .and(cursor)
            .map_err(|e| DisplayError::Terminal(e.to_string()))?;

        debug!("Terminal preview closed");
        Ok(())
    }
}

impl Drop for TerminalPreview {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Split a line into rows of at most `cols` terminal cells
///
/// Wide characters (CJK, Hangul) take two cells and are never split.
fn wrap_cells(line: &str, cols: usize) -> Vec<String> {
    let mut rows = vec![String::new()];
    let mut used = 0;

    for ch in line.chars() {
        let mut utf8 = [0u8; 4];
        let width = Span::raw(&*ch.encode_utf8(&mut utf8)).width();
        if used + width > cols && used > 0 {
            rows.push(String::new());
            used = 0;
        }
        if let Some(row) = rows.last_mut() {
            row.push(ch);
        }
        used += width;
    }

    rows
}

fn build_status_message(found: usize) -> String {
    format!("Scanning | {} found | 'q'/Esc quit", found)
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget<'a> {
    image: &'a RgbaImage,
    overlays: &'a [SymbolOverlay],
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let image = self.image;
        if image.width() == 0 || image.height() == 0 {
            return;
        }

        let layout = FrameLayout::fit(image.width(), image.height(), area);
        if layout.width == 0 || layout.height == 0 {
            return;
        }

        // Scale factors
        let x_scale = image.width() as f64 / layout.width as f64;
        let y_scale = image.height() as f64 / (layout.height * 2) as f64;

        // Render using half-block characters
        // Each terminal cell represents 2 vertical pixels:
        // - Upper half (▀) colored with fg
        // - Lower half colored with bg
        for ty in 0..layout.height {
            for tx in 0..layout.width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((layout.x + tx, layout.y + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(image, src_x, src_y_top));
                    cell.set_bg(sample_pixel(image, src_x, src_y_bottom));
                }
            }
        }

        for overlay in self.overlays {
            render_label(overlay, &layout, area, buf);
        }
    }
}

/// Where the frame lands inside the widget area, in cells
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameLayout {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

impl FrameLayout {
    /// Fit the frame into `area` keeping its aspect ratio, centered
    fn fit(frame_width: u32, frame_height: u32, area: Rect) -> Self {
        let frame_aspect = frame_width as f64 / frame_height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64; // *2 because half-blocks

        let (width, height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        Self {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        }
    }
}

/// Label on the row above the symbol's box, or on its top row when the box
/// touches the top edge
fn render_label(overlay: &SymbolOverlay, layout: &FrameLayout, area: Rect, buf: &mut Buffer) {
    let left = layout.x + (overlay.region.x * layout.width as f32) as u16;
    let top = layout.y + (overlay.region.y * layout.height as f32) as u16;
    let row = if top > area.y { top - 1 } else { top };

    let right_edge = area.x + area.width;
    if left >= right_edge || row >= area.y + area.height {
        return;
    }

    let style = if overlay.is_new {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else {
        Style::default().fg(Color::White).bg(Color::Blue)
    };
    buf.set_stringn(
        left,
        row,
        &overlay.label,
        (right_edge - left) as usize,
        style,
    );
}

fn sample_pixel(image: &RgbaImage, x: u32, y: u32) -> Color {
    let x = x.min(image.width() - 1);
    let y = y.min(image.height() - 1);
    let [r, g, b, _] = image.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        buf.set_stringn(
            area.x,
            area.y,
            self.message,
            area.width as usize,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}
