// SPDX-License-Identifier: GPL-3.0-only

//! Capture, decode and report loop
//!
//! One iteration:
//!
//! 1. read a frame from the camera (an error ends the run)
//! 2. decode every symbol in it
//! 3. annotate the frame, print and beep for first sightings
//! 4. show the frame
//! 5. poll the keyboard for Esc / `q` / Ctrl+C
//!
//! The loop owns nothing global. Everything it touches is passed in, so
//! tests drive it with fake cameras and surfaces.

pub mod session;
pub mod surface;

pub use session::{ScanSession, SeenValues};
pub use surface::{ScanKey, ScanSurface};

use crate::backends::audio::create_beeper;
use crate::backends::camera::{FrameSource, V4l2Camera};
use crate::config::{LabelMappings, ScannerConfig};
use crate::console::HeadlessConsole;
use crate::constants::timing::{KEY_POLL_TIMEOUT, STATS_LOG_INTERVAL};
use crate::errors::AppResult;
use crate::frame_processor::annotate_frame;
use crate::frame_processor::tasks::{DecoderChain, SymbolDecoder};
use crate::frame_processor::types::{FrameRegion, SymbolOverlay};
use crate::terminal::TerminalPreview;
use std::io::IsTerminal;
use tracing::{debug, error, info};

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames read from the camera
    pub frames: u64,
    /// Symbols decoded, repeats included
    pub symbols: u64,
    /// Values printed (first sightings)
    pub new_values: u64,
}

/// Run the loop until an exit key or a capture error
pub fn scan_loop<S, D, U>(
    source: &mut S,
    decoder: &mut D,
    surface: &mut U,
    session: &mut ScanSession,
) -> AppResult<LoopStats>
where
    S: FrameSource + ?Sized,
    D: SymbolDecoder + ?Sized,
    U: ScanSurface + ?Sized,
{
    let mut stats = LoopStats::default();

    loop {
        let mut frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, frames = stats.frames, "Camera stopped delivering frames");
                return Err(e.into());
            }
        };
        stats.frames += 1;

        let symbols = decoder.decode(&frame);
        stats.symbols += symbols.len() as u64;
        debug!(frame = stats.frames, decoded = symbols.len(), "Frame processed");

        annotate_frame(&mut frame.image, &symbols);

        let (width, height) = (frame.width(), frame.height());
        let mut overlays = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let label = session.label_for(symbol);
            let is_new = session.record(symbol);
            if is_new {
                info!(symbology = %symbol.symbology, text = %symbol.text, "New value");
                surface.print_line(&label)?;
                session.signal_new_value();
                stats.new_values += 1;
            }
            overlays.push(SymbolOverlay {
                region: FrameRegion::from_rect(&symbol.bounding_box(), width, height),
                label,
                is_new,
            });
        }

        surface.show(&frame, &overlays)?;

        if stats.frames % STATS_LOG_INTERVAL == 0 {
            debug!(
                frames = stats.frames,
                symbols = stats.symbols,
                new_values = stats.new_values,
                "Scan progress"
            );
        }

        if let Some(key) = surface.poll_key(KEY_POLL_TIMEOUT)?
            && key.is_exit()
        {
            info!(key = ?key, "Exit requested");
            return Ok(stats);
        }
    }
}

/// Open everything a run needs and scan until the user quits
///
/// The camera is opened before the terminal is touched, so a bad index
/// fails without leaving anything behind. The surface is closed on every
/// path out of the loop.
pub fn run(config: &ScannerConfig) -> AppResult<LoopStats> {
    let mappings = LabelMappings::resolve(config.mappings.as_deref());

    let mut camera = V4l2Camera::open(config.camera_index)?;
    let mut decoder = DecoderChain::standard(config.max_dimension);
    let mut session = ScanSession::new(mappings).with_beeper(create_beeper(config.beep));

    info!(
        camera = camera.index(),
        name = %camera.name(),
        format = %camera.format(),
        beep = session.beep_enabled(),
        "Scanning"
    );

    let stats = if config.preview && std::io::stdout().is_terminal() {
        let surface = TerminalPreview::new()?;
        run_on_surface(&mut camera, &mut decoder, surface, &mut session)?
    } else {
        let surface = HeadlessConsole::stdout()?;
        run_on_surface(&mut camera, &mut decoder, surface, &mut session)?
    };

    info!(
        frames = stats.frames,
        symbols = stats.symbols,
        new_values = stats.new_values,
        "Scan finished"
    );
    Ok(stats)
}

fn run_on_surface<U: ScanSurface>(
    camera: &mut V4l2Camera,
    decoder: &mut DecoderChain,
    mut surface: U,
    session: &mut ScanSession,
) -> AppResult<LoopStats> {
    let result = scan_loop(camera, decoder, &mut surface, session);
    let closed = surface.close();

    let stats = result?;
    closed?;
    Ok(stats)
}
