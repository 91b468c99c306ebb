// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the scan loop, driven by fake collaborators

use barcode_scanner::backends::audio::Beeper;
use barcode_scanner::backends::camera::{CameraFrame, FrameSource};
use barcode_scanner::errors::{AppError, AudioError, CameraError, DisplayError, EXIT_CAPTURE_LOST};
use barcode_scanner::frame_processor::tasks::SymbolDecoder;
use barcode_scanner::frame_processor::{DecodedSymbol, Point, SymbolOverlay, Symbology};
use barcode_scanner::scanner::{ScanKey, ScanSession, ScanSurface, scan_loop};
use barcode_scanner::{LabelMappings, LoopStats};
use image::{Rgba, RgbaImage};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;

/// Camera that yields `frames` blank frames, then reports a disconnect
struct FakeCamera {
    frames: u32,
    reads: u32,
}

impl FakeCamera {
    fn new(frames: u32) -> Self {
        Self { frames, reads: 0 }
    }
}

impl FrameSource for FakeCamera {
    fn read_frame(&mut self) -> Result<CameraFrame, CameraError> {
        self.reads += 1;
        if self.reads > self.frames {
            return Err(CameraError::Disconnected);
        }
        let image = RgbaImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgba([0, 0, 0, 255]));
        Ok(CameraFrame::new(image, self.reads - 1))
    }
}

/// Decoder that returns a fixed list of texts per frame sequence number
struct ScriptedDecoder {
    script: Vec<Vec<&'static str>>,
}

impl ScriptedDecoder {
    fn new(script: Vec<Vec<&'static str>>) -> Self {
        Self { script }
    }
}

impl SymbolDecoder for ScriptedDecoder {
    fn decode(&mut self, frame: &CameraFrame) -> Vec<DecodedSymbol> {
        self.script
            .get(frame.sequence as usize)
            .map(|texts| texts.iter().map(|text| qr(text)).collect())
            .unwrap_or_default()
    }
}

fn qr(text: &str) -> DecodedSymbol {
    DecodedSymbol::new(
        Symbology::QrCode,
        text,
        [
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(30.0, 30.0),
            Point::new(10.0, 30.0),
        ],
    )
}

#[derive(Debug, Clone, PartialEq)]
enum SurfaceEvent {
    Print(String),
    Show,
    Poll,
}

/// Surface that records everything and replays scripted key presses
#[derive(Default)]
struct FakeSurface {
    events: Vec<SurfaceEvent>,
    keys: VecDeque<Option<ScanKey>>,
    overlays: Vec<Vec<SymbolOverlay>>,
    annotated: Vec<bool>,
    closed: bool,
}

impl FakeSurface {
    /// Press `key` on the `n`th poll (1-based), nothing before it
    fn key_on_poll(n: usize, key: ScanKey) -> Self {
        let mut keys: VecDeque<_> = std::iter::repeat_n(None, n - 1).collect();
        keys.push_back(Some(key));
        Self {
            keys,
            ..Self::default()
        }
    }

    fn lines(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Print(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    fn shown(&self) -> usize {
        self.events
            .iter()
            .filter(|event| **event == SurfaceEvent::Show)
            .count()
    }
}

impl ScanSurface for FakeSurface {
    fn show(
        &mut self,
        frame: &CameraFrame,
        overlays: &[SymbolOverlay],
    ) -> Result<(), DisplayError> {
        self.events.push(SurfaceEvent::Show);
        self.overlays.push(overlays.to_vec());
        self.annotated
            .push(frame.image.pixels().any(|pixel| pixel.0 != [0, 0, 0, 255]));
        Ok(())
    }

    fn print_line(&mut self, line: &str) -> Result<(), DisplayError> {
        self.events.push(SurfaceEvent::Print(line.to_owned()));
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<ScanKey>, DisplayError> {
        self.events.push(SurfaceEvent::Poll);
        Ok(self.keys.pop_front().flatten())
    }

    fn close(&mut self) -> Result<(), DisplayError> {
        self.closed = true;
        Ok(())
    }
}

/// Beeper that counts calls, optionally failing every one
struct CountingBeeper {
    count: Rc<Cell<usize>>,
    fail: bool,
}

impl Beeper for CountingBeeper {
    fn beep(&mut self) -> Result<(), AudioError> {
        self.count.set(self.count.get() + 1);
        if self.fail {
            Err(AudioError::NoOutputDevice)
        } else {
            Ok(())
        }
    }
}

fn session_with_beeper(fail: bool) -> (ScanSession, Rc<Cell<usize>>) {
    let count = Rc::new(Cell::new(0));
    let beeper = CountingBeeper {
        count: Rc::clone(&count),
        fail,
    };
    let session = ScanSession::new(LabelMappings::default()).with_beeper(Some(Box::new(beeper)));
    (session, count)
}

fn run(
    frames: u32,
    script: Vec<Vec<&'static str>>,
    surface: &mut FakeSurface,
    session: &mut ScanSession,
) -> (Result<LoopStats, AppError>, FakeCamera) {
    let mut camera = FakeCamera::new(frames);
    let mut decoder = ScriptedDecoder::new(script);
    let result = scan_loop(&mut camera, &mut decoder, surface, session);
    (result, camera)
}

#[test]
fn test_value_is_reported_once_across_frames() {
    let mut surface = FakeSurface::key_on_poll(11, ScanKey::Char('q'));
    let mut session = ScanSession::new(LabelMappings::default());

    let (result, _) = run(11, vec![vec!["HELLO"]; 11], &mut surface, &mut session);

    let stats = result.unwrap();
    assert_eq!(surface.lines(), vec!["QR_CODE: HELLO"]);
    assert_eq!(stats.frames, 11);
    assert_eq!(stats.symbols, 11);
    assert_eq!(stats.new_values, 1);
}

#[test]
fn test_two_values_in_one_frame_keep_decode_order() {
    let mut surface = FakeSurface::key_on_poll(1, ScanKey::Char('q'));
    let mut session = ScanSession::new(LabelMappings::default());

    let (result, _) = run(1, vec![vec!["A1", "B2"]], &mut surface, &mut session);

    assert!(result.is_ok());
    assert_eq!(surface.lines(), vec!["QR_CODE: A1", "QR_CODE: B2"]);
    assert!(session.seen().contains("A1"));
    assert!(session.seen().contains("B2"));
    assert_eq!(session.seen().len(), 2);
}

#[test]
fn test_capture_failure_ends_loop_before_any_frame() {
    let mut surface = FakeSurface::default();
    let mut session = ScanSession::new(LabelMappings::default());

    let (result, camera) = run(0, vec![], &mut surface, &mut session);

    let err = result.unwrap_err();
    assert!(matches!(err, AppError::Camera(CameraError::Disconnected)));
    assert_eq!(err.exit_code(), EXIT_CAPTURE_LOST);
    assert_eq!(camera.reads, 1);
    assert!(surface.events.is_empty());
    assert!(session.seen().is_empty());
}

#[test]
fn test_capture_lost_mid_run_is_an_error() {
    // No quit key: the camera runs dry after three frames
    let mut surface = FakeSurface::default();
    let mut session = ScanSession::new(LabelMappings::default());

    let (result, _) = run(3, vec![vec!["A1"], vec![], vec!["B2"]], &mut surface, &mut session);

    assert!(matches!(result, Err(AppError::Camera(CameraError::Disconnected))));
    assert_eq!(surface.shown(), 3);
    assert_eq!(surface.lines(), vec!["QR_CODE: A1", "QR_CODE: B2"]);
}

#[test]
fn test_quit_happens_after_display() {
    let mut surface = FakeSurface::key_on_poll(1, ScanKey::Char('q'));
    let mut session = ScanSession::new(LabelMappings::default());

    let (result, camera) = run(5, vec![vec!["A1"]], &mut surface, &mut session);

    assert_eq!(result.unwrap().frames, 1);
    assert_eq!(camera.reads, 1);
    assert_eq!(
        surface.events,
        vec![
            SurfaceEvent::Print("QR_CODE: A1".into()),
            SurfaceEvent::Show,
            SurfaceEvent::Poll,
        ]
    );
}

#[test]
fn test_exit_keys() {
    for key in [ScanKey::Esc, ScanKey::Char('Q'), ScanKey::Interrupt] {
        let mut surface = FakeSurface::key_on_poll(2, key);
        let mut session = ScanSession::new(LabelMappings::default());
        let (result, _) = run(10, vec![], &mut surface, &mut session);
        assert_eq!(result.unwrap().frames, 2, "{:?}", key);
    }
}

#[test]
fn test_other_keys_do_not_quit() {
    let mut surface = FakeSurface::default();
    surface.keys = VecDeque::from([
        Some(ScanKey::Char('x')),
        Some(ScanKey::Char('c')),
        Some(ScanKey::Other),
        Some(ScanKey::Char('q')),
    ]);
    let mut session = ScanSession::new(LabelMappings::default());

    let (result, _) = run(10, vec![], &mut surface, &mut session);

    assert_eq!(result.unwrap().frames, 4);
}

#[test]
fn test_beep_once_per_new_value() {
    let mut surface = FakeSurface::key_on_poll(3, ScanKey::Char('q'));
    let (mut session, beeps) = session_with_beeper(false);

    let script = vec![vec!["A1"], vec!["A1", "B2"], vec!["B2", "A1"]];
    let (result, _) = run(3, script, &mut surface, &mut session);

    assert!(result.is_ok());
    assert_eq!(beeps.get(), 2);
}

#[test]
fn test_no_beep_when_disabled() {
    let mut surface = FakeSurface::key_on_poll(1, ScanKey::Char('q'));
    let mut session = ScanSession::new(LabelMappings::default()).with_beeper(None);

    let (result, _) = run(1, vec![vec!["A1"]], &mut surface, &mut session);

    assert!(result.is_ok());
    assert!(!session.beep_enabled());
    assert_eq!(surface.lines(), vec!["QR_CODE: A1"]);
}

#[test]
fn test_failing_beeper_does_not_change_output() {
    let mut surface = FakeSurface::key_on_poll(3, ScanKey::Char('q'));
    let (mut session, beeps) = session_with_beeper(true);

    let script = vec![vec!["A1"], vec!["B2"], vec!["C3"]];
    let (result, _) = run(3, script, &mut surface, &mut session);

    assert_eq!(result.unwrap().frames, 3);
    assert_eq!(beeps.get(), 3);
    assert_eq!(
        surface.lines(),
        vec!["QR_CODE: A1", "QR_CODE: B2", "QR_CODE: C3"]
    );
}

#[test]
fn test_mapped_label_replaces_console_text() {
    let mut mappings = LabelMappings::default();
    mappings.insert("3009P", "Front door");
    let mut surface = FakeSurface::key_on_poll(2, ScanKey::Char('q'));
    let mut session = ScanSession::new(mappings);

    let script = vec![vec!["3009P", "B2"], vec!["3009P"]];
    let (result, _) = run(2, script, &mut surface, &mut session);

    assert!(result.is_ok());
    assert_eq!(surface.lines(), vec!["Front door", "QR_CODE: B2"]);
    assert!(session.seen().contains("3009P"));
    assert!(!session.seen().contains("Front door"));
}

#[test]
fn test_seen_set_is_distinct_texts() {
    let mut surface = FakeSurface::key_on_poll(5, ScanKey::Char('q'));
    let mut session = ScanSession::new(LabelMappings::default());

    let script = vec![
        vec!["A1"],
        vec![],
        vec!["B2", "A1", "B2"],
        vec!["C3"],
        vec!["A1"],
    ];
    let (result, _) = run(5, script, &mut surface, &mut session);

    assert_eq!(result.unwrap().new_values, 3);
    let mut seen: Vec<&str> = session.seen().iter().collect();
    seen.sort_unstable();
    assert_eq!(seen, vec!["A1", "B2", "C3"]);
    assert_eq!(surface.lines().len(), 3);
}

#[test]
fn test_frames_are_annotated_with_overlays() {
    let mut surface = FakeSurface::key_on_poll(3, ScanKey::Char('q'));
    let mut session = ScanSession::new(LabelMappings::default());

    let (result, _) = run(3, vec![vec!["A1"], vec![], vec!["A1"]], &mut surface, &mut session);

    assert!(result.is_ok());
    assert_eq!(surface.annotated, vec![true, false, true]);

    let first = &surface.overlays[0];
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].label, "QR_CODE: A1");
    assert!(first[0].is_new);
    assert!(surface.overlays[1].is_empty());
    assert!(!surface.overlays[2][0].is_new);

    let region = &first[0].region;
    assert!((region.x - 10.0 / FRAME_WIDTH as f32).abs() < 1e-6);
    assert!((region.width - 20.0 / FRAME_WIDTH as f32).abs() < 1e-6);
}

#[test]
fn test_fresh_session_reports_again() {
    for _ in 0..2 {
        let mut surface = FakeSurface::key_on_poll(1, ScanKey::Char('q'));
        let mut session = ScanSession::new(LabelMappings::default());
        let (result, _) = run(1, vec![vec!["HELLO"]], &mut surface, &mut session);
        assert!(result.is_ok());
        assert_eq!(surface.lines(), vec!["QR_CODE: HELLO"]);
    }
}

#[test]
fn test_loop_does_not_close_surface() {
    // Closing is the caller's job so it also happens on error paths
    let mut surface = FakeSurface::key_on_poll(1, ScanKey::Esc);
    let mut session = ScanSession::new(LabelMappings::default());
    let (result, _) = run(1, vec![], &mut surface, &mut session);
    assert!(result.is_ok());
    assert!(!surface.closed);
}
