// SPDX-License-Identifier: MPL-2.0

//! First-sighting beep
//!
//! The tone is played with cpal on one long-lived worker thread fed over a
//! channel, so the scan loop never waits for audio. Beeps requested while
//! one is still playing are merged into a single follow-up beep. Hosts
//! without an output device get the terminal bell instead.

use crate::constants::tone;
use crate::errors::AudioError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::io::Write;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

/// Something that can make a short audible signal
pub trait Beeper {
    /// Start a beep and return immediately
    fn beep(&mut self) -> Result<(), AudioError>;
}

/// Sine burst on the default output device
pub struct ToneBeeper {
    requests: Option<SyncSender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ToneBeeper {
    /// Create a beeper if the host has a default output device
    pub fn new() -> Result<Self, AudioError> {
        Self::with_tone(tone::FREQUENCY_HZ, tone::DURATION)
    }

    pub fn with_tone(frequency_hz: f32, duration: Duration) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        debug!(
            device = %device.name().unwrap_or_default(),
            frequency_hz,
            duration_ms = duration.as_millis(),
            "Tone beeper ready"
        );

        Self::spawn(move || play_on_default_device(frequency_hz, duration))
    }

    /// Start the worker thread that runs `play` once per accepted beep
    ///
    /// cpal streams are not Send everywhere, so every stream is built and
    /// dropped on the worker.
    pub fn spawn<F>(mut play: F) -> Result<Self, AudioError>
    where
        F: FnMut() -> Result<(), AudioError> + Send + 'static,
    {
        // One pending beep at most; more requests while it waits are merged
        let (requests, pending) = mpsc::sync_channel::<()>(1);

        let worker = std::thread::Builder::new()
            .name("beep".into())
            .spawn(move || {
                for () in pending {
                    if let Err(e) = play() {
                        debug!(error = %e, "Tone playback failed");
                    }
                }
                debug!("Tone worker stopped");
            })
            .map_err(|e| AudioError::StreamFailed(e.to_string()))?;

        Ok(Self {
            requests: Some(requests),
            worker: Some(worker),
        })
    }
}

impl Beeper for ToneBeeper {
    fn beep(&mut self) -> Result<(), AudioError> {
        let Some(requests) = &self.requests else {
            return Err(AudioError::StreamFailed("tone worker is gone".into()));
        };

        match requests.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => Ok(()),
            Err(TrySendError::Disconnected(())) => {
                Err(AudioError::StreamFailed("tone worker is gone".into()))
            }
        }
    }
}

impl Drop for ToneBeeper {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish the pending beep and exit
        self.requests.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!("Tone worker panicked");
        }
    }
}

fn play_on_default_device(frequency: f32, duration: Duration) -> Result<(), AudioError> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or(AudioError::NoOutputDevice)?;
    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::StreamFailed(e.to_string()))?;
    let config = supported.config();

    match supported.sample_format() {
        cpal::SampleFormat::F32 => play_tone::<f32>(&device, &config, frequency, duration),
        cpal::SampleFormat::I16 => play_tone::<i16>(&device, &config, frequency, duration),
        cpal::SampleFormat::U16 => play_tone::<u16>(&device, &config, frequency, duration),
        other => Err(AudioError::StreamFailed(format!(
            "unsupported sample format {:?}",
            other
        ))),
    }
}

fn play_tone<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frequency: f32,
    duration: Duration,
) -> Result<(), AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let sample_rate = config.sample_rate.0 as f32;
    let channels = config.channels as usize;
    let mut samples = tone_samples(frequency, sample_rate, duration).into_iter();

    let stream = device
        .build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in output.chunks_mut(channels) {
                    let value = samples.next().unwrap_or(0.0);
                    for sample in frame.iter_mut() {
                        *sample = T::from_sample(value);
                    }
                }
            },
            |err| warn!(error = %err, "Tone stream error"),
            None,
        )
        .map_err(|e| AudioError::StreamFailed(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AudioError::StreamFailed(e.to_string()))?;

    // Keep the stream alive for the tone plus one buffer of silence
    std::thread::sleep(duration + tone::TAIL);
    Ok(())
}

/// Mono samples of a sine burst with a short fade at both ends
pub fn tone_samples(frequency: f32, sample_rate: f32, duration: Duration) -> Vec<f32> {
    let count = (sample_rate * duration.as_secs_f32()) as usize;
    let fade = (sample_rate * tone::FADE.as_secs_f32()) as usize;
    let step = 2.0 * std::f32::consts::PI * frequency / sample_rate;

    (0..count)
        .map(|n| {
            let envelope = if fade == 0 {
                1.0
            } else {
                let from_edge = n.min(count - 1 - n);
                (from_edge as f32 / fade as f32).min(1.0)
            };
            (n as f32 * step).sin() * tone::AMPLITUDE * envelope
        })
        .collect()
}

/// Terminal bell (`BEL`) written to a stream, stderr by default
pub struct BellBeeper<W: Write> {
    out: W,
}

impl BellBeeper<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self {
            out: std::io::stderr(),
        }
    }
}

impl<W: Write> BellBeeper<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Beeper for BellBeeper<W> {
    fn beep(&mut self) -> Result<(), AudioError> {
        self.out
            .write_all(b"\x07")
            .and_then(|_| self.out.flush())
            .map_err(|e| AudioError::Bell(e.to_string()))
    }
}

/// Build the beeper for a run, or `None` when beeping is disabled
pub fn create_beeper(enabled: bool) -> Option<Box<dyn Beeper>> {
    if !enabled {
        return None;
    }

    match ToneBeeper::new() {
        Ok(beeper) => Some(Box::new(beeper)),
        Err(e) => {
            debug!(error = %e, "No audio output, falling back to terminal bell");
            Some(Box::new(BellBeeper::stderr()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_sample_count() {
        let samples = tone_samples(1000.0, 48_000.0, Duration::from_millis(120));
        assert_eq!(samples.len(), 5760);
    }

    #[test]
    fn test_tone_is_bounded_and_faded() {
        let samples = tone_samples(1000.0, 44_100.0, Duration::from_millis(120));
        assert!(samples.iter().all(|s| s.abs() <= tone::AMPLITUDE + f32::EPSILON));
        assert_eq!(samples[0], 0.0);
        assert!(samples.last().unwrap().abs() < 0.01);
        assert!(samples.iter().any(|s| s.abs() > tone::AMPLITUDE * 0.9));
    }

    #[test]
    fn test_bell_writes_bel() {
        let mut beeper = BellBeeper::new(Vec::new());
        beeper.beep().unwrap();
        beeper.beep().unwrap();
        assert_eq!(beeper.into_inner(), b"\x07\x07");
    }

    #[test]
    fn test_rapid_beeps_are_coalesced_on_one_worker() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let played = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&played);
        let mut beeper = ToneBeeper::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        for _ in 0..5 {
            beeper.beep().unwrap();
        }
        drop(beeper);

        let count = played.load(Ordering::SeqCst);
        assert!((1..=2).contains(&count), "played {} times", count);
    }

    #[test]
    fn test_playback_errors_do_not_stop_the_worker() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let mut beeper = ToneBeeper::spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AudioError::NoOutputDevice)
        })
        .unwrap();

        beeper.beep().unwrap();
        std::thread::sleep(Duration::from_millis(50));
        beeper.beep().unwrap();
        drop(beeper);

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disabled_beeper_is_none() {
        assert!(create_beeper(false).is_none());
    }
}
