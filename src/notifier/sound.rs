//! Audible completion cue
//!
//! The chime is a [`rodio::Source`] synthesized on the fly and played on the
//! default output device. Audio is optional: every failure is logged at
//! debug level and otherwise ignored.

use std::{f32::consts::TAU, time::Duration};
use rodio::{OutputStream, Sink, Source};
use tracing::debug;

const SAMPLE_RATE: u32 = 44_100;

/// A run of tones played back to back under one decaying envelope
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSequence {
    /// (frequency in Hz, length in ms)
    pub steps: Vec<(f32, u32)>,
    pub start_gain: f32,
    pub end_gain: f32,
}

impl ToneSequence {
    /// 800 Hz, 600 Hz, 800 Hz over 300 ms, fading from 0.3 to 0.01
    pub fn chime() -> Self {
        Self {
            steps: vec![(800.0, 100), (600.0, 100), (800.0, 100)],
            start_gain: 0.3,
            end_gain: 0.01,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        self.steps.iter().map(|(_, ms)| ms).sum()
    }

    /// Playable source for this sequence
    pub fn source(&self) -> ToneSource {
        ToneSource::new(self.clone())
    }
}

/// Mono sine generator walking through a [`ToneSequence`]
#[derive(Debug, Clone)]
pub struct ToneSource {
    tones: ToneSequence,
    step: usize,
    step_sample: usize,
    played: usize,
    total: usize,
    phase: f32,
}

impl ToneSource {
    fn new(tones: ToneSequence) -> Self {
        let total = samples_for(tones.duration_ms());
        Self {
            tones,
            step: 0,
            step_sample: 0,
            played: 0,
            total,
            phase: 0.0,
        }
    }

    /// Exponential ramp from `start_gain` to `end_gain` across the sequence
    fn gain(&self) -> f32 {
        let progress = self.played as f32 / self.total.max(1) as f32;
        let ratio = self.tones.end_gain / self.tones.start_gain;
        self.tones.start_gain * ratio.powf(progress)
    }
}

fn samples_for(ms: u32) -> usize {
    (u64::from(SAMPLE_RATE) * u64::from(ms) / 1000) as usize
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let frequency = loop {
            let &(frequency, ms) = self.tones.steps.get(self.step)?;
            if self.step_sample < samples_for(ms) {
                break frequency;
            }
            self.step += 1;
            self.step_sample = 0;
        };

        let sample = self.phase.sin() * self.gain();
        self.phase = (self.phase + TAU * frequency / SAMPLE_RATE as f32) % TAU;
        self.step_sample += 1;
        self.played += 1;
        Some(sample)
    }
}

impl Source for ToneSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total - self.played.min(self.total))
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(u64::from(self.tones.duration_ms())))
    }
}

/// Plays tone sequences on the default audio output
#[derive(Debug, Clone, Default)]
pub struct SoundPlayer;

impl SoundPlayer {
    pub fn new() -> Self {
        Self
    }

    /// Fire and forget. Does nothing outside a tokio runtime.
    pub fn play(&self, tone: &ToneSequence) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime available, skipping completion sound");
            return;
        };
        let source = tone.source();
        // The output stream is not Send, so it lives and dies on the blocking thread
        runtime.spawn_blocking(move || {
            if let Err(e) = play_blocking(source) {
                debug!("Audio notification not supported: {}", e);
            }
        });
    }
}

fn play_blocking(source: ToneSource) -> Result<(), String> {
    let (_stream, handle) = OutputStream::try_default()
        .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
    let sink = Sink::try_new(&handle)
        .map_err(|e| format!("Failed to create audio sink: {}", e))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
            .count()
    }

    #[test]
    fn chime_is_three_tones_over_300ms() {
        let chime = ToneSequence::chime();
        assert_eq!(chime.duration_ms(), 300);
        let frequencies: Vec<f32> = chime.steps.iter().map(|(f, _)| *f).collect();
        assert_eq!(frequencies, vec![800.0, 600.0, 800.0]);

        let source = chime.source();
        assert_eq!(source.channels(), 1);
        assert_eq!(source.total_duration(), Some(Duration::from_millis(300)));
    }

    #[test]
    fn source_steps_through_frequencies() {
        let samples: Vec<f32> = ToneSequence::chime().source().collect();
        let step = samples_for(100);
        assert_eq!(samples.len(), step * 3);

        // A sine at f Hz crosses zero about 2f times per second
        let crossings: Vec<usize> = samples.chunks(step).map(zero_crossings).collect();
        assert!((155..=165).contains(&crossings[0]), "{:?}", crossings);
        assert!((115..=125).contains(&crossings[1]), "{:?}", crossings);
        assert!((155..=165).contains(&crossings[2]), "{:?}", crossings);
    }

    #[test]
    fn amplitude_decays_from_03_to_001() {
        let samples: Vec<f32> = ToneSequence::chime().source().collect();
        let peak = |window: &[f32]| window.iter().fold(0.0f32, |max, s| max.max(s.abs()));

        let head = peak(&samples[..500]);
        let tail = peak(&samples[samples.len() - 500..]);
        assert!(head <= 0.3 + f32::EPSILON);
        assert!(head > 0.25, "head {}", head);
        assert!(tail < 0.015, "tail {}", tail);
        assert!(tail > 0.005, "tail {}", tail);
    }

    #[test]
    fn playing_without_runtime_is_silent() {
        SoundPlayer::new().play(&ToneSequence::chime());
    }
}
