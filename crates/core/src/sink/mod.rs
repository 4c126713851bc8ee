use crate::{PlaybackClock, Result, SampleBuffer, SonifyError};

/// Transport state of an [`AudioSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Consumer of finished sample buffers.
///
/// A sink plays on its own timeline and can be asked at any moment how many
/// samples have been played so far; the cursor mapper turns that count back
/// into an image coordinate.
pub trait AudioSink {
    /// Takes ownership of a buffer and rewinds to its start.
    fn load(&mut self, buffer: SampleBuffer) -> Result<()>;

    fn play(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    fn state(&self) -> PlaybackState;

    fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Samples played since the start of the buffer. Zero while stopped.
    fn elapsed_samples(&self) -> usize;
}

/// Clamps to `[-1, 1]` and scales to signed 16-bit PCM, truncating.
pub fn quantize_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|sample| (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
        .collect()
}

/// Device-free sink whose position is driven by an explicit clock.
///
/// Useful for previews, tests and offline tooling that need the same
/// elapsed-sample reporting a hardware sink would provide.
#[derive(Debug, Default)]
pub struct ClockedSink {
    pcm: Vec<i16>,
    sample_rate: f32,
    channels: u16,
    clock: PlaybackClock,
    state: PlaybackState,
}

impl ClockedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded audio as 16-bit PCM.
    pub fn pcm(&self) -> &[i16] {
        &self.pcm
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn clock(&self) -> PlaybackClock {
        self.clock
    }

    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate > 0.0 {
            self.pcm.len() as f32 / (self.sample_rate * f32::from(self.channels.max(1)))
        } else {
            0.0
        }
    }

    /// Moves the playback position forward while playing. Reaching the end
    /// of the buffer stops playback and rewinds.
    pub fn advance(&mut self, delta_seconds: f32) {
        if self.state != PlaybackState::Playing {
            return;
        }

        self.clock.advance(delta_seconds);
        if self.clock.seconds() >= self.duration_seconds() {
            tracing::debug!("playback reached end of buffer");
            self.stop();
        }
    }
}

impl AudioSink for ClockedSink {
    fn load(&mut self, buffer: SampleBuffer) -> Result<()> {
        if buffer.is_empty() {
            return Err(SonifyError::data("audio data is empty"));
        }

        self.sample_rate = buffer.sample_rate();
        self.channels = buffer.channels();
        self.pcm = quantize_i16(buffer.samples());
        self.stop();
        Ok(())
    }

    fn play(&mut self) {
        if !self.pcm.is_empty() {
            self.state = PlaybackState::Playing;
        }
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.clock.reset();
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn elapsed_samples(&self) -> usize {
        if self.state == PlaybackState::Stopped {
            return 0;
        }

        let played = self.clock.seconds() * self.sample_rate * f32::from(self.channels);
        (played as usize).min(self.pcm.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    fn loaded(len: usize, sample_rate: f32) -> ClockedSink {
        let mut sink = ClockedSink::new();
        let buffer = SampleBuffer::new(vec![0.5; len], sample_rate, 1, Direction::LeftToRight);
        sink.load(buffer).unwrap();
        sink
    }

    #[test]
    fn quantizes_with_clamping() {
        assert_eq!(quantize_i16(&[0.0, 1.0, -1.0, 2.0, -3.0]), vec![0, 32767, -32767, 32767, -32767]);
        assert_eq!(quantize_i16(&[0.5]), vec![16383]);
    }

    #[test]
    fn reports_elapsed_samples_while_playing_or_paused() {
        let mut sink = loaded(100, 100.0);
        sink.advance(0.5);
        assert_eq!(sink.elapsed_samples(), 0, "clock only runs while playing");

        sink.play();
        sink.advance(0.25);
        assert_eq!(sink.elapsed_samples(), 25);

        sink.pause();
        sink.advance(0.25);
        assert_eq!(sink.elapsed_samples(), 25);
        assert!(!sink.is_playing());

        sink.play();
        sink.advance(0.5);
        assert_eq!(sink.elapsed_samples(), 75);
    }

    #[test]
    fn stops_and_rewinds_at_end() {
        let mut sink = loaded(10, 10.0);
        sink.play();
        sink.advance(2.0);

        assert_eq!(sink.state(), PlaybackState::Stopped);
        assert_eq!(sink.elapsed_samples(), 0);
    }

    #[test]
    fn rejects_empty_buffers() {
        let mut sink = ClockedSink::new();
        let empty = SampleBuffer::new(Vec::new(), 44_100.0, 1, Direction::LeftToRight);
        assert!(sink.load(empty).is_err());

        sink.play();
        assert_eq!(sink.state(), PlaybackState::Stopped);
    }
}
