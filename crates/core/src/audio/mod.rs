use crate::{analysis::SampleStats, Direction};

/// Number of interleaved channels in every buffer the engine produces.
pub const CHANNELS: u16 = 1;

/// Mono synthesis output.
///
/// Samples are stored in temporal order, which is also traversal order: the
/// first `samples_per_unit` samples belong to the first visited line, and so
/// on.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: f32,
    samples_per_unit: usize,
    direction: Direction,
}

impl SampleBuffer {
    pub fn new(
        samples: Vec<f32>,
        sample_rate: f32,
        samples_per_unit: usize,
        direction: Direction,
    ) -> Self {
        Self {
            samples,
            sample_rate,
            samples_per_unit: samples_per_unit.max(1),
            direction,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Releases the raw samples, e.g. to hand them to an audio device.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        CHANNELS
    }

    pub fn samples_per_unit(&self) -> usize {
        self.samples_per_unit
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of traversed lines the buffer covers.
    pub fn line_count(&self) -> usize {
        self.samples.len() / self.samples_per_unit
    }

    /// Samples generated for the `order`-th visited line.
    pub fn line(&self, order: usize) -> Option<&[f32]> {
        let start = order.checked_mul(self.samples_per_unit)?;
        self.samples.get(start..start + self.samples_per_unit)
    }

    pub fn lines(&self) -> std::slice::Chunks<'_, f32> {
        self.samples.chunks(self.samples_per_unit)
    }

    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate
    }

    pub fn stats(&self) -> SampleStats {
        SampleStats::measure(&self.samples, self.sample_rate)
    }
}
