use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};

use crate::{Result, SonifyError};

/// Level summary of a block of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub rms: f32,
    pub peak: f32,
    pub duration_seconds: f32,
}

impl SampleStats {
    pub fn measure(samples: &[f32], sample_rate: f32) -> Self {
        Self {
            rms: compute_rms(samples),
            peak: compute_peak(samples),
            duration_seconds: if sample_rate > 0.0 {
                samples.len() as f32 / sample_rate
            } else {
                0.0
            },
        }
    }
}

/// FFT-based frequency estimation over mono blocks. The FFT plan is cached
/// and rebuilt only when the block size changes.
pub struct SpectrumAnalyzer {
    sample_rate: f32,
    fft_planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            fft_planner: RealFftPlanner::new(),
            fft: None,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frequency in Hz of the strongest non-DC component, refined by
    /// parabolic interpolation between neighbouring bins.
    pub fn dominant_frequency(&mut self, samples: &[f32]) -> Result<f32> {
        let len = samples.len();
        let bin_hz = self.sample_rate / len.max(1) as f32;
        let spectrum = self.magnitudes(samples)?;

        let Some((peak, _)) = spectrum
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
        else {
            return Ok(0.0);
        };

        let offset = if peak + 1 < spectrum.len() {
            let (alpha, beta, gamma) = (spectrum[peak - 1], spectrum[peak], spectrum[peak + 1]);
            let denom = alpha - 2.0 * beta + gamma;
            if denom.abs() > f32::EPSILON {
                0.5 * (alpha - gamma) / denom
            } else {
                0.0
            }
        } else {
            0.0
        };

        Ok((peak as f32 + offset) * bin_hz)
    }

    /// Magnitude-weighted mean frequency in Hz.
    pub fn spectral_centroid(&mut self, samples: &[f32]) -> Result<f32> {
        let bin_hz = self.sample_rate / samples.len().max(1) as f32;
        let spectrum = self.magnitudes(samples)?;

        let mut magnitude_sum = 0.0;
        let mut weighted_sum = 0.0;
        for (i, magnitude) in spectrum.iter().enumerate() {
            magnitude_sum += magnitude;
            weighted_sum += magnitude * (i as f32 * bin_hz);
        }

        if magnitude_sum <= f32::EPSILON {
            Ok(0.0)
        } else {
            Ok(weighted_sum / magnitude_sum)
        }
    }

    fn magnitudes(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let len = samples.len();
        if len < 2 {
            return Err(SonifyError::data(
                "spectral analysis requires blocks with at least two samples",
            ));
        }

        let fft = self.prepare_fft(len);
        for (index, value) in samples.iter().enumerate() {
            fft.input[index] = *value * hann_value(index, len);
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)
            .map_err(|err| SonifyError::data(format!("fft failed: {err}")))?;

        Ok(fft.spectrum.iter().map(|bin| bin.norm()).collect())
    }

    fn prepare_fft(&mut self, size: usize) -> &mut FftResources {
        let fft = match self.fft.take() {
            Some(fft) if fft.size == size => fft,
            _ => {
                let plan = self.fft_planner.plan_fft_forward(size);
                let scratch = plan.make_scratch_vec();
                let spectrum = plan.make_output_vec();
                let input = plan.make_input_vec();
                FftResources {
                    size,
                    plan,
                    scratch,
                    spectrum,
                    input,
                }
            }
        };

        self.fft.insert(fft)
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("sample_rate", &self.sample_rate)
            .field("fft", &self.fft)
            .finish()
    }
}

impl fmt::Debug for FftResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftResources")
            .field("size", &self.size)
            .finish()
    }
}

pub fn compute_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    (sum / samples.len() as f32).sqrt()
}

pub fn compute_peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |peak, sample| peak.max(sample.abs()))
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frequency: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (2.0 * PI * frequency * n as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn measures_levels() {
        let stats = SampleStats::measure(&[0.5, -1.0, 0.5, 0.0], 4.0);
        assert_eq!(stats.peak, 1.0);
        assert!((stats.rms - (1.5_f32 / 4.0).sqrt()).abs() < 1e-6);
        assert_eq!(stats.duration_seconds, 1.0);

        assert_eq!(SampleStats::measure(&[], 44_100.0), SampleStats::default());
    }

    #[test]
    fn finds_dominant_frequency() {
        let mut analyzer = SpectrumAnalyzer::new(8000.0);
        let estimate = analyzer.dominant_frequency(&tone(440.0, 8000.0, 2048)).unwrap();
        assert!((estimate - 440.0).abs() < 4.0, "estimated {estimate}");

        // a different block size rebuilds the plan
        let estimate = analyzer.dominant_frequency(&tone(1000.0, 8000.0, 1000)).unwrap();
        assert!((estimate - 1000.0).abs() < 8.0, "estimated {estimate}");
    }

    #[test]
    fn silent_block_has_zero_centroid() {
        let mut analyzer = SpectrumAnalyzer::new(48_000.0);
        assert_eq!(analyzer.spectral_centroid(&[0.0; 1024]).unwrap(), 0.0);
    }

    #[test]
    fn rejects_tiny_blocks() {
        let mut analyzer = SpectrumAnalyzer::new(48_000.0);
        assert!(analyzer.dominant_frequency(&[0.3]).is_err());
    }
}
