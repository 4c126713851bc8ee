use std::{f32::consts::TAU, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{FrequencyMap, Result, SonifyError};

/// Everything a generator may look at for one output sample.
///
/// A fresh value is built for every sample; generators never see state left
/// over from a previous line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisContext {
    pub sample_rate: f32,
    /// Mean luminance of the current line, nominally in `[0, 1]`.
    pub brightness: f32,
    pub line: LinePosition,
    pub width: usize,
    pub height: usize,
    /// Position of this sample within the whole output buffer.
    pub sample_index: usize,
    /// Position of this sample within the current line.
    pub frame_index: usize,
    pub frequency_map: FrequencyMap,
}

/// Image coordinate of the line being synthesised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePosition {
    Column(usize),
    Row(usize),
}

impl LinePosition {
    pub fn x(&self) -> Option<usize> {
        match self {
            LinePosition::Column(x) => Some(*x),
            LinePosition::Row(_) => None,
        }
    }

    pub fn y(&self) -> Option<usize> {
        match self {
            LinePosition::Column(_) => None,
            LinePosition::Row(y) => Some(*y),
        }
    }
}

/// Stateful signal source driven once per output sample.
///
/// Implementations return values in `[-1, 1]`. Any state they carry (such as
/// oscillator phase) belongs to the instance and survives between calls until
/// [`Waveform::reset`] is invoked.
pub trait Waveform: Send {
    fn sample(&mut self, ctx: &SynthesisContext) -> f32;

    /// Returns the generator to its initial state.
    fn reset(&mut self) {}
}

impl<F> Waveform for F
where
    F: FnMut(&SynthesisContext) -> f32 + Send,
{
    fn sample(&mut self, ctx: &SynthesisContext) -> f32 {
        self(ctx)
    }
}

/// Phase accumulator shared by the sine generators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    phase: f32,
}

impl Oscillator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Advances by one sample at `frequency` and returns the new phase.
    ///
    /// Overflow past `2π` is corrected with a single subtraction, not a
    /// modulo, so a step larger than `2π` leaves the phase above `2π`.
    pub fn advance(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        self.phase += TAU * frequency / sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        self.phase
    }
}

/// Sine whose pitch follows the configured frequency curve and whose
/// amplitude follows brightness.
#[derive(Debug, Clone, Default)]
pub struct Sine {
    oscillator: Oscillator,
}

impl Sine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }
}

impl Waveform for Sine {
    fn sample(&mut self, ctx: &SynthesisContext) -> f32 {
        let b = ctx.brightness.clamp(0.0, 1.0);
        let frequency = ctx.frequency_map.frequency(b);
        let phase = self.oscillator.advance(frequency, ctx.sample_rate);
        b * phase.sin()
    }

    fn reset(&mut self) {
        self.oscillator.reset();
    }
}

/// Full-amplitude sine whose pitch always follows the linear curve.
#[derive(Debug, Clone, Default)]
pub struct SineFrequency {
    oscillator: Oscillator,
}

impl SineFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }
}

impl Waveform for SineFrequency {
    fn sample(&mut self, ctx: &SynthesisContext) -> f32 {
        let frequency = ctx.frequency_map.linear_frequency(ctx.brightness);
        self.oscillator.advance(frequency, ctx.sample_rate).sin()
    }

    fn reset(&mut self) {
        self.oscillator.reset();
    }
}

/// Built-in generator selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaveformKind {
    #[default]
    Sine,
    SineFrequency,
}

impl WaveformKind {
    pub const ALL: [WaveformKind; 2] = [WaveformKind::Sine, WaveformKind::SineFrequency];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaveformKind::Sine => "sine",
            WaveformKind::SineFrequency => "sine-frequency",
        }
    }

    /// Creates a fresh generator with its phase at zero.
    pub fn build(&self) -> Box<dyn Waveform> {
        match self {
            WaveformKind::Sine => Box::new(Sine::new()),
            WaveformKind::SineFrequency => Box::new(SineFrequency::new()),
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaveformKind {
    type Err = SonifyError;

    fn from_str(s: &str) -> Result<Self> {
        WaveformKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SonifyError::configuration(format!("invalid waveform `{s}`")))
    }
}
