use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, SonifyError};

/// Curve used to spread brightness over the frequency range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrequencyScale {
    #[default]
    Linear,
    Log,
    Exponential,
}

impl FrequencyScale {
    pub const ALL: [FrequencyScale; 3] = [
        FrequencyScale::Linear,
        FrequencyScale::Log,
        FrequencyScale::Exponential,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyScale::Linear => "linear",
            FrequencyScale::Log => "log",
            FrequencyScale::Exponential => "exponential",
        }
    }
}

impl fmt::Display for FrequencyScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrequencyScale {
    type Err = SonifyError;

    fn from_str(s: &str) -> Result<Self> {
        FrequencyScale::ALL
            .into_iter()
            .find(|scale| scale.as_str() == s)
            .ok_or_else(|| SonifyError::configuration(format!("invalid frequency scale `{s}`")))
    }
}

/// Policy converting a normalised brightness into a frequency in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyMap {
    pub min: f32,
    pub max: f32,
    pub scale: FrequencyScale,
}

impl Default for FrequencyMap {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 2500.0,
            scale: FrequencyScale::Linear,
        }
    }
}

impl FrequencyMap {
    pub fn new(min: f32, max: f32, scale: FrequencyScale) -> Self {
        Self { min, max, scale }
    }

    /// Checks the bounds. Curved scales divide by `min`, so they need a
    /// strictly positive lower bound; the linear scale also accepts zero.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SonifyError::configuration("frequency bounds must be finite"));
        }

        if self.min < 0.0 {
            return Err(SonifyError::configuration(format!(
                "frequency minimum {} must not be negative",
                self.min
            )));
        }

        if self.max <= self.min {
            return Err(SonifyError::configuration(format!(
                "frequency maximum {} must exceed the minimum {}",
                self.max, self.min
            )));
        }

        if self.scale != FrequencyScale::Linear && self.min <= 0.0 {
            return Err(SonifyError::configuration(format!(
                "`{}` frequency scale requires a positive minimum",
                self.scale
            )));
        }

        Ok(())
    }

    /// Frequency for `brightness` using the configured curve.
    pub fn frequency(&self, brightness: f32) -> f32 {
        let b = brightness.clamp(0.0, 1.0);
        match self.scale {
            FrequencyScale::Linear => self.linear_frequency(b),
            FrequencyScale::Log => self.min * (self.max / self.min).powf(b),
            FrequencyScale::Exponential => self.min * (b * (self.max / self.min).ln()).exp(),
        }
    }

    /// Frequency for `brightness` on the linear curve, whatever the scale.
    pub fn linear_frequency(&self, brightness: f32) -> f32 {
        let b = brightness.clamp(0.0, 1.0);
        self.min + b * (self.max - self.min)
    }
}
