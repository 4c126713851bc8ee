use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Direction, FrequencyMap, Result, SonifyError, WaveformKind};

/// Settings for one synthesis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Seconds of audio produced for each traversed column or row.
    pub seconds_per_unit: f32,
    pub direction: Direction,
    pub frequency_map: FrequencyMap,
    pub waveform: WaveformKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            seconds_per_unit: 0.001,
            direction: Direction::default(),
            frequency_map: FrequencyMap::default(),
            waveform: WaveformKind::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON document. Missing fields fall back to the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every field before any synthesis work begins.
    ///
    /// The traversal direction is not checked here: circular directions are
    /// valid configuration and only fail once synthesis dispatches on them.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(SonifyError::configuration(format!(
                "invalid sample rate {}",
                self.sample_rate
            )));
        }

        if !self.seconds_per_unit.is_finite() || self.seconds_per_unit <= 0.0 {
            return Err(SonifyError::configuration(format!(
                "invalid seconds per unit {}",
                self.seconds_per_unit
            )));
        }

        self.frequency_map.validate()?;

        if self.frequency_map.max >= 0.5 * self.sample_rate {
            tracing::warn!(
                max = self.frequency_map.max,
                nyquist = 0.5 * self.sample_rate,
                "frequency ceiling is at or above the Nyquist limit, output will alias"
            );
        }

        Ok(())
    }

    /// Samples generated per traversed line.
    pub fn samples_per_unit(&self) -> usize {
        crate::traversal::samples_per_unit(self.sample_rate, self.seconds_per_unit)
    }
}
