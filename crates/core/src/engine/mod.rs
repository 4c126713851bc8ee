use crate::{
    traversal::Axis, EngineConfig, ImageBuffer, LinePosition, PlaybackCursorMapper, Result,
    SampleBuffer, SonifyError, SynthesisContext, Waveform,
};

/// Turns images into sample buffers using a configured traversal, frequency
/// map and waveform generator.
///
/// The engine keeps no image or audio data between calls. The generator is
/// the only state it carries: its phase continues from one [`sonify`] call
/// to the next until [`SonificationEngine::reset`] is called.
///
/// [`sonify`]: SonificationEngine::sonify
pub struct SonificationEngine {
    config: EngineConfig,
    generator: Option<Box<dyn Waveform>>,
}

impl SonificationEngine {
    /// Creates an engine with a fresh instance of the configured waveform.
    pub fn new(config: EngineConfig) -> Self {
        let generator = config.waveform.build();
        Self::with_generator(config, generator)
    }

    /// Creates an engine driven by a caller supplied generator.
    pub fn with_generator(config: EngineConfig, generator: Box<dyn Waveform>) -> Self {
        Self {
            config,
            generator: Some(generator),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the settings. The current generator and its phase are kept.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    pub fn set_generator(&mut self, generator: Box<dyn Waveform>) {
        self.generator = Some(generator);
    }

    /// Removes the generator. Synthesis fails until a new one is set.
    pub fn take_generator(&mut self) -> Option<Box<dyn Waveform>> {
        self.generator.take()
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Resets the generator phase so the next pass starts from zero.
    pub fn reset(&mut self) {
        if let Some(generator) = self.generator.as_deref_mut() {
            generator.reset();
        }
    }

    pub fn samples_per_unit(&self) -> usize {
        self.config.samples_per_unit()
    }

    /// Cursor mapper matching the buffers this engine produces for `image`.
    pub fn cursor_for(&self, image: &ImageBuffer) -> Result<PlaybackCursorMapper> {
        PlaybackCursorMapper::from_config(&self.config, image.width(), image.height())
    }

    /// Synthesises a complete buffer for `image`.
    ///
    /// Validation happens before any sample is generated, so a failed call
    /// leaves the generator untouched and returns no partial output.
    pub fn sonify(&mut self, image: &ImageBuffer) -> Result<SampleBuffer> {
        let config = &self.config;
        let generator = self
            .generator
            .as_deref_mut()
            .ok_or_else(|| SonifyError::configuration("waveform generator is not set"))?;

        config.validate()?;

        if image.is_empty() {
            return Err(SonifyError::data("image data is empty"));
        }

        let sweep = config.direction.sweep(image.width(), image.height())?;
        let brightness = image.line_brightnesses(sweep.axis)?;
        let samples_per_unit = config.samples_per_unit();
        let total = sweep
            .extent
            .checked_mul(samples_per_unit)
            .filter(|&total| total <= isize::MAX as usize / std::mem::size_of::<f32>())
            .ok_or_else(|| {
                SonifyError::configuration(format!(
                    "{} lines of {samples_per_unit} samples do not fit in memory",
                    sweep.extent
                ))
            })?;

        tracing::debug!(
            direction = %config.direction,
            lines = sweep.extent,
            samples_per_unit,
            "sonifying image"
        );

        let mut samples = Vec::with_capacity(total);
        for line in sweep.lines() {
            let position = match sweep.axis {
                Axis::Columns => LinePosition::Column(line),
                Axis::Rows => LinePosition::Row(line),
            };

            for frame_index in 0..samples_per_unit {
                let ctx = SynthesisContext {
                    sample_rate: config.sample_rate,
                    brightness: brightness[line],
                    line: position,
                    width: image.width(),
                    height: image.height(),
                    sample_index: samples.len(),
                    frame_index,
                    frequency_map: config.frequency_map,
                };
                samples.push(generator.sample(&ctx));
            }
        }

        tracing::info!(
            samples = samples.len(),
            seconds = samples.len() as f32 / config.sample_rate,
            "sonification complete"
        );

        Ok(SampleBuffer::new(
            samples,
            config.sample_rate,
            samples_per_unit,
            config.direction,
        ))
    }
}

impl std::fmt::Debug for SonificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonificationEngine")
            .field("config", &self.config)
            .field("has_generator", &self.generator.is_some())
            .finish()
    }
}

/// One-shot synthesis with a fresh generator built from `config.waveform`.
pub fn sonify(image: &ImageBuffer, config: &EngineConfig) -> Result<SampleBuffer> {
    SonificationEngine::new(config.clone()).sonify(image)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{Direction, ErrorKind};

    fn config(direction: Direction) -> EngineConfig {
        EngineConfig {
            sample_rate: 1000.0,
            seconds_per_unit: 0.003,
            direction,
            ..Default::default()
        }
    }

    fn ramp(width: usize, height: usize) -> ImageBuffer {
        let data = (0..width * height)
            .map(|i| (i % width) as f32 / width as f32)
            .collect();
        ImageBuffer::new(width, height, 1, width, data).unwrap()
    }

    fn recording() -> (Box<dyn Waveform>, Arc<Mutex<Vec<SynthesisContext>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let generator: Box<dyn Waveform> = Box::new(move |ctx: &SynthesisContext| {
            sink.lock().unwrap().push(*ctx);
            ctx.brightness
        });
        (generator, seen)
    }

    #[test]
    fn emits_contexts_in_traversal_order() {
        let (generator, seen) = recording();
        let mut engine = SonificationEngine::with_generator(config(Direction::RightToLeft), generator);
        let buffer = engine.sonify(&ramp(4, 2)).unwrap();

        assert_eq!(buffer.len(), 12);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 12);

        for (i, ctx) in seen.iter().enumerate() {
            assert_eq!(ctx.sample_index, i);
            assert_eq!(ctx.frame_index, i % 3);
            assert_eq!(ctx.line, LinePosition::Column(3 - i / 3));
            assert_eq!(ctx.line.y(), None);
        }
        assert!((seen[0].brightness - 0.75).abs() < 1e-6);
        assert!((buffer.samples()[11] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn row_traversals_carry_row_coordinates() {
        let (generator, seen) = recording();
        let mut engine = SonificationEngine::with_generator(config(Direction::BottomToTop), generator);
        engine.sonify(&ramp(4, 2)).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0].line, LinePosition::Row(1));
        assert_eq!(seen[5].line, LinePosition::Row(0));
        assert_eq!(seen[0].line.x(), None);
        assert!((seen[0].brightness - 0.375).abs() < 1e-6);
    }

    #[test]
    fn missing_generator_is_a_configuration_error() {
        let mut engine = SonificationEngine::new(config(Direction::LeftToRight));
        assert!(engine.take_generator().is_some());
        let err = engine.sonify(&ramp(2, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn failures_leave_generator_phase_untouched() {
        let image = ramp(3, 3);
        let mut engine = SonificationEngine::new(config(Direction::CircleOutwards));
        let err = engine.sonify(&image).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        engine.set_config(config(Direction::LeftToRight));
        let after_failure = engine.sonify(&image).unwrap();
        let fresh = sonify(&image, &config(Direction::LeftToRight)).unwrap();
        assert_eq!(after_failure, fresh);
    }

    #[test]
    fn oversized_output_is_a_configuration_error() {
        let (generator, seen) = recording();
        let config = EngineConfig {
            sample_rate: 1e30,
            seconds_per_unit: 1e9,
            ..config(Direction::LeftToRight)
        };
        let mut engine = SonificationEngine::with_generator(config, generator);

        let err = engine.sonify(&ramp(2, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn phase_carries_over_until_reset() {
        let image = ramp(3, 1);
        let mut engine = SonificationEngine::new(config(Direction::LeftToRight));
        let first = engine.sonify(&image).unwrap();
        let continued = engine.sonify(&image).unwrap();
        engine.reset();
        let restarted = engine.sonify(&image).unwrap();

        assert_ne!(first, continued);
        assert_eq!(first, restarted);
    }
}
