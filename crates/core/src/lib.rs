//! Core library for the image sonifier.
//!
//! An image is traversed one column or row at a time. Each line is reduced to
//! its mean luminance, that brightness is mapped onto a frequency, and a
//! stateful waveform generator renders a fixed number of samples for the
//! line. The resulting mono buffer is handed to an external audio sink, and
//! the cursor mapper converts the sink's playback position back into an image
//! coordinate.
//!
//! ```no_run
//! use sonify_core::{sonify, EngineConfig, ImageBuffer};
//!
//! let image = ImageBuffer::new(2, 1, 1, 2, vec![0.0, 1.0])?;
//! let buffer = sonify(&image, &EngineConfig::default())?;
//! assert_eq!(buffer.len(), 2 * 44);
//! # Ok::<(), sonify_core::SonifyError>(())
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod raster;
pub mod sink;
pub mod timeline;
pub mod traversal;
pub mod waveform;

pub use analysis::{SampleStats, SpectrumAnalyzer};
pub use audio::SampleBuffer;
pub use config::EngineConfig;
pub use cursor::{CursorLayout, CursorPosition, PlaybackCursorMapper, Rect, Size};
pub use engine::{sonify, SonificationEngine};
pub use error::{ErrorKind, Result, SonifyError};
pub use mapping::{FrequencyMap, FrequencyScale};
pub use raster::{normalize_u8, ChannelLayout, ImageBuffer};
pub use sink::{quantize_i16, AudioSink, ClockedSink, PlaybackState};
pub use timeline::PlaybackClock;
pub use traversal::{samples_per_unit, Axis, Direction, LineSweep};
pub use waveform::{
    LinePosition, Oscillator, Sine, SineFrequency, SynthesisContext, Waveform, WaveformKind,
};
