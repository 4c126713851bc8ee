//! Mapping from played samples back to image coordinates.
//!
//! The engine allots `samples_per_unit` consecutive samples to every visited
//! line. [`PlaybackCursorMapper`] inverts that allocation so a visual cursor
//! can follow an audio sink that only reports how many samples it has played.

use std::ops::Range;

use crate::{
    traversal::{samples_per_unit, Axis, LineSweep},
    Direction, EngineConfig, Result,
};

/// Where the cursor sits for a given playback position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub axis: Axis,
    /// Index of the visited line, in traversal order.
    pub line_index: usize,
    /// Cursor edge in image pixels along the primary axis. Forward sweeps
    /// start at 0; reversed sweeps start at the far edge and move back.
    pub coordinate: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursorMapper {
    direction: Direction,
    sweep: LineSweep,
    samples_per_unit: usize,
}

impl PlaybackCursorMapper {
    /// Fails with an unsupported-feature error for circular directions.
    pub fn new(
        direction: Direction,
        width: usize,
        height: usize,
        samples_per_unit: usize,
    ) -> Result<Self> {
        Ok(Self {
            direction,
            sweep: direction.sweep(width, height)?,
            samples_per_unit: samples_per_unit.max(1),
        })
    }

    /// Mapper for buffers produced with `config` from a `width` x `height`
    /// image.
    pub fn from_config(config: &EngineConfig, width: usize, height: usize) -> Result<Self> {
        Self::new(
            config.direction,
            width,
            height,
            samples_per_unit(config.sample_rate, config.seconds_per_unit),
        )
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn axis(&self) -> Axis {
        self.sweep.axis
    }

    pub fn samples_per_unit(&self) -> usize {
        self.samples_per_unit
    }

    /// Number of visited lines.
    pub fn extent(&self) -> usize {
        self.sweep.extent
    }

    pub fn total_samples(&self) -> usize {
        self.sweep.extent * self.samples_per_unit
    }

    /// Traversal-order index of the line that was sounding after
    /// `elapsed_samples` samples.
    pub fn line_index(&self, elapsed_samples: usize) -> usize {
        elapsed_samples / self.samples_per_unit
    }

    /// Forward allocation: the sample range synthesised for `line_index`.
    pub fn sample_range(&self, line_index: usize) -> Range<usize> {
        let start = line_index * self.samples_per_unit;
        start..start + self.samples_per_unit
    }

    /// Image column or row being played, or `None` once playback has moved
    /// past the last line.
    pub fn image_line(&self, elapsed_samples: usize) -> Option<usize> {
        let line_index = self.line_index(elapsed_samples);
        (line_index < self.sweep.extent).then(|| self.sweep.line_at(line_index))
    }

    pub fn position(&self, elapsed_samples: usize) -> CursorPosition {
        let line_index = self.line_index(elapsed_samples);
        let coordinate = if self.sweep.reversed {
            self.sweep.extent.saturating_sub(line_index)
        } else {
            line_index
        };

        CursorPosition {
            axis: self.sweep.axis,
            line_index,
            coordinate,
        }
    }
}

/// Width and height in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Uniform scale and offset that place an image inside a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

/// Scales the image to fit within three quarters of the window width and
/// the full window height, centred.
pub fn fit_image(window: Size, image: Size) -> ImagePlacement {
    let scale_x = (window.width - window.width * 0.25) / image.width;
    let scale_y = window.height / image.height;
    let scale = scale_x.min(scale_y);

    ImagePlacement {
        x: (window.width - image.width * scale) * 0.5,
        y: (window.height - image.height * scale) * 0.5,
        scale,
    }
}

/// Converts cursor positions into display-space rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorLayout {
    pub placement: ImagePlacement,
    pub image: Size,
    pub cursor_width: f32,
}

impl CursorLayout {
    pub fn new(window: Size, image: Size, cursor_width: f32) -> Self {
        Self {
            placement: fit_image(window, image),
            image,
            cursor_width,
        }
    }

    pub fn rect(&self, position: &CursorPosition) -> Rect {
        let ImagePlacement { x, y, scale } = self.placement;
        let offset = position.coordinate as f32 * scale;

        match position.axis {
            Axis::Columns => Rect {
                x: x + offset,
                y,
                width: self.cursor_width,
                height: self.image.height * scale,
            },
            Axis::Rows => Rect {
                x,
                y: y + offset,
                width: self.image.width * scale,
                height: self.cursor_width,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn forward_sweeps_advance_from_origin() {
        let mapper = PlaybackCursorMapper::new(Direction::LeftToRight, 5, 3, 10).unwrap();
        assert_eq!(mapper.position(0).coordinate, 0);
        assert_eq!(mapper.position(9).coordinate, 0);
        assert_eq!(mapper.position(10).coordinate, 1);
        assert_eq!(mapper.image_line(49), Some(4));
        assert_eq!(mapper.image_line(50), None);
    }

    #[test]
    fn reversed_sweeps_start_at_far_edge() {
        let mapper = PlaybackCursorMapper::new(Direction::BottomToTop, 5, 3, 4).unwrap();
        assert_eq!(mapper.axis(), Axis::Rows);
        assert_eq!(mapper.position(0).coordinate, 3);
        assert_eq!(mapper.position(4).coordinate, 2);
        assert_eq!(mapper.image_line(0), Some(2));
        assert_eq!(mapper.position(400).coordinate, 0);
    }

    #[test]
    fn line_index_inverts_sample_ranges() {
        let mapper = PlaybackCursorMapper::new(Direction::RightToLeft, 7, 2, 3).unwrap();
        for elapsed in 0..mapper.total_samples() {
            let line = mapper.line_index(elapsed);
            assert!(mapper.sample_range(line).contains(&elapsed));
        }
    }

    #[test]
    fn circular_directions_are_unsupported() {
        let err = PlaybackCursorMapper::new(Direction::CircleOutwards, 4, 4, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn fits_and_centres_image() {
        let placement = fit_image(Size::new(800.0, 600.0), Size::new(300.0, 300.0));
        assert_eq!(placement.scale, 2.0);
        assert_eq!(placement.x, 100.0);
        assert_eq!(placement.y, 0.0);
    }

    #[test]
    fn cursor_rect_follows_axis() {
        let layout = CursorLayout::new(Size::new(800.0, 600.0), Size::new(300.0, 300.0), 5.0);

        let column = CursorPosition {
            axis: Axis::Columns,
            line_index: 10,
            coordinate: 10,
        };
        assert_eq!(
            layout.rect(&column),
            Rect {
                x: 120.0,
                y: 0.0,
                width: 5.0,
                height: 600.0
            }
        );

        let row = CursorPosition {
            axis: Axis::Rows,
            line_index: 3,
            coordinate: 3,
        };
        assert_eq!(
            layout.rect(&row),
            Rect {
                x: 100.0,
                y: 6.0,
                width: 600.0,
                height: 5.0
            }
        );
    }
}
