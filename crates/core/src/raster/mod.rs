use crate::{traversal::Axis, Result, SonifyError};

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Normalised float pixel buffer handed over by an image loader.
///
/// Channel `c` of pixel `(x, y)` lives at `data[y * stride + x * channels + c]`
/// and every value is expected to be in `[0, 1]`. The buffer is read-only once
/// constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageBuffer {
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
    data: Vec<f32>,
}

impl ImageBuffer {
    /// Wraps pre-normalised pixel data after checking that both dimensions
    /// are non-zero and the geometry is consistent with the buffer length.
    ///
    /// The channel count itself is only checked when the image is traversed.
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
        data: Vec<f32>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SonifyError::data(format!(
                "image dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let row_len = width
            .checked_mul(channels)
            .ok_or_else(|| SonifyError::data("image row size overflows"))?;
        if stride < row_len {
            return Err(SonifyError::data(format!(
                "row stride {stride} is smaller than width * channels ({row_len})"
            )));
        }

        let expected = height
            .checked_mul(stride)
            .ok_or_else(|| SonifyError::data("image size overflows"))?;
        if data.len() != expected {
            return Err(SonifyError::data(format!(
                "expected {expected} values for a {width}x{height} image with stride {stride}, got {}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            stride,
            data,
        })
    }

    /// Builds a four channel image from tightly packed RGBA8 bytes.
    pub fn from_rgba8(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        Self::new(width, height, 4, width * 4, normalize_u8(bytes))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resolves the channel count into a supported pixel layout.
    pub fn layout(&self) -> Result<ChannelLayout> {
        ChannelLayout::from_count(self.channels)
    }

    /// Luminance of a single pixel.
    pub fn luminance(&self, layout: ChannelLayout, x: usize, y: usize) -> f32 {
        let idx = y * self.stride + x * self.channels;
        match layout {
            ChannelLayout::Gray => self.data[idx],
            // alpha is ignored
            ChannelLayout::Rgb | ChannelLayout::Rgba => {
                LUMA_R * self.data[idx] + LUMA_G * self.data[idx + 1] + LUMA_B * self.data[idx + 2]
            }
        }
    }

    /// Arithmetic mean of the luminance along one line.
    ///
    /// For [`Axis::Columns`] `index` is an `x` coordinate and the mean runs
    /// over the full height; for [`Axis::Rows`] it is a `y` coordinate and the
    /// mean runs over the full width.
    pub fn line_brightness(&self, layout: ChannelLayout, axis: Axis, index: usize) -> f32 {
        match axis {
            Axis::Columns => {
                let sum: f32 = (0..self.height)
                    .map(|y| self.luminance(layout, index, y))
                    .sum();
                sum / self.height as f32
            }
            Axis::Rows => {
                let sum: f32 = (0..self.width)
                    .map(|x| self.luminance(layout, x, index))
                    .sum();
                sum / self.width as f32
            }
        }
    }

    /// Mean brightness of every line along `axis`, indexed by image coordinate.
    pub fn line_brightnesses(&self, axis: Axis) -> Result<Vec<f32>> {
        let layout = self.layout()?;
        let extent = match axis {
            Axis::Columns => self.width,
            Axis::Rows => self.height,
        };

        let reduce = |index| self.line_brightness(layout, axis, index);

        // lines are independent; only the collection order matters
        #[cfg(feature = "parallel")]
        let values = {
            use rayon::prelude::*;
            (0..extent).into_par_iter().map(reduce).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let values = (0..extent).map(reduce).collect();

        Ok(values)
    }
}

/// Pixel layouts the luminance reduction understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Gray,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn from_count(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(ChannelLayout::Gray),
            3 => Ok(ChannelLayout::Rgb),
            4 => Ok(ChannelLayout::Rgba),
            other => Err(SonifyError::data(format!(
                "number of channels ({other}) is not supported"
            ))),
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }
}

/// Maps 8-bit samples onto `[0, 1]`.
pub fn normalize_u8(bytes: &[u8]) -> Vec<f32> {
    bytes.iter().map(|&byte| f32::from(byte) / 255.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: usize, height: usize, data: Vec<f32>) -> ImageBuffer {
        ImageBuffer::new(width, height, 1, width, data).unwrap()
    }

    #[test]
    fn rejects_inconsistent_geometry() {
        let err = ImageBuffer::new(2, 2, 3, 4, vec![0.0; 8]).unwrap_err();
        assert!(format!("{err}").contains("stride"));

        let err = ImageBuffer::new(2, 2, 1, 2, vec![0.0; 3]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Data);
    }

    #[test]
    fn rejects_zero_dimensions() {
        // padded stride keeps the data non-empty even with no columns
        let err = ImageBuffer::new(0, 2, 1, 3, vec![0.5; 6]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Data);
        assert!(format!("{err}").contains("0x2"));

        let err = ImageBuffer::new(2, 0, 1, 2, Vec::new()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Data);

        assert!(ImageBuffer::from_rgba8(0, 1, &[]).is_err());
    }

    #[test]
    fn averages_columns_and_rows() {
        // 0.0 0.2
        // 0.4 0.6
        let image = gray(2, 2, vec![0.0, 0.2, 0.4, 0.6]);
        let layout = image.layout().unwrap();

        assert!((image.line_brightness(layout, Axis::Columns, 0) - 0.2).abs() < 1e-6);
        assert!((image.line_brightness(layout, Axis::Columns, 1) - 0.4).abs() < 1e-6);
        assert!((image.line_brightness(layout, Axis::Rows, 0) - 0.1).abs() < 1e-6);
        assert!((image.line_brightness(layout, Axis::Rows, 1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rgba_luminance_ignores_alpha() {
        let opaque = ImageBuffer::new(1, 1, 4, 4, vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let clear = ImageBuffer::new(1, 1, 4, 4, vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        let layout = opaque.layout().unwrap();

        assert!((opaque.luminance(layout, 0, 0) - 0.299).abs() < 1e-6);
        assert_eq!(opaque.luminance(layout, 0, 0), clear.luminance(layout, 0, 0));
    }

    #[test]
    fn padded_stride_is_skipped() {
        // one padding value per row
        let image = ImageBuffer::new(1, 2, 1, 2, vec![0.5, 9.0, 0.25, 9.0]).unwrap();
        let values = image.line_brightnesses(Axis::Rows).unwrap();
        assert_eq!(values, vec![0.5, 0.25]);
    }

    #[test]
    fn unsupported_channel_count_is_a_data_error() {
        let image = ImageBuffer::new(1, 1, 2, 2, vec![0.5, 0.5]).unwrap();
        let err = image.line_brightnesses(Axis::Columns).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Data);
    }

    #[test]
    fn normalizes_bytes() {
        assert_eq!(normalize_u8(&[0, 255]), vec![0.0, 1.0]);

        let image = ImageBuffer::from_rgba8(1, 1, &[255, 255, 255, 0]).unwrap();
        assert_eq!(image.stride(), 4);
        assert_eq!(image.channels(), 4);
    }
}
