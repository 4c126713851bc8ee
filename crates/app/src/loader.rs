use std::path::Path;

use anyhow::{bail, Context};
use sonify_core::ImageBuffer;

/// Reads and decodes an image file into a normalised RGBA buffer.
pub fn load_image(path: &Path) -> anyhow::Result<ImageBuffer> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image file {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("load image {}", path.display()))
}

/// Decodes encoded image bytes. Every format is widened to RGBA8 first so
/// the engine always sees four channels.
pub fn decode_image(bytes: &[u8]) -> anyhow::Result<ImageBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        bail!("invalid image dimensions {width}x{height}");
    }

    let buffer = ImageBuffer::from_rgba8(width as usize, height as usize, rgba.as_raw())?;
    tracing::debug!(width, height, "decoded image");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(width: u32, height: u32, rgba: Vec<u8>) -> Vec<u8> {
        let img = image::RgbaImage::from_raw(width, height, rgba).unwrap();
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decodes_png_into_normalised_rgba() {
        let bytes = png_bytes(2, 1, vec![255, 0, 0, 255, 0, 0, 0, 0]);
        let image = decode_image(&bytes).unwrap();

        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 1);
        assert_eq!(image.channels(), 4);
        assert_eq!(image.stride(), 8);
        assert_eq!(&image.data()[..4], &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, png_bytes(1, 1, vec![0, 255, 0, 255])).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.data(), &[0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn reports_missing_and_garbage_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        let err = load_image(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("missing.png"));

        assert!(decode_image(b"definitely not an image").is_err());
    }
}
