//! Screenshot downsampling for inline previews.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::error::{IoResultExt, VaultError, VaultResult};

/// Re-encoded image ready to embed in a tool result.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// Base64 of the encoded bytes.
    pub data: String,
    pub mime_type: &'static str,
    pub original_size: usize,
    pub compressed_size: usize,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn compression_ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            return 0.0;
        }
        self.original_size as f64 / self.compressed_size as f64
    }
}

/// Shrink `path` to fit in `max_width` x `max_height` (aspect ratio kept) and
/// re-encode. PNG stays PNG; everything else becomes JPEG at `quality`.
pub fn compress_image(
    path: &Path,
    max_width: u32,
    max_height: u32,
    quality: u8,
) -> VaultResult<CompressedImage> {
    let original = std::fs::read(path).with_path(path)?;
    let format = image::guess_format(&original)
        .map_err(|e| VaultError::Image(format!("unrecognised image '{}': {}", path.display(), e)))?;
    let img = image::load_from_memory_with_format(&original, format)
        .map_err(|e| VaultError::Image(format!("failed to decode '{}': {}", path.display(), e)))?;

    let img = if img.width() > max_width || img.height() > max_height {
        img.resize(max_width, max_height, FilterType::Triangle)
    } else {
        img
    };

    let (bytes, mime_type) = encode(&img, format, quality)?;

    Ok(CompressedImage {
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        mime_type,
        original_size: original.len(),
        compressed_size: bytes.len(),
        width: img.width(),
        height: img.height(),
    })
}

fn encode(
    img: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> VaultResult<(Vec<u8>, &'static str)> {
    let mut buf = Vec::new();

    match format {
        ImageFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(|e| VaultError::Image(format!("PNG encode failed: {}", e)))?;
            Ok((buf, "image/png"))
        }
        _ => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
                .map_err(|e| VaultError::Image(format!("JPEG encode failed: {}", e)))?;
            Ok((buf, "image/jpeg"))
        }
    }
}

/// Raw file as a `data:` URI.
pub fn data_uri(path: &Path, mime_type: &str) -> VaultResult<String> {
    let bytes = std::fs::read(path).with_path(path)?;
    Ok(format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        DynamicImage::new_rgba8(width, height)
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn test_large_png_is_downscaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        write_png(&path, 800, 400);

        let out = compress_image(&path, 200, 200, 70).unwrap();
        assert_eq!(out.mime_type, "image/png");
        assert_eq!((out.width, out.height), (200, 100));
        assert!(!out.data.is_empty());
    }

    #[test]
    fn test_small_image_keeps_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        write_png(&path, 50, 40);

        let out = compress_image(&path, 200, 200, 70).unwrap();
        assert_eq!((out.width, out.height), (50, 40));
    }

    #[test]
    fn test_jpeg_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        DynamicImage::new_rgb8(300, 600)
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();

        let out = compress_image(&path, 200, 200, 70).unwrap();
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!((out.width, out.height), (100, 200));
        assert!(out.compression_ratio() > 0.0);
    }

    #[test]
    fn test_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.png");
        std::fs::write(&path, "plain text").unwrap();
        assert!(matches!(
            compress_image(&path, 200, 200, 70),
            Err(VaultError::Image(_))
        ));
    }

    #[test]
    fn test_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        assert_eq!(data_uri(&path, "image/jpeg").unwrap(), "data:image/jpeg;base64,AQID");
    }
}
