// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Photo compression: bound the dimensions and byte size of uploads before
//! they become session previews.

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Tuning knobs for [`compress_image`].
#[derive(Clone, Debug)]
pub struct CompressionOptions {
    /// Upper bound for the encoded output, in bytes.
    pub max_bytes: usize,
    /// Upper bound for the longer edge of the output, in pixels.
    pub max_dimension: u32,
    /// JPEG quality of the first encoding attempt.
    pub initial_quality: u8,
    /// Lowest quality tried before giving up on the byte budget.
    pub quality_floor: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_dimension: 1920,
            initial_quality: 85,
            quality_floor: 40,
        }
    }
}

/// Why a file could not be turned into a preview.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// The bytes are not a decodable image (corrupt file, or a declared
    /// type that lied about the content).
    #[error("failed to decode image data")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode compressed image")]
    Encode(#[source] image::ImageError),
    /// Even the lowest permitted quality produced too many bytes.
    #[error("compressed image exceeds {limit} bytes at quality {quality}")]
    TooLarge { limit: usize, quality: u8 },
}

/// A compressed, displayable image produced by ingestion.
#[derive(Clone, Debug)]
pub struct CompressedImage {
    /// JPEG-encoded pixel data.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Lowercase hex SHA-256 of `bytes`.
    pub digest: String,
}

/// Decode, clamp to the configured bounds, and re-encode an uploaded image.
///
/// The aspect ratio is preserved; images already within bounds are not
/// upscaled. Output is always JPEG, with quality stepped down until the
/// byte budget holds.
pub fn compress_image(
    data: &[u8],
    options: &CompressionOptions,
) -> Result<CompressedImage, CompressionError> {
    let decoded = image::load_from_memory(data).map_err(CompressionError::Decode)?;
    let resized = clamp_dimensions(decoded, options.max_dimension);

    let mut quality = options.initial_quality.max(options.quality_floor);
    loop {
        let bytes = encode_jpeg(&resized, quality)?;
        if bytes.len() <= options.max_bytes {
            let digest = format!("{:x}", Sha256::digest(&bytes));
            return Ok(CompressedImage {
                bytes,
                width: resized.width(),
                height: resized.height(),
                digest,
            });
        }
        if quality <= options.quality_floor {
            return Err(CompressionError::TooLarge {
                limit: options.max_bytes,
                quality,
            });
        }
        quality = quality.saturating_sub(10).max(options.quality_floor);
    }
}

/// Shrink an image so its longer edge fits `max_dimension`. Never upscales.
fn clamp_dimensions(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    if image.width().max(image.height()) <= max_dimension {
        image
    } else {
        image.resize(max_dimension, max_dimension, FilterType::Triangle)
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    // JPEG carries no alpha channel; flatten before encoding.
    image
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(CompressionError::Encode)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb};

    use super::{CompressionError, CompressionOptions, compress_image};

    /// Encode a solid-color PNG entirely in memory.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgb([40, 90, 200]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .expect("png encoded");
        bytes
    }

    #[test]
    fn oversized_image_is_clamped_to_max_dimension() {
        let input = png_bytes(4000, 3000);

        let output = compress_image(&input, &CompressionOptions::default()).unwrap();

        assert_eq!(output.width.max(output.height), 1920);
        // 4:3 input stays 4:3.
        assert_eq!(output.width, 1920);
        assert_eq!(output.height, 1440);
        assert!(output.bytes.len() <= 1024 * 1024);
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let input = png_bytes(10, 12);

        let output = compress_image(&input, &CompressionOptions::default()).unwrap();

        assert_eq!((output.width, output.height), (10, 12));
    }

    #[test]
    fn corrupt_input_fails_with_decode_error() {
        let result = compress_image(b"definitely not an image", &CompressionOptions::default());

        assert!(matches!(result, Err(CompressionError::Decode(_))));
    }

    #[test]
    fn impossible_byte_budget_fails_with_too_large() {
        let input = png_bytes(64, 64);
        let options = CompressionOptions {
            max_bytes: 16,
            ..CompressionOptions::default()
        };

        let result = compress_image(&input, &options);

        assert!(matches!(
            result,
            Err(CompressionError::TooLarge { limit: 16, .. })
        ));
    }

    #[test]
    fn digest_is_lowercase_hex_of_output() {
        let output = compress_image(&png_bytes(8, 8), &CompressionOptions::default()).unwrap();

        assert_eq!(output.digest.len(), 64);
        assert!(output.digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
