//! Pure Rust image backend built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate decoders |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode to AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//!
//! The `avif` feature only enables the encoder, so variants are resized from
//! the decoded source rather than from the AVIF master.

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend, OptimizedImage};
use super::calculations::{scaled_height, select_breakpoints};
use super::params::{OptimizeParams, Quality};
use image::codecs::avif::AvifEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

const AVIF_SPEED: u8 = 6;

/// Backend using the `image` crate ecosystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    reader(bytes)?
        .decode()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode image: {}", e)))
}

fn encode_avif(img: &DynamicImage, quality: Quality) -> Result<EncodedImage, BackendError> {
    let mut bytes = Vec::new();
    let encoder = AvifEncoder::new_with_speed_quality(&mut bytes, AVIF_SPEED, quality.value());
    // encoder takes 8-bit input only
    DynamicImage::ImageRgba8(img.to_rgba8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("AVIF encode failed: {}", e)))?;
    Ok(EncodedImage {
        width: img.width(),
        height: img.height(),
        bytes,
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e)))?;
        Ok(Dimensions { width, height })
    }

    fn optimize(
        &self,
        bytes: &[u8],
        params: &OptimizeParams,
    ) -> Result<OptimizedImage, BackendError> {
        let img = decode(bytes)?;
        let natural = Dimensions {
            width: img.width(),
            height: img.height(),
        };

        let master = encode_avif(&img, params.quality)?;

        let mut variants = Vec::new();
        for bp in select_breakpoints(natural.width, &params.breakpoints) {
            let height = scaled_height(natural, bp.width);
            let resized = img.resize_exact(bp.width, height, FilterType::Lanczos3);
            variants.push((bp.name, encode_avif(&resized, params.quality)?));
        }

        Ok(OptimizedImage { master, variants })
    }
}
