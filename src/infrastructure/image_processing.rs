//! Preview and thumbnail derivation.
//!
//! | Step    | Implementation                                   |
//! |---------|--------------------------------------------------|
//! | Decode  | `image::load_from_memory` (PNG, JPEG, WebP)      |
//! | Resize  | `DynamicImage::resize_exact` with `Lanczos3`     |
//! | Encode  | lossy WebP through libwebp, lossless alpha plane |

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use thiserror::Error;

/// Target width and WebP quality for one derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantSpec {
    pub width: u32,
    pub quality: f32,
}

pub const PREVIEW: VariantSpec = VariantSpec {
    width: 1200,
    quality: 80.0,
};

pub const THUMB: VariantSpec = VariantSpec {
    width: 400,
    quality: 65.0,
};

/// libwebp alpha quality; 100 keeps the alpha plane lossless.
const ALPHA_QUALITY: i32 = 100;

#[derive(Debug, Error)]
pub enum ImageProcessingError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode webp: {0}")]
    Encode(String),
}

#[derive(Debug, Clone)]
pub struct DerivedImages {
    pub preview: Vec<u8>,
    pub thumb: Vec<u8>,
    /// Dimensions of the original, before any resizing.
    pub width: u32,
    pub height: u32,
}

/// Decode `bytes` and produce the preview and thumbnail WebP encodings.
pub fn derive_variants(bytes: &[u8]) -> Result<DerivedImages, ImageProcessingError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();

    let preview = encode_variant(&img, PREVIEW)?;
    let thumb = encode_variant(&img, THUMB)?;

    Ok(DerivedImages {
        preview,
        thumb,
        width,
        height,
    })
}

/// Scale `(width, height)` down to `target` width, keeping the aspect ratio.
/// Images already narrower than `target` keep their size.
pub fn fit_to_width(width: u32, height: u32, target: u32) -> (u32, u32) {
    if width <= target || width == 0 {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(target) + u64::from(width) / 2) / u64::from(width);
    (target, scaled.max(1) as u32)
}

fn encode_variant(img: &DynamicImage, spec: VariantSpec) -> Result<Vec<u8>, ImageProcessingError> {
    let (width, height) = img.dimensions();
    let (target_width, target_height) = fit_to_width(width, height, spec.width);

    let rgba = if (target_width, target_height) == (width, height) {
        img.to_rgba8()
    } else {
        img.resize_exact(target_width, target_height, FilterType::Lanczos3)
            .to_rgba8()
    };

    encode_webp(&rgba, spec.quality)
}

fn encode_webp(rgba: &RgbaImage, quality: f32) -> Result<Vec<u8>, ImageProcessingError> {
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());

    let mut config = webp::WebPConfig::new().map_err(|()| {
        ImageProcessingError::Encode("failed to initialise libwebp config".to_string())
    })?;
    config.lossless = 0;
    config.quality = quality;
    config.alpha_quality = ALPHA_QUALITY;

    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|err| ImageProcessingError::Encode(format!("{err:?}")))?;

    Ok(encoded.to_vec())
}
