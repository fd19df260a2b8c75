//! Raster normalization: decode, bounded resize, archive tone, JPEG encode.

use crate::model::mission::Attachment;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use std::error::Error;
use std::fmt::{Display, Formatter};

const OVERLAY_RGB: (f32, f32, f32) = (255.0, 240.0, 200.0);
const OVERLAY_ALPHA: f32 = 0.1;

/// Errors from one normalization attempt.
///
/// All variants are terminal for the attempt; the caller lets the user pick
/// a new source file.
#[derive(Debug)]
pub enum PhotoError {
    /// The source bytes do not decode as a raster image.
    Decode(image::ImageError),
    /// The processed frame failed to re-encode as JPEG.
    Encode(image::ImageError),
    /// The blocking worker running the pipeline disappeared before
    /// returning a result.
    WorkerLost(String),
}

impl Display for PhotoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "image decode failed: {err}"),
            Self::Encode(err) => write!(f, "jpeg encode failed: {err}"),
            Self::WorkerLost(message) => write!(f, "normalization worker lost: {message}"),
        }
    }
}

impl Error for PhotoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::WorkerLost(_) => None,
        }
    }
}

/// Normalization parameters for one attachment entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeProfile {
    /// Sources wider than this are scaled down proportionally; narrower
    /// sources keep their dimensions (never upscaled).
    pub max_width: u32,
    /// JPEG quality, 0-100.
    pub jpeg_quality: u8,
    /// Apply the sepia matrix plus warm overlay after resizing.
    pub archive_tone: bool,
}

impl NormalizeProfile {
    /// Mission-level annex documents: tight cap, strong compression, toned.
    pub fn archive() -> Self {
        Self {
            max_width: 800,
            jpeg_quality: 60,
            archive_tone: true,
        }
    }

    /// Inline section and sub-section photos: wider cap, lighter
    /// compression, untoned.
    pub fn inline() -> Self {
        Self {
            max_width: 1200,
            jpeg_quality: 80,
            archive_tone: false,
        }
    }
}

/// Runs the full pipeline on raw image bytes.
///
/// # Contract
/// - Output width is `min(source_width, profile.max_width)`; height scales
///   proportionally, rounded.
/// - With `archive_tone`, every pixel passes the sepia matrix and the whole
///   frame is blended with the warm overlay before encoding.
/// - The returned attachment carries the encoded JPEG inline and no caption.
pub fn normalize(bytes: &[u8], profile: &NormalizeProfile) -> Result<Attachment, PhotoError> {
    let source = image::load_from_memory(bytes).map_err(PhotoError::Decode)?;
    let (source_width, source_height) = source.dimensions();
    let (width, height) = target_dimensions(source_width, source_height, profile.max_width);

    let resized = if (width, height) == (source_width, source_height) {
        source
    } else {
        source.resize_exact(width, height, FilterType::Triangle)
    };

    let mut frame = resized.to_rgb8();
    if profile.archive_tone {
        for pixel in frame.pixels_mut() {
            let [r, g, b] = pixel.0;
            let (tr, tg, tb) = archive_tone(r, g, b);
            pixel.0 = [
                overlay_channel(tr, OVERLAY_RGB.0),
                overlay_channel(tg, OVERLAY_RGB.1),
                overlay_channel(tb, OVERLAY_RGB.2),
            ];
        }
    }

    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, profile.jpeg_quality);
    encoder
        .encode(
            frame.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(PhotoError::Encode)?;

    Ok(Attachment::from_jpeg_bytes(&encoded))
}

/// Sepia matrix of the archive tone, before the warm overlay.
///
/// Pure white and pure black are fixed points up to rounding.
pub fn archive_tone(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
    let tr = 0.393 * rf + 0.769 * gf + 0.189 * bf;
    let tg = 0.349 * rf + 0.686 * gf + 0.168 * bf;
    let tb = 0.272 * rf + 0.534 * gf + 0.131 * bf;
    (clamp_channel(tr), clamp_channel(tg), clamp_channel(tb))
}

fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scale = f64::from(max_width) / f64::from(width);
    let scaled_height = (f64::from(height) * scale).round() as u32;
    (max_width, scaled_height.max(1))
}

fn overlay_channel(base: u8, overlay: f32) -> u8 {
    clamp_channel(OVERLAY_ALPHA * overlay + (1.0 - OVERLAY_ALPHA) * f32::from(base))
}

fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::target_dimensions;

    #[test]
    fn narrow_sources_keep_their_dimensions() {
        assert_eq!(target_dimensions(640, 480, 800), (640, 480));
        assert_eq!(target_dimensions(800, 600, 800), (800, 600));
    }

    #[test]
    fn wide_sources_scale_down_proportionally() {
        assert_eq!(target_dimensions(1600, 900, 800), (800, 450));
        assert_eq!(target_dimensions(2400, 1000, 1200), (1200, 500));
    }

    #[test]
    fn scaled_height_rounds_and_never_hits_zero() {
        assert_eq!(target_dimensions(1000, 333, 800), (800, 266));
        assert_eq!(target_dimensions(10_000, 1, 800), (800, 1));
    }
}
