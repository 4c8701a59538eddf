use image::{Rgba, RgbaImage};

use crate::config::ComparisonConfig;
use crate::error::{Error, Result};

/// Maximum possible delta in YIQ color space (used by dify internally).
const MAX_YIQ_POSSIBLE_DELTA: f32 = 35215.0;

/// Fill colour for padding when image sizes differ.
const PAD_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

#[derive(Debug)]
pub struct DiffResult {
    /// Number of pixels that differ above the threshold.
    pub diff_pixels: u64,
    pub total_pixels: u64,
    /// Visual diff image, `None` when the engine found nothing to show.
    pub diff_image: Option<RgbaImage>,
}

impl DiffResult {
    /// Mismatch ratio: 0.0 = identical, 1.0 = every pixel differs.
    pub fn score(&self) -> f64 {
        if self.total_pixels > 0 {
            self.diff_pixels as f64 / self.total_pixels as f64
        } else {
            0.0
        }
    }
}

/// A pixel-for-pixel diff engine. Both images must have equal dimensions;
/// implementations return [`Error::DimensionMismatch`] otherwise.
pub trait PixelDiffer: Send + Sync {
    fn diff(
        &self,
        left: RgbaImage,
        right: RgbaImage,
        config: &ComparisonConfig,
    ) -> Result<DiffResult>;
}

pub(crate) fn check_dimensions(left: &RgbaImage, right: &RgbaImage) -> Result<()> {
    if left.dimensions() != right.dimensions() {
        return Err(Error::DimensionMismatch {
            left_w: left.width(),
            left_h: left.height(),
            right_w: right.width(),
            right_h: right.height(),
        });
    }
    Ok(())
}

/// pixelmatch-compatible differ backed by `dify`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DifyDiffer;

impl PixelDiffer for DifyDiffer {
    fn diff(
        &self,
        left: RgbaImage,
        right: RgbaImage,
        config: &ComparisonConfig,
    ) -> Result<DiffResult> {
        check_dimensions(&left, &right)?;
        let total_pixels = (left.width() as u64) * (left.height() as u64);

        let t = config.threshold as f32;
        let output_base = Some(dify::cli::OutputImageBase::LeftImage);
        let block_out: Option<std::collections::HashSet<(u32, u32)>> = None;

        let result = dify::diff::get_results(
            left,
            right,
            MAX_YIQ_POSSIBLE_DELTA * t * t,
            config.detect_anti_aliasing,
            Some(config.unchanged_alpha),
            &output_base,
            &block_out,
        );

        Ok(match result {
            Some((diff_count, diff_image)) => DiffResult {
                diff_pixels: diff_count.max(0) as u64,
                total_pixels,
                diff_image: Some(diff_image),
            },
            None => DiffResult {
                diff_pixels: 0,
                total_pixels,
                diff_image: None,
            },
        })
    }
}

/// Paste `src` onto a magenta canvas of `w x h`, anchored at top-left.
pub(crate) fn pad_to(src: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(w, h, PAD_COLOR);
    image::imageops::overlay(&mut canvas, src, 0, 0);
    canvas
}
