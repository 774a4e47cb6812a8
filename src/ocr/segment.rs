use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};

use crate::config::layout::{self, RegionConfig};
use crate::config::settings::OcrSettings;

/// Cuts a results screenshot into its card regions and binarizes each one
pub struct Segmenter {
    regions: Vec<RegionConfig>,
    scale: u32,
    threshold: u8,
}

impl Segmenter {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            regions: layout::get_regions(),
            scale: settings.scale.max(1),
            threshold: settings.threshold,
        }
    }

    pub fn regions(&self) -> &[RegionConfig] {
        &self.regions
    }

    /// Upscaled black-on-white raster of one region.
    pub fn render(&self, image: &DynamicImage, region: &RegionConfig) -> GrayImage {
        let (x, y, width, height) = crop_bounds(region, image.width(), image.height());
        let cropped = image.crop_imm(x, y, width, height);
        let scaled = cropped.resize_exact(width * self.scale, height * self.scale, FilterType::Triangle);
        self.binarize(&scaled)
    }

    fn binarize(&self, image: &DynamicImage) -> GrayImage {
        let rgb = image.to_rgb8();
        let threshold = self.threshold as u32;

        GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let [r, g, b] = rgb.get_pixel(x, y).0;
            let average = (r as u32 + g as u32 + b as u32) / 3;
            // Card text is light on a dark background; flip it for the recognizer.
            if average > threshold { Luma([0]) } else { Luma([255]) }
        })
    }
}

/// Pixel rectangle of a fractional region, clamped to the image.
pub fn crop_bounds(region: &RegionConfig, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let x = ((width as f64 * region.x) as u32).min(width.saturating_sub(1));
    let y = ((height as f64 * region.y) as u32).min(height.saturating_sub(1));
    let w = ((width as f64 * region.width) as u32).clamp(1, (width - x).max(1));
    let h = ((height as f64 * region.height) as u32).clamp(1, (height - y).max(1));
    (x, y, w, h)
}
