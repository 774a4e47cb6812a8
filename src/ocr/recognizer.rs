use anyhow::{Context, Result, bail};
use image::GrayImage;
use log::debug;
use std::process::Command;

use crate::config::settings::OcrSettings;

/// Turns a binarized region into text, one recognized line per `\n`
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> Result<String>;
}

/// Runs the `tesseract` command-line tool on each region
pub struct TesseractRecognizer {
    binary: String,
    languages: String,
    page_segmentation: u8,
}

impl TesseractRecognizer {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            binary: settings.tesseract_bin.clone(),
            languages: settings.languages.clone(),
            page_segmentation: settings.page_segmentation,
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<String> {
        let file = tempfile::Builder::new()
            .prefix("region-")
            .suffix(".png")
            .tempfile()
            .context("Failed to create temporary region file")?;

        image
            .save(file.path())
            .context("Failed to write region image")?;

        let output = Command::new(&self.binary)
            .arg(file.path())
            .arg("stdout")
            .arg("--psm")
            .arg(self.page_segmentation.to_string())
            .arg("-l")
            .arg(&self.languages)
            .output()
            .with_context(|| format!("Failed to run {}", self.binary))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("Recognized {} lines", text.lines().count());
        Ok(text)
    }
}
