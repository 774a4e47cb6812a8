use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File-based store for scan work in progress, in two tiers: raw recognizer
/// transcripts and parsed review sessions
pub struct Cache {
    raw_dir: PathBuf,
    parsed_dir: PathBuf,
}

impl Cache {
    /// Create a new cache instance
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        let raw_dir = cache_dir.join("raw");
        let parsed_dir = cache_dir.join("parsed");

        fs::create_dir_all(&raw_dir).context("Failed to create raw cache directory")?;
        fs::create_dir_all(&parsed_dir).context("Failed to create parsed cache directory")?;

        Ok(Self {
            raw_dir,
            parsed_dir,
        })
    }

    // --- Raw Tier ---

    /// Save recognizer output exactly as produced
    pub fn save_raw(&self, key: &str, text: &str) -> Result<()> {
        let file_path = self.raw_dir.join(format!("{}.txt", key));
        fs::write(&file_path, text).context("Failed to write raw cache file")?;
        info!("Saved raw transcript to cache: {}", file_path.display());
        Ok(())
    }

    pub fn load_raw(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.raw_dir.join(format!("{}.txt", key));
        if !file_path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&file_path).context("Failed to read raw cache file")?;
        Ok(Some(text))
    }

    // --- Parsed Tier ---

    /// Save parsed data to cache
    pub fn save_parsed<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let file_path = self.build_parsed_path(key);
        self.write_json(&file_path, data)?;
        info!("Saved parsed data to cache: {}", file_path.display());
        Ok(())
    }

    /// Load parsed data from cache
    pub fn load_parsed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        let file_path = self.build_parsed_path(key);
        self.read_json_opt(&file_path)
    }

    pub fn remove_parsed(&self, key: &str) -> Result<bool> {
        let file_path = self.build_parsed_path(key);
        if !file_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&file_path).context("Failed to remove cache file")?;
        info!("Removed parsed data from cache: {}", file_path.display());
        Ok(true)
    }

    // --- Helper Methods ---

    fn build_parsed_path(&self, key: &str) -> PathBuf {
        self.parsed_dir.join(format!("{}.json", key))
    }

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        fs::write(path, json).context("Failed to write cache file")?;
        Ok(())
    }

    fn read_json_opt<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(data))
    }
}
