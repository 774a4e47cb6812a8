use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MatcherSettings {
    /// Candidates shorter than this are never matched.
    pub min_candidate_len: usize,
    /// Minimum cleaned length for substring matching.
    pub min_contain_len: usize,
    /// Accepted edit distance as a share of the candidate length.
    pub fuzzy_ratio: f64,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            min_candidate_len: 2,
            min_contain_len: 3,
            fuzzy_ratio: 0.45,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub scale: u32,
    /// Mean RGB above this becomes background.
    pub threshold: u8,
    pub max_lone_kills: u32,
    /// Lone numbers this close to the top of a block may be the rank label.
    pub rank_header_lines: usize,
    /// Entries kept per detected rank.
    pub group_capacity: usize,
    pub workers: usize,
    pub tesseract_bin: String,
    pub languages: String,
    pub page_segmentation: u8,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            scale: 2,
            threshold: 140,
            max_lone_kills: 30,
            rank_header_lines: 3,
            group_capacity: 4,
            workers: 2,
            tesseract_bin: "tesseract".to_string(),
            languages: "jpn+eng".to_string(),
            page_segmentation: 6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database_path: PathBuf,
    pub cache_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("squad_standings.db"),
            cache_dir: PathBuf::from("cache"),
        }
    }
}

impl StorageSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub matcher: MatcherSettings,
    pub ocr: OcrSettings,
    pub storage: StorageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            matcher: MatcherSettings::default(),
            ocr: OcrSettings::default(),
            storage: StorageSettings::from_env(),
        }
    }
}
