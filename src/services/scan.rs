use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::roster::{TournamentContext, check_round, load_context};
use crate::cache::Cache;
use crate::config::layout::RegionLabel;
use crate::config::settings::AppConfig;
use crate::database::{self, DbPool};
use crate::domain::{RoundNumber, Roster};
use crate::matching::NameMatcher;
use crate::ocr::{DetectionItem, LineResolver, RegionParser, RegionText, ScanSession, Segmenter, TextRecognizer, group_detections};

/// Recognized text of one region of one screenshot
#[derive(Debug, Clone)]
pub struct RegionScan {
    pub label: RegionLabel,
    pub text: String,
    pub parsed: RegionText,
}

#[derive(Debug, Clone)]
pub struct ImageScan {
    pub index: usize,
    pub regions: Vec<RegionScan>,
}

/// Reads result screenshots of one round into a review session
pub struct ScanService {
    config: AppConfig,
    pool: DbPool,
    cache: Cache,
    recognizer: Arc<dyn TextRecognizer>,
}

impl ScanService {
    pub fn new(config: AppConfig, pool: DbPool, cache: Cache, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            config,
            pool,
            cache,
            recognizer,
        }
    }

    pub async fn run(&self, tournament_id: &str, round: RoundNumber, images: &[PathBuf]) -> Result<ScanSession> {
        info!("=== Scanning Round {} of {} ===\n", round, tournament_id);

        let TournamentContext { tournament, roster } = {
            let mut conn = database::get_connection(&self.pool)?;
            load_context(&mut conn, tournament_id)?
        };
        check_round(&tournament, round)?;

        // Step 1: Recognize every screenshot
        let scans = self.recognize_images(images).await?;
        let regions: usize = scans.iter().map(|scan| scan.regions.len()).sum();
        info!("  → Recognized {} regions in {}/{} images", regions, scans.len(), images.len());

        // Step 2: Match names and group by rank
        let matcher = NameMatcher::new(self.config.matcher.clone());
        let items = build_items(&scans, &matcher, &roster);
        let detected = items.len();
        let items = group_detections(items, self.config.ocr.group_capacity);
        let duplicates = items.iter().filter(|item| item.is_duplicate).count();
        info!(
            "  → {} names detected, {} kept after grouping, {} flagged duplicate",
            detected,
            items.len(),
            duplicates
        );

        // Step 3: Keep the session for review
        let session = ScanSession::new(tournament_id, round, items, transcript(&scans));
        let key = ScanSession::cache_key(tournament_id, round);
        self.cache.save_raw(&key, &session.transcript)?;
        self.cache.save_parsed(&key, &session)?;
        info!("  → {} items need review\n", session.unresolved().len());

        info!("=== Scan Complete ===");
        Ok(session)
    }

    async fn recognize_images(&self, images: &[PathBuf]) -> Result<Vec<ImageScan>> {
        let segmenter = Arc::new(Segmenter::new(&self.config.ocr));
        let parser = Arc::new(RegionParser::new(&self.config.ocr)?);
        let workers = Arc::new(Semaphore::new(self.config.ocr.workers.max(1)));

        let mut tasks = JoinSet::new();
        for (index, path) in images.iter().cloned().enumerate() {
            let segmenter = Arc::clone(&segmenter);
            let parser = Arc::clone(&parser);
            let recognizer = Arc::clone(&self.recognizer);
            let workers = Arc::clone(&workers);

            tasks.spawn(async move {
                let _permit = workers.acquire_owned().await?;
                let scan = tokio::task::spawn_blocking(move || {
                    scan_image(index, &path, &segmenter, recognizer.as_ref(), &parser)
                        .with_context(|| format!("Image {} ({})", index + 1, path.display()))
                })
                .await
                .map_err(|e| anyhow!("Recognition worker failed: {}", e))?;
                scan
            });
        }

        let mut scans = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(scan)) => scans.push(scan),
                Ok(Err(e)) => warn!("Skipping image: {:#}", e),
                Err(e) => warn!("Skipping image: {}", e),
            }
        }

        // Completion order is arbitrary.
        scans.sort_by_key(|scan| scan.index);
        Ok(scans)
    }
}

/// Decodes one screenshot and runs every region through the recognizer, one
/// region at a time. A failing region is logged and left out.
pub fn scan_image(
    index: usize,
    path: &Path,
    segmenter: &Segmenter,
    recognizer: &dyn TextRecognizer,
    parser: &RegionParser,
) -> Result<ImageScan> {
    let image = image::open(path).context("Failed to decode image")?;
    debug!("Image {}: {}x{}", index + 1, image.width(), image.height());

    let mut regions = Vec::new();
    for region in segmenter.regions() {
        let raster = segmenter.render(&image, region);
        match recognizer.recognize(&raster) {
            Ok(text) => {
                let parsed = parser.parse(&text, region.label);
                debug!(
                    "Image {} {}: rank {:?}, {} names",
                    index + 1,
                    region.label,
                    parsed.rank,
                    parsed.entries.len()
                );
                regions.push(RegionScan {
                    label: region.label,
                    text,
                    parsed,
                });
            }
            Err(e) => warn!("Image {} region {} failed: {:#}", index + 1, region.label, e),
        }
    }

    Ok(ImageScan { index, regions })
}

pub fn build_items(scans: &[ImageScan], matcher: &NameMatcher, roster: &Roster) -> Vec<DetectionItem> {
    let resolver = LineResolver::new(matcher, roster);
    let mut items = Vec::new();
    for scan in scans {
        for region in &scan.regions {
            for (line_index, line) in region.parsed.entries.iter().enumerate() {
                items.push(DetectionItem::from_line(
                    line,
                    region.parsed.rank,
                    scan.index,
                    region.label,
                    line_index,
                    &resolver,
                ));
            }
        }
    }
    items
}

fn transcript(scans: &[ImageScan]) -> String {
    let mut text = String::new();
    for scan in scans {
        for region in &scan.regions {
            text.push_str(&format!("--- Image {} Pos {} ---\n{}\n\n", scan.index + 1, region.label, region.text.trim_end()));
        }
    }
    text
}
