use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot on the results card. The card shows two placements stacked in the
/// left column and three in the right column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionLabel {
    #[serde(rename = "LT")]
    LeftTop,
    #[serde(rename = "LB")]
    LeftBottom,
    #[serde(rename = "RT")]
    RightTop,
    #[serde(rename = "RM")]
    RightMiddle,
    #[serde(rename = "RB")]
    RightBottom,
}

impl RegionLabel {
    pub fn code(&self) -> &'static str {
        match self {
            RegionLabel::LeftTop => "LT",
            RegionLabel::LeftBottom => "LB",
            RegionLabel::RightTop => "RT",
            RegionLabel::RightMiddle => "RM",
            RegionLabel::RightBottom => "RB",
        }
    }

    /// Rank assumed when the region shows no readable rank label. Only the
    /// left column holds fixed placements.
    pub fn fallback_rank(&self) -> Option<u32> {
        match self {
            RegionLabel::LeftTop => Some(1),
            RegionLabel::LeftBottom => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fractional bounding box of one slot, relative to the screenshot size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionConfig {
    pub label: RegionLabel,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RegionConfig {
    pub const fn new(label: RegionLabel, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            label,
            x,
            y,
            width,
            height,
        }
    }
}

/// Results-card layout, tuned against real match-result screenshots
pub fn get_regions() -> Vec<RegionConfig> {
    vec![
        RegionConfig::new(RegionLabel::LeftTop, 0.04, 0.15, 0.46, 0.38),
        RegionConfig::new(RegionLabel::LeftBottom, 0.04, 0.53, 0.46, 0.39),
        RegionConfig::new(RegionLabel::RightTop, 0.50, 0.18, 0.46, 0.23),
        RegionConfig::new(RegionLabel::RightMiddle, 0.50, 0.41, 0.46, 0.24),
        RegionConfig::new(RegionLabel::RightBottom, 0.50, 0.65, 0.46, 0.30),
    ]
}
