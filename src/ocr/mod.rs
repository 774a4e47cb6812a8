pub mod detection;
pub mod parser;
pub mod recognizer;
pub mod review;
pub mod segment;
pub mod tables;

pub use detection::{DetectionItem, LineResolver, group_detections, mark_duplicates};
pub use parser::{ParsedLine, RegionParser, RegionText};
pub use recognizer::{TesseractRecognizer, TextRecognizer};
pub use review::ScanSession;
pub use segment::Segmenter;
