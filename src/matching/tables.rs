//! Confusable-glyph tables collected from real result screenshots.
//!
//! Every entry was added after a concrete misread was observed. Append new
//! pairs here; the matcher and its control flow stay untouched. Bump
//! [`TABLE_VERSION`] whenever an entry changes so stored match transcripts can
//! be traced back to the table that produced them.

pub const TABLE_VERSION: u32 = 3;

/// Symbols the recognizer emits around names, removed before comparison.
pub const NOISE_SYMBOLS: &[char] = &[
    '*', '|', '!', '‡', '_', '@', '#', '%', '&', '§', '=', '-', '[', ']', '(', ')', '{', '}', '+',
    '.', '~', '«',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only when the text starts with the pattern.
    Prefix,
    /// First occurrence anywhere.
    First,
    /// Every occurrence.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub from: &'static str,
    pub to: &'static str,
    pub scope: Scope,
}

impl Substitution {
    pub const fn new(from: &'static str, to: &'static str, scope: Scope) -> Self {
        Self { from, to, scope }
    }

    pub fn apply(&self, text: &str) -> String {
        match self.scope {
            Scope::Prefix => match text.strip_prefix(self.from) {
                Some(rest) => format!("{}{}", self.to, rest),
                None => text.to_string(),
            },
            Scope::First => text.replacen(self.from, self.to, 1),
            Scope::All => text.replace(self.from, self.to),
        }
    }
}

/// Runs a table in order; later rows see the output of earlier ones.
pub fn apply_all(table: &[Substitution], text: &str) -> String {
    table
        .iter()
        .fold(text.to_string(), |acc, substitution| substitution.apply(&acc))
}

/// Recognizer artifacts in player names.
pub const OCR_MISREADS: &[Substitution] = &[
    Substitution::new("ooharamen", "oharamen", Scope::All),
    Substitution::new("rafこ", "raf", Scope::Prefix),
    Substitution::new("lnd遂", "lnd", Scope::Prefix),
];

/// Small-form kana folded to their full-size form.
pub const KANA_FOLDS: &[Substitution] = &[
    Substitution::new("ッ", "つ", Scope::All),
    Substitution::new("っ", "つ", Scope::All),
];

/// Team-tag letter sequences the recognizer confuses with each other.
pub const TAG_MISREADS: &[Substitution] = &[
    Substitution::new("drx", "crx", Scope::Prefix),
    Substitution::new("cry", "crx", Scope::Prefix),
    Substitution::new("erx", "crx", Scope::Prefix),
    Substitution::new("gz4", "bz4", Scope::Prefix),
    Substitution::new("bib", "big", Scope::First),
    Substitution::new("8ig", "big", Scope::First),
    Substitution::new("ilsmn", "jisos", Scope::First),
    Substitution::new("nqe", "nqg", Scope::First),
    Substitution::new("phv", "crx", Scope::First),
    Substitution::new("dante", "route", Scope::First),
];
