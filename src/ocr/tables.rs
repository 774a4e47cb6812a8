//! Fixed strings the region parser relies on.

use crate::matching::tables::{Scope, Substitution};

/// Lines containing any of these (case-insensitive) are card chrome.
pub const SYSTEM_LABELS: &[&str] = &["PUBG", "MOBILE", "RESULT", "NAME", "TIME", "OK", "RANK"];

/// Glyphs the recognizer substitutes for digits and the kill unit.
/// `Bx` must run before `B`.
pub const LINE_GLYPHS: &[Substitution] = &[
    Substitution::new("ロ", "5", Scope::All),
    Substitution::new("ワ", "2", Scope::All),
    Substitution::new("IL", "3", Scope::All),
    Substitution::new("Bx", "キル", Scope::All),
    Substitution::new("B", "8", Scope::All),
];

/// Alternation of the kill-unit renderings seen after a kill count.
pub const KILL_SUFFIX: &str = r"キル|キ *ル|ロキ *ル|ワキ *ル|ル|k|\||:|!|\*|DL|IL|\[\s*キル|[$」]|Bx|[.,_s]";

/// Recognizer fragments that carry no name.
pub const NAME_ARTIFACTS: &[&str] = &[r"シン *ノン", r"因 *全 *生", r"吉 *本 *本"];

/// Strings the recognizer produces out of background texture.
pub const HALLUCINATIONS: &[&str] = &[
    "on", "hx", "DL", "cé", "み", "cw", "シン ノン", "AZ", "PRY", "後藤 マン", "シン ", "X17", "ミイ ",
    "オデ", "シ シン", "NF", "hisrcs", "OK",
];

/// Team tags short enough to look like a hallucination.
pub const KNOWN_TAGS: &[&str] = &[
    "Dzl", "BZ4", "GUM", "CRX", "NS", "GZ4", "DRX", "ERX", "CRY", "RAF", "LND", "FN", "BIG",
];

/// Characters a name may start with: ASCII alphanumerics, kana, CJK ideographs.
pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('\u{3040}'..='\u{30ff}').contains(&c)
        || ('\u{4e00}'..='\u{9faf}').contains(&c)
}

/// Whether a cleaned name is recognizer noise rather than a player.
pub fn is_hallucination(name: &str) -> bool {
    let length = name.chars().count();
    let suspicious = length < 2 || HALLUCINATIONS.iter().any(|h| name.contains(h));
    if !suspicious || KNOWN_TAGS.iter().any(|tag| name.starts_with(tag)) {
        return false;
    }
    length < 3 || HALLUCINATIONS.contains(&name)
}
