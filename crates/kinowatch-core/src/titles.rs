//! Title normalization and classification.
//!
//! Listing pages mix real movie titles with UI chrome, genre-filter labels
//! and ad decorations in the same DOM structures. Everything here is pure
//! text transformation: raw candidate in, canonical title (or nothing) out.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Whole phrases that disqualify a candidate wherever they appear.
fn exclude_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(?i)\bМУЛЬТ\s+в\s+кино\b").expect("valid regex"),
            Regex::new(r"(?i)\bвыпуск\s*№?\s*\d+\b").expect("valid regex"),
        ]
    })
}

/// Trailing ad decoration: "<dash> предсеансовое обслуживание ['quoted text']"
/// with any dash variant and straight/curly/guillemet quotes.
fn presession_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)\s*[\-–—]\s*предсеансовое\s+обслуживание(?:\s+['"«»“”‘’].*?['"«»“”‘’])?\s*$"#,
        )
        .expect("valid regex")
    })
}

fn surrounding_quotes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^['"«»“”‘’]+|['"«»“”‘’]+$"#).expect("valid regex"))
}

fn punct_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s.,:;!?\-–—_/\\]+").expect("valid regex"))
}

/// Exact lowercase labels the sources render around the actual listings.
const GENERIC_LABELS: &[&str] = &[
    // sections / generic labels
    "расписание фильмов",
    "рекомендации для вас",
    "рестораны рядом",
    "популярно сейчас",
    "смотреть в okko",
    "как вам кинотеатр?",
    "отзывы",
    "подборки афиши",
    "все",
    // genres
    "боевики",
    "военные",
    "детективы",
    "драматические",
    "исторические",
    "комедии",
    "мелодрамы",
    "приключения",
    "слешеры",
    "триллеры",
    "ужасы",
    "фэнтези",
];

/// Labels after removing whitespace/punctuation, to catch glued words like
/// "ОтзывыВсе" that the exact set misses.
const GENERIC_LABEL_KEYS: &[&str] = &["отзывывсе", "подборкиафиши", "подборкиафишивсе"];

/// Collapse any whitespace run to a single space and trim.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn strip_surrounding_quotes(title: &str) -> String {
    surrounding_quotes_re()
        .replace_all(title, "")
        .trim()
        .to_string()
}

/// Remove the presession-ad suffix, then any quotes wrapping the title.
pub fn clean(title: &str) -> String {
    let cleaned = presession_suffix_re().replace(title, "");
    strip_surrounding_quotes(cleaned.trim())
}

/// Lowercase and drop whitespace/punctuation for robust generic matching.
fn to_label_key(s: &str) -> String {
    punct_ws_re().replace_all(&s.to_lowercase(), "").into_owned()
}

fn is_generic_label(title_lower: &str) -> bool {
    if GENERIC_LABELS.contains(&title_lower) {
        return true;
    }
    GENERIC_LABEL_KEYS.contains(&to_label_key(title_lower).as_str())
}

fn is_valid_movie_title(title: &str) -> bool {
    if title.is_empty() {
        return false;
    }
    if exclude_patterns().iter().any(|p| p.is_match(title)) {
        return false;
    }
    if is_generic_label(&title.to_lowercase()) {
        return false;
    }
    // Very short lines are section markers, not titles.
    if title.chars().count() < 2 {
        return false;
    }
    true
}

/// Turn raw scraped candidates into canonical titles: normalize, strip
/// decorations, drop noise, then dedup preserving first-occurrence order.
pub fn filter_titles<I, S>(titles: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut kept: Vec<String> = Vec::new();
    for raw in titles {
        let t = clean(&normalize(raw.as_ref()));
        if is_valid_movie_title(&t) {
            kept.push(t);
        }
    }

    let mut seen = HashSet::new();
    let mut uniq = Vec::with_capacity(kept.len());
    for t in kept {
        if seen.insert(t.clone()) {
            uniq.push(t);
        }
    }
    uniq
}
