// src/checks/keywords.rs
// =============================================================================
// Keyword frequency and density summary.
//
// This is a lexical pass, not a scored check: lowercase the text of
// paragraphs and headings, keep alphanumeric tokens, drop English stop words,
// count. Ties in frequency are broken alphabetically so the summary is stable.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

const TOP_KEYWORDS: usize = 10;
const PRIMARY_KEYWORDS: usize = 5;

#[rustfmt::skip]
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an",
    "and", "any", "are", "aren", "as", "at", "be", "because", "been", "before",
    "being", "below", "between", "both", "but", "by", "can", "couldn", "d", "did",
    "didn", "do", "does", "doesn", "doing", "don", "down", "during", "each", "few",
    "for", "from", "further", "had", "hadn", "has", "hasn", "have", "haven", "having",
    "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "i",
    "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "ll",
    "m", "ma", "me", "mightn", "more", "most", "mustn", "my", "myself", "needn",
    "no", "nor", "not", "now", "o", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "re", "s",
    "same", "shan", "she", "should", "shouldn", "so", "some", "such", "t", "than",
    "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "ve", "very",
    "was", "wasn", "we", "were", "weren", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "won", "wouldn", "y", "you", "your",
    "yours", "yourself", "yourselves",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensity {
    pub keyword: String,
    pub count: usize,
    /// Share of all counted words, in percent, two decimals
    pub density: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    /// Words counted after stop-word removal
    pub total_words: usize,
    pub primary_keywords: Vec<String>,
    pub secondary_keywords: Vec<String>,
    pub keyword_density: Vec<KeywordDensity>,
}

pub fn summarize_keywords(document: &Html) -> KeywordSummary {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = SELECTOR.get_or_init(|| Selector::parse("p, h1, h2, h3, h4, h5, h6").unwrap());

    let text = document
        .select(selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(" ");

    summarize_text(&text)
}

pub(crate) fn summarize_text(text: &str) -> KeywordSummary {
    let stop_words = stop_words();
    let lowered = text.to_lowercase();

    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !stop_words.contains(*w))
        .collect();

    let total_words = words.len();
    if total_words == 0 {
        return KeywordSummary::default();
    }

    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for word in &words {
        *frequencies.entry(*word).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|(a_word, a_count), (b_word, b_count)| {
        b_count.cmp(a_count).then_with(|| a_word.cmp(b_word))
    });
    ranked.truncate(TOP_KEYWORDS);

    let keyword_density = ranked
        .iter()
        .map(|(word, count)| KeywordDensity {
            keyword: word.to_string(),
            count: *count,
            density: round2(*count as f64 / total_words as f64 * 100.0),
        })
        .collect();

    let mut keywords = ranked.iter().map(|(word, _)| word.to_string());
    let primary_keywords = keywords.by_ref().take(PRIMARY_KEYWORDS).collect();
    let secondary_keywords = keywords.collect();

    KeywordSummary {
        total_words,
        primary_keywords,
        secondary_keywords,
        keyword_density,
    }
}

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
