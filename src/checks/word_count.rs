// src/checks/word_count.rs
// =============================================================================
// Visible word count of the page.
//
// Text inside <script>, <style>, <noscript> and <template> is not content, so
// those subtrees are skipped before counting. A "word" is a
// whitespace-separated token with at least one alphanumeric character, which
// keeps stray punctuation like "|" or "-" out of the count.
// =============================================================================

use scraper::{Html, Node};
use serde::{Deserialize, Serialize};

use super::{CheckMetrics, CheckResult, DocumentCheck};
use crate::config::LengthBand;

const NON_CONTENT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCountMetrics {
    pub word_count: usize,
    pub is_optimal_length: bool,
}

impl CheckMetrics for WordCountMetrics {
    fn passed(&self) -> bool {
        self.is_optimal_length
    }
}

pub struct WordCountCheck {
    band: LengthBand,
}

impl WordCountCheck {
    pub fn new(band: LengthBand) -> Self {
        Self { band }
    }
}

impl DocumentCheck for WordCountCheck {
    type Metrics = WordCountMetrics;

    fn run(&self, document: &Html) -> CheckResult<WordCountMetrics> {
        let word_count = count_words(&visible_text(document));
        let LengthBand { min, .. } = self.band;

        let mut recommendations = Vec::new();
        if word_count < self.band.min {
            recommendations.push(format!(
                "Content is too short ({} words). Aim for at least {} words",
                word_count, min
            ));
        } else if word_count > self.band.max {
            recommendations.push(format!(
                "Content is too long ({} words). Consider splitting into multiple pages",
                word_count
            ));
        }

        CheckResult::new(
            WordCountMetrics {
                word_count,
                is_optimal_length: self.band.contains(word_count),
            },
            recommendations,
        )
    }
}

/// All text of the document outside non-content subtrees, space separated.
pub(crate) fn visible_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_CONTENT_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        text.push_str(chunk);
        text.push(' ');
    }

    text
}

pub(crate) fn count_words(text: &str) -> usize {
    text.split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(html: &str) -> CheckResult<WordCountMetrics> {
        WordCountCheck::new(LengthBand::new(300, 2000)).run(&Html::parse_document(html))
    }

    fn page_with_words(count: usize) -> String {
        format!("<html><body><p>{}</p></body></html>", "word ".repeat(count))
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        for (count, optimal) in [(299, false), (300, true), (2000, true), (2001, false)] {
            let result = check(&page_with_words(count));
            assert_eq!(result.metrics.word_count, count);
            assert_eq!(result.metrics.is_optimal_length, optimal, "{} words", count);
        }
    }

    #[test]
    fn test_scripts_and_styles_are_excluded() {
        let html = r#"
            <html><head><style>body { color: red; }</style></head>
            <body>
              <p>one two three</p>
              <script>var hidden = "not counted at all";</script>
              <noscript>enable javascript please</noscript>
            </body></html>
        "#;
        assert_eq!(check(html).metrics.word_count, 3);
    }

    #[test]
    fn test_adjacent_elements_do_not_merge_words() {
        let html = "<p>alpha</p><p>beta</p><span>gamma</span>";
        assert_eq!(check(html).metrics.word_count, 3);
    }

    #[test]
    fn test_punctuation_tokens_are_not_words() {
        assert_eq!(count_words("Home | About - Contact"), 3);
        assert_eq!(count_words("   \n\t "), 0);
    }

    #[test]
    fn test_recommendations() {
        let short = check(&page_with_words(10));
        assert_eq!(
            short.top_recommendation(),
            Some("Content is too short (10 words). Aim for at least 300 words")
        );

        let long = check(&page_with_words(2500));
        assert!(long.recommendations[0].contains("Consider splitting into multiple pages"));
    }

    #[test]
    fn test_empty_document() {
        let result = check("<html></html>");
        assert_eq!(result.metrics.word_count, 0);
        assert!(!result.metrics.is_optimal_length);
    }
}
