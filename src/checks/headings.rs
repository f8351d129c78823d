// src/checks/headings.rs
// =============================================================================
// H1 count and texts.
// =============================================================================

use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::{CheckMetrics, CheckResult, DocumentCheck};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingMetrics {
    pub h1_count: usize,
    pub h1_texts: Vec<String>,
    pub has_h1: bool,
    pub has_multiple_h1: bool,
}

impl CheckMetrics for HeadingMetrics {
    fn passed(&self) -> bool {
        self.has_h1 && !self.has_multiple_h1
    }
}

pub struct HeadingCheck {
    max_h1: usize,
}

impl HeadingCheck {
    pub fn new(max_h1: usize) -> Self {
        Self { max_h1 }
    }
}

impl DocumentCheck for HeadingCheck {
    type Metrics = HeadingMetrics;

    fn run(&self, document: &Html) -> CheckResult<HeadingMetrics> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("h1").unwrap());

        let h1_texts: Vec<String> = document
            .select(selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();
        let h1_count = h1_texts.len();

        // Missing outranks multiple; only one of them is reported
        let mut recommendations = Vec::new();
        if h1_count == 0 {
            recommendations.push("Add an H1 tag to your page".to_string());
        } else if h1_count > self.max_h1 {
            recommendations.push(format!(
                "Remove extra H1 tags. Only one H1 tag is recommended, found {}",
                h1_count
            ));
        }

        CheckResult::new(
            HeadingMetrics {
                h1_count,
                h1_texts,
                has_h1: h1_count > 0,
                has_multiple_h1: h1_count > self.max_h1,
            },
            recommendations,
        )
    }
}
