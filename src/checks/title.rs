// src/checks/title.rs
// =============================================================================
// <title> presence and length.
// =============================================================================

use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::{CheckMetrics, CheckResult, DocumentCheck};
use crate::config::LengthBand;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMetrics {
    pub exists: bool,
    pub text: String,
    /// Length in characters, not bytes
    pub length: usize,
    pub is_optimal_length: bool,
}

impl CheckMetrics for TitleMetrics {
    fn passed(&self) -> bool {
        self.exists && self.is_optimal_length
    }
}

pub struct TitleCheck {
    band: LengthBand,
}

impl TitleCheck {
    pub fn new(band: LengthBand) -> Self {
        Self { band }
    }
}

impl DocumentCheck for TitleCheck {
    type Metrics = TitleMetrics;

    fn run(&self, document: &Html) -> CheckResult<TitleMetrics> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("title").unwrap());

        let text = document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        // An empty <title></title> is as good as none
        if text.is_empty() {
            return CheckResult::new(
                TitleMetrics::default(),
                vec!["Add a title tag to your page".to_string()],
            );
        }

        let length = text.chars().count();
        let LengthBand { min, max } = self.band;

        let mut recommendations = Vec::new();
        if length < min {
            recommendations.push(format!(
                "Title is too short ({} chars). Aim for {}-{} characters",
                length, min, max
            ));
        } else if length > max {
            recommendations.push(format!(
                "Title is too long ({} chars). Keep it to at most {} characters",
                length, max
            ));
        }

        CheckResult::new(
            TitleMetrics {
                exists: true,
                text,
                length,
                is_optimal_length: self.band.contains(length),
            },
            recommendations,
        )
    }
}
