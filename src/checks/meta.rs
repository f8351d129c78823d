// src/checks/meta.rs
// =============================================================================
// <meta name="description"> presence, duplication and length.
// =============================================================================

use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::{CheckMetrics, CheckResult, DocumentCheck};
use crate::config::LengthBand;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaDescriptionMetrics {
    pub has_meta_description: bool,
    pub meta_description: String,
    pub meta_description_length: usize,
    pub is_optimal_length: bool,
    pub has_duplicate_meta: bool,
}

impl CheckMetrics for MetaDescriptionMetrics {
    fn passed(&self) -> bool {
        self.has_meta_description && self.is_optimal_length && !self.has_duplicate_meta
    }
}

pub struct MetaDescriptionCheck {
    band: LengthBand,
}

impl MetaDescriptionCheck {
    pub fn new(band: LengthBand) -> Self {
        Self { band }
    }
}

impl DocumentCheck for MetaDescriptionCheck {
    type Metrics = MetaDescriptionMetrics;

    fn run(&self, document: &Html) -> CheckResult<MetaDescriptionMetrics> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("meta[name]").unwrap());

        // name="Description" is common in the wild
        let descriptions: Vec<_> = document
            .select(selector)
            .filter(|el| {
                el.value()
                    .attr("name")
                    .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
            })
            .collect();

        let Some(first) = descriptions.first() else {
            return CheckResult::new(
                MetaDescriptionMetrics::default(),
                vec!["Add a meta description to your page".to_string()],
            );
        };

        let text = first.value().attr("content").unwrap_or("").trim().to_string();
        let length = text.chars().count();
        let has_duplicate_meta = descriptions.len() > 1;
        let LengthBand { min, max } = self.band;

        let mut recommendations = Vec::new();
        if has_duplicate_meta {
            recommendations.push("Remove duplicate meta description tags".to_string());
        }
        if length < min {
            recommendations.push(format!(
                "Meta description is too short ({} chars). Aim for {}-{} characters",
                length, min, max
            ));
        } else if length > max {
            recommendations.push(format!(
                "Meta description is too long ({} chars). Keep it to at most {} characters",
                length, max
            ));
        }

        CheckResult::new(
            MetaDescriptionMetrics {
                has_meta_description: true,
                meta_description: text,
                meta_description_length: length,
                is_optimal_length: self.band.contains(length),
                has_duplicate_meta,
            },
            recommendations,
        )
    }
}
