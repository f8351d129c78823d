// src/checks/images.rs
// =============================================================================
// Alt text on <img> elements.
//
// Every image lands in exactly one bucket:
// - images_without_alt:    no alt attribute at all
// - images_with_empty_alt: alt shorter than min_alt_length after trimming
// - images_with_alt:       everything else
// =============================================================================

use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::{CheckMetrics, CheckResult, DocumentCheck};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAltMetrics {
    pub total_images: usize,
    pub images_with_alt: usize,
    pub images_without_alt: usize,
    pub images_with_empty_alt: usize,
}

impl CheckMetrics for ImageAltMetrics {
    fn passed(&self) -> bool {
        self.images_without_alt == 0 && self.images_with_empty_alt == 0
    }
}

pub struct ImageAltCheck {
    min_alt_length: usize,
}

impl ImageAltCheck {
    pub fn new(min_alt_length: usize) -> Self {
        Self { min_alt_length }
    }
}

impl DocumentCheck for ImageAltCheck {
    type Metrics = ImageAltMetrics;

    fn run(&self, document: &Html) -> CheckResult<ImageAltMetrics> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("img").unwrap());

        let mut metrics = ImageAltMetrics::default();
        for image in document.select(selector) {
            metrics.total_images += 1;
            match image.value().attr("alt") {
                None => metrics.images_without_alt += 1,
                Some(alt) if alt.trim().chars().count() < self.min_alt_length => {
                    metrics.images_with_empty_alt += 1
                }
                Some(_) => metrics.images_with_alt += 1,
            }
        }

        let mut recommendations = Vec::new();
        if metrics.total_images == 0 {
            recommendations.push("Consider adding relevant images to improve engagement".to_string());
        }
        if metrics.images_without_alt > 0 {
            recommendations.push(format!(
                "Add alt text to {} images",
                metrics.images_without_alt
            ));
        }
        if metrics.images_with_empty_alt > 0 {
            recommendations.push(format!(
                "Improve alt text for {} images (current alt text is too short)",
                metrics.images_with_empty_alt
            ));
        }

        CheckResult::new(metrics, recommendations)
    }
}
