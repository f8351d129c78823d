// src/audit/score.rs
// =============================================================================
// Overall score and the ranked recommendation list.
//
// Both are pure functions of the check results: the same AuditChecks always
// produce the same score and the same list.
//
// Deductions from 100:
//   site not served over HTTPS          20
//   missing title                       15
//   missing meta description            10
//   missing H1                          10
//   more than one H1                    10
//   title length outside band (present)  5
//   meta length outside band (present)   5
//   word count outside band              5
//   any broken link                     10
// =============================================================================

use super::AuditChecks;

/// Score in `[0, 100]` and the deduplicated recommendation list.
pub fn aggregate(checks: &AuditChecks) -> (u8, Vec<String>) {
    (score(checks), recommendations(checks))
}

pub fn score(checks: &AuditChecks) -> u8 {
    let mut score: i32 = 100;

    if !checks.ssl.metrics.is_secure {
        score -= 20;
    }

    let title = &checks.title.metrics;
    if !title.exists {
        score -= 15;
    } else if !title.is_optimal_length {
        score -= 5;
    }

    let meta = &checks.meta_description.metrics;
    if !meta.has_meta_description {
        score -= 10;
    } else if !meta.is_optimal_length {
        score -= 5;
    }

    let h1 = &checks.h1.metrics;
    if !h1.has_h1 {
        score -= 10;
    }
    if h1.has_multiple_h1 {
        score -= 10;
    }

    if !checks.word_count.metrics.is_optimal_length {
        score -= 5;
    }

    if checks.broken_links.metrics.broken_links_count > 0 {
        score -= 10;
    }

    score.clamp(0, 100) as u8
}

pub fn recommendations(checks: &AuditChecks) -> Vec<String> {
    // Priority order; redirects are informational and never listed here
    let candidates = [
        (checks.title.passed(), checks.title.top_recommendation()),
        (checks.meta_description.passed(), checks.meta_description.top_recommendation()),
        (checks.h1.passed(), checks.h1.top_recommendation()),
        (checks.word_count.passed(), checks.word_count.top_recommendation()),
        (checks.ssl.passed(), checks.ssl.top_recommendation()),
        (checks.broken_links.passed(), checks.broken_links.top_recommendation()),
        (checks.image_alt.passed(), checks.image_alt.top_recommendation()),
        (checks.sitemap.passed(), checks.sitemap.top_recommendation()),
        (checks.robots_txt.passed(), checks.robots_txt.top_recommendation()),
    ];

    let mut out: Vec<String> = Vec::new();
    for (passed, top) in candidates {
        let Some(recommendation) = top else {
            continue;
        };
        if !passed && !out.iter().any(|seen| seen == recommendation) {
            out.push(recommendation.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::*;

    fn healthy() -> AuditChecks {
        AuditChecks {
            title: CheckResult::new(
                TitleMetrics {
                    exists: true,
                    text: "A descriptive page title for the audit tests".to_string(),
                    length: 44,
                    is_optimal_length: true,
                },
                Vec::new(),
            ),
            meta_description: CheckResult::new(
                MetaDescriptionMetrics {
                    has_meta_description: true,
                    meta_description_length: 140,
                    is_optimal_length: true,
                    ..Default::default()
                },
                Vec::new(),
            ),
            h1: CheckResult::new(
                HeadingMetrics {
                    h1_count: 1,
                    h1_texts: vec!["Welcome".to_string()],
                    has_h1: true,
                    has_multiple_h1: false,
                },
                Vec::new(),
            ),
            word_count: CheckResult::new(
                WordCountMetrics {
                    word_count: 800,
                    is_optimal_length: true,
                },
                Vec::new(),
            ),
            image_alt: CheckResult::new(ImageAltMetrics::default(), Vec::new()),
            ssl: CheckResult::new(
                SslMetrics {
                    is_secure: true,
                    has_valid_cert: true,
                    days_remaining: Some(200),
                    ..Default::default()
                },
                Vec::new(),
            ),
            broken_links: CheckResult::new(
                BrokenLinkMetrics {
                    checked_links_count: 12,
                    ..Default::default()
                },
                Vec::new(),
            ),
            redirects: CheckResult::new(
                RedirectMetrics {
                    is_optimal: true,
                    is_www_consistent: true,
                    ..Default::default()
                },
                Vec::new(),
            ),
            sitemap: CheckResult::new(
                SitemapMetrics {
                    exists: true,
                    url_count: 40,
                    ..Default::default()
                },
                Vec::new(),
            ),
            robots_txt: CheckResult::new(
                RobotsMetrics {
                    exists: true,
                    has_sitemap: true,
                    has_user_agent: true,
                    has_disallow: true,
                    has_wildcard_user_agent: true,
                    ..Default::default()
                },
                Vec::new(),
            ),
        }
    }

    /// Each entry makes exactly one signal worse.
    fn degradations() -> Vec<fn(&mut AuditChecks)> {
        let list: [fn(&mut AuditChecks); 9] = [
            |c| c.ssl.metrics.is_secure = false,
            |c| c.title.metrics.exists = false,
            |c| c.title.metrics.is_optimal_length = false,
            |c| c.meta_description.metrics.has_meta_description = false,
            |c| c.meta_description.metrics.is_optimal_length = false,
            |c| c.h1.metrics.has_h1 = false,
            |c| c.h1.metrics.has_multiple_h1 = true,
            |c| c.word_count.metrics.is_optimal_length = false,
            |c| c.broken_links.metrics.broken_links_count = 4,
        ];
        list.to_vec()
    }

    #[test]
    fn test_healthy_site_scores_100() {
        let (score, recommendations) = aggregate(&healthy());
        assert_eq!(score, 100);
        assert!(recommendations.is_empty());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut checks = healthy();
        checks.title.metrics.exists = false;
        checks.title.recommendations = vec!["Add a title tag to your page".to_string()];
        checks.ssl.metrics.is_secure = false;
        checks.ssl.recommendations = vec!["Enable HTTPS for your website".to_string()];

        assert_eq!(aggregate(&checks), aggregate(&checks));
    }

    #[test]
    fn test_worse_signal_never_raises_score() {
        let baseline = score(&healthy());
        for degrade in degradations() {
            let mut checks = healthy();
            degrade(&mut checks);
            assert!(score(&checks) < baseline);

            // And stacking on top of an already degraded report never helps
            for other in degradations() {
                let before = score(&checks);
                let mut worse = checks.clone();
                other(&mut worse);
                assert!(score(&worse) <= before);
            }
        }
    }

    #[test]
    fn test_every_deduction_at_once_stays_in_range() {
        let mut checks = healthy();
        for degrade in degradations() {
            degrade(&mut checks);
        }
        // 20 + 15 + 10 + 10 + 10 + 5 + 10; length deductions need the element present
        assert_eq!(score(&checks), 20);
    }

    #[test]
    fn test_recommendations_follow_priority_and_dedupe() {
        let mut checks = healthy();
        checks.robots_txt = CheckResult::failed("timeout", "Error checking robots.txt");
        checks.title.metrics.exists = false;
        checks.title.recommendations = vec!["Add a title tag to your page".to_string()];
        checks.sitemap.metrics.exists = false;
        checks.sitemap.recommendations = vec!["Add a title tag to your page".to_string()];
        checks.redirects.metrics.is_optimal = false;
        checks.redirects.recommendations = vec!["Redirect to HTTPS instead of HTTP".to_string()];

        assert_eq!(
            recommendations(&checks),
            vec![
                "Add a title tag to your page".to_string(),
                "Error checking robots.txt".to_string(),
            ]
        );
    }

    #[test]
    fn test_passing_checks_do_not_contribute() {
        let mut checks = healthy();
        // A suggestion on a passing check stays in the check's own result
        checks.image_alt.recommendations =
            vec!["Consider adding relevant images to improve engagement".to_string()];
        assert!(recommendations(&checks).is_empty());
    }
}
