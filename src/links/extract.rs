// src/links/extract.rs
// =============================================================================
// Extracts the links the broken-link check will probe.
//
// Pipeline for every <a href>:
//   skip special schemes -> resolve against the page URL -> keep http(s)
//   -> keep same origin -> drop #fragment -> dedupe -> cap
//
// "Same origin" means the same host *and* the same effective port as the
// audited page. Comparing hosts exactly (instead of looking for the domain
// somewhere in the URL string) keeps links like
// https://other.com/?ref=example.com out of the candidate set.
// =============================================================================

use std::collections::HashSet;
use std::sync::OnceLock;

use scraper::{Html, Selector};
use url::Url;

// Prefixes that never point at a fetchable page
const SKIPPED_PREFIXES: [&str; 5] = ["#", "javascript:", "mailto:", "tel:", "data:"];

/// Collects unique same-origin links in document order, at most `limit`.
pub fn extract_same_origin_links(document: &Html, base: &Url, limit: usize) -> Vec<Url> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = SELECTOR.get_or_init(|| Selector::parse("a[href]").unwrap());

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(selector) {
        if links.len() >= limit {
            break;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(url) = resolve_link(base, href) else {
            continue;
        };

        if is_same_origin(base, &url) && seen.insert(url.clone()) {
            links.push(url);
        }
    }

    links
}

// Resolves a possibly-relative href against the page URL
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    let lowered = href.to_ascii_lowercase();
    if href.is_empty() || SKIPPED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

fn is_same_origin(base: &Url, candidate: &Url) -> bool {
    candidate.host_str().is_some()
        && candidate.host_str() == base.host_str()
        && candidate.port_or_known_default() == base.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str, base: &str, limit: usize) -> Vec<String> {
        let document = Html::parse_document(html);
        let base = Url::parse(base).unwrap();
        extract_same_origin_links(&document, &base, limit)
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_resolves_relative_links() {
        let links = extract(
            r#"<a href="/docs">Docs</a><a href="../about">About</a>"#,
            "https://example.com/page/",
            100,
        );
        assert_eq!(
            links,
            vec!["https://example.com/docs", "https://example.com/about"]
        );
    }

    #[test]
    fn test_skips_special_schemes() {
        let links = extract(
            r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+15551234">Call</a>
            <a href="JavaScript:void(0)">Menu</a>
            <a href="#top">Top</a>
            "##,
            "https://example.com",
            100,
        );
        assert!(links.is_empty());
    }

    #[test]
    fn test_keeps_only_same_host() {
        let links = extract(
            r#"
            <a href="https://example.com/a">A</a>
            <a href="https://other.com/?ref=example.com">Echo</a>
            <a href="https://blog.example.com/b">Subdomain</a>
            <a href="http://example.com:8080/c">Other port</a>
            "#,
            "https://example.com/",
            100,
        );
        assert_eq!(links, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_dedupes_ignoring_fragments() {
        let links = extract(
            r#"<a href="/a">1</a><a href="/a#part">2</a><a href="https://example.com/a">3</a>"#,
            "https://example.com/",
            100,
        );
        assert_eq!(links, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_caps_candidate_count() {
        let html: String = (0..250)
            .map(|i| format!(r#"<a href="/page-{}">p</a>"#, i))
            .collect();
        let links = extract(&html, "https://example.com/", 100);
        assert_eq!(links.len(), 100);
        assert_eq!(links[0], "https://example.com/page-0");
    }
}
