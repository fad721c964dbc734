use std::collections::BTreeSet;

use crate::app::ports::{DocumentNode, DocumentTree};

/// Absolute links to cultivar pages found on a listing page.
///
/// Root-relative hrefs are joined to `base_url`; other relative forms are
/// skipped. A link is kept when its lower-cased href contains any of
/// `url_patterns`. The result is de-duplicated and sorted.
pub fn discover_strain_urls<D: DocumentTree>(
    doc: &D,
    base_url: &str,
    url_patterns: &[&str],
) -> Vec<String> {
    let base = base_url.trim_end_matches('/');

    doc.select("a[href]")
        .into_iter()
        .filter_map(|link| link.attr("href"))
        .filter_map(|href| {
            let full_url = if href.starts_with('/') {
                format!("{}{}", base, href)
            } else if href.starts_with("http") {
                href.to_string()
            } else {
                return None;
            };

            let lower = href.to_lowercase();
            url_patterns
                .iter()
                .any(|pattern| lower.contains(&pattern.to_lowercase()))
                .then_some(full_url)
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
