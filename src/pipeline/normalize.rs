//! Canonical URL keys for cross-feed deduplication.

use url::Url;

/// Canonicalize a feed link into a stable dedup key.
///
/// Rules, in order: trim; drop `utm_*` query parameters (key compared
/// case-insensitively) keeping the rest in their original order; strip
/// trailing slashes from the path (an empty path becomes `/`); upgrade
/// `http` to `https`; lowercase the host; drop the fragment.
///
/// Never fails. Input the `url` crate cannot parse is retried with an
/// `https://` prefix, and otherwise returned trimmed with its fragment cut.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let parsed = Url::parse(trimmed)
        .ok()
        .filter(|u| u.has_host())
        .or_else(|| Url::parse(&format!("https://{trimmed}")).ok().filter(|u| u.has_host()));

    match parsed {
        Some(url) => canonicalize(url),
        None => trimmed.split('#').next().unwrap_or_default().to_string(),
    }
}

fn canonicalize(mut url: Url) -> String {
    if url.scheme() == "http" {
        // http -> https never fails: both are special schemes
        let _ = url.set_scheme("https");
    }
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !k.to_lowercase().starts_with("utm_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&kept);
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(if path.is_empty() { "/" } else { &path });

    // `Url` already lowercases hosts of special schemes; this covers the rest.
    if let Some(host) = url.host_str().map(str::to_lowercase) {
        let _ = url.set_host(Some(&host));
    }

    url.to_string()
}
