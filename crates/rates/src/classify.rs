//! Domain extraction and classification.

use url::Url;

use crate::builtin::{DEFAULT_RATE, RATE_TABLE};
use crate::types::RateRecord;

const WWW_PREFIX: &str = "www.";

/// Lowercases a hostname and strips one leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().to_lowercase();
    match host.strip_prefix(WWW_PREFIX) {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Extracts the normalized domain of a URL.
///
/// Returns `None` for URLs that fail to parse or have no host
/// (`about:blank`, `file:///...`, `data:` URLs).
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    let domain = normalize_host(host);
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

/// Finds the table entry for an already normalized domain.
///
/// Exact match first, then the first entry in declared order whose key is
/// a substring of the domain or contains it.
pub fn match_entry(domain: &str) -> Option<(&'static str, &'static RateRecord)> {
    if domain.is_empty() {
        return None;
    }

    if let Some((key, rate)) = RATE_TABLE.iter().find(|(key, _)| *key == domain) {
        return Some((*key, rate));
    }

    RATE_TABLE
        .iter()
        .find(|(key, _)| domain.contains(key) || key.contains(domain))
        .map(|(key, rate)| (*key, rate))
}

/// Returns the rate record for a hostname, falling back to [`DEFAULT_RATE`].
pub fn classify(host: &str) -> &'static RateRecord {
    let domain = normalize_host(host);
    match_entry(&domain)
        .map(|(_, rate)| rate)
        .unwrap_or(&DEFAULT_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccrualUnit;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_domain_strips_www() {
        assert_eq!(
            extract_domain("https://www.youtube.com/watch?v=abc"),
            Some("youtube.com".to_string())
        );
        assert_eq!(
            extract_domain("https://chatgpt.com/c/123"),
            Some("chatgpt.com".to_string())
        );
    }

    #[test]
    fn test_extract_domain_only_strips_leading_www() {
        assert_eq!(
            extract_domain("https://docs.www.example.org/"),
            Some("docs.www.example.org".to_string())
        );
    }

    #[test]
    fn test_extract_domain_rejects_malformed_and_hostless() {
        assert_eq!(extract_domain("not a url"), None);
        assert_eq!(extract_domain(""), None);
        assert_eq!(extract_domain("about:blank"), None);
        assert_eq!(extract_domain("file:///home/user/index.html"), None);
    }

    #[test]
    fn test_extract_domain_lowercases() {
        assert_eq!(
            extract_domain("https://WWW.Netflix.COM/browse"),
            Some("netflix.com".to_string())
        );
    }

    #[test]
    fn test_exact_match() {
        let rate = classify("youtube.com");
        assert_eq!(rate.display_name, "YouTube");
        assert_eq!(rate.energy_per_unit, 0.00013);
        assert_eq!(rate.unit, AccrualUnit::Minute);

        let rate = classify("mail.yahoo.com");
        assert_eq!(rate.display_name, "Yahoo Mail");
    }

    #[test]
    fn test_www_prefix_classifies_like_bare_host() {
        for (key, _) in RATE_TABLE {
            let with_www = format!("www.{}", key);
            assert_eq!(classify(&with_www), classify(key));
        }
        assert_eq!(
            classify("www.example-unlisted.test"),
            classify("example-unlisted.test")
        );
    }

    #[test]
    fn test_subdomain_matches_parent_entry() {
        assert_eq!(classify("news.google.com").display_name, "Google Search");
        assert_eq!(classify("m.youtube.com").display_name, "YouTube");
    }

    #[test]
    fn test_host_contained_in_key_matches() {
        assert_eq!(classify("netflix").display_name, "Netflix");
    }

    #[test]
    fn test_partial_match_is_first_in_declared_order() {
        // Both "gemini.google.com" and "google.com" are substrings; the
        // earlier entry wins.
        let (key, rate) = match_entry("gemini.google.com.au").unwrap();
        assert_eq!(key, "gemini.google.com");
        assert_eq!(rate.display_name, "Google Gemini");

        // Substring matching is loose: any host ending in "x.com" lands on X.
        let (key, _) = match_entry("dropbox.com").unwrap();
        assert_eq!(key, "x.com");
    }

    #[test]
    fn test_unknown_domain_uses_default() {
        let rate = classify("example-unlisted.test");
        assert_eq!(rate, &DEFAULT_RATE);
        assert_eq!(rate.energy_per_unit, 0.0003);
        assert_eq!(rate.unit, AccrualUnit::Visit);
        assert_eq!(rate.display_name, "Website");
    }

    #[test]
    fn test_empty_host_uses_default() {
        assert_eq!(classify(""), &DEFAULT_RATE);
        assert_eq!(classify("www."), &DEFAULT_RATE);
    }
}
