// src/scrub/filter.rs
// =============================================================================
// Decides which bookmarks are worth probing at all.
//
// Most redirects in a bookmark collection come from a handful of
// link-shortener and feed-proxy hosts (feedproxy.google.com, t.co, bit.ly
// and friends), so by default we only probe bookmarks whose URL host is in
// the configured site list or matches one of the host regexes. The
// --all-redirects flag turns the filter off and probes everything.
//
// Rust concepts:
// - HashSet for O(1) exact host membership
// - The regex crate for the pattern side of the filter
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Per-run filter criteria, immutable once built.
#[derive(Debug)]
pub struct SiteFilter {
    match_all: bool,
    sites: HashSet<String>,
    patterns: Vec<Regex>,
}

impl SiteFilter {
    /// Build a filter from the CLI values.
    ///
    /// A bad regex is a configuration error and fails the run up front,
    /// unlike the per-bookmark errors the pipeline recovers from.
    pub fn new(match_all: bool, sites: Vec<String>, patterns: Vec<String>) -> Result<Self> {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(&p).with_context(|| format!("invalid site pattern '{}'", p)))
            .collect::<Result<Vec<_>>>()?;

        Ok(SiteFilter {
            match_all,
            sites: sites.into_iter().collect(),
            patterns,
        })
    }

    /// Should this bookmark URL be probed?
    ///
    /// True when the filter matches everything, or when the URL's host is
    /// an exact member of the site set, or when any pattern matches the
    /// host. A URL we cannot parse a host out of never matches - there is
    /// nothing to probe.
    pub fn keep(&self, href: &str) -> bool {
        if self.match_all {
            return true;
        }
        let parsed = match Url::parse(href) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };
        let host = match parsed.host_str() {
            Some(host) => host,
            None => return false,
        };
        self.sites.contains(host) || self.patterns.iter().any(|p| p.is_match(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(sites: &[&str], patterns: &[&str]) -> SiteFilter {
        SiteFilter::new(
            false,
            sites.iter().map(|s| s.to_string()).collect(),
            patterns.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_site_match() {
        let f = filter(&["example.com"], &[]);
        assert!(f.keep("http://example.com/blah"));
    }

    #[test]
    fn test_no_site_match() {
        let f = filter(&["feedproxy.google.com"], &[]);
        assert!(!f.keep("http://example.com/blah"));
    }

    #[test]
    fn test_host_must_match_exactly() {
        // Subdomains are not implied by an exact site entry
        let f = filter(&["example.com"], &[]);
        assert!(!f.keep("http://www.example.com/blah"));
    }

    #[test]
    fn test_pattern_match() {
        let f = filter(&[], &[r"^feeds?\."]);
        assert!(f.keep("http://feed.example.com/1"));
        assert!(f.keep("http://feeds.example.com/2"));
        assert!(!f.keep("http://example.com/feeds"));
    }

    #[test]
    fn test_sites_and_patterns_are_ored() {
        let f = filter(&["example.com"], &[r"\.ly$"]);
        assert!(f.keep("http://example.com/a"));
        assert!(f.keep("http://bit.ly/b"));
        assert!(!f.keep("http://other.com/c"));
    }

    #[test]
    fn test_match_all_ignores_filters() {
        let f = SiteFilter::new(true, vec![], vec![]).unwrap();
        assert!(f.keep("http://anything.example.net/x"));
    }

    #[test]
    fn test_unparseable_url_never_matches() {
        let f = filter(&["example.com"], &[r".*"]);
        assert!(!f.keep("not a url at all"));
    }

    #[test]
    fn test_url_without_host_never_matches() {
        let f = filter(&["example.com"], &[r".*"]);
        assert!(!f.keep("mailto:someone@example.com"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let result = SiteFilter::new(false, vec![], vec!["[unclosed".to_string()]);
        assert!(result.is_err());
    }
}
