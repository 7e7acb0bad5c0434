// src/sites.rs
// =============================================================================
// The `sites` subcommand: list every distinct host that appears in the
// bookmark collection. Useful for deciding what to feed --redirect-site -
// run this first, spot the shortener domains, then scrub them.
// =============================================================================

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use url::Url;

use crate::pinboard::{Bookmark, BookmarkStore};
use crate::report::Reporter;

/// Download everything and print the unique hosts, one per line, sorted.
pub async fn list_sites(store: &dyn BookmarkStore, reporter: Reporter) -> Result<()> {
    reporter.info("downloading bookmarks");
    let bookmarks = store
        .all_posts()
        .await
        .context("downloading all bookmarks")?;
    reporter.info(&format!("have {} bookmarks", bookmarks.len()));

    for site in unique_hosts(&bookmarks) {
        println!("{}", site);
    }
    Ok(())
}

// BTreeSet gives us deduplication and sorted output in one move.
fn unique_hosts(bookmarks: &[Bookmark]) -> BTreeSet<String> {
    bookmarks
        .iter()
        .filter_map(|bookmark| {
            Url::parse(&bookmark.href)
                .ok()
                .and_then(|url| url.host_str().map(str::to_string))
        })
        .collect()
}
