// src/scrub/source.rs
// =============================================================================
// The bookmark source: walks the remote store date by date and feeds the
// bookmarks that pass the site filter into the work channel.
//
// The pinboard API only lets us page through bookmarks by creation date,
// so a "work unit" here is one date. Two properties matter:
//
// - A date whose retrieval fails is logged and skipped; a flaky remote
//   call never aborts the whole enumeration.
// - stop-early: dates arrive newest first, and shortener links cluster in
//   older bookmarks that have already been cleaned on previous runs. If a
//   date yields zero kept bookmarks we assume earlier dates won't yield
//   any either and stop. That's a heuristic to save API calls, not a
//   guarantee - and it deliberately does not trigger on a date that
//   failed to download, only on one that genuinely had no matches.
//
// Rust concepts:
// - &dyn Trait: the source works against any BookmarkStore
// - Sending into an async channel hands the bookmark off to the workers
// =============================================================================

use anyhow::{Context, Result};

use crate::pinboard::{Bookmark, BookmarkStore};
use crate::report::Reporter;
use crate::scrub::filter::SiteFilter;

/// Enumerate bookmarks from `store` into `work_tx`, in source order.
///
/// Runs on the caller's task; only the probing downstream is parallel.
/// Returns an error only when the initial dates listing fails - there is
/// no run to speak of without it.
pub async fn enumerate_bookmarks(
    store: &dyn BookmarkStore,
    work_tx: &async_channel::Sender<Bookmark>,
    filter: &SiteFilter,
    stop_early: bool,
    reporter: Reporter,
) -> Result<()> {
    let dates = store.dates().await.context("listing bookmark dates")?;
    reporter.info(&format!("processing {} dates", dates.len()));

    for date in dates {
        reporter.info(&format!("looking at posts from {}", date));
        let bookmarks = match store.posts_on(date).await {
            Ok(bookmarks) => bookmarks,
            Err(err) => {
                reporter.error(&format!("could not retrieve posts from {}: {}", date, err));
                continue;
            }
        };

        let mut kept = 0;
        for bookmark in bookmarks {
            if !filter.keep(&bookmark.href) {
                continue;
            }
            reporter.info(&format!(
                "adding {} to processing queue ({})",
                bookmark.href, bookmark.description
            ));
            if work_tx.send(bookmark).await.is_err() {
                // Every worker is gone; nothing left to feed.
                return Ok(());
            }
            kept += 1;
        }

        if kept > 0 {
            reporter.info(&format!("found {} posts to process from {}", kept, date));
        } else if stop_early {
            reporter.info("no redirects found, stopping processing early");
            break;
        }
    }
    Ok(())
}
