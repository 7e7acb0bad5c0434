// src/scrub/update.rs
// =============================================================================
// The update sink: the single serialized consumer at the end of the
// pipeline. However many probe workers are racing upstream, exactly one
// task applies changes to the remote store, because the store's behavior
// under concurrent writes is unspecified and we'd rather not find out.
//
// Two interchangeable variants, selected by --dry-run:
// - the live updater, which re-adds each bookmark under its resolved URL
//   and then deletes the original
// - the dry-run reporter, which only prints what would change
//
// Failure rules for the live variant (each item is isolated):
// - add fails: log it, keep the original bookmark, move on - never delete
//   something we couldn't replace
// - delete fails: log it, move on. The account ends up with both the old
//   and the new bookmark, which beats losing either.
//
// Rust concepts:
// - while let Some(..) = rx.recv().await: drain a channel until every
//   sender is dropped
// =============================================================================

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::pinboard::{BookmarkStore, NewPost};
use crate::report::Reporter;
use crate::scrub::probe::Update;

/// Apply updates to the remote store until the channel closes.
///
/// Returns how many bookmarks were successfully given a new URL. With
/// `add_only` the originals are left in place (useful for verifying a run
/// before trusting it with deletes).
pub async fn run_live_updater(
    store: Arc<dyn BookmarkStore>,
    mut update_rx: mpsc::UnboundedReceiver<Update>,
    add_only: bool,
    reporter: Reporter,
) -> usize {
    reporter.debug("starting update worker");
    let mut num_updates = 0;

    while let Some(Update { bookmark, new_url }) = update_rx.recv().await {
        if add_only {
            reporter.info(&format!("adding {}", new_url));
        } else {
            reporter.info(&format!(
                "changing {} to {} ({})",
                bookmark.href, new_url, bookmark.description
            ));
        }

        let replacement = NewPost::replacement(&bookmark, &new_url);
        if let Err(err) = store.add(&replacement).await {
            reporter.error(&format!("failed to create new post for {}: {}", new_url, err));
            continue;
        }
        reporter.debug(&format!("added {}", new_url));

        if !add_only {
            reporter.debug(&format!("deleting old post {}", bookmark.href));
            match store.delete(&bookmark.href).await {
                Ok(()) => reporter.debug(&format!("deleted {}", bookmark.href)),
                Err(err) => {
                    // No retry and no rollback of the add: a duplicate
                    // pair of bookmarks is the accepted degraded state.
                    reporter.error(&format!(
                        "failed to remove old post for {}: {}",
                        bookmark.href, err
                    ));
                }
            }
        }
        num_updates += 1;
    }

    reporter.debug("update worker done");
    num_updates
}

/// The --dry-run stand-in: report every update, touch nothing.
pub async fn run_dry_run_reporter(
    mut update_rx: mpsc::UnboundedReceiver<Update>,
    reporter: Reporter,
) -> usize {
    reporter.debug("starting dry-run worker");
    let mut num_updates = 0;
    while let Some(Update { bookmark, new_url }) = update_rx.recv().await {
        reporter.info(&format!(
            "DRY RUN would change {} to {}",
            bookmark.href, new_url
        ));
        num_updates += 1;
    }
    num_updates
}
