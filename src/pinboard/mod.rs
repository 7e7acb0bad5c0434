// src/pinboard/mod.rs
// =============================================================================
// This module is our gateway to the remote bookmark store (pinboard.in).
//
// Submodules:
// - types: the Bookmark/NewPost/Tag records and the store error taxonomy
// - client: the real HTTP client for the pinboard v1 JSON API
// - mock: a recording in-memory store, compiled only for tests
//
// The rest of the program never talks to PinboardClient directly - it goes
// through the BookmarkStore trait defined here, so every pipeline stage can
// be tested against the mock without a network.
//
// Rust concepts:
// - Traits as seams: swap the real client for a fake in tests
// - async-trait: async methods in traits need this macro (for now)
// =============================================================================

mod client;
#[cfg(test)]
pub mod mock;
mod types;

pub use client::{Credentials, PinboardClient};
pub use types::{Bookmark, NewPost, StoreError, Tag};

use async_trait::async_trait;
use chrono::NaiveDate;

/// The operations the pipeline needs from the remote bookmark store.
///
/// One caution that the trait cannot express: a single instance is only
/// ever used from one task at a time. The pipeline builds two independent
/// clients - one for enumerating, one for the live updater - rather than
/// sharing a session between concurrent stages.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// The distinct dates on which bookmarks were created, newest first.
    /// The stop-early heuristic depends on that ordering.
    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError>;

    /// All bookmarks created on the given date.
    async fn posts_on(&self, date: NaiveDate) -> Result<Vec<Bookmark>, StoreError>;

    /// Every bookmark in the account. Used by the `sites` command.
    async fn all_posts(&self) -> Result<Vec<Bookmark>, StoreError>;

    /// Create a bookmark. Replacing an existing URL is the store's concern,
    /// not ours.
    async fn add(&self, post: &NewPost) -> Result<(), StoreError>;

    /// Delete the bookmark stored under `url`.
    async fn delete(&self, url: &str) -> Result<(), StoreError>;

    /// Every tag in the account with its use count.
    async fn tags(&self) -> Result<Vec<Tag>, StoreError>;

    /// Rename a tag across all bookmarks that carry it.
    async fn rename_tag(&self, old: &str, new: &str) -> Result<(), StoreError>;
}
