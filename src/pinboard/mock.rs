// src/pinboard/mock.rs
// =============================================================================
// A fake BookmarkStore for tests (this file is only compiled with `cargo
// test`). It serves canned dates/posts/tags and records every write call
// so tests can assert exactly what the pipeline did to the store - and in
// what order.
// =============================================================================

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{Bookmark, BookmarkStore, NewPost, StoreError, Tag};

/// One recorded mutation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Add(NewPost),
    Delete(String),
    RenameTag(String, String),
}

/// In-memory store with scriptable failures.
#[derive(Default)]
pub struct MockStore {
    dates: Vec<NaiveDate>,
    posts: HashMap<NaiveDate, Vec<Bookmark>>,
    tags: Vec<Tag>,
    failing_dates: HashSet<NaiveDate>,
    failing_adds: HashSet<String>,
    failing_deletes: HashSet<String>,
    failing_renames: HashSet<String>,
    calls: Mutex<Vec<StoreCall>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `posts` for `date`. Dates are listed in insertion order, so
    /// insert newest first to mimic the real client.
    pub fn on_date(mut self, date: NaiveDate, posts: Vec<Bookmark>) -> Self {
        self.dates.push(date);
        self.posts.insert(date, posts);
        self
    }

    /// Make posts_on() fail for `date` with a retrieval error.
    pub fn failing_date(mut self, date: NaiveDate) -> Self {
        self.dates.push(date);
        self.failing_dates.insert(date);
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Make add() fail for this exact URL.
    pub fn failing_add(mut self, url: &str) -> Self {
        self.failing_adds.insert(url.to_string());
        self
    }

    /// Make delete() fail for this exact URL.
    pub fn failing_delete(mut self, url: &str) -> Self {
        self.failing_deletes.insert(url.to_string());
        self
    }

    /// Make rename_tag() fail when renaming this tag.
    pub fn failing_rename(mut self, old: &str) -> Self {
        self.failing_renames.insert(old.to_string());
        self
    }

    /// Every write call so far, in the order they happened.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BookmarkStore for MockStore {
    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        Ok(self.dates.clone())
    }

    async fn posts_on(&self, date: NaiveDate) -> Result<Vec<Bookmark>, StoreError> {
        if self.failing_dates.contains(&date) {
            return Err(StoreError::retrieval(
                format!("posts from {}", date),
                "scripted failure",
            ));
        }
        Ok(self.posts.get(&date).cloned().unwrap_or_default())
    }

    async fn all_posts(&self) -> Result<Vec<Bookmark>, StoreError> {
        Ok(self
            .dates
            .iter()
            .filter_map(|d| self.posts.get(d))
            .flatten()
            .cloned()
            .collect())
    }

    async fn add(&self, post: &NewPost) -> Result<(), StoreError> {
        if self.failing_adds.contains(&post.url) {
            return Err(StoreError::write(format!("add {}", post.url), "scripted failure"));
        }
        self.record(StoreCall::Add(post.clone()));
        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        if self.failing_deletes.contains(url) {
            return Err(StoreError::write(format!("delete {}", url), "scripted failure"));
        }
        self.record(StoreCall::Delete(url.to_string()));
        Ok(())
    }

    async fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        Ok(self.tags.clone())
    }

    async fn rename_tag(&self, old: &str, new: &str) -> Result<(), StoreError> {
        if self.failing_renames.contains(old) {
            return Err(StoreError::write(
                format!("rename tag {} to {}", old, new),
                "scripted failure",
            ));
        }
        self.record(StoreCall::RenameTag(old.to_string(), new.to_string()));
        Ok(())
    }
}

/// A bookmark with the metadata most tests care about, created
/// 2013-03-31 09:09:09 UTC.
pub fn sample_bookmark(href: &str) -> Bookmark {
    Bookmark {
        href: href.to_string(),
        description: "example link".to_string(),
        extended: "extended".to_string(),
        tags: vec!["tag1".to_string(), "tag2".to_string()],
        time: Utc.with_ymd_and_hms(2013, 3, 31, 9, 9, 9).unwrap(),
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
