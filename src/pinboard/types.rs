// src/pinboard/types.rs
// =============================================================================
// The data records that flow through the pipeline, plus the error taxonomy
// for store operations.
//
// Design note: a Bookmark is immutable once read. "Updating" a bookmark
// never mutates it in place - we build a NewPost for the replacement and
// the old record is deleted separately. That makes it safe to clone
// bookmarks freely across queue boundaries without locking.
//
// Rust concepts:
// - Derive macros: Clone/Debug/PartialEq generated for us
// - thiserror: derives std::error::Error with formatted messages
// =============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// A saved link, exactly as the remote store returned it.
///
/// `href` doubles as the bookmark's unique key within a run: the store
/// keys posts by URL, so that's what we use to delete the original later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// The bookmarked URL.
    pub href: String,
    /// The bookmark title (pinboard calls this "description").
    pub description: String,
    /// Longer free-form notes.
    pub extended: String,
    /// Tags, in the order the store returned them.
    pub tags: Vec<String>,
    /// When the bookmark was created.
    pub time: DateTime<Utc>,
}

/// A bookmark to be created on the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub url: String,
    pub description: String,
    pub extended: String,
    pub tags: Vec<String>,
    /// Creation date, day granularity only. The store's add call doesn't
    /// need the time of day, so we drop it on purpose.
    pub date: NaiveDate,
}

impl NewPost {
    /// Build the replacement record for a bookmark that redirects to
    /// `new_url`: same title, notes and tags, original creation date
    /// truncated to the day.
    pub fn replacement(bookmark: &Bookmark, new_url: &str) -> Self {
        NewPost {
            url: new_url.to_string(),
            description: bookmark.description.clone(),
            extended: bookmark.extended.clone(),
            tags: bookmark.tags.clone(),
            date: bookmark.time.date_naive(),
        }
    }
}

/// A tag and how many bookmarks carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub count: u64,
}

/// What can go wrong talking to the remote store.
///
/// The pipeline recovers from both kinds: retrieval failures skip the
/// affected date, write failures skip the affected bookmark. Neither is
/// ever fatal to the run.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Listing dates, posts, or tags failed.
    #[error("could not retrieve {what}: {reason}")]
    Retrieval { what: String, reason: String },

    /// An add, delete, or rename failed.
    #[error("could not {what}: {reason}")]
    Write { what: String, reason: String },
}

impl StoreError {
    pub fn retrieval(what: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Retrieval {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(what: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Write {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bookmark() -> Bookmark {
        Bookmark {
            href: "http://example.com/blah".to_string(),
            description: "example link".to_string(),
            extended: "extended".to_string(),
            tags: vec!["tag1".to_string(), "tag2".to_string()],
            time: Utc.with_ymd_and_hms(2013, 3, 31, 9, 9, 9).unwrap(),
        }
    }

    #[test]
    fn test_replacement_keeps_metadata() {
        let bm = sample_bookmark();
        let post = NewPost::replacement(&bm, "http://newlink.com/blah");
        assert_eq!(post.url, "http://newlink.com/blah");
        assert_eq!(post.description, "example link");
        assert_eq!(post.extended, "extended");
        assert_eq!(post.tags, vec!["tag1", "tag2"]);
    }

    #[test]
    fn test_replacement_truncates_time_to_date() {
        let bm = sample_bookmark();
        let post = NewPost::replacement(&bm, "http://newlink.com/blah");
        // 2013-03-31 09:09:09 becomes just 2013-03-31
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2013, 3, 31).unwrap());
    }

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::retrieval("posts from 2013-03-31", "timed out");
        assert_eq!(
            err.to_string(),
            "could not retrieve posts from 2013-03-31: timed out"
        );
        let err = StoreError::write("add http://a/", "403 Forbidden");
        assert_eq!(err.to_string(), "could not add http://a/: 403 Forbidden");
    }
}
