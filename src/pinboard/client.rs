// src/pinboard/client.rs
// =============================================================================
// The real BookmarkStore: a client for the pinboard.in v1 API.
//
// How the v1 API works:
// - Every endpoint is a GET with query parameters (yes, even deletes)
// - We ask for JSON with format=json (the default is XML)
// - Auth is either an API token (auth_token=user:TOKEN) or HTTP basic auth
// - Write endpoints report failure in the body: {"result_code":"done"} on
//   success, an error message in the same field otherwise - sometimes with
//   HTTP 200! So we check the body, not just the status code.
//
// Rust concepts:
// - serde derive on private structs that mirror the wire format, converted
//   into our own types at the module boundary
// - map_err: translating reqwest errors into our StoreError taxonomy
// =============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{Bookmark, BookmarkStore, NewPost, StoreError, Tag};

const API_BASE: &str = "https://api.pinboard.in/v1";

/// How to authenticate against the API.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// An API token in pinboard's "user:HEXSTRING" form.
    Token(String),
    /// Classic username and password, sent as HTTP basic auth.
    UserPass { user: String, password: String },
}

/// A pinboard.in session.
///
/// Not shared between pipeline stages: the enumerator and the live updater
/// each get their own instance (see BookmarkStore docs).
pub struct PinboardClient {
    http: Client,
    base: String,
    credentials: Credentials,
}

impl PinboardClient {
    pub fn new(credentials: Credentials) -> anyhow::Result<Self> {
        Self::with_base_url(API_BASE, credentials)
    }

    /// Same as new() but pointed at an arbitrary base URL.
    /// Tests use this to aim the client at a local mock server.
    pub fn with_base_url(base: &str, credentials: Credentials) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(PinboardClient {
            http,
            base: base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    // Issues one API call and deserializes the JSON body.
    // Errors come back as plain strings; the caller decides whether that
    // makes a Retrieval or a Write error.
    async fn call<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T, String>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base, path);
        let mut request = self
            .http
            .get(&url)
            .query(&[("format", "json")])
            .query(params);

        request = match &self.credentials {
            Credentials::Token(token) => request.query(&[("auth_token", token.as_str())]),
            Credentials::UserPass { user, password } => request.basic_auth(user, Some(password)),
        };

        let response = request.send().await.map_err(|e| e.to_string())?;
        let response = response.error_for_status().map_err(|e| e.to_string())?;
        response.json::<T>().await.map_err(|e| e.to_string())
    }

    // Calls a write endpoint and checks the "done" marker in the body.
    async fn call_write(&self, path: &str, params: &[(&str, &str)]) -> Result<(), String> {
        let result: ApiResult = self.call(path, params).await?;
        if result.is_done() {
            Ok(())
        } else {
            Err(result.message())
        }
    }
}

#[async_trait]
impl BookmarkStore for PinboardClient {
    async fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let response: DatesResponse = self
            .call("posts/dates", &[])
            .await
            .map_err(|reason| StoreError::retrieval("bookmark dates", reason))?;

        // The JSON API hands us an unordered map of date -> count. The
        // stop-early heuristic needs newest-first, so we sort explicitly
        // instead of trusting whatever order the server serialized.
        let mut dates: Vec<NaiveDate> = response
            .dates
            .keys()
            .filter_map(|d| d.parse().ok())
            .collect();
        dates.sort_unstable();
        dates.reverse();
        Ok(dates)
    }

    async fn posts_on(&self, date: NaiveDate) -> Result<Vec<Bookmark>, StoreError> {
        let dt = date.format("%Y-%m-%d").to_string();
        let response: PostsResponse = self
            .call("posts/get", &[("dt", dt.as_str())])
            .await
            .map_err(|reason| StoreError::retrieval(format!("posts from {}", dt), reason))?;
        Ok(response.posts.into_iter().map(Bookmark::from).collect())
    }

    async fn all_posts(&self) -> Result<Vec<Bookmark>, StoreError> {
        let posts: Vec<ApiPost> = self
            .call("posts/all", &[])
            .await
            .map_err(|reason| StoreError::retrieval("all posts", reason))?;
        Ok(posts.into_iter().map(Bookmark::from).collect())
    }

    async fn add(&self, post: &NewPost) -> Result<(), StoreError> {
        let tags = post.tags.join(" ");
        // Day granularity only; the API still wants a full timestamp shape.
        let dt = post.date.format("%Y-%m-%dT00:00:00Z").to_string();
        self.call_write(
            "posts/add",
            &[
                ("url", post.url.as_str()),
                ("description", post.description.as_str()),
                ("extended", post.extended.as_str()),
                ("tags", tags.as_str()),
                ("dt", dt.as_str()),
            ],
        )
        .await
        .map_err(|reason| StoreError::write(format!("add {}", post.url), reason))
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        self.call_write("posts/delete", &[("url", url)])
            .await
            .map_err(|reason| StoreError::write(format!("delete {}", url), reason))
    }

    async fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        // tags/get is a flat map of name -> count, except the count is
        // sometimes a JSON number and sometimes a quoted string.
        let response: HashMap<String, serde_json::Value> = self
            .call("tags/get", &[])
            .await
            .map_err(|reason| StoreError::retrieval("tags", reason))?;

        let mut tags: Vec<Tag> = response
            .into_iter()
            .map(|(name, count)| Tag {
                name,
                count: count
                    .as_u64()
                    .or_else(|| count.as_str().and_then(|s| s.parse().ok()))
                    .unwrap_or(0),
            })
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn rename_tag(&self, old: &str, new: &str) -> Result<(), StoreError> {
        self.call_write("tags/rename", &[("old", old), ("new", new)])
            .await
            .map_err(|reason| StoreError::write(format!("rename tag {} to {}", old, new), reason))
    }
}

// --- Wire format ------------------------------------------------------------
// Private mirrors of the JSON the API actually sends.

#[derive(Debug, Deserialize)]
struct DatesResponse {
    #[serde(default)]
    dates: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<ApiPost>,
}

#[derive(Debug, Deserialize)]
struct ApiPost {
    href: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    extended: String,
    /// Space-separated on the wire.
    #[serde(default)]
    tags: String,
    time: DateTime<Utc>,
}

impl From<ApiPost> for Bookmark {
    fn from(post: ApiPost) -> Self {
        Bookmark {
            href: post.href,
            description: post.description,
            extended: post.extended,
            tags: post.tags.split_whitespace().map(str::to_string).collect(),
            time: post.time,
        }
    }
}

// posts/* endpoints answer {"result_code":"done"}, the tags endpoints
// answer {"result":"done"}. Accept either spelling.
#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(default)]
    result_code: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

impl ApiResult {
    fn is_done(&self) -> bool {
        self.result_code.as_deref() == Some("done") || self.result.as_deref() == Some("done")
    }

    fn message(&self) -> String {
        self.result_code
            .clone()
            .or_else(|| self.result.clone())
            .unwrap_or_else(|| "no result code in response".to_string())
    }
}
