// src/scrub/probe.rs
// =============================================================================
// The redirect prober and its worker pool.
//
// Each worker pulls bookmarks off the shared work channel, issues a single
// HTTP HEAD request (no body download), and classifies the answer:
//
// - 3xx with a Location header -> a redirect; push (bookmark, target)
//   onto the update channel
// - 3xx without Location       -> log an error, drop the bookmark
// - anything else              -> not a redirect, nothing to do
// - request error/timeout      -> log, treat as "no redirect"
//
// Two deliberate choices about the probing client:
// - redirects are NOT followed - we need to see the 3xx itself, and we
//   only ever resolve one hop
// - a 10 second per-request timeout, so one dead host can't wedge a worker
//
// Rust concepts:
// - async-trait: RedirectCheck keeps the HTTP layer swappable in tests
// - channel close as shutdown: workers exit when recv() fails, no
//   sentinel values on the queue
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::pinboard::Bookmark;
use crate::report::Reporter;

/// Default size of the worker pool. The user probably doesn't need to
/// change this.
pub const DEFAULT_NUM_WORKERS: usize = 4;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// A bookmark that turned out to redirect, and where it points now.
/// Lives only on the update channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub bookmark: Bookmark,
    pub new_url: String,
}

/// A probe request that couldn't complete (network error, timeout, ...).
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct ProbeError {
    pub reason: String,
}

/// What the remote server answered to our HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReply {
    pub status: u16,
    pub location: Option<String>,
}

/// How one probe turned out, after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Single-hop redirect to this target.
    Redirect(String),
    /// The server said 3xx but forgot to say where to.
    MissingLocation,
    /// Anything outside the 3xx class.
    NoRedirect,
}

/// Classify a reply. 300-399 is the redirect class; everything else -
/// success, client error, server error alike - means there is nothing
/// for us to rewrite.
pub fn classify(reply: &ProbeReply) -> ProbeOutcome {
    if !(300..=399).contains(&reply.status) {
        return ProbeOutcome::NoRedirect;
    }
    match &reply.location {
        Some(location) => ProbeOutcome::Redirect(location.clone()),
        None => ProbeOutcome::MissingLocation,
    }
}

/// The lightweight HTTP check a worker performs on one URL.
#[async_trait]
pub trait RedirectCheck: Send + Sync {
    async fn check(&self, url: &str) -> Result<ProbeReply, ProbeError>;
}

/// The real prober: HEAD requests over reqwest.
pub struct HttpProber {
    http: Client,
}

impl HttpProber {
    pub fn new() -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(PROBE_TIMEOUT)
            // We classify the 3xx ourselves; following it would hide it.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(HttpProber { http })
    }
}

#[async_trait]
impl RedirectCheck for HttpProber {
    async fn check(&self, url: &str) -> Result<ProbeReply, ProbeError> {
        let response = self
            .http
            .head(url)
            .send()
            .await
            .map_err(|e| ProbeError { reason: e.to_string() })?;

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(ProbeReply {
            status: response.status().as_u16(),
            location,
        })
    }
}

/// One worker: drain the work channel until it closes.
///
/// The worker never forwards a shutdown signal itself - the update
/// channel closes on its own once every worker (and its sender clone)
/// is gone.
async fn probe_worker(
    checker: Arc<dyn RedirectCheck>,
    work_rx: async_channel::Receiver<Bookmark>,
    update_tx: mpsc::UnboundedSender<Update>,
    reporter: Reporter,
) {
    reporter.debug("starting bookmark worker");
    while let Ok(bookmark) = work_rx.recv().await {
        reporter.debug(&format!(
            "examining {} ({})",
            bookmark.href, bookmark.description
        ));

        let reply = match checker.check(&bookmark.href).await {
            Ok(reply) => reply,
            Err(err) => {
                reporter.error(&format!(
                    "could not retrieve {} ({}): {}",
                    bookmark.href, bookmark.description, err
                ));
                continue;
            }
        };
        reporter.debug(&format!("response status: {}", reply.status));

        match classify(&reply) {
            ProbeOutcome::Redirect(new_url) => {
                reporter.debug(&format!("preparing to update {}", bookmark.href));
                if update_tx.send(Update { bookmark, new_url }).is_err() {
                    // Update sink is gone; no point probing further.
                    break;
                }
            }
            ProbeOutcome::MissingLocation => {
                reporter.error(&format!(
                    "redirect for {} ({}) did not include a location",
                    bookmark.href, bookmark.description
                ));
            }
            ProbeOutcome::NoRedirect => {
                reporter.debug(&format!(
                    "no redirect for {} ({})",
                    bookmark.href, bookmark.description
                ));
            }
        }
    }
    reporter.debug("bookmark worker done");
}

/// Start the fixed-size worker pool. Each worker shares the work channel
/// and holds its own clone of the update sender; the caller's copies of
/// both are consumed here so that channel lifetime tracking stays with
/// the workers.
pub fn spawn_probe_workers(
    num_workers: usize,
    checker: Arc<dyn RedirectCheck>,
    work_rx: async_channel::Receiver<Bookmark>,
    update_tx: mpsc::UnboundedSender<Update>,
    reporter: Reporter,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            tokio::spawn(probe_worker(
                checker.clone(),
                work_rx.clone(),
                update_tx.clone(),
                reporter,
            ))
        })
        .collect()
    // work_rx and update_tx drop here: only the workers keep them alive now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinboard::mock::sample_bookmark;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(status: u16, location: Option<&str>) -> ProbeReply {
        ProbeReply {
            status,
            location: location.map(str::to_string),
        }
    }

    #[test]
    fn test_classify_redirect_with_location() {
        assert_eq!(
            classify(&reply(301, Some("http://new.example/x"))),
            ProbeOutcome::Redirect("http://new.example/x".to_string())
        );
    }

    #[test]
    fn test_classify_success_is_no_redirect() {
        assert_eq!(classify(&reply(200, None)), ProbeOutcome::NoRedirect);
    }

    #[test]
    fn test_classify_redirect_without_location() {
        assert_eq!(classify(&reply(301, None)), ProbeOutcome::MissingLocation);
    }

    #[test]
    fn test_classify_class_boundaries() {
        assert_eq!(
            classify(&reply(300, Some("http://a/"))),
            ProbeOutcome::Redirect("http://a/".to_string())
        );
        assert_eq!(
            classify(&reply(399, Some("http://a/"))),
            ProbeOutcome::Redirect("http://a/".to_string())
        );
        assert_eq!(classify(&reply(299, Some("http://a/"))), ProbeOutcome::NoRedirect);
        assert_eq!(classify(&reply(400, Some("http://a/"))), ProbeOutcome::NoRedirect);
        assert_eq!(classify(&reply(404, None)), ProbeOutcome::NoRedirect);
    }

    // A scripted checker: url -> reply or error.
    struct FakeCheck {
        replies: HashMap<String, ProbeReply>,
    }

    #[async_trait]
    impl RedirectCheck for FakeCheck {
        async fn check(&self, url: &str) -> Result<ProbeReply, ProbeError> {
            self.replies
                .get(url)
                .cloned()
                .ok_or_else(|| ProbeError { reason: "connection refused".to_string() })
        }
    }

    // Feed the given bookmarks through a small pool and collect what
    // reaches the update channel.
    async fn run_pool(replies: HashMap<String, ProbeReply>, bookmarks: Vec<Bookmark>) -> Vec<Update> {
        let (work_tx, work_rx) = async_channel::unbounded();
        let (update_tx, mut update_rx) = mpsc::unbounded_channel();

        let handles = spawn_probe_workers(
            2,
            Arc::new(FakeCheck { replies }),
            work_rx,
            update_tx,
            Reporter::quiet(),
        );
        for bookmark in bookmarks {
            work_tx.send(bookmark).await.unwrap();
        }
        drop(work_tx);
        for handle in handles {
            handle.await.unwrap();
        }

        let mut updates = Vec::new();
        while let Some(update) = update_rx.recv().await {
            updates.push(update);
        }
        updates
    }

    #[tokio::test]
    async fn test_redirect_reaches_update_channel() {
        let mut replies = HashMap::new();
        replies.insert(
            "http://example.com/blah".to_string(),
            reply(301, Some("http://new.example/x")),
        );
        let updates = run_pool(replies, vec![sample_bookmark("http://example.com/blah")]).await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].bookmark.href, "http://example.com/blah");
        assert_eq!(updates[0].new_url, "http://new.example/x");
    }

    #[tokio::test]
    async fn test_non_redirect_produces_nothing() {
        let mut replies = HashMap::new();
        replies.insert("http://example.com/ok".to_string(), reply(200, None));
        let updates = run_pool(replies, vec![sample_bookmark("http://example.com/ok")]).await;
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_redirect_without_location_is_dropped() {
        let mut replies = HashMap::new();
        replies.insert("http://example.com/weird".to_string(), reply(302, None));
        let updates = run_pool(replies, vec![sample_bookmark("http://example.com/weird")]).await;
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_probe_failure_does_not_kill_the_worker() {
        // First URL has no scripted reply -> the fake errors out. The
        // worker must keep going and still process the second bookmark.
        let mut replies = HashMap::new();
        replies.insert(
            "http://example.com/good".to_string(),
            reply(301, Some("http://new.example/y")),
        );
        let updates = run_pool(
            replies,
            vec![
                sample_bookmark("http://example.com/dead"),
                sample_bookmark("http://example.com/good"),
            ],
        )
        .await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].new_url, "http://new.example/y");
    }

    #[tokio::test]
    async fn test_http_prober_uses_head_and_sees_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/short"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", "http://new.example/x"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let prober = HttpProber::new().unwrap();
        let reply = prober.check(&format!("{}/short", server.uri())).await.unwrap();
        assert_eq!(reply.status, 301);
        assert_eq!(reply.location.as_deref(), Some("http://new.example/x"));
    }

    #[tokio::test]
    async fn test_http_prober_does_not_follow_redirects() {
        // /hop redirects to /dest which would answer 200. The prober has
        // to report the 3xx, not chase it.
        let server = MockServer::start().await;
        let dest = format!("{}/dest", server.uri());
        Mock::given(method("HEAD"))
            .and(path("/hop"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", dest.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/dest"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let prober = HttpProber::new().unwrap();
        let reply = prober.check(&format!("{}/hop", server.uri())).await.unwrap();
        assert_eq!(reply.status, 302);
        assert_eq!(reply.location, Some(dest));
    }

    #[tokio::test]
    async fn test_http_prober_maps_connection_error() {
        // Nothing is listening on this port
        let prober = HttpProber::new().unwrap();
        let result = prober.check("http://127.0.0.1:9/unreachable").await;
        assert!(result.is_err());
    }
}
