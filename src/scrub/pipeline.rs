// src/scrub/pipeline.rs
// =============================================================================
// The orchestrator: wires source -> worker pool -> update sink together
// and owns the shutdown sequence.
//
// Lifecycle, in order:
// 1. build the two channels
// 2. start the update sink (before any producer, so nothing it should
//    consume can ever be produced first)
// 3. start the probe workers
// 4. run enumeration right here on the calling task
// 5. close the work channel; workers drain what's queued and exit
// 6. join the workers - after this no one holds an update sender
// 7. the update channel is now closed; join the sink and collect its count
//
// The ordering constraint that matters: the update channel must only
// close after ALL workers are done, which falls out of sender-clone
// lifetimes rather than manual signalling.
//
// Rust concepts:
// - dropping a Sender closes the channel for its receivers
// - join_all: wait for the whole pool at once
// =============================================================================

use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::pinboard::BookmarkStore;
use crate::report::Reporter;
use crate::scrub::filter::SiteFilter;
use crate::scrub::probe::{spawn_probe_workers, RedirectCheck};
use crate::scrub::source::enumerate_bookmarks;
use crate::scrub::update::{run_dry_run_reporter, run_live_updater};

/// Which update sink to run.
///
/// The live variant carries its own store instance: the remote client
/// isn't assumed to be usable from two tasks, so the updater never shares
/// a session with the enumerator.
pub enum UpdateMode {
    /// Report what would change; mutate nothing.
    DryRun,
    /// Apply the changes, optionally keeping the originals.
    Live {
        store: Arc<dyn BookmarkStore>,
        add_only: bool,
    },
}

/// Knobs that shape a run but not its outcome semantics.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub stop_early: bool,
    pub num_workers: usize,
}

/// Run the whole pipeline to completion and return the number of
/// bookmarks updated (or, in dry-run mode, that would have been).
///
/// Does not return until every queued bookmark has been probed and every
/// resulting update applied or reported. Per-item failures are logged
/// along the way and never propagate; the only error path out of here is
/// failing to list the bookmark dates at all.
pub async fn run_pipeline(
    enumerate_store: Arc<dyn BookmarkStore>,
    mode: UpdateMode,
    checker: Arc<dyn RedirectCheck>,
    filter: SiteFilter,
    options: PipelineOptions,
    reporter: Reporter,
) -> Result<usize> {
    let (work_tx, work_rx) = async_channel::unbounded();
    let (update_tx, update_rx) = mpsc::unbounded_channel();

    // Sink first (step 2)
    let sink = match mode {
        UpdateMode::DryRun => tokio::spawn(run_dry_run_reporter(update_rx, reporter)),
        UpdateMode::Live { store, add_only } => {
            tokio::spawn(run_live_updater(store, update_rx, add_only, reporter))
        }
    };

    // Worker pool (step 3); consumes our update_tx, so once the workers
    // are gone the update channel closes by itself
    let workers = spawn_probe_workers(options.num_workers, checker, work_rx, update_tx, reporter);

    // Enumeration runs here, not on a spawned task (step 4). Even if it
    // fails we fall through to the shutdown sequence so every in-flight
    // probe and update still completes.
    let enumerated = enumerate_bookmarks(
        enumerate_store.as_ref(),
        &work_tx,
        &filter,
        options.stop_early,
        reporter,
    )
    .await;

    drop(work_tx); // step 5: no more work is coming

    for joined in join_all(workers).await {
        if let Err(err) = joined {
            reporter.error(&format!("probe worker crashed: {}", err));
        }
    }

    let num_updates = sink.await?; // step 7
    enumerated?;
    Ok(num_updates)
}
