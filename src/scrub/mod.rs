// src/scrub/mod.rs
// =============================================================================
// This module contains the redirect-scrubbing pipeline.
//
// Submodules, in data-flow order:
// - filter: which bookmarks are worth probing (site list + host regexes)
// - source: enumerates bookmarks date-by-date and feeds the work channel
// - probe: the HEAD-request worker pool that spots redirects
// - update: the single serialized sink that applies (or reports) changes
// - pipeline: wires the stages together and owns startup/shutdown order
//
// This file (mod.rs) is the module root - it re-exports the public API so
// main.rs can write `scrub::run_pipeline(...)` without knowing the layout.
// =============================================================================

mod filter;
mod pipeline;
mod probe;
mod source;
mod update;

pub use filter::SiteFilter;
pub use pipeline::{run_pipeline, PipelineOptions, UpdateMode};
pub use probe::{HttpProber, DEFAULT_NUM_WORKERS};
