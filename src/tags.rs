// src/tags.rs
// =============================================================================
// The `tags-canonicalize` subcommand: merge tags that differ only by
// capitalization ("Python", "python", "PYTHON") down to their lowercase
// form. Renaming a tag to one that already exists merges them on the
// store side, so this is all we need to do from here.
//
// Shares the pipeline's failure philosophy: a rename that fails is
// logged and skipped, never fatal.
// =============================================================================

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::pinboard::BookmarkStore;
use crate::report::Reporter;

/// Rename every tag whose lowercase form differs from its current name.
/// Returns the number of renames performed (or, in dry-run, proposed).
pub async fn canonicalize_tags(
    store: Arc<dyn BookmarkStore>,
    dry_run: bool,
    reporter: Reporter,
) -> Result<usize> {
    let all_tags = store.tags().await.context("listing tags")?;
    reporter.info(&format!("found {} separate tags", all_tags.len()));

    let mut renamed = 0;
    for tag in &all_tags {
        let canonical = tag.name.to_lowercase();
        if canonical == tag.name {
            continue;
        }
        reporter.debug(&format!(
            "\"{}\" is used by {} bookmark(s)",
            tag.name, tag.count
        ));
        if dry_run {
            reporter.info(&format!(
                "DRY RUN would rename \"{}\" to \"{}\"",
                tag.name, canonical
            ));
            renamed += 1;
            continue;
        }
        reporter.info(&format!("renaming \"{}\" to \"{}\"", tag.name, canonical));
        match store.rename_tag(&tag.name, &canonical).await {
            Ok(()) => renamed += 1,
            Err(err) => reporter.error(&format!(
                "failed to rename \"{}\" to \"{}\": {}",
                tag.name, canonical, err
            )),
        }
    }
    Ok(renamed)
}
