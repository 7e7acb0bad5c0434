// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Turn the auth flags into credentials (prompting for a password if
//    needed) and build the pinboard client(s)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = completed, 2 = could not start)
//
// Per-bookmark failures inside a run are logged and recovered from, so a
// run that completes always exits 0 - the non-zero path is reserved for
// "couldn't even start": bad arguments, bad credentials, or the initial
// dates listing failing.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod pinboard; // src/pinboard/ - the remote bookmark store client
mod report; // src/report.rs - the injected output sink
mod scrub; // src/scrub/ - the redirect-scrubbing pipeline
mod sites; // src/sites.rs - the `sites` subcommand
mod tags; // src/tags.rs - the `tags-canonicalize` subcommand

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use cli::{Cli, Commands};
use pinboard::{BookmarkStore, Credentials, PinboardClient};
use report::Reporter;
use scrub::{HttpProber, PipelineOptions, SiteFilter, UpdateMode};

// The #[tokio::main] attribute transforms our async main into a real main
// function, creating a tokio runtime and running our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} includes the whole anyhow context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let reporter = Reporter::from_flags(cli.verbose, cli.quiet);
    let credentials = gather_credentials(&cli, reporter)?;

    match cli.command {
        Commands::Redirects {
            add_only,
            redirect_sites,
            redirect_site_regexes,
            all_redirects,
            stop_early,
            no_stop_early,
            num_workers,
        } => {
            let options = PipelineOptions {
                stop_early: cli::stop_early(stop_early, no_stop_early),
                num_workers,
            };
            handle_redirects(
                credentials,
                cli.dry_run,
                add_only,
                SiteFilter::new(all_redirects, redirect_sites, redirect_site_regexes)?,
                options,
                reporter,
            )
            .await
        }
        Commands::Sites => handle_sites(credentials, reporter).await,
        Commands::TagsCanonicalize => {
            handle_tags_canonicalize(credentials, cli.dry_run, reporter).await
        }
    }
}

// Turns the auth flags into Credentials, asking the terminal for the
// password when --user was given without --password.
fn gather_credentials(cli: &Cli, reporter: Reporter) -> Result<Credentials> {
    if let Some(token) = &cli.token {
        reporter.debug("logging in with token");
        return Ok(Credentials::Token(token.clone()));
    }

    let user = cli
        .user
        .clone()
        .context("either --token or --user is required")?;
    let password = match cli.password.clone() {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt(format!("pinboard.in password for {}", user))
            .interact()
            .context("reading password")?,
    };
    reporter.debug("logging in with username and password");
    Ok(Credentials::UserPass { user, password })
}

// Handles the 'redirects' subcommand - the main event.
async fn handle_redirects(
    credentials: Credentials,
    dry_run: bool,
    add_only: bool,
    filter: SiteFilter,
    options: PipelineOptions,
    reporter: Reporter,
) -> Result<i32> {
    reporter.info("🔍 Scanning bookmarks for redirecting links...");

    let enumerate_store: Arc<dyn BookmarkStore> =
        Arc::new(PinboardClient::new(credentials.clone())?);

    // The update sink gets its own session. The client isn't guaranteed
    // to behave when shared between the enumerator and the updater, so
    // we never share one.
    let mode = if dry_run {
        UpdateMode::DryRun
    } else {
        UpdateMode::Live {
            store: Arc::new(PinboardClient::new(credentials)?),
            add_only,
        }
    };

    let checker = Arc::new(HttpProber::new()?);
    let num_updates =
        scrub::run_pipeline(enumerate_store, mode, checker, filter, options, reporter).await?;

    if dry_run {
        reporter.info(&format!("📋 Would update {} bookmark(s)", num_updates));
    } else {
        reporter.info(&format!("✅ Updated {} bookmark(s)", num_updates));
    }
    Ok(0)
}

// Handles the 'sites' subcommand
async fn handle_sites(credentials: Credentials, reporter: Reporter) -> Result<i32> {
    let store = PinboardClient::new(credentials)?;
    sites::list_sites(&store, reporter).await?;
    Ok(0)
}

// Handles the 'tags-canonicalize' subcommand
async fn handle_tags_canonicalize(
    credentials: Credentials,
    dry_run: bool,
    reporter: Reporter,
) -> Result<i32> {
    let store: Arc<dyn BookmarkStore> = Arc::new(PinboardClient::new(credentials)?);
    let renamed = tags::canonicalize_tags(store, dry_run, reporter).await?;

    if dry_run {
        reporter.info(&format!("📋 Would rename {} tag(s)", renamed));
    } else {
        reporter.info(&format!("✅ Renamed {} tag(s)", renamed));
    }
    Ok(0)
}
