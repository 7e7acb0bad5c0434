// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Layout mirrors how the tool is used: authentication and output flags
// are global (they apply to every subcommand), while the knobs specific
// to one operation live on its subcommand.
// =============================================================================

use clap::{ArgAction, Parser, Subcommand};

use crate::scrub::DEFAULT_NUM_WORKERS;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "link-scrubber",
    version = "0.1.0",
    // -V is taken by --verbose (per the spec), so drop clap's auto -V/--version
    disable_version_flag = true,
    about = "A pinboard.in bookmark cleaner",
    long_about = "link-scrubber scans your pinboard.in bookmarks for links that have turned \
                  into HTTP redirects (feed proxies, URL shorteners, moved pages) and rewrites \
                  each one to point at its final destination."
)]
pub struct Cli {
    /// pinboard.in username
    #[arg(short = 'u', long, global = true, conflicts_with = "token")]
    pub user: Option<String>,

    /// pinboard.in password (prompted for interactively when omitted)
    #[arg(short = 'p', long, global = true)]
    pub password: Option<String>,

    /// pinboard.in API token ("username:HEXSTRING")
    #[arg(short = 't', long, global = true)]
    pub token: Option<String>,

    /// Show the changes, but do not make them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Repeat for more detailed output
    #[arg(short = 'V', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Turn off progress output (errors still go to stderr)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    // The #[command(subcommand)] attribute tells clap that this field
    // will hold one of the subcommands defined in the Commands enum
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (redirects, sites, tags-canonicalize)
//
// Each variant represents a different subcommand the user can run
// The fields inside each variant become the arguments for that subcommand
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace redirecting bookmarks with their destination link
    ///
    /// Example: link-scrubber -t user:TOKEN redirects --dry-run
    Redirects {
        /// Add new copies of the links but do not delete any data
        #[arg(short = 'A', long)]
        add_only: bool,

        /// Replace redirects originating from these sites;
        /// repeat the option to add sites
        #[arg(
            long = "redirect-site",
            value_name = "HOST",
            default_values_t = [String::from("feedproxy.google.com")]
        )]
        redirect_sites: Vec<String>,

        /// Pattern to match against the site name to check for redirects;
        /// repeat the option to add patterns
        #[arg(
            long = "redirect-site-regex",
            value_name = "REGEX",
            default_values_t = [
                String::from(r"^feeds?\."),
                String::from(r"\.feedsportal\.com$"),
                String::from(r"^t\.co$"),
                String::from(r"\.ly$"),
                String::from(r"^lnkd\.in$"),
                String::from(r"^red\.ht$"),
                String::from(r"^nyti\.ms$"),
            ]
        )]
        redirect_site_regexes: Vec<String>,

        /// Replace all links that cause a redirect, not just the
        /// configured sites and patterns
        #[arg(long)]
        all_redirects: bool,

        /// Stop scanning once a date yields no matching bookmarks
        /// (this is the default; see --no-stop-early)
        #[arg(long, overrides_with = "no_stop_early")]
        stop_early: bool,

        /// Scan every date even when one yields no matching bookmarks
        #[arg(long, overrides_with = "stop_early")]
        no_stop_early: bool,

        /// How many bookmarks to check at one time
        #[arg(short = 'N', long, default_value_t = DEFAULT_NUM_WORKERS)]
        num_workers: usize,
    },

    /// List the unique sites in the bookmarks
    Sites,

    /// Combine tags that are the same except for capitalization
    TagsCanonicalize,
}

/// Fold the --stop-early / --no-stop-early pair into one value.
/// Stopping early is the default; the affirmative flag exists so scripts
/// can be explicit about it.
pub fn stop_early(stop_early_flag: bool, no_stop_early_flag: bool) -> bool {
    stop_early_flag || !no_stop_early_flag
}
