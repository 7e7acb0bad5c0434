// src/report.rs
// =============================================================================
// This module defines the Reporter - our output sink for progress messages.
//
// Instead of a process-wide global logger, every component receives its own
// (cheap, Copy) Reporter value. That keeps output behavior explicit: you can
// see exactly which parts of the program are allowed to talk to the user,
// and tests can hand components a quiet Reporter.
//
// Verbosity levels:
// - 0 (--quiet): errors and warnings only
// - 1 (default): progress messages
// - 2 (-V -V):   per-bookmark debug chatter
//
// Rust concepts:
// - Copy types: Reporter is two bytes, so we pass it by value everywhere
// - Methods on structs: behavior attached to data with impl blocks
// =============================================================================

/// Destination for human-readable progress output, with a verbosity gate.
///
/// Errors and warnings go to stderr and are never suppressed; info and
/// debug messages go to stdout when the verbosity level allows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reporter {
    level: u8,
}

impl Reporter {
    /// Build a reporter from the CLI flags.
    ///
    /// `quiet` wins over any number of -V flags; otherwise the level is
    /// 1 (the default) plus one per repeated -V.
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        let level = if quiet { 0 } else { 1 + verbose };
        Reporter { level }
    }

    /// A reporter that only ever emits errors and warnings.
    /// Handy default for tests.
    pub fn quiet() -> Self {
        Reporter { level: 0 }
    }

    /// Progress messages shown at the default verbosity.
    pub fn info(&self, msg: &str) {
        if self.level >= 1 {
            println!("{}", msg);
        }
    }

    /// Per-item chatter, only shown with -V -V.
    pub fn debug(&self, msg: &str) {
        if self.level >= 2 {
            println!("{}", msg);
        }
    }

    /// Non-fatal problems. Always shown, on stderr.
    pub fn warn(&self, msg: &str) {
        eprintln!("Warning: {}", msg);
    }

    /// Errors the pipeline recovered from. Always shown, on stderr.
    pub fn error(&self, msg: &str) {
        eprintln!("Error: {}", msg);
    }
}
