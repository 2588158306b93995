//! Injectable progress sink shared by the long-running engines.
//!
//! `log`'s global logger is where routine `trace!`/`debug!` output goes, but a
//! caller embedding these engines in a larger application (a REPL, a progress
//! bar) may want structured progress records without scraping log lines. A
//! [`Reporter`] is that second, explicit channel.

use std::fmt;
use std::time::Duration;

/// One algorithm's identity, for labelling [`ReportRecord`]s in a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    FroidurePin,
    ToddCoxeter,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::FroidurePin => write!(f, "froidure-pin"),
            Algorithm::ToddCoxeter => write!(f, "todd-coxeter"),
        }
    }
}

/// A single progress record emitted by a long-running enumeration.
#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub algorithm: Algorithm,
    /// A short human-readable label, e.g. "wave 7" or "lookahead".
    pub phase: &'static str,
    /// Count of whatever unit this phase tracks (elements discovered, cosets
    /// defined, cosets killed).
    pub count: usize,
    pub elapsed: Duration,
    pub thread: Option<std::thread::ThreadId>,
}

impl fmt::Display for ReportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({:?} elapsed)",
            self.algorithm, self.phase, self.count, self.elapsed
        )
    }
}

/// Sink for [`ReportRecord`]s. The default implementation is a no-op so that
/// engines can report unconditionally without callers paying for it.
pub trait Reporter: Send + Sync {
    fn report(&self, record: ReportRecord);
}

/// A [`Reporter`] that discards every record. Used when a caller doesn't
/// supply one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&self, _record: ReportRecord) {}
}

/// A [`Reporter`] that forwards records to the `log` crate at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, record: ReportRecord) {
        log::info!("{}", record);
    }
}
