use serde::{Deserialize, Serialize};

use crate::transfer::{Direction, TransferFilter};

/// Verbosity level controlling tracing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (info level)
    Normal,
    /// Verbose output (debug level)
    Verbose,
    /// Maximum output (trace level)
    Trace,
}

impl From<(bool, u8)> for Verbosity {
    /// Convert from (quiet_flag, verbose_count) to Verbosity.
    ///
    /// - quiet=true -> Quiet (regardless of verbose count)
    /// - verbose=0  -> Normal
    /// - verbose=1  -> Verbose
    /// - verbose=2+ -> Trace
    fn from((quiet, verbose_count): (bool, u8)) -> Self {
        if quiet {
            Verbosity::Quiet
        } else {
            match verbose_count {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

impl Verbosity {
    /// Return the tracing filter string for this verbosity level.
    pub fn as_tracing_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

/// Default cap on the finished view.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Contents of `config.toml`.
///
/// ```toml
/// views = ["all", "download", "upload", "finished"]
/// history_limit = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    /// Views built by the transfer board, in display order.
    pub views: Vec<TransferFilter>,
    /// Maximum entries kept in the finished view; 0 keeps everything.
    pub history_limit: usize,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            views: vec![
                TransferFilter::All,
                TransferFilter::Direction(Direction::Download),
                TransferFilter::Direction(Direction::Upload),
                TransferFilter::Finished,
            ],
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
