//! Error types for engine startup.
//!
//! Runtime request failures reuse [`parkgrid_lot::LotError`]; this module
//! only covers loading lot layouts at startup, which aborts the process
//! rather than answering a request.

use std::path::PathBuf;

use parkgrid_lot::LayoutError;
use parkgrid_types::LotId;

/// Errors that can occur while seeding lots from layout files.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Reading the seed directory or a layout file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A layout file is not valid JSON for the expected schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A layout file parsed but describes a broken graph.
    #[error("invalid lot layout in {path}: {source}")]
    Layout {
        /// The offending file.
        path: PathBuf,
        /// The underlying layout error.
        source: LayoutError,
    },

    /// Two layout files claim the same lot id.
    #[error("lot {0} is defined more than once")]
    DuplicateLot(LotId),
}
