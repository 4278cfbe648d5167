//! Lot layout loading.
//!
//! Lots are provisioned externally; the engine only consumes the result:
//! one JSON file per lot holding the lot metadata plus its nodes and
//! edges. The whole directory is loaded once at startup -- there is no
//! disk persistence afterwards, graph state lives in memory.

use std::path::{Path, PathBuf};

use parkgrid_lot::LotGraph;
use parkgrid_types::{Edge, LotMeta, Node};
use serde::Deserialize;
use tracing::info;

use crate::error::SeedError;
use crate::registry::LotRegistry;

/// The on-disk schema of one lot layout file.
#[derive(Debug, Deserialize)]
pub struct LotLayout {
    /// Lot metadata (id, name, geographic position).
    #[serde(flatten)]
    pub meta: LotMeta,
    /// All nodes of the lot.
    pub nodes: Vec<Node>,
    /// All edges of the lot.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Parse a single layout file into a validated [`LotGraph`].
///
/// # Errors
///
/// [`SeedError::Io`] / [`SeedError::Parse`] for unreadable or malformed
/// files, [`SeedError::Layout`] when the graph itself is broken.
pub fn load_file(path: &Path) -> Result<LotGraph, SeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let layout: LotLayout =
        serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    LotGraph::new(layout.meta, layout.nodes, layout.edges).map_err(|source| {
        SeedError::Layout {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Load every `*.json` layout in a directory into the registry.
///
/// Files are processed in filename order so startup is deterministic.
/// Returns the number of lots registered.
///
/// # Errors
///
/// Any [`SeedError`]; the first broken layout aborts the whole seed.
pub async fn seed_dir(registry: &LotRegistry, dir: &Path) -> Result<usize, SeedError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SeedError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut count: usize = 0;
    for path in paths {
        let graph = load_file(&path)?;
        let lot_id = graph.meta().id;
        let nodes = graph.node_count();
        registry.insert_lot(graph).await?;
        info!(%lot_id, nodes, path = %path.display(), "seeded lot");
        count = count.saturating_add(1);
    }
    Ok(count)
}
