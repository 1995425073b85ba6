use std::collections::HashSet;

use thiserror::Error;

use fcn_core::{
    ClockingScheme, Coord, Dimensions, GateKind, GateLayout, LayoutError, Signal, Topology,
};

use crate::document::{DimensionsRecord, LayoutDocument, TileRecord, FORMAT_VERSION};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),

    #[error("unknown topology tag '{0}'")]
    UnknownTopology(String),

    #[error("tile {coord}: unknown gate kind '{gate}'")]
    UnknownGateKind { coord: Coord, gate: String },

    #[error("tile {coord} lies outside the declared dimensions {dims}")]
    TileOutOfBounds { coord: Coord, dims: Dimensions },

    #[error("duplicate tile record at {0}")]
    DuplicateTile(Coord),

    #[error("tile {coord}: {gate} lists {actual} input(s), arity is {expected}")]
    RecordArityMismatch {
        coord: Coord,
        gate: GateKind,
        expected: usize,
        actual: usize,
    },

    #[error("tile records cannot be ordered by their input references (cycle or unknown source)")]
    UnorderableTiles,

    #[error("reconstructed layout violates an invariant: {0}")]
    Layout(#[from] LayoutError),
}

/// Serialize a layout to its document form. Tiles are emitted in
/// sorted coordinate order so equal layouts export identical bytes.
pub fn export(layout: &GateLayout) -> Result<Vec<u8>, CodecError> {
    let dims = layout.dimensions();
    let mut nodes: Vec<_> = layout.nodes().collect();
    nodes.sort_by_key(|n| n.coord);

    let tiles = nodes
        .into_iter()
        .map(|n| TileRecord {
            x: n.coord.x,
            y: n.coord.y,
            z: n.coord.z,
            gate: n.kind.tag().to_string(),
            inputs: n.inputs.iter().map(|s| s.source().into()).collect(),
            label: n.label.clone(),
        })
        .collect();

    let doc = LayoutDocument {
        version: FORMAT_VERSION,
        dimensions: DimensionsRecord {
            x: dims.x,
            y: dims.y,
            z: dims.z,
        },
        topology: layout.topology().tag().to_string(),
        clocking: layout.clocking().name().to_string(),
        tiles,
    };

    log::info!("exporting layout: {} tile(s), {}", layout.node_count(), dims);
    Ok(serde_json::to_vec_pretty(&doc)?)
}

/// Parse and validate a document, reconstructing the layout by
/// re-inserting tiles in an order that satisfies their input
/// references. Any structural inconsistency or invariant violation is
/// a decode error; no partially-built layout ever escapes.
pub fn import(bytes: &[u8]) -> Result<GateLayout, CodecError> {
    let doc: LayoutDocument = serde_json::from_slice(bytes)?;
    if doc.version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(doc.version));
    }

    let topology = Topology::from_tag(&doc.topology)
        .ok_or_else(|| CodecError::UnknownTopology(doc.topology.clone()))?;
    let clocking = ClockingScheme::from_name(&doc.clocking).map_err(CodecError::Layout)?;
    let dims = Dimensions::new(doc.dimensions.x, doc.dimensions.y, doc.dimensions.z);

    validate_records(&doc.tiles, dims)?;

    let mut layout = GateLayout::new(dims, topology, clocking);
    insert_in_dependency_order(&mut layout, doc.tiles)?;
    layout.rebuild_index();

    log::info!(
        "imported layout: {} tile(s), {}",
        layout.node_count(),
        dims
    );
    Ok(layout)
}

fn validate_records(tiles: &[TileRecord], dims: Dimensions) -> Result<(), CodecError> {
    let mut seen = HashSet::new();
    for rec in tiles {
        let coord = rec.coord();
        if !dims.contains(&coord) {
            return Err(CodecError::TileOutOfBounds { coord, dims });
        }
        if !seen.insert(coord) {
            return Err(CodecError::DuplicateTile(coord));
        }
        let kind: GateKind = rec
            .gate
            .parse()
            .map_err(|_| CodecError::UnknownGateKind {
                coord,
                gate: rec.gate.clone(),
            })?;
        // Deficient records are legal: deletions leave gates with
        // missing inputs, and a stored layout keeps them. Surplus
        // inputs can never arise and mean a corrupt document.
        if rec.inputs.len() > kind.arity() {
            return Err(CodecError::RecordArityMismatch {
                coord,
                gate: kind,
                expected: kind.arity(),
                actual: rec.inputs.len(),
            });
        }
    }
    Ok(())
}

// Kahn-style insertion: repeatedly place every record whose inputs all
// resolve already. A pass that places nothing while records remain
// means a cycle or a reference to an unlisted tile.
fn insert_in_dependency_order(
    layout: &mut GateLayout,
    mut tiles: Vec<TileRecord>,
) -> Result<(), CodecError> {
    tiles.sort_by_key(TileRecord::coord);
    while !tiles.is_empty() {
        let mut deferred = Vec::with_capacity(tiles.len());
        let mut progressed = false;
        for rec in tiles {
            let ready = rec
                .inputs
                .iter()
                .all(|r| layout.is_occupied(&Coord::from(*r)));
            if !ready {
                deferred.push(rec);
                continue;
            }
            let kind: GateKind = rec.gate.parse().map_err(|_| CodecError::UnknownGateKind {
                coord: rec.coord(),
                gate: rec.gate.clone(),
            })?;
            let inputs = rec
                .inputs
                .iter()
                .map(|r| Signal::from(Coord::from(*r)))
                .collect();
            layout.restore_node(kind, rec.coord(), inputs, rec.label)?;
            progressed = true;
        }
        if !progressed && !deferred.is_empty() {
            return Err(CodecError::UnorderableTiles);
        }
        tiles = deferred;
    }
    Ok(())
}
