use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use thiserror::Error;

use fcn_core::{Coord, GateKind, GateLayout, LayoutError, Signal};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no gate at route endpoint {0}")]
    EndpointMissing(Coord),

    #[error("target gate {0} already has all of its inputs wired")]
    TargetSaturated(Coord),

    #[error("no clocking-respecting path from {from} to {to}")]
    NoPath { from: Coord, to: Coord },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Connect two already-placed gates with a chain of BUF (wire) tiles.
///
/// The path respects the clocking order at every step, passes only
/// through unoccupied tiles, and is shortest under Manhattan distance
/// among such paths. All failure modes are detected before the first
/// mutation; on error the layout is unchanged.
///
/// Returns the full tile path, endpoints included.
pub fn route(
    layout: &mut GateLayout,
    source: Coord,
    target: Coord,
) -> Result<Vec<Coord>, RouteError> {
    let src_node = layout
        .node(&source)
        .ok_or(RouteError::EndpointMissing(source))?;
    let tgt_node = layout
        .node(&target)
        .ok_or(RouteError::EndpointMissing(target))?;
    // A gate cannot feed itself; there is no phase-advancing cycle
    // back to the same tile.
    if source == target {
        return Err(RouteError::NoPath {
            from: source,
            to: target,
        });
    }
    if tgt_node.inputs.len() >= tgt_node.kind.arity() {
        return Err(RouteError::TargetSaturated(target));
    }
    log::debug!(
        "routing {} {} -> {} {}",
        src_node.kind,
        source,
        tgt_node.kind,
        target
    );

    let path = find_path(layout, source, target).ok_or(RouteError::NoPath {
        from: source,
        to: target,
    })?;

    // Commit. The search guarantees every intermediate tile is in
    // bounds, unoccupied, and clock-compatible with its predecessor, so
    // the placements below cannot fail on a consistent layout.
    let mut feed = Signal::from(source);
    for tile in &path[1..path.len() - 1] {
        feed = layout.create_node(GateKind::Buf, *tile, vec![feed])?;
    }
    layout.attach_input(target, feed)?;
    log::debug!("placed {} wire tile(s)", path.len() - 2);
    Ok(path)
}

/// A* over tiles with unit step cost and a Manhattan heuristic.
/// Expands only in-bounds, unoccupied (or goal), clock-successor tiles.
fn find_path(layout: &GateLayout, source: Coord, target: Coord) -> Option<Vec<Coord>> {
    let dims = layout.dimensions();
    let topology = layout.topology();
    let clocking = layout.clocking();

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut g_score: HashMap<Coord, u32> = HashMap::new();

    g_score.insert(source, 0);
    open.push(Reverse((source.manhattan_distance(&target), source)));

    while let Some(Reverse((_, current))) = open.pop() {
        if current == target {
            return Some(reconstruct(&came_from, source, target));
        }
        let g_current = g_score[&current];
        for next in topology.neighbors(&current) {
            if !dims.contains(&next) {
                continue;
            }
            if next != target && layout.is_occupied(&next) {
                continue;
            }
            if !clocking.may_feed(&current, &next) {
                continue;
            }
            let tentative = g_current + 1;
            if tentative < *g_score.get(&next).unwrap_or(&u32::MAX) {
                came_from.insert(next, current);
                g_score.insert(next, tentative);
                open.push(Reverse((tentative + next.manhattan_distance(&target), next)));
            }
        }
    }
    None
}

fn reconstruct(came_from: &HashMap<Coord, Coord>, source: Coord, target: Coord) -> Vec<Coord> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}
