use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::clocking::ClockingScheme;
use crate::coord::{Coord, Dimensions, Topology};
use crate::error::LayoutError;
use crate::gate::{GateKind, Node, Signal};

/// A clocked gate-level layout: a bounded tile grid where every tile
/// holds at most one gate. Wiring between adjacent tiles must respect
/// the clocking scheme's phase order; an input drawn from a distant
/// tile is logical wiring, realized later as a routed wire path whose
/// every hop the router checks.
///
/// All mutators validate fully before committing; on error the layout
/// is unchanged. The struct assumes a single writer (see the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateLayout {
    dimensions: Dimensions,
    topology: Topology,
    clocking: ClockingScheme,
    /// Occupancy map over tiles.
    grid: HashMap<Coord, Node>,
    /// Fanout index: source tile -> tiles whose node lists it as input.
    /// Maintained incrementally by every mutator.
    fanout: HashMap<Coord, Vec<Coord>>,
}

impl GateLayout {
    pub fn new(dimensions: Dimensions, topology: Topology, clocking: ClockingScheme) -> Self {
        Self {
            dimensions,
            topology,
            clocking,
            grid: HashMap::new(),
            fanout: HashMap::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn clocking(&self) -> ClockingScheme {
        self.clocking
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.grid.len()
    }

    pub fn node(&self, coord: &Coord) -> Option<&Node> {
        self.grid.get(coord)
    }

    pub fn is_occupied(&self, coord: &Coord) -> bool {
        self.grid.contains_key(coord)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.grid.values()
    }

    pub fn pis(&self) -> impl Iterator<Item = &Node> {
        self.grid.values().filter(|n| n.kind.is_pi())
    }

    pub fn pos(&self) -> impl Iterator<Item = &Node> {
        self.grid.values().filter(|n| n.kind.is_po())
    }

    /// Source tiles currently feeding the node at `coord`, in input order.
    /// Empty for unoccupied tiles.
    pub fn fanins(&self, coord: &Coord) -> Vec<Coord> {
        self.grid
            .get(coord)
            .map(|n| n.inputs.iter().map(|s| s.source()).collect())
            .unwrap_or_default()
    }

    /// Tiles whose node lists `coord` as an input.
    pub fn fanouts(&self, coord: &Coord) -> Vec<Coord> {
        self.fanout.get(coord).cloned().unwrap_or_default()
    }

    /// Resolve a coordinate to a usable signal, failing if the tile is
    /// unoccupied.
    pub fn make_signal(&self, coord: Coord) -> Result<Signal, LayoutError> {
        if self.grid.contains_key(&coord) {
            Ok(Signal(coord))
        } else {
            Err(LayoutError::InvalidSignal(coord))
        }
    }

    // ── Mutators ─────────────────────────────────────────────────────

    /// Update the bounding box. Fails if any occupied tile would fall
    /// outside the new bounds; occupancy itself never changes.
    pub fn resize(&mut self, dims: Dimensions) -> Result<(), LayoutError> {
        if let Some(conflict) = self.grid.keys().find(|c| !dims.contains(c)) {
            return Err(LayoutError::ResizeConflict {
                dims,
                conflict: *conflict,
            });
        }
        self.dimensions = dims;
        Ok(())
    }

    /// Place a gate at `coord` wired to `inputs`. Returns the signal of
    /// the new tile's output.
    pub fn create_node(
        &mut self,
        kind: GateKind,
        coord: Coord,
        inputs: Vec<Signal>,
    ) -> Result<Signal, LayoutError> {
        self.create_node_labeled(kind, coord, inputs, None)
    }

    pub fn create_node_labeled(
        &mut self,
        kind: GateKind,
        coord: Coord,
        inputs: Vec<Signal>,
        label: Option<String>,
    ) -> Result<Signal, LayoutError> {
        self.place(kind, coord, inputs, label, false)
    }

    /// Re-insert a node restored from a persisted document. Identical
    /// to `create_node_labeled` except that missing inputs are
    /// tolerated: a stored layout can legally carry arity-deficient
    /// gates left behind by earlier deletions.
    pub fn restore_node(
        &mut self,
        kind: GateKind,
        coord: Coord,
        inputs: Vec<Signal>,
        label: Option<String>,
    ) -> Result<Signal, LayoutError> {
        self.place(kind, coord, inputs, label, true)
    }

    fn place(
        &mut self,
        kind: GateKind,
        coord: Coord,
        inputs: Vec<Signal>,
        label: Option<String>,
        allow_deficit: bool,
    ) -> Result<Signal, LayoutError> {
        if !self.dimensions.contains(&coord) {
            return Err(LayoutError::OutOfBounds {
                coord,
                dims: self.dimensions,
            });
        }
        if self.grid.contains_key(&coord) {
            return Err(LayoutError::TileOccupied(coord));
        }
        self.validate_wiring(kind.arity(), &coord, &inputs, allow_deficit)?;

        for s in &inputs {
            self.add_fanout_edge(s.source(), coord);
        }
        let mut node = Node::new(kind, coord, inputs);
        node.label = label;
        self.grid.insert(coord, node);
        Ok(Signal(coord))
    }

    /// Place a primary input, optionally labeled for I/O identification.
    pub fn create_pi(&mut self, label: &str, coord: Coord) -> Result<Signal, LayoutError> {
        let label = (!label.is_empty()).then(|| label.to_string());
        self.create_node_labeled(GateKind::Pi, coord, vec![], label)
    }

    /// Place a primary output fed by `input`.
    pub fn create_po(
        &mut self,
        input: Signal,
        label: &str,
        coord: Coord,
    ) -> Result<Signal, LayoutError> {
        let label = (!label.is_empty()).then(|| label.to_string());
        self.create_node_labeled(GateKind::Po, coord, vec![input], label)
    }

    /// Remove the node at `coord`. Every dependent node loses `coord`
    /// from its input list and stays placed, arity-deficient; the DRC
    /// reports such tiles. Returns the removed node.
    pub fn clear_tile(&mut self, coord: Coord) -> Result<Node, LayoutError> {
        let node = self
            .grid
            .remove(&coord)
            .ok_or(LayoutError::NodeNotFound(coord))?;

        // The cleared tile is no longer a dependent of its own sources.
        for s in &node.inputs {
            if let Some(deps) = self.fanout.get_mut(&s.source()) {
                deps.retain(|d| *d != coord);
                if deps.is_empty() {
                    self.fanout.remove(&s.source());
                }
            }
        }

        // Strip the cleared tile from every dependent's input list.
        if let Some(deps) = self.fanout.remove(&coord) {
            for dep in deps {
                if let Some(n) = self.grid.get_mut(&dep) {
                    n.inputs.retain(|s| s.source() != coord);
                }
            }
        }
        Ok(node)
    }

    /// Replace the input wiring of the node at `coord`, validating the
    /// new inputs exactly as `create_node` would.
    pub fn move_node(&mut self, coord: Coord, new_inputs: Vec<Signal>) -> Result<(), LayoutError> {
        let kind = self
            .grid
            .get(&coord)
            .map(|n| n.kind)
            .ok_or(LayoutError::NodeNotFound(coord))?;
        self.validate_wiring(kind.arity(), &coord, &new_inputs, false)?;

        let old_inputs = match self.grid.get_mut(&coord) {
            Some(node) => std::mem::replace(&mut node.inputs, new_inputs.clone()),
            None => return Err(LayoutError::NodeNotFound(coord)),
        };

        for s in &old_inputs {
            if let Some(deps) = self.fanout.get_mut(&s.source()) {
                deps.retain(|d| *d != coord);
                if deps.is_empty() {
                    self.fanout.remove(&s.source());
                }
            }
        }
        for s in &new_inputs {
            self.add_fanout_edge(s.source(), coord);
        }
        Ok(())
    }

    /// Append one input to the node at `coord`, which must have spare
    /// input capacity. Used by the router to wire a finished path into
    /// its target gate.
    pub fn attach_input(&mut self, coord: Coord, input: Signal) -> Result<(), LayoutError> {
        let (kind, wired) = match self.grid.get(&coord) {
            Some(n) => (n.kind, n.inputs.len()),
            None => return Err(LayoutError::NodeNotFound(coord)),
        };
        if wired >= kind.arity() {
            return Err(LayoutError::ArityMismatch {
                expected: kind.arity(),
                actual: wired + 1,
            });
        }
        let src = input.source();
        if src == coord || !self.grid.contains_key(&src) {
            return Err(LayoutError::InvalidSignal(src));
        }
        self.check_clocked_feed(src, &coord)?;
        if let Some(n) = self.grid.get_mut(&coord) {
            n.inputs.push(input);
        }
        self.add_fanout_edge(src, coord);
        Ok(())
    }

    /// Reconstruct the fanout index from scratch by scanning the grid.
    /// Used after bulk restoration; normal operation maintains the
    /// index incrementally.
    pub fn rebuild_index(&mut self) {
        log::debug!("rebuilding fanout index over {} node(s)", self.grid.len());
        self.fanout.clear();
        let mut coords: Vec<Coord> = self.grid.keys().copied().collect();
        coords.sort();
        for coord in coords {
            let sources: Vec<Coord> = self.grid[&coord].inputs.iter().map(|s| s.source()).collect();
            for src in sources {
                self.add_fanout_edge(src, coord);
            }
        }
    }

    // A node listing the same source on several input slots is still a
    // single dependent of that source.
    fn add_fanout_edge(&mut self, src: Coord, dependent: Coord) {
        let deps = self.fanout.entry(src).or_default();
        if !deps.contains(&dependent) {
            deps.push(dependent);
        }
    }

    // Shared validation for placement and rewiring: arity, signal
    // resolvability, then clocking order, in that reporting order.
    fn validate_wiring(
        &self,
        arity: usize,
        target: &Coord,
        inputs: &[Signal],
        allow_deficit: bool,
    ) -> Result<(), LayoutError> {
        let arity_ok = if allow_deficit {
            inputs.len() <= arity
        } else {
            inputs.len() == arity
        };
        if !arity_ok {
            return Err(LayoutError::ArityMismatch {
                expected: arity,
                actual: inputs.len(),
            });
        }
        for s in inputs {
            let src = s.source();
            if src == *target || !self.grid.contains_key(&src) {
                return Err(LayoutError::InvalidSignal(src));
            }
        }
        for s in inputs {
            self.check_clocked_feed(s.source(), target)?;
        }
        Ok(())
    }

    // A source on a neighboring tile must sit in the phase immediately
    // preceding the target's. Distant sources carry no constraint here;
    // the router checks every hop of the path that realizes them.
    fn check_clocked_feed(&self, src: Coord, target: &Coord) -> Result<(), LayoutError> {
        if self.topology.are_adjacent(target, &src) && !self.clocking.may_feed(&src, target) {
            return Err(LayoutError::ClockingViolation {
                src,
                target: *target,
                src_clock: self.clocking.clock_of(&src),
                target_clock: self.clocking.clock_of(target),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_5x5() -> GateLayout {
        GateLayout::new(
            Dimensions::new(5, 5, 2),
            Topology::Cartesian,
            ClockingScheme::ddwave(),
        )
    }

    #[test]
    fn test_place_and_query_and_gate() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let b = layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a, b])
            .unwrap();

        assert_eq!(layout.node_count(), 3);
        assert_eq!(
            layout.fanins(&Coord::ground(1, 0)),
            vec![Coord::ground(0, 0), Coord::ground(0, 1)]
        );
        assert_eq!(layout.fanouts(&Coord::ground(0, 0)), vec![Coord::ground(1, 0)]);
    }

    #[test]
    fn test_occupied_tile_rejected() {
        let mut layout = layout_5x5();
        layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let err = layout.create_pi("b", Coord::ground(0, 0)).unwrap_err();
        assert_eq!(err, LayoutError::TileOccupied(Coord::ground(0, 0)));
        assert_eq!(layout.node_count(), 1);
    }

    #[test]
    fn test_unresolved_signal_rejected() {
        let mut layout = layout_5x5();
        layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        let err = layout
            .create_node(
                GateKind::And,
                Coord::ground(1, 0),
                vec![Signal(Coord::ground(3, 3)), Signal(Coord::ground(0, 1))],
            )
            .unwrap_err();
        assert_eq!(err, LayoutError::InvalidSignal(Coord::ground(3, 3)));
        // Failed placement leaves the layout unchanged.
        assert_eq!(layout.node_count(), 1);
        assert!(layout.fanouts(&Coord::ground(0, 1)).is_empty());
    }

    #[test]
    fn test_adjacent_backward_feed_rejected() {
        let mut layout = layout_5x5();
        // (2,2) has clock 0; its neighbor (1,2) has clock 3. Feeding
        // backwards in the wave must fail.
        let a = layout.create_pi("a", Coord::ground(2, 2)).unwrap();
        let err = layout
            .create_node(GateKind::Buf, Coord::ground(1, 2), vec![a])
            .unwrap_err();
        assert!(matches!(err, LayoutError::ClockingViolation { .. }));
        assert_eq!(
            err.to_string(),
            "tile (2,2,0) (clock 0) may not feed tile (1,2,0) (clock 3)"
        );
        assert_eq!(layout.node_count(), 1);
    }

    #[test]
    fn test_distant_inputs_carry_no_clock_constraint() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let b = layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        // (0,1) shares clock 1 with (1,0) but is not adjacent to it:
        // the reference is logical wiring for the router to realize.
        let g = layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a, b])
            .unwrap();
        assert_eq!(g, Signal(Coord::ground(1, 0)));
        assert_eq!(
            layout.fanins(&Coord::ground(1, 0)),
            vec![Coord::ground(0, 0), Coord::ground(0, 1)]
        );
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let err = layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a])
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::ArityMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut layout = layout_5x5();
        let err = layout.create_pi("a", Coord::ground(7, 0)).unwrap_err();
        assert!(matches!(err, LayoutError::OutOfBounds { .. }));
    }

    #[test]
    fn test_clear_tile_strips_dependent_inputs() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let b = layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a, b])
            .unwrap();

        layout.clear_tile(Coord::ground(0, 0)).unwrap();

        assert!(!layout.is_occupied(&Coord::ground(0, 0)));
        // The AND gate survives, arity-deficient.
        assert_eq!(layout.fanins(&Coord::ground(1, 0)), vec![Coord::ground(0, 1)]);
        assert!(layout.node(&Coord::ground(1, 0)).unwrap().is_arity_deficient());
        assert!(layout.fanouts(&Coord::ground(0, 0)).is_empty());
    }

    #[test]
    fn test_clear_unoccupied_tile_reports_not_found() {
        let mut layout = layout_5x5();
        let err = layout.clear_tile(Coord::ground(2, 2)).unwrap_err();
        assert_eq!(err, LayoutError::NodeNotFound(Coord::ground(2, 2)));
    }

    #[test]
    fn test_move_node_rewires() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let b = layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        let c = layout.create_pi("c", Coord::ground(1, 1)).unwrap();
        layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a, b])
            .unwrap();
        // (1,1) has clock 2, (1,0) has clock 1: c may not feed the AND.
        let err = layout.move_node(Coord::ground(1, 0), vec![a, c]).unwrap_err();
        assert!(matches!(err, LayoutError::ClockingViolation { .. }));
        // Failed rewire leaves wiring and index intact.
        assert_eq!(
            layout.fanins(&Coord::ground(1, 0)),
            vec![Coord::ground(0, 0), Coord::ground(0, 1)]
        );

        // A valid rewire swaps input order and fixes the index.
        layout.move_node(Coord::ground(1, 0), vec![b, a]).unwrap();
        assert_eq!(
            layout.fanins(&Coord::ground(1, 0)),
            vec![Coord::ground(0, 1), Coord::ground(0, 0)]
        );
        assert_eq!(layout.fanouts(&Coord::ground(0, 0)), vec![Coord::ground(1, 0)]);
    }

    #[test]
    fn test_move_node_enforces_arity() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let b = layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a, b])
            .unwrap();
        let err = layout.move_node(Coord::ground(1, 0), vec![a]).unwrap_err();
        assert!(matches!(err, LayoutError::ArityMismatch { .. }));
    }

    #[test]
    fn test_resize_conflict_and_idempotence() {
        let mut layout = layout_5x5();
        layout.create_pi("a", Coord::ground(4, 4)).unwrap();

        let err = layout.resize(Dimensions::new(3, 3, 1)).unwrap_err();
        assert!(matches!(err, LayoutError::ResizeConflict { .. }));
        assert_eq!(layout.dimensions(), Dimensions::new(5, 5, 2));

        let bigger = Dimensions::new(8, 8, 2);
        layout.resize(bigger).unwrap();
        layout.resize(bigger).unwrap();
        assert_eq!(layout.dimensions(), bigger);
        assert_eq!(layout.node_count(), 1);
    }

    #[test]
    fn test_rebuild_index_matches_incremental() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let b = layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a, b])
            .unwrap();

        let before = layout.fanouts(&Coord::ground(0, 0));
        layout.rebuild_index();
        assert_eq!(layout.fanouts(&Coord::ground(0, 0)), before);
    }

    #[test]
    fn test_attach_input_respects_capacity() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let b = layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a, b])
            .unwrap();

        // Fully wired gate rejects a third input.
        let c = layout.create_pi("c", Coord::ground(1, 1)).unwrap();
        let err = layout.attach_input(Coord::ground(1, 0), c).unwrap_err();
        assert!(matches!(err, LayoutError::ArityMismatch { .. }));

        // After clearing an upstream source, the freed slot accepts a
        // clocking-compatible replacement.
        layout.clear_tile(Coord::ground(0, 0)).unwrap();
        let d = layout.create_pi("d", Coord::ground(0, 0)).unwrap();
        layout.attach_input(Coord::ground(1, 0), d).unwrap();
        assert_eq!(
            layout.fanins(&Coord::ground(1, 0)),
            vec![Coord::ground(0, 1), Coord::ground(0, 0)]
        );
    }

    #[test]
    fn test_restore_node_tolerates_missing_inputs() {
        let mut layout = layout_5x5();
        let b = layout.create_pi("b", Coord::ground(0, 1)).unwrap();
        layout
            .restore_node(GateKind::And, Coord::ground(1, 0), vec![b], None)
            .unwrap();
        assert!(layout
            .node(&Coord::ground(1, 0))
            .unwrap()
            .is_arity_deficient());
        assert_eq!(layout.fanouts(&Coord::ground(0, 1)), vec![Coord::ground(1, 0)]);

        // Surplus inputs stay rejected.
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        let err = layout
            .restore_node(GateKind::Buf, Coord::ground(1, 1), vec![a, b], None)
            .unwrap_err();
        assert!(matches!(err, LayoutError::ArityMismatch { .. }));
    }

    #[test]
    fn test_fanout_index_deduplicates_repeated_source() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        layout
            .create_node(GateKind::And, Coord::ground(1, 0), vec![a, a])
            .unwrap();

        // Both input slots are recorded, the dependent only once.
        assert_eq!(
            layout.fanins(&Coord::ground(1, 0)),
            vec![Coord::ground(0, 0), Coord::ground(0, 0)]
        );
        assert_eq!(layout.fanouts(&Coord::ground(0, 0)), vec![Coord::ground(1, 0)]);

        layout.rebuild_index();
        assert_eq!(layout.fanouts(&Coord::ground(0, 0)), vec![Coord::ground(1, 0)]);
    }

    #[test]
    fn test_pi_po_iterators() {
        let mut layout = layout_5x5();
        let a = layout.create_pi("a", Coord::ground(0, 0)).unwrap();
        layout.create_po(a, "f", Coord::ground(1, 0)).unwrap();
        assert_eq!(layout.pis().count(), 1);
        assert_eq!(layout.pos().count(), 1);
        assert_eq!(layout.pos().next().unwrap().label.as_deref(), Some("f"));
    }
}
