use fcn_core::{Coord, GateLayout, Node};

use crate::violation::{Violation, ViolationKind};

/// Sweep all occupied tiles and collect structural violations.
///
/// Read-only: violations are data, not control flow, and the full list
/// is always returned rather than stopping at the first finding.
pub fn check(layout: &GateLayout) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut coords: Vec<Coord> = layout.nodes().map(|n| n.coord).collect();
    coords.sort();

    for coord in coords {
        let node = match layout.node(&coord) {
            Some(n) => n,
            None => continue,
        };
        check_arity(layout, node, &mut violations);
        check_clocking(layout, node, &mut violations);
        check_io(layout, node, &mut violations);
    }

    log::debug!(
        "design-rule sweep over {} tile(s): {} violation(s)",
        layout.node_count(),
        violations.len()
    );
    violations
}

fn check_arity(layout: &GateLayout, node: &Node, out: &mut Vec<Violation>) {
    let resolved = node
        .inputs
        .iter()
        .filter(|s| layout.is_occupied(&s.source()))
        .count();
    let required = node.kind.arity();
    if resolved < required {
        out.push(Violation::new(
            ViolationKind::ArityMismatch,
            node.coord,
            format!(
                "{} gate has {resolved} of {required} required input(s)",
                node.kind
            ),
        ));
    }
}

// Clocking binds physically adjacent feeds only; a distant input is
// logical wiring whose eventual wire path is checked hop by hop when
// it is routed.
fn check_clocking(layout: &GateLayout, node: &Node, out: &mut Vec<Violation>) {
    let clocking = layout.clocking();
    let topology = layout.topology();
    for s in &node.inputs {
        let src = s.source();
        if layout.is_occupied(&src)
            && topology.are_adjacent(&node.coord, &src)
            && !clocking.may_feed(&src, &node.coord)
        {
            out.push(Violation::new(
                ViolationKind::ClockingViolation,
                node.coord,
                format!(
                    "input {} (clock {}) does not precede tile clock {}",
                    src,
                    clocking.clock_of(&src),
                    clocking.clock_of(&node.coord)
                ),
            ));
        }
    }
}

fn check_io(layout: &GateLayout, node: &Node, out: &mut Vec<Violation>) {
    if node.kind.is_pi() && !node.inputs.is_empty() {
        out.push(Violation::new(
            ViolationKind::DanglingIo,
            node.coord,
            "primary input has recorded fanin",
        ));
    }
    if node.kind.is_po() {
        let fed = node
            .inputs
            .iter()
            .any(|s| layout.is_occupied(&s.source()));
        if !fed {
            out.push(Violation::new(
                ViolationKind::DanglingIo,
                node.coord,
                "primary output has no resolvable input",
            ));
        }
    }
}
