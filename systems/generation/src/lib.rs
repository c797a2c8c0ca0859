#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Generation stepping system applying the standard B3/S23 Life rule.
//!
//! A step runs in two passes. The evaluation pass reads an immutable
//! [`GridView`] and records which cells change state; the commit pass hands
//! that plan to the world as a single [`Command::CommitGeneration`]. No cell is
//! written while neighbors are still being counted, so the outcome does not
//! depend on traversal order.

use life_canvas_core::{Cell, CellCoord, Command, Event, GridView, Statistics};
use life_canvas_world::{self as world, query, World};
use log::trace;

/// Offsets of the eight positions at Chebyshev distance one.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Counts the alive cells among the eight positions surrounding `cell`.
///
/// Positions are resolved through [`GridView::cell_at`], so off-grid positions
/// clamp onto the nearest edge cell. Repeats are not deduplicated: when two
/// off-grid positions clamp onto the same alive cell it is counted twice, and a
/// position that clamps back onto `cell` counts `cell` itself.
#[must_use]
pub fn alive_neighbor_count(view: &GridView<'_>, cell: Cell) -> u8 {
    let column = i64::from(cell.column());
    let row = i64::from(cell.row());

    let mut count = 0;
    for (column_offset, row_offset) in NEIGHBOR_OFFSETS {
        if view
            .cell_at(column + column_offset, row + row_offset)
            .is_alive()
        {
            count += 1;
        }
    }
    count
}

/// Decides whether a cell is alive in the next generation.
#[must_use]
pub const fn next_state(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// Cells that change state between two generations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationPlan {
    born: Vec<CellCoord>,
    died: Vec<CellCoord>,
}

impl GenerationPlan {
    /// Cells that are dead now and alive in the next generation.
    #[must_use]
    pub fn born(&self) -> &[CellCoord] {
        &self.born
    }

    /// Cells that are alive now and dead in the next generation.
    #[must_use]
    pub fn died(&self) -> &[CellCoord] {
        &self.died
    }

    /// Reports whether committing the plan would leave the grid unchanged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.born.is_empty() && self.died.is_empty()
    }

    /// Converts the plan into the command that commits it.
    #[must_use]
    pub fn into_command(self) -> Command {
        Command::CommitGeneration {
            born: self.born,
            died: self.died,
        }
    }
}

/// Runs the evaluation pass over every cell of the view.
///
/// Cells are visited in the view's iteration order. Cells that survive or stay
/// dead are no-ops and appear in neither list.
#[must_use]
pub fn evaluate(view: GridView<'_>) -> GenerationPlan {
    let mut plan = GenerationPlan::default();
    for cell in view.iter() {
        let neighbors = alive_neighbor_count(&view, cell);
        match (cell.is_alive(), next_state(cell.is_alive(), neighbors)) {
            (false, true) => plan.born.push(cell.coord()),
            (true, false) => plan.died.push(cell.coord()),
            _ => {}
        }
    }
    plan
}

/// Advances the world by one generation and returns the fresh statistics.
pub fn step(world: &mut World) -> Statistics {
    let mut events = Vec::new();
    step_with_events(world, &mut events)
}

/// Advances the world by one generation, appending the world's events.
pub fn step_with_events(world: &mut World, out_events: &mut Vec<Event>) -> Statistics {
    let plan = evaluate(query::grid_view(world));
    trace!(
        "generation plan: {} born, {} died",
        plan.born().len(),
        plan.died().len()
    );
    world::apply(world, plan.into_command(), out_events);
    query::statistics(world)
}
