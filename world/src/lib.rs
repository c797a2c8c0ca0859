#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Life Canvas.

use life_canvas_core::{
    Cell, CellBuffer, CellCoord, Command, Event, GridError, GridSize, GridView, Statistics,
    DEFAULT_ALIVE_PROBABILITY,
};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Parameters required to construct a [`World`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    size: GridSize,
    seeded: bool,
    alive_probability: f64,
    rng_seed: Option<u64>,
}

impl WorldConfig {
    /// Creates a configuration for a grid of the provided size.
    ///
    /// When `seeded` is set every cell is drawn alive with
    /// [`DEFAULT_ALIVE_PROBABILITY`] unless overridden. Draws come from an
    /// entropy-seeded generator unless [`WorldConfig::with_rng_seed`] pins it.
    #[must_use]
    pub const fn new(size: GridSize, seeded: bool) -> Self {
        Self {
            size,
            seeded,
            alive_probability: DEFAULT_ALIVE_PROBABILITY,
            rng_seed: None,
        }
    }

    /// Overrides the probability used when drawing seeded cells.
    pub fn with_alive_probability(mut self, alive_probability: f64) -> Result<Self, GridError> {
        if !(0.0..=1.0).contains(&alive_probability) {
            return Err(GridError::InvalidProbability(alive_probability));
        }
        self.alive_probability = alive_probability;
        Ok(self)
    }

    /// Pins the seed feeding the world's random number generator, making
    /// every random draw reproducible.
    #[must_use]
    pub const fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = Some(rng_seed);
        self
    }

    /// Dimensions of the grid the world starts with.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }
}

/// Dense two-dimensional cell storage with clamped lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: CellBuffer,
}

impl Grid {
    /// Builds a grid with every cell dead.
    #[must_use]
    pub fn empty(size: GridSize) -> Self {
        Self {
            cells: CellBuffer::empty(size),
        }
    }

    fn from_fn(size: GridSize, alive: impl FnMut(CellCoord) -> bool) -> Self {
        Self {
            cells: CellBuffer::from_fn(size, alive),
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.cells.size()
    }

    /// Captures a read-only view of the grid.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        self.cells.view()
    }

    /// Returns the cell nearest to the provided coordinate.
    #[must_use]
    pub fn cell_at(&self, column: i64, row: i64) -> Cell {
        self.view().cell_at(column, row)
    }

    /// Sets the state of the cell nearest to the provided coordinate.
    ///
    /// Returns the mutated cell so callers learn which cell absorbed the
    /// clamped coordinate.
    pub fn set_alive(&mut self, column: i64, row: i64, alive: bool) -> Cell {
        let coord = self.size().clamp(column, row);
        let _ = self.cells.set_alive(coord, alive);
        Cell::new(coord, alive)
    }

    /// Flips the state of the cell nearest to the provided coordinate.
    pub fn toggle(&mut self, column: i64, row: i64) -> Cell {
        let current = self.cell_at(column, row);
        self.set_alive(column, row, !current.is_alive())
    }

    /// Counts the alive cells currently stored in the grid.
    #[must_use]
    pub fn alive_count(&self) -> u64 {
        self.view().alive_count()
    }
}

/// Represents the authoritative Life Canvas world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    statistics: Statistics,
    alive_probability: f64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world with a grid sized by the provided configuration.
    ///
    /// Returns an error when the configured probability is out of range.
    pub fn new(config: WorldConfig) -> Result<Self, GridError> {
        if !(0.0..=1.0).contains(&config.alive_probability) {
            return Err(GridError::InvalidProbability(config.alive_probability));
        }

        let mut world = Self {
            grid: Grid::empty(config.size),
            statistics: Statistics::default(),
            alive_probability: config.alive_probability,
            rng: match config.rng_seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            },
        };
        world.rebuild(config.size, config.seeded, config.alive_probability);

        info!("{}x{} grid", config.size.columns(), config.size.rows());
        info!("{} cells", config.size.cell_count());

        Ok(world)
    }

    fn rebuild(&mut self, size: GridSize, seeded: bool, alive_probability: f64) {
        self.grid = if seeded {
            let rng = &mut self.rng;
            Grid::from_fn(size, |_| rng.gen_bool(alive_probability))
        } else {
            Grid::empty(size)
        };
        self.statistics = Statistics::fresh(self.grid.alive_count());
    }

    fn commit(&mut self, born: &[CellCoord], died: &[CellCoord]) {
        let mut ignored = 0_usize;
        for &coord in died {
            if !self.grid.cells.set_alive(coord, false) {
                ignored += 1;
            }
        }
        for &coord in born {
            if !self.grid.cells.set_alive(coord, true) {
                ignored += 1;
            }
        }
        if ignored > 0 {
            debug!("ignored {ignored} commit entries outside the grid");
        }

        self.statistics = Statistics {
            generation_count: self.statistics.generation_count.saturating_add(1),
            alive_count: self.grid.alive_count(),
        };
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { size, seeded } => {
            let alive_probability = world.alive_probability;
            world.rebuild(size, seeded, alive_probability);
            debug!(
                "grid resized to {}x{} (seeded: {seeded})",
                size.columns(),
                size.rows()
            );
            out_events.push(Event::GridConfigured {
                size,
                statistics: world.statistics,
            });
        }
        Command::ToggleCell { column, row } => {
            let cell = world.grid.toggle(column, row);
            out_events.push(Event::CellToggled {
                cell: cell.coord(),
                alive: cell.is_alive(),
            });
        }
        Command::ResetEmpty => {
            let size = world.grid.size();
            world.rebuild(size, false, 0.0);
            debug!("grid cleared");
            out_events.push(Event::GridReset {
                seeded: false,
                statistics: world.statistics,
            });
        }
        Command::ResetRandom { alive_probability } => {
            let alive_probability = sanitize_probability(alive_probability);
            let size = world.grid.size();
            world.rebuild(size, true, alive_probability);
            debug!(
                "grid reseeded with p={alive_probability}: {} alive",
                world.statistics.alive_count
            );
            out_events.push(Event::GridReset {
                seeded: true,
                statistics: world.statistics,
            });
        }
        Command::CommitGeneration { born, died } => {
            world.commit(&born, &died);
            out_events.push(Event::GenerationAdvanced {
                statistics: world.statistics,
            });
        }
    }
}

fn sanitize_probability(alive_probability: f64) -> f64 {
    if alive_probability.is_nan() {
        warn!("alive probability is NaN; falling back to {DEFAULT_ALIVE_PROBABILITY}");
        return DEFAULT_ALIVE_PROBABILITY;
    }
    let clamped = alive_probability.clamp(0.0, 1.0);
    if clamped != alive_probability {
        warn!("alive probability {alive_probability} clamped to {clamped}");
    }
    clamped
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use life_canvas_core::{Cell, GridSize, GridView, Statistics};

    /// Captures a read-only view of the grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Returns the cell nearest to the provided coordinate.
    #[must_use]
    pub fn cell_at(world: &World, column: i64, row: i64) -> Cell {
        world.grid.cell_at(column, row)
    }

    /// Statistics recorded by the most recent commit or rebuild.
    #[must_use]
    pub fn statistics(world: &World) -> Statistics {
        world.statistics
    }

    /// Dimensions of the current grid.
    #[must_use]
    pub fn size(world: &World) -> GridSize {
        world.grid.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(columns: u32, rows: u32) -> GridSize {
        GridSize::new(columns, rows).expect("valid size")
    }

    #[test]
    fn empty_grid_starts_with_zero_statistics() {
        let world = World::new(WorldConfig::new(size(8, 6), false)).expect("world");

        assert_eq!(query::statistics(&world), Statistics::default());
        assert_eq!(query::grid_view(&world).alive_count(), 0);
    }

    #[test]
    fn every_coordinate_maps_to_matching_cell() {
        let world = World::new(WorldConfig::new(size(7, 5), true)).expect("world");
        let view = query::grid_view(&world);

        for column in 0..7_u32 {
            for row in 0..5_u32 {
                let cell = view.cell_at(i64::from(column), i64::from(row));
                assert_eq!(cell.column(), column);
                assert_eq!(cell.row(), row);
            }
        }
        assert_eq!(view.iter().count(), 35);
    }

    #[test]
    fn seeded_world_reports_actual_alive_count() {
        let world = World::new(WorldConfig::new(size(20, 20), true)).expect("world");
        let counted = query::grid_view(&world).alive_count();

        assert_eq!(query::statistics(&world).alive_count, counted);
        assert_eq!(query::statistics(&world).generation_count, 0);
    }

    #[test]
    fn config_rejects_out_of_range_probability() {
        let config = WorldConfig::new(size(2, 2), true);
        assert_eq!(
            config.with_alive_probability(1.5),
            Err(GridError::InvalidProbability(1.5))
        );
        assert!(config.with_alive_probability(f64::NAN).is_err());
    }

    #[test]
    fn set_alive_clamps_out_of_range_coordinates() {
        let mut grid = Grid::empty(size(4, 4));
        let cell = grid.set_alive(-3, 9, true);

        assert_eq!(cell.coord(), CellCoord::new(0, 3));
        assert!(grid.cell_at(0, 3).is_alive());
        assert_eq!(grid.alive_count(), 1);
    }

    #[test]
    fn toggle_reports_clamped_cell() {
        let mut world = World::new(WorldConfig::new(size(5, 5), false)).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ToggleCell {
                column: 12,
                row: -4,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CellToggled {
                cell: CellCoord::new(4, 0),
                alive: true,
            }]
        );
    }

    #[test]
    fn commit_generation_updates_statistics_after_commit() {
        let mut world = World::new(WorldConfig::new(size(4, 4), false)).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::CommitGeneration {
                born: vec![CellCoord::new(1, 1), CellCoord::new(2, 2)],
                died: vec![CellCoord::new(0, 0)],
            },
            &mut events,
        );

        let expected = Statistics {
            generation_count: 1,
            alive_count: 2,
        };
        assert_eq!(query::statistics(&world), expected);
        assert_eq!(
            events,
            vec![Event::GenerationAdvanced {
                statistics: expected
            }]
        );
    }

    #[test]
    fn commit_ignores_coordinates_outside_grid() {
        let mut world = World::new(WorldConfig::new(size(2, 2), false)).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::CommitGeneration {
                born: vec![CellCoord::new(5, 5)],
                died: Vec::new(),
            },
            &mut events,
        );

        assert_eq!(query::statistics(&world).alive_count, 0);
        assert_eq!(query::statistics(&world).generation_count, 1);
    }

    #[test]
    fn reset_empty_clears_cells_and_statistics() {
        let mut world = World::new(WorldConfig::new(size(6, 6), true)).expect("world");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CommitGeneration {
                born: Vec::new(),
                died: Vec::new(),
            },
            &mut events,
        );

        apply(&mut world, Command::ResetEmpty, &mut events);

        assert_eq!(query::statistics(&world), Statistics::default());
        assert_eq!(query::grid_view(&world).alive_count(), 0);
        assert_eq!(query::size(&world), size(6, 6));
    }

    #[test]
    fn reset_random_with_extreme_probabilities() {
        let mut world = World::new(WorldConfig::new(size(10, 10), false)).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ResetRandom {
                alive_probability: 1.0,
            },
            &mut events,
        );
        assert_eq!(query::statistics(&world).alive_count, 100);

        apply(
            &mut world,
            Command::ResetRandom {
                alive_probability: -2.0,
            },
            &mut events,
        );
        assert_eq!(query::statistics(&world).alive_count, 0);
    }

    #[test]
    fn configure_grid_rebuilds_at_new_size() {
        let mut world = World::new(WorldConfig::new(size(3, 3), false)).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureGrid {
                size: size(9, 4),
                seeded: false,
            },
            &mut events,
        );

        assert_eq!(query::size(&world), size(9, 4));
        assert_eq!(query::grid_view(&world).iter().count(), 36);
        assert_eq!(
            events,
            vec![Event::GridConfigured {
                size: size(9, 4),
                statistics: Statistics::default(),
            }]
        );
    }

    #[test]
    fn unpinned_seeded_worlds_draw_different_grids() {
        let config = WorldConfig::new(size(50, 50), true);
        let first = World::new(config).expect("world");
        let second = World::new(config).expect("world");

        let first_cells: Vec<Cell> = query::grid_view(&first).iter().collect();
        let second_cells: Vec<Cell> = query::grid_view(&second).iter().collect();
        assert_ne!(first_cells, second_cells);
    }

    #[test]
    fn seeded_worlds_are_deterministic_for_same_seed() {
        let config = WorldConfig::new(size(16, 16), true).with_rng_seed(0x1234);
        let first = World::new(config).expect("world");
        let second = World::new(config).expect("world");

        let first_cells: Vec<Cell> = query::grid_view(&first).iter().collect();
        let second_cells: Vec<Cell> = query::grid_view(&second).iter().collect();
        assert_eq!(first_cells, second_cells);
    }
}
