#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Life Canvas engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems read the grid exclusively through a borrowed [`GridView`]
//! and respond with new commands, so evaluation never observes a half-committed
//! generation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Probability used when reseeding a grid without an explicit density.
pub const DEFAULT_ALIVE_PROBABILITY: f64 = 0.5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the grid wholesale at a new size.
    ConfigureGrid {
        /// Dimensions of the rebuilt grid.
        size: GridSize,
        /// Whether cells are drawn randomly instead of starting dead.
        seeded: bool,
    },
    /// Flips the state of the cell nearest to the provided coordinate.
    ///
    /// Coordinates are signed because pointer translation may land left of or
    /// above the grid; the world clamps them onto the nearest edge cell.
    ToggleCell {
        /// Column of the requested cell, clamped by the world.
        column: i64,
        /// Row of the requested cell, clamped by the world.
        row: i64,
    },
    /// Rebuilds the grid at its current size with every cell dead.
    ResetEmpty,
    /// Rebuilds the grid at its current size with independently drawn cells.
    ResetRandom {
        /// Probability that any single cell starts alive.
        alive_probability: f64,
    },
    /// Commits a fully evaluated generation to the grid.
    CommitGeneration {
        /// Cells that become alive in the new generation.
        born: Vec<CellCoord>,
        /// Cells that die in the new generation.
        died: Vec<CellCoord>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the grid was rebuilt at a new size.
    GridConfigured {
        /// Dimensions of the rebuilt grid.
        size: GridSize,
        /// Statistics reflecting the freshly built grid.
        statistics: Statistics,
    },
    /// Confirms that a single cell changed state through user interaction.
    CellToggled {
        /// Cell that was flipped after clamping.
        cell: CellCoord,
        /// State of the cell after the toggle.
        alive: bool,
    },
    /// Announces that the grid was rebuilt at its current size.
    GridReset {
        /// Whether the rebuilt grid was drawn randomly.
        seeded: bool,
        /// Statistics reflecting the rebuilt grid.
        statistics: Statistics,
    },
    /// Announces that a generation was committed.
    GenerationAdvanced {
        /// Statistics recomputed after the commit.
        statistics: Statistics,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Single grid cell: a fixed position plus its mutable life state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    coord: CellCoord,
    alive: bool,
}

impl Cell {
    /// Creates a cell anchored at the provided coordinate.
    #[must_use]
    pub const fn new(coord: CellCoord, alive: bool) -> Self {
        Self { coord, alive }
    }

    /// Position of the cell within the grid.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.coord.column()
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.coord.row()
    }

    /// Reports whether the cell is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }
}

/// Validated grid dimensions measured in whole cells.
///
/// Deserialization goes through [`GridSize::new`], so decoded sizes obey the
/// same rules as constructed ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGridSize")]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

#[derive(Deserialize)]
struct RawGridSize {
    columns: u32,
    rows: u32,
}

impl TryFrom<RawGridSize> for GridSize {
    type Error = GridError;

    fn try_from(raw: RawGridSize) -> Result<Self, Self::Error> {
        Self::new(raw.columns, raw.rows)
    }
}

impl GridSize {
    /// Creates a new size descriptor.
    ///
    /// Returns an error when either dimension is zero or when the resulting
    /// cell count cannot be addressed on this platform.
    pub fn new(columns: u32, rows: u32) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::EmptyDimension { columns, rows });
        }

        let cells = u64::from(columns) * u64::from(rows);
        if usize::try_from(cells).is_err() {
            return Err(GridError::TooLarge { columns, rows });
        }

        Ok(Self { columns, rows })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Clamps a signed coordinate pair onto the nearest in-range cell.
    #[must_use]
    pub fn clamp(&self, column: i64, row: i64) -> CellCoord {
        CellCoord::new(
            clamp_axis(column, self.columns),
            clamp_axis(row, self.rows),
        )
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, coord: CellCoord) -> bool {
        coord.column() < self.columns && coord.row() < self.rows
    }

    /// Storage slot of the coordinate in column-major order.
    #[must_use]
    pub fn index(&self, coord: CellCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let slot = u64::from(coord.column()) * u64::from(self.rows) + u64::from(coord.row());
        usize::try_from(slot).ok()
    }
}

fn clamp_axis(value: i64, length: u32) -> u32 {
    let last = i64::from(length.saturating_sub(1));
    // `last` originates from a u32, so the clamped value always fits.
    value.clamp(0, last) as u32
}

/// Aggregate counters maintained by the world alongside the grid.
///
/// The world recomputes these whenever a generation is committed or the grid
/// is rebuilt; callers read them back instead of counting cells themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of generations committed since the grid was last rebuilt.
    pub generation_count: u64,
    /// Number of alive cells as of the last commit or rebuild.
    pub alive_count: u64,
}

impl Statistics {
    /// Creates statistics for a freshly built grid.
    #[must_use]
    pub const fn fresh(alive_count: u64) -> Self {
        Self {
            generation_count: 0,
            alive_count,
        }
    }
}

/// Dense column-major cell storage holding exactly one cell per coordinate.
///
/// Every column is a contiguous run of `rows` cells and each cell's
/// coordinate matches its slot. The buffer is the only way to obtain a
/// [`GridView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellBuffer {
    size: GridSize,
    cells: Vec<Cell>,
}

impl CellBuffer {
    /// Builds a buffer with every cell dead.
    #[must_use]
    pub fn empty(size: GridSize) -> Self {
        Self::from_fn(size, |_| false)
    }

    /// Builds a buffer by asking `alive` for every coordinate in column-major order.
    #[must_use]
    pub fn from_fn(size: GridSize, mut alive: impl FnMut(CellCoord) -> bool) -> Self {
        // `GridSize::new` guarantees the count is addressable.
        let capacity = usize::try_from(size.cell_count()).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for column in 0..size.columns() {
            for row in 0..size.rows() {
                let coord = CellCoord::new(column, row);
                cells.push(Cell::new(coord, alive(coord)));
            }
        }
        Self { size, cells }
    }

    /// Dimensions of the stored grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Borrows a read-only view of the stored cells.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView {
            cells: &self.cells,
            size: self.size,
        }
    }

    /// Sets the state of the cell at the exact coordinate.
    ///
    /// Returns `false` without mutating anything when the coordinate lies
    /// outside the grid.
    pub fn set_alive(&mut self, coord: CellCoord, alive: bool) -> bool {
        let Some(cell) = self
            .size
            .index(coord)
            .and_then(|index| self.cells.get_mut(index))
        else {
            return false;
        };
        cell.set_alive(alive);
        true
    }
}

/// Read-only view into a [`CellBuffer`].
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Cell],
    size: GridSize,
}

impl<'a> GridView<'a> {

    /// Dimensions of the underlying grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Returns the cell nearest to the provided coordinate.
    ///
    /// Each axis is clamped independently into `[0, len - 1]`, so queries past
    /// an edge resolve to the edge cell itself and queries past a corner resolve
    /// to the corner cell.
    #[must_use]
    pub fn cell_at(&self, column: i64, row: i64) -> Cell {
        let coord = self.size.clamp(column, row);
        self.cell(coord).unwrap_or_else(|| Cell::new(coord, false))
    }

    /// Returns the cell at the exact coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.size
            .index(coord)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Iterates over every cell, column by column and top to bottom within a column.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + 'a {
        self.cells.iter().copied()
    }

    /// Iterates over the alive cells in the same order as [`GridView::iter`].
    pub fn alive_cells(&self) -> impl Iterator<Item = Cell> + 'a {
        self.iter().filter(Cell::is_alive)
    }

    /// Counts the alive cells currently stored in the grid.
    #[must_use]
    pub fn alive_count(&self) -> u64 {
        self.alive_cells().count() as u64
    }
}

/// Reasons a grid cannot be constructed or reseeded.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GridError {
    /// Grids require at least one column and one row.
    #[error("grid dimensions must be positive (received {columns}x{rows})")]
    EmptyDimension {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// The requested grid holds more cells than can be addressed.
    #[error("grid of {columns}x{rows} cells cannot be addressed on this platform")]
    TooLarge {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// Seeding probabilities must lie within `0.0..=1.0`.
    #[error("alive probability must lie within 0.0..=1.0 (received {0})")]
    InvalidProbability(f64),
}
