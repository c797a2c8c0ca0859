#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Life Canvas adapters.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use life_canvas_core::{CellCoord, GridError, GridSize, GridView, Statistics};
use life_canvas_system_pacing::RunState;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Pixel dimensions of the drawing surface that hosts the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

/// Maps between window pixels and grid cells.
///
/// The window hosts a status strip of `chrome_offset` pixels at the top; the
/// drawing surface sits directly beneath it and every cell covers a square of
/// `cell_size` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanvasLayout {
    cell_size: u32,
    chrome_offset: u32,
}

impl CanvasLayout {
    /// Side length of a cell in pixels when none is configured.
    pub const DEFAULT_CELL_SIZE: u32 = 4;

    /// Height of the status strip above the surface when none is configured.
    pub const DEFAULT_CHROME_OFFSET: u32 = 22;

    /// Creates a new layout descriptor.
    ///
    /// Returns an error when `cell_size` is zero.
    pub fn new(cell_size: u32, chrome_offset: u32) -> Result<Self, RenderingError> {
        if cell_size == 0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }

        Ok(Self {
            cell_size,
            chrome_offset,
        })
    }

    /// Side length of a single cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Height of the status strip above the drawing surface.
    #[must_use]
    pub const fn chrome_offset(&self) -> u32 {
        self.chrome_offset
    }

    /// Derives the drawing surface from the window's inner dimensions.
    ///
    /// Both dimensions are trimmed to even pixel counts and the status strip
    /// is carved off the height.
    #[must_use]
    pub const fn surface_size(&self, window_width: u32, window_height: u32) -> SurfaceSize {
        SurfaceSize {
            width: window_width - window_width % 2,
            height: (window_height - window_height % 2).saturating_sub(self.chrome_offset),
        }
    }

    /// Number of whole cells that fit on the surface, truncating partial cells.
    pub fn grid_size(&self, surface: SurfaceSize) -> Result<GridSize, GridError> {
        GridSize::new(
            surface.width / self.cell_size,
            surface.height / self.cell_size,
        )
    }

    /// Translates a window pixel position into a signed grid coordinate.
    ///
    /// Positions inside the status strip map to negative rows; the world clamps
    /// them onto the grid.
    #[must_use]
    pub fn cell_at_pixel(&self, position: Vec2) -> (i64, i64) {
        let size = self.cell_size as f32;
        let column = (position.x / size).trunc();
        let row = ((position.y - self.chrome_offset as f32) / size).trunc();
        (column as i64, row as i64)
    }

    /// Top-left window pixel of the provided cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        let size = self.cell_size as f32;
        Vec2::new(
            cell.column() as f32 * size,
            self.chrome_offset as f32 + cell.row() as f32 * size,
        )
    }
}

impl Default for CanvasLayout {
    fn default() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            chrome_offset: Self::DEFAULT_CHROME_OFFSET,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a run/pause toggle on this frame.
    pub toggle_run: bool,
    /// Whether the adapter detected a request to clear the grid.
    pub reset_empty: bool,
    /// Whether the adapter detected a request to reseed the grid randomly.
    pub reset_random: bool,
    /// Grid coordinate the player clicked, before clamping.
    pub toggle_cell: Option<(i64, i64)>,
    /// Inner window dimensions observed on this frame.
    pub window_size: Option<(u32, u32)>,
}

/// Colors used to draw the status strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChromePresentation {
    /// Fill color of the strip.
    pub background: Color,
    /// Color of the status text.
    pub text_color: Color,
}

/// Everything a backend needs to draw a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Pixel mapping shared by drawing and input handling.
    pub layout: CanvasLayout,
    /// Dimensions of the grid being displayed.
    pub grid_size: GridSize,
    /// Alive cells captured from the most recent grid view.
    pub alive_cells: Vec<CellCoord>,
    /// Statistics reported by the world.
    pub statistics: Statistics,
    /// Whether the driving loop is stepping the simulation.
    pub run_state: RunState,
    /// Fill color of alive cells.
    pub cell_color: Color,
    /// Status strip styling.
    pub chrome: ChromePresentation,
}

impl Scene {
    /// Creates a new scene with no alive cells.
    #[must_use]
    pub fn new(
        layout: CanvasLayout,
        grid_size: GridSize,
        cell_color: Color,
        chrome: ChromePresentation,
    ) -> Self {
        Self {
            layout,
            grid_size,
            alive_cells: Vec::new(),
            statistics: Statistics::default(),
            run_state: RunState::Paused,
            cell_color,
            chrome,
        }
    }

    /// Replaces the scene content with a fresh capture of the grid.
    pub fn populate(&mut self, view: GridView<'_>, statistics: Statistics, run_state: RunState) {
        self.grid_size = view.size();
        self.alive_cells.clear();
        self.alive_cells
            .extend(view.alive_cells().map(|cell| cell.coord()));
        self.statistics = statistics;
        self.run_state = run_state;
    }

    /// Text shown in the status strip.
    #[must_use]
    pub fn status_line(&self) -> String {
        let state = match self.run_state {
            RunState::Paused => "paused",
            RunState::Running => "running",
        };
        format!(
            "generation {} | alive {} | {state}",
            self.statistics.generation_count, self.statistics.alive_count
        )
    }

    /// Window size needed to show the whole grid and the status strip.
    #[must_use]
    pub fn window_size(&self) -> (u32, u32) {
        let cell_size = self.layout.cell_size();
        (
            self.grid_size.columns().saturating_mul(cell_size),
            self.grid_size
                .rows()
                .saturating_mul(cell_size)
                .saturating_add(self.layout.chrome_offset()),
        )
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Life Canvas scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and refreshes the scene before it is
    /// drawn. Every frame clears the background and then fills one square per
    /// alive cell.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// Cells must cover at least one pixel.
    #[error("cell_size must be positive (received {cell_size})")]
    InvalidCellSize {
        /// Provided cell size that failed validation.
        cell_size: u32,
    },
}
