use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use life_canvas_core::{GridError, GridSize, DEFAULT_ALIVE_PROBABILITY};
use life_canvas_rendering::CanvasLayout;
use life_canvas_system_pacing::DEFAULT_TICK_INTERVAL;
use life_canvas_world::WorldConfig;
use serde::Deserialize;

/// Window width assumed when neither a grid size nor a pixel size is configured.
pub(crate) const DEFAULT_WINDOW_WIDTH: u32 = 1024;
/// Window height assumed when neither a grid size nor a pixel size is configured.
pub(crate) const DEFAULT_WINDOW_HEIGHT: u32 = 768;

/// One layer of optional settings, sourced from a TOML file or the command line.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConfigLayer {
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) cell_size: Option<u32>,
    pub(crate) seeded: Option<bool>,
    pub(crate) alive_probability: Option<f64>,
    pub(crate) tick_ms: Option<u64>,
    pub(crate) seed: Option<u64>,
}

impl ConfigLayer {
    /// Reads a layer from the TOML file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load config file at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }

    /// Fills every unset field from `fallback`.
    #[must_use]
    pub(crate) fn or(self, fallback: Self) -> Self {
        Self {
            columns: self.columns.or(fallback.columns),
            rows: self.rows.or(fallback.rows),
            width: self.width.or(fallback.width),
            height: self.height.or(fallback.height),
            cell_size: self.cell_size.or(fallback.cell_size),
            seeded: self.seeded.or(fallback.seeded),
            alive_probability: self.alive_probability.or(fallback.alive_probability),
            tick_ms: self.tick_ms.or(fallback.tick_ms),
            seed: self.seed.or(fallback.seed),
        }
    }
}

/// Fully resolved settings used to boot the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) layout: CanvasLayout,
    pub(crate) grid_size: GridSize,
    pub(crate) seeded: bool,
    pub(crate) alive_probability: f64,
    pub(crate) tick_interval: Duration,
    pub(crate) rng_seed: Option<u64>,
}

impl Settings {
    /// Validates a merged layer and applies defaults to the fields it leaves unset.
    ///
    /// An explicit `columns`/`rows` pair wins over pixel dimensions. Without
    /// either, the grid fills a default window.
    pub(crate) fn resolve(layer: ConfigLayer) -> Result<Self> {
        let layout = CanvasLayout::new(
            layer.cell_size.unwrap_or(CanvasLayout::DEFAULT_CELL_SIZE),
            CanvasLayout::DEFAULT_CHROME_OFFSET,
        )
        .context("invalid canvas layout")?;

        let grid_size = match (layer.columns, layer.rows) {
            (Some(columns), Some(rows)) => GridSize::new(columns, rows)?,
            (None, None) => {
                let surface = layout.surface_size(
                    layer.width.unwrap_or(DEFAULT_WINDOW_WIDTH),
                    layer.height.unwrap_or(DEFAULT_WINDOW_HEIGHT),
                );
                layout
                    .grid_size(surface)
                    .context("window is too small to hold a single cell")?
            }
            _ => bail!("columns and rows must be configured together"),
        };

        let alive_probability = layer
            .alive_probability
            .unwrap_or(DEFAULT_ALIVE_PROBABILITY);
        if !(0.0..=1.0).contains(&alive_probability) {
            return Err(GridError::InvalidProbability(alive_probability).into());
        }

        let tick_interval = layer
            .tick_ms
            .map_or(DEFAULT_TICK_INTERVAL, Duration::from_millis);
        if tick_interval.is_zero() {
            bail!("tick interval must be at least one millisecond");
        }

        Ok(Self {
            layout,
            grid_size,
            seeded: layer.seeded.unwrap_or(true),
            alive_probability,
            tick_interval,
            rng_seed: layer.seed,
        })
    }

    /// World configuration matching these settings, seeded with `rng_seed`.
    pub(crate) fn world_config(&self, rng_seed: u64) -> Result<WorldConfig> {
        let config = WorldConfig::new(self.grid_size, self.seeded)
            .with_alive_probability(self.alive_probability)?
            .with_rng_seed(rng_seed);
        Ok(config)
    }
}
