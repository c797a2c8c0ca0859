#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Life Canvas, either in a window or headless.

mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use config::{ConfigLayer, Settings};
use life_canvas_core::{Command, Event, Statistics};
use life_canvas_rendering::{
    CanvasLayout, ChromePresentation, Color, FrameInput, Presentation, RenderingBackend, Scene,
};
use life_canvas_rendering_macroquad::MacroquadBackend;
use life_canvas_system_generation as generation;
use life_canvas_system_pacing::{Config as PacingConfig, Pacing};
use life_canvas_world::{self as world, query, World};
use log::{debug, info, trace};

const WINDOW_TITLE: &str = "Life Canvas";
const BACKGROUND_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);
const CELL_COLOR: Color = Color::new(1.0, 1.0, 1.0, 1.0);
const CHROME_BACKGROUND_COLOR: Color = Color::new(0.14, 0.14, 0.14, 1.0);
const CHROME_TEXT_COLOR: Color = Color::new(0.88, 0.88, 0.88, 1.0);

/// Conway's Game of Life on a clamped grid.
#[derive(Debug, Parser)]
#[command(name = "life-canvas", version)]
struct CliArgs {
    /// Number of grid columns. Requires `--rows`.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of grid rows. Requires `--columns`.
    #[arg(long)]
    rows: Option<u32>,
    /// Window width in pixels used to derive the column count [default: 1024].
    #[arg(long)]
    width: Option<u32>,
    /// Window height in pixels used to derive the row count [default: 768].
    #[arg(long)]
    height: Option<u32>,
    /// Side length of a cell in pixels [default: 4].
    #[arg(long)]
    cell_size: Option<u32>,
    /// Whether the initial grid is drawn randomly [default: true].
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    seeded: Option<bool>,
    /// Probability that a seeded cell starts alive [default: 0.5].
    #[arg(long)]
    alive_probability: Option<f64>,
    /// Milliseconds between generations while running [default: 100].
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Seed for the random number generator; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file supplying defaults for the options above.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Runs the given number of generations without a window and prints the statistics.
    #[arg(long, value_name = "GENERATIONS")]
    headless: Option<u64>,
    /// Logs frame-rate averages once per second.
    #[arg(long)]
    show_fps: bool,
    /// Renders as fast as possible instead of waiting for the display refresh.
    #[arg(long)]
    no_vsync: bool,
}

impl CliArgs {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            columns: self.columns,
            rows: self.rows,
            width: self.width,
            height: self.height,
            cell_size: self.cell_size,
            seeded: self.seeded,
            alive_probability: self.alive_probability,
            tick_ms: self.tick_ms,
            seed: self.seed,
        }
    }
}

/// Entry point for the Life Canvas command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let file_layer = match &args.config {
        Some(path) => ConfigLayer::load(path)?,
        None => ConfigLayer::default(),
    };
    let settings = Settings::resolve(args.layer().or(file_layer))?;

    let rng_seed = settings.rng_seed.unwrap_or_else(rand::random);
    debug!("rng seed {rng_seed}");
    let mut world =
        World::new(settings.world_config(rng_seed)?).context("failed to construct world")?;

    match args.headless {
        Some(generations) => {
            let statistics = run_headless(&mut world, generations);
            println!(
                "generation {} | alive {}",
                statistics.generation_count, statistics.alive_count
            );
            Ok(())
        }
        None => run_windowed(world, &settings, args.show_fps, !args.no_vsync),
    }
}

fn run_headless(world: &mut World, generations: u64) -> Statistics {
    let mut statistics = query::statistics(world);
    for _ in 0..generations {
        statistics = generation::step(world);
    }
    info!(
        "finished after {} generations with {} alive cells",
        statistics.generation_count, statistics.alive_count
    );
    statistics
}

fn run_windowed(world: World, settings: &Settings, show_fps: bool, vsync: bool) -> Result<()> {
    let mut session = Session::new(world, settings);
    let mut scene = Scene::new(
        settings.layout,
        query::size(&session.world),
        CELL_COLOR,
        ChromePresentation {
            background: CHROME_BACKGROUND_COLOR,
            text_color: CHROME_TEXT_COLOR,
        },
    );
    session.refresh(&mut scene);

    let presentation = Presentation::new(WINDOW_TITLE, BACKGROUND_COLOR, scene);
    MacroquadBackend::new()
        .with_vsync(vsync)
        .with_show_fps(show_fps)
        .run(presentation, move |dt, input, scene| {
            session.handle_frame(dt, input);
            session.refresh(scene);
        })
}

/// Interactive state owned by the windowed render loop.
#[derive(Debug)]
struct Session {
    world: World,
    pacing: Pacing,
    layout: CanvasLayout,
    alive_probability: f64,
    window_size: Option<(u32, u32)>,
    window_resized: bool,
    events: Vec<Event>,
}

impl Session {
    fn new(world: World, settings: &Settings) -> Self {
        Self {
            world,
            pacing: Pacing::new(PacingConfig::new(settings.tick_interval)),
            layout: settings.layout,
            alive_probability: settings.alive_probability,
            window_size: None,
            window_resized: false,
            events: Vec::new(),
        }
    }

    /// Applies one frame of input, then steps the world once per due tick.
    fn handle_frame(&mut self, dt: Duration, input: FrameInput) {
        if let Some(window_size) = input.window_size {
            if self.window_size.is_some_and(|previous| previous != window_size) {
                self.window_resized = true;
            }
            self.window_size = Some(window_size);
        }

        if let Some((column, row)) = input.toggle_cell {
            world::apply(
                &mut self.world,
                Command::ToggleCell { column, row },
                &mut self.events,
            );
        }
        if input.reset_empty {
            self.reset(false);
        }
        if input.reset_random {
            self.reset(true);
        }
        if input.toggle_run {
            let run_state = self.pacing.toggle();
            info!("simulation {run_state:?}");
        }

        for _ in 0..self.pacing.advance(dt) {
            let _ = generation::step_with_events(&mut self.world, &mut self.events);
        }

        for event in self.events.drain(..) {
            trace!("{event:?}");
        }
    }

    /// Rebuilds the grid, picking up the window size if it changed since the last reset.
    fn reset(&mut self, seeded: bool) {
        let current = query::size(&self.world);
        let target = if std::mem::take(&mut self.window_resized) {
            self.window_size
                .and_then(|(width, height)| {
                    let surface = self.layout.surface_size(width, height);
                    self.layout.grid_size(surface).ok()
                })
                .unwrap_or(current)
        } else {
            current
        };

        let command = if target != current {
            Command::ConfigureGrid {
                size: target,
                seeded,
            }
        } else if seeded {
            Command::ResetRandom {
                alive_probability: self.alive_probability,
            }
        } else {
            Command::ResetEmpty
        };
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn refresh(&self, scene: &mut Scene) {
        scene.populate(
            query::grid_view(&self.world),
            query::statistics(&self.world),
            self.pacing.run_state(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_canvas_core::{CellCoord, GridSize};
    use life_canvas_system_pacing::RunState;

    fn settings(columns: u32, rows: u32, seeded: bool) -> Settings {
        Settings::resolve(ConfigLayer {
            columns: Some(columns),
            rows: Some(rows),
            seeded: Some(seeded),
            seed: Some(11),
            ..ConfigLayer::default()
        })
        .expect("valid settings")
    }

    fn session(columns: u32, rows: u32, seeded: bool) -> Session {
        let settings = settings(columns, rows, seeded);
        let world = World::new(settings.world_config(11).expect("world config")).expect("world");
        Session::new(world, &settings)
    }

    fn alive(session: &Session) -> Vec<CellCoord> {
        query::grid_view(&session.world)
            .alive_cells()
            .map(|cell| cell.coord())
            .collect()
    }

    #[test]
    fn parses_flags_into_a_layer() {
        let args = CliArgs::try_parse_from([
            "life-canvas",
            "--columns",
            "40",
            "--rows",
            "30",
            "--seeded",
            "false",
            "--tick-ms",
            "250",
            "--headless",
            "5",
        ])
        .expect("valid arguments");

        let layer = args.layer();
        assert_eq!(layer.columns, Some(40));
        assert_eq!(layer.rows, Some(30));
        assert_eq!(layer.seeded, Some(false));
        assert_eq!(layer.tick_ms, Some(250));
        assert_eq!(layer.cell_size, None);
        assert_eq!(args.headless, Some(5));
    }

    #[test]
    fn bare_seeded_flag_means_true() {
        let args =
            CliArgs::try_parse_from(["life-canvas", "--seeded"]).expect("valid arguments");

        assert_eq!(args.seeded, Some(true));
    }

    #[test]
    fn headless_run_counts_generations() {
        let settings = settings(32, 24, true);
        let mut world =
            World::new(settings.world_config(3).expect("world config")).expect("world");

        let statistics = run_headless(&mut world, 25);

        assert_eq!(statistics.generation_count, 25);
        assert_eq!(statistics, query::statistics(&world));
    }

    #[test]
    fn clicks_toggle_cells_without_running() {
        let mut session = session(8, 8, false);

        session.handle_frame(
            Duration::from_millis(500),
            FrameInput {
                toggle_cell: Some((3, 4)),
                ..FrameInput::default()
            },
        );

        assert_eq!(alive(&session), vec![CellCoord::new(3, 4)]);
        assert_eq!(query::statistics(&session.world).generation_count, 0);
    }

    #[test]
    fn running_session_steps_per_tick() {
        let mut session = session(8, 8, false);
        for (column, row) in [(1, 2), (2, 2), (3, 2)] {
            session.handle_frame(
                Duration::ZERO,
                FrameInput {
                    toggle_cell: Some((column, row)),
                    ..FrameInput::default()
                },
            );
        }

        session.handle_frame(
            Duration::ZERO,
            FrameInput {
                toggle_run: true,
                ..FrameInput::default()
            },
        );
        assert_eq!(session.pacing.run_state(), RunState::Running);

        session.handle_frame(Duration::from_millis(100), FrameInput::default());

        assert_eq!(
            alive(&session),
            vec![
                CellCoord::new(2, 1),
                CellCoord::new(2, 2),
                CellCoord::new(2, 3)
            ]
        );
        assert_eq!(query::statistics(&session.world).generation_count, 1);
    }

    #[test]
    fn clear_request_empties_the_grid() {
        let mut session = session(16, 16, true);

        session.handle_frame(
            Duration::ZERO,
            FrameInput {
                reset_empty: true,
                ..FrameInput::default()
            },
        );

        assert!(alive(&session).is_empty());
        assert_eq!(query::statistics(&session.world), Statistics::default());
    }

    #[test]
    fn reset_after_window_resize_rebuilds_at_new_size() {
        let mut session = session(10, 10, false);
        session.handle_frame(
            Duration::ZERO,
            FrameInput {
                window_size: Some((40, 62)),
                ..FrameInput::default()
            },
        );
        session.handle_frame(
            Duration::ZERO,
            FrameInput {
                window_size: Some((80, 122)),
                reset_random: true,
                ..FrameInput::default()
            },
        );

        assert_eq!(
            query::size(&session.world),
            GridSize::new(20, 25).expect("size")
        );
    }

    #[test]
    fn reset_without_resize_keeps_size() {
        let mut session = session(10, 10, false);
        for _ in 0..2 {
            session.handle_frame(
                Duration::ZERO,
                FrameInput {
                    window_size: Some((1000, 1000)),
                    reset_random: true,
                    ..FrameInput::default()
                },
            );
        }

        assert_eq!(
            query::size(&session.world),
            GridSize::new(10, 10).expect("size")
        );
    }

    #[test]
    fn refresh_populates_scene() {
        let mut session = session(4, 4, false);
        session.handle_frame(
            Duration::ZERO,
            FrameInput {
                toggle_cell: Some((9, -3)),
                ..FrameInput::default()
            },
        );
        let mut scene = Scene::new(
            session.layout,
            GridSize::new(1, 1).expect("size"),
            CELL_COLOR,
            ChromePresentation {
                background: CHROME_BACKGROUND_COLOR,
                text_color: CHROME_TEXT_COLOR,
            },
        );

        session.refresh(&mut scene);

        assert_eq!(scene.grid_size, GridSize::new(4, 4).expect("size"));
        assert_eq!(scene.alive_cells, vec![CellCoord::new(3, 0)]);
        assert_eq!(scene.status_line(), "generation 0 | alive 0 | paused");
    }
}
