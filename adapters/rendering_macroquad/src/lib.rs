#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Life Canvas.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::Result;
use glam::Vec2;
use life_canvas_rendering::{
    CanvasLayout, Color, FrameInput, Presentation, RenderingBackend, Scene,
};
use log::info;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

const STATUS_FONT_SIZE: f32 = 18.0;
const STATUS_TEXT_INSET: f32 = 6.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the render loop.
    quit_requested: bool,
    /// `Space` switches between running and paused.
    toggle_run: bool,
    /// `R` reseeds the grid randomly.
    reset_random: bool,
    /// `C` clears the grid.
    reset_empty: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            toggle_run: is_key_pressed(KeyCode::Space),
            reset_random: is_key_pressed(KeyCode::R),
            reset_empty: is_key_pressed(KeyCode::C),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let avg_render = self.render_accum / self.frames.max(1);

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.render_accum = Duration::ZERO;

        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_render,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let (window_width, window_height) = scene.window_size();
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_width).unwrap_or(i32::MAX).max(1),
            window_height: i32::try_from(window_height).unwrap_or(i32::MAX).max(1),
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let (cursor_x, cursor_y) = mouse_position();
                let click = is_mouse_button_pressed(MouseButton::Left);
                let window_size = (
                    macroquad::window::screen_width().max(0.0) as u32,
                    macroquad::window::screen_height().max(0.0) as u32,
                );
                let frame_input = gather_frame_input_from_observations(
                    &scene.layout,
                    Vec2::new(cursor_x, cursor_y),
                    click,
                    keyboard,
                    window_size,
                );

                update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                draw_cells(&scene);
                draw_chrome(&scene, window_size.0 as f32);
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(frame_dt, render_duration);
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_render,
                    }) = fps_metrics
                    {
                        info!(
                            "FPS: {:.2} (10s avg: {:.2}) | render: {:>6.2}ms",
                            per_second,
                            trailing_ten_seconds,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input_from_observations(
    layout: &CanvasLayout,
    cursor_position: Vec2,
    click: bool,
    keyboard: KeyboardShortcuts,
    window_size: (u32, u32),
) -> FrameInput {
    let on_surface = cursor_position.y >= layout.chrome_offset() as f32;
    let toggle_cell = if click && on_surface {
        Some(layout.cell_at_pixel(cursor_position))
    } else {
        None
    };

    FrameInput {
        toggle_run: keyboard.toggle_run,
        reset_empty: keyboard.reset_empty,
        reset_random: keyboard.reset_random,
        toggle_cell,
        window_size: Some(window_size),
    }
}

fn cell_squares(scene: &Scene) -> impl Iterator<Item = (Vec2, f32)> + '_ {
    let size = scene.layout.cell_size() as f32;
    scene
        .alive_cells
        .iter()
        .map(move |cell| (scene.layout.cell_origin(*cell), size))
}

fn draw_cells(scene: &Scene) {
    let color = to_macroquad_color(scene.cell_color);
    for (origin, size) in cell_squares(scene) {
        macroquad::shapes::draw_rectangle(origin.x, origin.y, size, size, color);
    }
}

fn draw_chrome(scene: &Scene, screen_width: f32) {
    let height = scene.layout.chrome_offset() as f32;
    if height <= f32::EPSILON {
        return;
    }

    macroquad::shapes::draw_rectangle(
        0.0,
        0.0,
        screen_width,
        height,
        to_macroquad_color(scene.chrome.background),
    );
    let _ = macroquad::text::draw_text(
        &scene.status_line(),
        STATUS_TEXT_INSET,
        height - STATUS_TEXT_INSET,
        STATUS_FONT_SIZE,
        to_macroquad_color(scene.chrome.text_color),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_canvas_core::{CellCoord, GridSize};
    use life_canvas_rendering::ChromePresentation;

    fn scene_with(alive: Vec<CellCoord>) -> Scene {
        let mut scene = Scene::new(
            CanvasLayout::new(4, 22).expect("valid layout"),
            GridSize::new(10, 10).expect("valid size"),
            Color::from_rgb_u8(0xff, 0xff, 0xff),
            ChromePresentation {
                background: Color::from_rgb_u8(0x10, 0x10, 0x10),
                text_color: Color::from_rgb_u8(0xff, 0xff, 0xff),
            },
        );
        scene.alive_cells = alive;
        scene
    }

    #[test]
    fn click_on_surface_maps_to_grid_coordinate() {
        let layout = CanvasLayout::new(4, 22).expect("valid layout");
        let input = gather_frame_input_from_observations(
            &layout,
            Vec2::new(17.0, 31.0),
            true,
            KeyboardShortcuts::default(),
            (400, 300),
        );

        assert_eq!(input.toggle_cell, Some((4, 2)));
        assert_eq!(input.window_size, Some((400, 300)));
    }

    #[test]
    fn click_inside_status_strip_is_ignored() {
        let layout = CanvasLayout::new(4, 22).expect("valid layout");
        let input = gather_frame_input_from_observations(
            &layout,
            Vec2::new(17.0, 5.0),
            true,
            KeyboardShortcuts::default(),
            (400, 300),
        );

        assert_eq!(input.toggle_cell, None);
    }

    #[test]
    fn keyboard_shortcuts_propagate_to_frame_input() {
        let layout = CanvasLayout::default();
        let keyboard = KeyboardShortcuts {
            quit_requested: false,
            toggle_run: true,
            reset_random: true,
            reset_empty: false,
        };
        let input =
            gather_frame_input_from_observations(&layout, Vec2::ZERO, false, keyboard, (0, 0));

        assert!(input.toggle_run);
        assert!(input.reset_random);
        assert!(!input.reset_empty);
        assert_eq!(input.toggle_cell, None);
    }

    #[test]
    fn one_square_per_alive_cell() {
        let scene = scene_with(vec![CellCoord::new(0, 0), CellCoord::new(3, 2)]);
        let squares: Vec<(Vec2, f32)> = cell_squares(&scene).collect();

        assert_eq!(
            squares,
            vec![
                (Vec2::new(0.0, 22.0), 4.0),
                (Vec2::new(12.0, 30.0), 4.0),
            ]
        );
    }

    #[test]
    fn fps_counter_reports_after_one_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);

        for _ in 0..3 {
            assert_eq!(counter.record_frame(frame, Duration::from_millis(2)), None);
        }
        let metrics = counter
            .record_frame(frame, Duration::from_millis(2))
            .expect("metrics after one second");

        assert!((metrics.per_second - 4.0).abs() < 1e-3);
        assert_eq!(metrics.avg_render, Duration::from_millis(2));
    }
}
