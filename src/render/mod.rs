pub mod frame;
pub mod hud;

use std::time::Instant;

use crossterm::style::Color;

use crate::convert::{BenchRecorder, Converter, EngineKind};
use crate::demo::DemoScene;
use crate::input::InputState;

pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return 232 + ((r as f32 - 8.0) / 247.0 * 24.0) as u8;
    }
    let ri = (r as f32 / 255.0 * 5.0 + 0.5) as u8;
    let gi = (g as f32 / 255.0 * 5.0 + 0.5) as u8;
    let bi = (b as f32 / 255.0 * 5.0 + 0.5) as u8;
    16 + 36 * ri + 6 * gi + bi
}

pub fn make_color(r: u8, g: u8, b: u8, use_truecolor: bool) -> Color {
    if use_truecolor {
        Color::Rgb { r, g, b }
    } else {
        Color::AnsiValue(rgb_to_ansi256(r, g, b))
    }
}

pub type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

pub const FRAME_TARGET: std::time::Duration = std::time::Duration::from_millis(8);

#[derive(Debug)]
pub struct AppState {
    pub scene: DemoScene,
    pub converter: Converter,
    pub engine: EngineKind,
    pub parallel_available: bool,
    pub recorder: BenchRecorder,
    pub grid_override: (Option<usize>, Option<usize>),
    pub hud_string_buf: String,
    pub input_state: InputState,
    pub show_hud: bool,
    pub frame_count: u64,
    pub skipped_frames: u64,
    pub last_frame_time: Instant,
    pub fps: f32,
    pub use_truecolor: bool,
}

impl AppState {
    /// Engine toggle request from the controls. Refused while a benchmark
    /// run is in progress (a mid-run switch would invalidate the in-flight
    /// sample) and when only the scalar path is available.
    pub fn try_toggle_engine(&mut self) {
        if self.recorder.is_active() || !self.parallel_available {
            return;
        }
        self.engine = self.engine.toggled();
    }

    /// Benchmark toggle. Enabling resets both variants' histories and pins
    /// the parallel engine first so the run alternates from a known state.
    pub fn toggle_benchmark(&mut self) {
        let next = !self.recorder.is_active();
        self.recorder.set_active(next);
        if next && self.parallel_available {
            self.engine = EngineKind::Parallel;
        }
    }
}
