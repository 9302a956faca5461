use clap::Parser;
use crossterm::{
    cursor, execute,
    terminal::{self, ClearType, EnterAlternateScreen},
};
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use glyphcast::convert::{BenchConfig, BenchRecorder, Converter, EngineKind};
use glyphcast::demo::DemoScene;
use glyphcast::input;
use glyphcast::render::frame::run_app_loop;
use glyphcast::render::AppState;
use glyphcast::terminal_setup::{cleanup_terminal, install_panic_hook};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(
    name = "glyphcast",
    version,
    about = "Real-time terminal ASCII video renderer with dual downsampling engines"
)]
struct Cli {
    #[arg(long, value_name = "PX", default_value_t = 320, help = "Source frame width")]
    source_width: usize,
    #[arg(long, value_name = "PX", default_value_t = 200, help = "Source frame height")]
    source_height: usize,
    #[arg(
        long,
        value_name = "CELLS",
        help = "Fix the glyph grid width (default: terminal width)"
    )]
    grid_width: Option<usize>,
    #[arg(
        long,
        value_name = "CELLS",
        help = "Fix the glyph grid height (default: terminal height)"
    )]
    grid_height: Option<usize>,
    #[arg(long, help = "Force the scalar engine")]
    scalar: bool,
    #[arg(long, help = "Start with a benchmark run active")]
    benchmark: bool,
    #[arg(
        long,
        value_name = "N",
        default_value_t = 3,
        help = "Invocations per variant excluded from latency aggregates"
    )]
    warmup_frames: u32,
    #[arg(
        long,
        value_name = "MS",
        default_value_t = 1000,
        help = "Sliding frame-rate window length"
    )]
    window_ms: u64,
    #[arg(
        long,
        value_name = "FRAMES",
        default_value_t = 300,
        help = "Frames per variant before a benchmark run switches engines"
    )]
    switch_interval: u32,
}

fn detect_truecolor() -> bool {
    match std::env::var("COLORTERM") {
        Ok(val) => !val.is_empty() && (val == "truecolor" || val == "24bit"),
        Err(_) => match std::env::var("TERM_PROGRAM") {
            Ok(prog) => prog != "Apple_Terminal",
            Err(_) => match std::env::var("TERM") {
                Ok(term) => {
                    term.contains("ghostty") || term.contains("kitty") || term.contains("wezterm")
                }
                Err(_) => false,
            },
        },
    }
}

fn main() -> AppResult<()> {
    install_panic_hook();
    let cli = Cli::parse();

    let parallel_available = !cli.scalar && rayon::current_num_threads() > 1;
    if !cli.scalar && !parallel_available {
        eprintln!("Warning: single-threaded host; the parallel engine is unavailable.");
    }
    let engine = if parallel_available {
        EngineKind::Parallel
    } else {
        EngineKind::Scalar
    };

    let mut recorder = BenchRecorder::new(BenchConfig {
        warmup_frames: cli.warmup_frames,
        window_ms: cli.window_ms as f64,
        switch_interval: cli.switch_interval.max(1),
    });
    if cli.benchmark {
        recorder.set_active(true);
    }

    let mut app_state = AppState {
        scene: DemoScene::new(cli.source_width, cli.source_height),
        converter: Converter::new(),
        engine,
        parallel_available,
        recorder,
        grid_override: (cli.grid_width, cli.grid_height),
        hud_string_buf: String::with_capacity(512),
        input_state: input::InputState::default(),
        show_hud: true,
        frame_count: 0,
        skipped_frames: 0,
        last_frame_time: Instant::now(),
        fps: 0.0,
        use_truecolor: detect_truecolor(),
    };

    crossterm::terminal::enable_raw_mode()?;
    let input_rx = input::spawn_input_thread();
    let mut stdout = BufWriter::with_capacity(1024 * 1024, io::stdout());

    execute!(
        stdout,
        EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(ClearType::All)
    )?;
    stdout.flush()?;

    let run_result = run_app_loop(&mut app_state, &input_rx, &mut stdout);
    let cleanup_result = cleanup_terminal(&mut stdout);

    run_result?;
    cleanup_result
}
