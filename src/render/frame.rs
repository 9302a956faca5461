use crossterm::{
    cursor, queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use std::io::{self, Write};
use std::time::Instant;

use super::{make_color, AppResult, AppState, FRAME_TARGET};
use crate::input;

fn is_hud_overlay_row(app: &AppState, row: usize, term_rows: usize) -> bool {
    app.show_hud
        && (row < super::hud::top_rows(app) || row == term_rows.saturating_sub(1))
}

/// One full pipeline tick: prepare caches, run the selected engine inside
/// the recorder's timestamps, paint the grid, draw the HUD. A precondition
/// failure skips the conversion and leaves the previous cells on screen.
pub fn render_frame(
    app: &mut AppState,
    terminal_size: (u16, u16),
    stdout: &mut impl Write,
) -> io::Result<()> {
    let term_cols = terminal_size.0.max(1) as usize;
    let term_rows = terminal_size.1.max(1) as usize;

    let grid_w = app.grid_override.0.unwrap_or(term_cols);
    let grid_h = app.grid_override.1.unwrap_or(term_rows);

    let (src_w, src_h) = app.scene.size();
    app.converter.prepare(src_w, src_h, grid_w, grid_h);

    match app.scene.frame() {
        Ok(frame) => {
            let start = Instant::now();
            match app.converter.convert(&frame, app.engine) {
                Ok(()) => {
                    let elapsed = start.elapsed();
                    if app.recorder.is_active() {
                        app.recorder.record(app.engine, elapsed);
                    }
                }
                Err(_) => app.skipped_frames += 1,
            }
        }
        Err(_) => app.skipped_frames += 1,
    }

    draw_cells(app, term_cols, term_rows, stdout)?;

    if app.show_hud {
        super::hud::draw_hud(app, terminal_size.0, terminal_size.1, stdout)?;
    }

    queue!(stdout, ResetColor)?;
    stdout.flush()
}

fn draw_cells(
    app: &AppState,
    term_cols: usize,
    term_rows: usize,
    stdout: &mut impl Write,
) -> io::Result<()> {
    let (grid_w, grid_h) = app.converter.grid_size();
    let cells = app.converter.cells();
    let rows = grid_h.min(term_rows);
    let cols = grid_w.min(term_cols);
    let tc = app.use_truecolor;

    let mut last_fg: Option<(u8, u8, u8)> = None;
    queue!(stdout, SetBackgroundColor(make_color(0, 0, 0, tc)))?;

    for row in 0..rows {
        if is_hud_overlay_row(app, row, term_rows) {
            last_fg = None;
            continue;
        }

        queue!(stdout, cursor::MoveTo(0, row as u16))?;
        for col in 0..cols {
            let cell = cells[row * grid_w + col];
            if cell.is_blank() {
                queue!(stdout, Print(' '))?;
                continue;
            }

            let fg = (cell.r, cell.g, cell.b);
            if last_fg != Some(fg) {
                queue!(stdout, SetForegroundColor(make_color(fg.0, fg.1, fg.2, tc)))?;
                last_fg = Some(fg);
            }
            queue!(stdout, Print(cell.glyph))?;
        }
    }

    Ok(())
}

pub fn run_app_loop(
    app: &mut AppState,
    input_rx: &input::InputReceiver,
    stdout: &mut io::BufWriter<io::Stdout>,
) -> AppResult<()> {
    loop {
        let frame_start = Instant::now();

        // Drain all pending input events -- never skip
        if input::drain_input_events(app, input_rx)? {
            break;
        }

        let now = Instant::now();
        let delta_time = now
            .duration_since(app.last_frame_time)
            .as_secs_f32()
            .max(1e-6);
        app.last_frame_time = now;

        app.scene.advance(delta_time);

        let terminal_size = terminal::size()?;
        render_frame(app, terminal_size, stdout)?;

        app.frame_count += 1;
        let instant_fps = 1.0 / delta_time;
        app.fps = if app.fps <= 0.01 {
            instant_fps
        } else {
            0.90 * app.fps + 0.10 * instant_fps
        };

        // An active run alternates variants on a fixed frame cadence.
        if app.recorder.tick_switch() && app.parallel_available {
            app.engine = app.engine.toggled();
        }

        let spent = frame_start.elapsed();
        if spent < FRAME_TARGET {
            std::thread::sleep(FRAME_TARGET - spent);
        }
    }

    Ok(())
}
