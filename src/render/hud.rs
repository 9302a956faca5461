use crossterm::{
    cursor, queue,
    style::{Print, SetBackgroundColor, SetForegroundColor},
};
use std::fmt::Write as _;
use std::io::{self, Write};

use super::{make_color, AppState};
use crate::convert::{BenchRecorder, EngineKind};

/// Terminal rows the top HUD block occupies; grows while a benchmark run
/// shows one stats row per variant.
pub fn top_rows(app: &AppState) -> usize {
    if app.recorder.is_active() {
        3
    } else {
        1
    }
}

fn truncate_and_pad_in_place(text: &mut String, width: usize) {
    if width == 0 {
        text.clear();
        return;
    }

    let mut seen_chars = 0usize;
    let mut truncate_byte = None;
    for (idx, _) in text.char_indices() {
        if seen_chars == width {
            truncate_byte = Some(idx);
            break;
        }
        seen_chars += 1;
    }

    if let Some(idx) = truncate_byte {
        text.truncate(idx);
    } else {
        for _ in seen_chars..width {
            text.push(' ');
        }
    }
}

fn write_variant_stats(
    hud: &mut String,
    recorder: &BenchRecorder,
    kind: EngineKind,
) -> io::Result<()> {
    let stats = recorder.stats(kind);
    let min = if stats.min_ms().is_finite() {
        stats.min_ms()
    } else {
        0.0
    };
    write!(
        hud,
        "{:<9} frames:{:>6}  avg:{:>7.2}ms  min:{:>7.2}ms  max:{:>7.2}ms  rate:{:>6.2}/s",
        kind.name(),
        stats.frame_count(),
        stats.avg_ms(),
        min,
        stats.max_ms(),
        stats.window_rate()
    )
    .map_err(|_| io::Error::other("failed to format HUD"))
}

pub fn draw_hud(
    app: &mut AppState,
    cols: u16,
    rows: u16,
    stdout: &mut impl Write,
) -> io::Result<()> {
    let width = cols as usize;
    let tc = app.use_truecolor;
    let (grid_w, grid_h) = app.converter.grid_size();
    let (src_w, src_h) = app.scene.size();

    let hud = &mut app.hud_string_buf;
    hud.clear();
    write!(
        hud,
        "FPS:{:>5.1}  Engine:{}  Grid:{}x{}  Src:{}x{}  Bench:{}  Skipped:{}  Cores:{}",
        app.fps,
        app.engine.name(),
        grid_w,
        grid_h,
        src_w,
        src_h,
        if app.recorder.is_active() { "ON" } else { "OFF" },
        app.skipped_frames,
        rayon::current_num_threads()
    )
    .map_err(|_| io::Error::other("failed to format HUD"))?;
    if !app.parallel_available {
        hud.push_str("  Parallel:N/A");
    }
    truncate_and_pad_in_place(hud, width);

    queue!(
        stdout,
        cursor::MoveTo(0, 0),
        SetBackgroundColor(make_color(0, 0, 0, tc)),
        SetForegroundColor(make_color(245, 245, 245, tc)),
        Print(app.hud_string_buf.as_str())
    )?;

    if app.recorder.is_active() {
        for (line, kind) in [EngineKind::Parallel, EngineKind::Scalar]
            .into_iter()
            .enumerate()
        {
            let hud = &mut app.hud_string_buf;
            hud.clear();
            write_variant_stats(hud, &app.recorder, kind)?;
            truncate_and_pad_in_place(hud, width);
            queue!(
                stdout,
                cursor::MoveTo(0, (line + 1) as u16),
                Print(app.hud_string_buf.as_str())
            )?;
        }
    }

    let hud = &mut app.hud_string_buf;
    hud.clear();
    hud.push_str("E:Engine  B:Bench  N:Reset stats  Tab:HUD  Q/Esc:Quit");
    truncate_and_pad_in_place(hud, width);

    queue!(
        stdout,
        cursor::MoveTo(0, rows.saturating_sub(1)),
        SetForegroundColor(make_color(220, 220, 220, tc)),
        Print(app.hud_string_buf.as_str())
    )?;

    Ok(())
}
