use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::render::AppState;

pub type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Default)]
pub struct InputState {
    pub quit_requested: bool,
}

// --- Input thread ---

#[derive(Debug)]
pub enum InputMessage {
    Event(Event),
    ReadError(String),
}

pub type InputReceiver = Receiver<InputMessage>;

/// Blocking reader on its own thread; the frame loop drains the channel
/// once per tick so controls take effect on the next tick boundary.
pub fn spawn_input_thread() -> InputReceiver {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(InputMessage::Event(ev)).is_err() {
                    break;
                }
            }
            Err(err) => {
                let _ = tx.send(InputMessage::ReadError(err.to_string()));
                break;
            }
        }
    });
    rx
}

pub fn drain_input_events(
    app: &mut AppState,
    input_rx: &InputReceiver,
) -> AppResult<bool> {
    loop {
        match input_rx.try_recv() {
            Ok(InputMessage::Event(event)) => {
                handle_input_event(app, event);
                if app.input_state.quit_requested {
                    return Ok(true);
                }
            }
            Ok(InputMessage::ReadError(err)) => {
                return Err(format!("Input thread read failed: {err}").into());
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                return Err("Input channel disconnected".into());
            }
        }
    }

    Ok(app.input_state.quit_requested)
}

pub fn handle_input_event(app: &mut AppState, event: Event) {
    let Event::Key(key_event) = event else {
        return;
    };
    if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return;
    }

    match key_event.code {
        KeyCode::Esc => app.input_state.quit_requested = true,
        KeyCode::Tab => app.show_hud = !app.show_hud,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => app.input_state.quit_requested = true,
            'e' => app.try_toggle_engine(),
            'b' => app.toggle_benchmark(),
            'n' => app.recorder.reset(),
            _ => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{BenchConfig, BenchRecorder, Converter, EngineKind};
    use crate::demo::DemoScene;
    use crate::render::AppState;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn make_state() -> AppState {
        AppState {
            scene: DemoScene::new(8, 8),
            converter: Converter::new(),
            engine: EngineKind::Parallel,
            parallel_available: true,
            recorder: BenchRecorder::new(BenchConfig::default()),
            grid_override: (None, None),
            hud_string_buf: String::new(),
            input_state: InputState::default(),
            show_hud: true,
            frame_count: 0,
            skipped_frames: 0,
            last_frame_time: Instant::now(),
            fps: 0.0,
            use_truecolor: false,
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(crossterm::event::KeyEvent::new(
            code,
            crossterm::event::KeyModifiers::NONE,
        ))
    }

    #[test]
    fn engine_key_flips_variant() {
        let mut app = make_state();
        handle_input_event(&mut app, key(KeyCode::Char('e')));
        assert_eq!(app.engine, EngineKind::Scalar);
        handle_input_event(&mut app, key(KeyCode::Char('e')));
        assert_eq!(app.engine, EngineKind::Parallel);
    }

    #[test]
    fn engine_toggle_refused_while_benchmarking() {
        let mut app = make_state();
        app.recorder.set_active(true);
        handle_input_event(&mut app, key(KeyCode::Char('e')));
        assert_eq!(app.engine, EngineKind::Parallel);
    }

    #[test]
    fn engine_toggle_refused_without_parallel_path() {
        let mut app = make_state();
        app.parallel_available = false;
        app.engine = EngineKind::Scalar;
        handle_input_event(&mut app, key(KeyCode::Char('e')));
        assert_eq!(app.engine, EngineKind::Scalar);
    }

    #[test]
    fn benchmark_key_resets_history_and_pins_parallel() {
        let mut app = make_state();
        app.engine = EngineKind::Scalar;

        handle_input_event(&mut app, key(KeyCode::Char('b')));
        assert!(app.recorder.is_active());
        assert_eq!(app.engine, EngineKind::Parallel);

        app.recorder
            .record(EngineKind::Parallel, Duration::from_millis(4));
        handle_input_event(&mut app, key(KeyCode::Char('b')));
        assert!(!app.recorder.is_active());

        handle_input_event(&mut app, key(KeyCode::Char('b')));
        assert_eq!(app.recorder.stats(EngineKind::Parallel).frame_count(), 0);
    }

    #[test]
    fn reset_key_clears_stats_without_stopping_the_run() {
        let mut app = make_state();
        app.recorder.set_active(true);
        app.recorder
            .record(EngineKind::Parallel, Duration::from_millis(4));

        handle_input_event(&mut app, key(KeyCode::Char('n')));
        assert!(app.recorder.is_active());
        assert_eq!(app.recorder.stats(EngineKind::Parallel).frame_count(), 0);
    }

    #[test]
    fn quit_keys_request_exit() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = make_state();
            handle_input_event(&mut app, key(code));
            assert!(app.input_state.quit_requested);
        }
    }

    #[test]
    fn drain_consumes_all_queued_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(InputMessage::Event(key(KeyCode::Tab))).expect("send tab");
        tx.send(InputMessage::Event(key(KeyCode::Char('e'))))
            .expect("send e");

        let mut app = make_state();
        let quit = drain_input_events(&mut app, &rx).expect("drain should succeed");
        assert!(!quit);
        assert!(!app.show_hud);
        assert_eq!(app.engine, EngineKind::Scalar);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
