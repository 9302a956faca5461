use std::time::{Duration, Instant};

use super::EngineKind;

// --- Benchmark policy ---

pub const DEFAULT_WARMUP_FRAMES: u32 = 3;
pub const DEFAULT_WINDOW_MS: f64 = 1000.0;
pub const DEFAULT_SWITCH_INTERVAL: u32 = 300;

#[derive(Debug, Clone, Copy)]
pub struct BenchConfig {
    /// Completed invocations per variant excluded from latency aggregates.
    pub warmup_frames: u32,
    /// Wall-clock length of the sliding frame-rate window.
    pub window_ms: f64,
    /// Completed benchmark frames between automatic variant switches.
    pub switch_interval: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            warmup_frames: DEFAULT_WARMUP_FRAMES,
            window_ms: DEFAULT_WINDOW_MS,
            switch_interval: DEFAULT_SWITCH_INTERVAL,
        }
    }
}

// --- Per-variant statistics ---

/// Latency aggregates exclude warm-up frames; the window rate counts every
/// completed invocation. `min_ms` stays at the infinity sentinel until the
/// first measured frame.
#[derive(Debug, Clone)]
pub struct BenchStats {
    frame_count: u32,
    warmup_seen: u32,
    total_ms: f64,
    min_ms: f64,
    max_ms: f64,
    avg_ms: f64,
    window_frames: u32,
    window_start_ms: Option<f64>,
    window_rate: f64,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            warmup_seen: 0,
            total_ms: 0.0,
            min_ms: f64::INFINITY,
            max_ms: 0.0,
            avg_ms: 0.0,
            window_frames: 0,
            window_start_ms: None,
            window_rate: 0.0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Fold one completed invocation into the record. `now_ms` is the wall
    /// clock at completion, relative to any fixed epoch.
    fn record(&mut self, elapsed_ms: f64, now_ms: f64, config: &BenchConfig) {
        self.frame_count += 1;

        if self.warmup_seen < config.warmup_frames {
            self.warmup_seen += 1;
        } else {
            self.total_ms += elapsed_ms;
            let measured = self.frame_count - config.warmup_frames;
            if measured > 0 {
                if elapsed_ms < self.min_ms {
                    self.min_ms = elapsed_ms;
                }
                if elapsed_ms > self.max_ms {
                    self.max_ms = elapsed_ms;
                }
                self.avg_ms = self.total_ms / f64::from(measured);
            }
        }

        self.window_frames += 1;
        match self.window_start_ms {
            None => self.window_start_ms = Some(now_ms),
            Some(start) => {
                let window_elapsed = now_ms - start;
                if window_elapsed >= config.window_ms {
                    self.window_rate = f64::from(self.window_frames) * 1000.0 / window_elapsed;
                    self.window_frames = 0;
                    self.window_start_ms = Some(now_ms);
                }
            }
        }
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn min_ms(&self) -> f64 {
        self.min_ms
    }

    pub fn max_ms(&self) -> f64 {
        self.max_ms
    }

    pub fn avg_ms(&self) -> f64 {
        self.avg_ms
    }

    pub fn window_rate(&self) -> f64 {
        self.window_rate
    }
}

// --- Recorder ---

/// Wall-clock instrumentation around engine invocations. The two variants'
/// records are fully independent, so switching never contaminates history.
#[derive(Debug)]
pub struct BenchRecorder {
    config: BenchConfig,
    scalar: BenchStats,
    parallel: BenchStats,
    epoch: Instant,
    active: bool,
    frames_since_switch: u32,
}

impl BenchRecorder {
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            scalar: BenchStats::new(),
            parallel: BenchStats::new(),
            epoch: Instant::now(),
            active: false,
            frames_since_switch: 0,
        }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enabling a run restarts both variants' histories.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if active {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.scalar.reset();
        self.parallel.reset();
        self.frames_since_switch = 0;
    }

    pub fn stats(&self, engine: EngineKind) -> &BenchStats {
        match engine {
            EngineKind::Scalar => &self.scalar,
            EngineKind::Parallel => &self.parallel,
        }
    }

    /// Fold a completed engine invocation into the variant's record. The
    /// caller captures the timestamps immediately around the invocation.
    pub fn record(&mut self, engine: EngineKind, elapsed: Duration) {
        let config = self.config;
        let now_ms = self.epoch.elapsed().as_secs_f64() * 1000.0;
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let stats = match engine {
            EngineKind::Scalar => &mut self.scalar,
            EngineKind::Parallel => &mut self.parallel,
        };
        stats.record(elapsed_ms, now_ms, &config);
    }

    /// Advance the variant-switch counter; true when an active run should
    /// move on to the other variant.
    pub fn tick_switch(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.frames_since_switch += 1;
        if self.frames_since_switch >= self.config.switch_interval {
            self.frames_since_switch = 0;
            true
        } else {
            false
        }
    }
}
