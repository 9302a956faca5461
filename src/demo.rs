use rand::Rng;
use std::f32::consts::TAU;

use crate::convert::{FrameError, SourceFrame};
use crate::math::hsv_to_rgb;

// --- Demo frame producer ---

/// Animated plasma standing in for an engine that deposits a fresh frame
/// into its buffer before every tick. Pixels are packed `0x00RRGGBB`.
#[derive(Debug)]
pub struct DemoScene {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    time: f32,
    phase: [f32; 4],
}

impl DemoScene {
    pub fn new(width: usize, height: usize) -> Self {
        let mut rng = rand::rng();
        let phase = [
            rng.random_range(0.0_f32..TAU),
            rng.random_range(0.0_f32..TAU),
            rng.random_range(0.0_f32..TAU),
            rng.random_range(0.0_f32..TAU),
        ];
        Self {
            width,
            height,
            pixels: vec![0; width * height],
            time: 0.0,
            phase,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Repaint the whole buffer for the next tick.
    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
        let t = self.time;
        let inv_w = 2.0 / self.width.max(1) as f32;
        let inv_h = 2.0 / self.height.max(1) as f32;

        for y in 0..self.height {
            let ny = y as f32 * inv_h - 1.0;
            let row = &mut self.pixels[y * self.width..][..self.width];
            for (x, px) in row.iter_mut().enumerate() {
                let nx = x as f32 * inv_w - 1.0;
                let v = ((nx * 3.0 + t * 0.9 + self.phase[0]).sin()
                    + (ny * 4.0 - t * 0.6 + self.phase[1]).sin()
                    + ((nx * nx + ny * ny).sqrt() * 6.0 - t * 1.7 + self.phase[2]).sin()
                    + ((nx + ny) * 2.5 + t * 0.4 + self.phase[3]).sin())
                    * 0.25;

                let hue = (v * 0.5 + 0.5) * 360.0;
                let value = 0.35 + 0.65 * (v * 0.5 + 0.5);
                let [r, g, b] = hsv_to_rgb(hue, 0.75, value);
                *px = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
            }
        }
    }

    /// View of the most recent frame; fails when the configured geometry is
    /// degenerate, in which case the caller skips the tick.
    pub fn frame(&self) -> Result<SourceFrame<'_>, FrameError> {
        SourceFrame::new(&self.pixels, self.width, self.height)
    }
}
