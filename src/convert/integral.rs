use super::SourceFrame;

// --- Summed-area tables ---

/// Channel-separated prefix-sum planes sized `(src_w + 1) x (src_h + 1)`.
/// Row 0 and column 0 are always zero, so any axis-aligned rectangle sum is
/// four corner lookups. Rebuilt fully every frame; plane capacity only
/// grows within a session.
#[derive(Debug, Default)]
pub struct IntegralImage {
    r: Vec<u32>,
    g: Vec<u32>,
    b: Vec<u32>,
    stride: usize,
    rows: usize,
}

#[inline]
fn corner_sum(plane: &[u32], a: usize, b: usize, c: usize, d: usize) -> u32 {
    // Intermediate differences may wrap; the result is exact whenever the
    // true rectangle sum fits in u32.
    plane[a]
        .wrapping_sub(plane[b])
        .wrapping_sub(plane[c])
        .wrapping_add(plane[d])
}

impl IntegralImage {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_capacity(&mut self, src_w: usize, src_h: usize) {
        let stride = src_w + 1;
        let rows = src_h + 1;
        let len = stride * rows;
        if len > self.r.len() {
            self.r.resize(len, 0);
            self.g.resize(len, 0);
            self.b.resize(len, 0);
        }
        self.stride = stride;
        self.rows = rows;
    }

    /// One pass over the frame: row-wise running sums plus the prior row's
    /// prefix. Stale data beyond the logical extent is never read.
    pub fn build(&mut self, frame: &SourceFrame<'_>) {
        self.ensure_capacity(frame.width, frame.height);
        let stride = self.stride;

        self.r[..stride].fill(0);
        self.g[..stride].fill(0);
        self.b[..stride].fill(0);
        for y in 1..self.rows {
            self.r[y * stride] = 0;
            self.g[y * stride] = 0;
            self.b[y * stride] = 0;
        }

        for y in 0..frame.height {
            let src_row = &frame.pixels[y * frame.width..][..frame.width];
            let split = (y + 1) * stride;

            let (head_r, tail_r) = self.r.split_at_mut(split);
            let (head_g, tail_g) = self.g.split_at_mut(split);
            let (head_b, tail_b) = self.b.split_at_mut(split);
            let prev_r = &head_r[y * stride..];
            let prev_g = &head_g[y * stride..];
            let prev_b = &head_b[y * stride..];

            let mut rsum = 0u32;
            let mut gsum = 0u32;
            let mut bsum = 0u32;
            for (x, &px) in src_row.iter().enumerate() {
                rsum += (px >> 16) & 0xFF;
                gsum += (px >> 8) & 0xFF;
                bsum += px & 0xFF;
                tail_r[x + 1] = rsum.wrapping_add(prev_r[x + 1]);
                tail_g[x + 1] = gsum.wrapping_add(prev_g[x + 1]);
                tail_b[x + 1] = bsum.wrapping_add(prev_b[x + 1]);
            }
        }
    }

    /// Sum of `[x0, x1) x [y0, y1)` for (r, g, b). Bounds are in source
    /// pixels; callers pass ranges from the region map, which are already
    /// clamped to the table extent.
    #[inline]
    pub fn rect_sum(&self, x0: usize, x1: usize, y0: usize, y1: usize) -> [u32; 3] {
        let w = self.stride;
        let (a, b, c, d) = (y1 * w + x1, y0 * w + x1, y1 * w + x0, y0 * w + x0);
        [
            corner_sum(&self.r, a, b, c, d),
            corner_sum(&self.g, a, b, c, d),
            corner_sum(&self.b, a, b, c, d),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn pack(r: u32, g: u32, b: u32) -> u32 {
        (r << 16) | (g << 8) | b
    }

    fn random_pixels(width: usize, height: usize, seed: u64) -> Vec<u32> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        (0..width * height)
            .map(|_| {
                pack(
                    rng.random_range(0..256u32),
                    rng.random_range(0..256u32),
                    rng.random_range(0..256u32),
                )
            })
            .collect()
    }

    fn naive_rect_sum(
        pixels: &[u32],
        width: usize,
        x0: usize,
        x1: usize,
        y0: usize,
        y1: usize,
    ) -> [u32; 3] {
        let mut sums = [0u32; 3];
        for y in y0..y1 {
            for x in x0..x1 {
                let px = pixels[y * width + x];
                sums[0] += (px >> 16) & 0xFF;
                sums[1] += (px >> 8) & 0xFF;
                sums[2] += px & 0xFF;
            }
        }
        sums
    }

    #[test]
    fn rect_sums_match_naive_on_random_frames() {
        let (width, height) = (13, 9);
        let pixels = random_pixels(width, height, 0xC0FFEE);
        let frame = SourceFrame::new(&pixels, width, height).expect("valid frame");

        let mut integral = IntegralImage::new();
        integral.build(&frame);

        for y0 in 0..height {
            for y1 in (y0 + 1)..=height {
                for x0 in 0..width {
                    for x1 in (x0 + 1)..=width {
                        assert_eq!(
                            integral.rect_sum(x0, x1, y0, y1),
                            naive_rect_sum(&pixels, width, x0, x1, y0, y1),
                            "rect [{x0},{x1})x[{y0},{y1})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn edge_anchored_rects_use_the_zero_border() {
        let pixels = random_pixels(5, 4, 7);
        let frame = SourceFrame::new(&pixels, 5, 4).expect("valid frame");
        let mut integral = IntegralImage::new();
        integral.build(&frame);

        for x1 in 1..=5 {
            assert_eq!(
                integral.rect_sum(0, x1, 0, 1),
                naive_rect_sum(&pixels, 5, 0, x1, 0, 1)
            );
        }
        for y1 in 1..=4 {
            assert_eq!(
                integral.rect_sum(0, 1, 0, y1),
                naive_rect_sum(&pixels, 5, 0, 1, 0, y1)
            );
        }
        assert_eq!(
            integral.rect_sum(0, 5, 0, 4),
            naive_rect_sum(&pixels, 5, 0, 5, 0, 4)
        );
    }

    #[test]
    fn shrinking_frames_reuse_grown_capacity() {
        let big = random_pixels(8, 8, 1);
        let small = random_pixels(4, 4, 2);
        let mut integral = IntegralImage::new();

        let frame = SourceFrame::new(&big, 8, 8).expect("valid frame");
        integral.build(&frame);

        let frame = SourceFrame::new(&small, 4, 4).expect("valid frame");
        integral.build(&frame);
        assert_eq!(
            integral.rect_sum(0, 4, 0, 4),
            naive_rect_sum(&small, 4, 0, 4, 0, 4)
        );
        assert_eq!(
            integral.rect_sum(1, 3, 2, 4),
            naive_rect_sum(&small, 4, 1, 3, 2, 4)
        );
    }
}
