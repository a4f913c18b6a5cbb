use bevy::prelude::Resource;
use constants::terrain::{EDGE_FADE_INNER, EDGE_FADE_OUTER, EDGE_FADE_SIZE};

/// Gradient stops of the radial fade, `(offset within the fade band, alpha)`.
const STOPS: [(f64, f64); 4] = [(0.0, 1.0), (0.6, 1.0), (0.85, 0x88 as f64 / 255.0), (1.0, 0.0)];

/// Precomputed square alpha raster, opaque in the middle and transparent at the rim.
///
/// Sampled by terrain UV so the terrain border blends into the background
/// instead of ending on a hard edge.
#[derive(Resource, Debug, Clone)]
pub struct EdgeFadeMask {
    size: usize,
    alpha: Vec<f32>,
}

impl Default for EdgeFadeMask {
    fn default() -> Self {
        Self::new(EDGE_FADE_SIZE)
    }
}

impl EdgeFadeMask {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut alpha = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                let u = (col as f64 + 0.5) / size as f64;
                let v = (row as f64 + 0.5) / size as f64;
                alpha.push(Self::radial_alpha(u, v) as f32);
            }
        }
        Self { size, alpha }
    }

    /// Exact gradient value at normalised raster coordinates.
    pub fn radial_alpha(u: f64, v: f64) -> f64 {
        let distance = (u - 0.5).hypot(v - 0.5);
        let t = ((distance - EDGE_FADE_INNER) / (EDGE_FADE_OUTER - EDGE_FADE_INNER)).clamp(0.0, 1.0);

        for pair in STOPS.windows(2) {
            let (t0, a0) = pair[0];
            let (t1, a1) = pair[1];
            if t <= t1 {
                let k = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
                return a0 + (a1 - a0) * k;
            }
        }
        STOPS[STOPS.len() - 1].1
    }

    /// Nearest-pixel lookup at terrain UV; coordinates outside `[0, 1]` clamp to the rim.
    pub fn sample(&self, u: f64, v: f64) -> f32 {
        let col = ((u * self.size as f64) as isize).clamp(0, self.size as isize - 1) as usize;
        let row = ((v * self.size as f64) as isize).clamp(0, self.size as isize - 1) as usize;
        self.alpha[row * self.size + col]
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_is_opaque_and_corners_transparent() {
        let mask = EdgeFadeMask::new(64);
        assert_eq!(mask.sample(0.5, 0.5), 1.0);
        assert_eq!(mask.sample(0.0, 0.0), 0.0);
        assert_eq!(mask.sample(1.0, 1.0), 0.0);
    }

    #[test]
    fn gradient_hits_grey_stop() {
        // 85% through the band: distance = 0.2 + 0.85 * 0.3
        let alpha = EdgeFadeMask::radial_alpha(0.5 + 0.2 + 0.85 * 0.3, 0.5);
        assert!((alpha - 0x88 as f64 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn alpha_decreases_outwards() {
        let mut last = f64::INFINITY;
        for i in 0..=50 {
            let a = EdgeFadeMask::radial_alpha(0.5 + i as f64 * 0.01, 0.5);
            assert!(a <= last);
            last = a;
        }
    }
}
