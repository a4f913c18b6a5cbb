/// Lattice hash: a deterministic pseudo-random value in `[0, 1)` for an integer seed.
pub fn seeded_random(seed: f64) -> f64 {
    let x = (seed * 127.1 + 311.7).sin() * 43758.5453;
    x - x.floor()
}

/// Hermite smoothstep weight `t * t * (3 - 2t)` for `t` in `[0, 1]`.
#[inline]
fn smooth_weight(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Smooth value noise in `[0, 1)`.
///
/// The four corners of the unit lattice cell are hashed from `ix + iy * 157`
/// and blended bilinearly with smoothstep weights, so the field is continuous
/// with a continuous first derivative across cell borders.
pub fn value_noise_2d(x: f64, y: f64) -> f64 {
    let ix = x.floor();
    let iy = y.floor();
    let fx = x - ix;
    let fy = y - iy;

    let a = seeded_random(ix + iy * 157.0);
    let b = seeded_random(ix + 1.0 + iy * 157.0);
    let c = seeded_random(ix + (iy + 1.0) * 157.0);
    let d = seeded_random(ix + 1.0 + (iy + 1.0) * 157.0);

    let sx = smooth_weight(fx);
    let sy = smooth_weight(fy);

    a + (b - a) * sx + (c - a) * sy + (a - b - c + d) * sx * sy
}

/// Fractal (multi-octave) sum of [`value_noise_2d`].
///
/// Amplitude starts at 0.5 and halves per octave, frequency starts at 1 and
/// doubles, so the result stays below `1 - 0.5^octaves`.
pub fn fractal_sum(x: f64, y: f64, octaves: u32) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..octaves {
        value += amplitude * value_noise_2d(x * frequency, y * frequency);
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}

/// Upper bound of [`fractal_sum`] for the given octave count.
pub fn fractal_sum_bound(octaves: u32) -> f64 {
    1.0 - 0.5f64.powi(octaves as i32)
}
