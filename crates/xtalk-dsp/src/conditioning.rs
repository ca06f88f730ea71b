use rand::Rng;
use rand_distr::StandardNormal;

/// Dither amplitude. Large enough to break exact-zero runs in digital
/// silence, far below one LSB of 16-bit audio.
const DITHER_SCALE: f32 = 1.0 / 4_294_967_296.0; // 2^-32

/// Add tiny Gaussian noise so downstream normalizations never divide by zero.
pub fn dither<R: Rng>(samples: &mut [f32], rng: &mut R) {
    for s in samples.iter_mut() {
        let n: f32 = rng.sample(StandardNormal);
        *s += n * DITHER_SCALE;
    }
}

/// First-order IIR DC-removal high-pass:
/// `y[n] = 0.999*x[n] - 0.999*x[n-1] + 0.999*y[n-1]`.
pub fn remove_dc(samples: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len());
    let mut prev_x = 0.0f32;
    let mut prev_y = 0.0f32;
    for &x in samples {
        let y = 0.999 * x - 0.999 * prev_x + 0.999 * prev_y;
        out.push(y);
        prev_x = x;
        prev_y = y;
    }
    out
}

/// Pre-emphasis `y[n] = x[n] - 0.97*x[n-1]`, `y[0] = x[0]`.
pub fn pre_emphasis(samples: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len());
    let mut prev = 0.0f32;
    for (i, &x) in samples.iter().enumerate() {
        out.push(if i == 0 { x } else { x - 0.97 * prev });
        prev = x;
    }
    out
}

/// Full conditioning chain applied before energy analysis.
pub fn condition<R: Rng>(samples: &[f32], rng: &mut R) -> Vec<f32> {
    let mut dithered = samples.to_vec();
    dither(&mut dithered, rng);
    pre_emphasis(&remove_dc(&dithered))
}
