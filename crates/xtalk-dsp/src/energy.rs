use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::frame::{hamming, FrameGrid};

/// FFT length for energy analysis; 25 ms frames at 16 kHz are zero-padded
/// from 400 to 512 samples.
const ENERGY_FFT_LEN: usize = 512;

/// Per-frame spectral power extractor.
///
/// Each frame is Hamming-windowed, zero-padded to 512 samples, and its
/// one-sided magnitude-squared spectrum is summed into a single scalar.
pub struct EnergyExtractor {
    grid: FrameGrid,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl EnergyExtractor {
    pub fn new(grid: FrameGrid) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            grid,
            window: hamming(grid.frame_len),
            fft: planner.plan_fft_forward(ENERGY_FFT_LEN),
        }
    }

    /// Sum of spectral power per frame, for an already conditioned signal.
    pub fn power_sum(&self, conditioned: &[f32]) -> Vec<f32> {
        let nframes = self.grid.num_frames(conditioned.len());
        let mut out = Vec::with_capacity(nframes);
        let mut buf = vec![Complex::new(0.0f32, 0.0f32); ENERGY_FFT_LEN];

        for j in 0..nframes {
            let start = j * self.grid.hop;
            let frame = &conditioned[start..start + self.grid.frame_len];
            for (slot, (&x, &w)) in buf.iter_mut().zip(frame.iter().zip(&self.window)) {
                *slot = Complex::new(x * w, 0.0);
            }
            for slot in buf.iter_mut().skip(self.grid.frame_len) {
                *slot = Complex::new(0.0, 0.0);
            }
            self.fft.process(&mut buf);
            // one-sided spectrum: bins 0..=N/2
            let power: f32 = buf[..ENERGY_FFT_LEN / 2 + 1]
                .iter()
                .map(|c| c.norm_sqr())
                .sum();
            out.push(power);
        }
        out
    }
}
