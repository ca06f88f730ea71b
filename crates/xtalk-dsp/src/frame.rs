use std::ops::Range;

use xtalk_foundation::EngineConfig;

/// Framing geometry of an analysis stage (25 ms / 10 ms for energy,
/// 100 ms / 20 ms for the periodicity feature).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGrid {
    pub frame_len: usize,
    pub hop: usize,
}

impl FrameGrid {
    pub fn new(sample_rate_hz: u32, frame_len_ms: f32, hop_ms: f32) -> Self {
        Self {
            frame_len: (sample_rate_hz as f32 * frame_len_ms / 1000.0) as usize,
            hop: (sample_rate_hz as f32 * hop_ms / 1000.0) as usize,
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::new(cfg.sample_rate_hz, cfg.frame_len_ms, cfg.hop_ms)
    }

    /// Number of complete frames that fit in `samples`.
    pub fn num_frames(&self, samples: usize) -> usize {
        if samples < self.frame_len {
            0
        } else {
            (samples - self.frame_len) / self.hop + 1
        }
    }

    /// Sample range of frame `idx`, clamped to the buffer end. Used by the
    /// suppressor, which touches every sample the frame window covers.
    pub fn frame_span(&self, idx: usize, total_samples: usize) -> Range<usize> {
        let start = idx * self.hop;
        start..(start + self.frame_len).min(total_samples)
    }
}

/// Nearest-neighbor resampling between two frame grids over the same audio,
/// e.g. from the 20 ms pitch hop onto the 10 ms energy hop. Queries beyond
/// the source are clamped to the last value.
pub fn resample_nearest<T: Copy>(values: &[T], from_hop: usize, to_hop: usize, out_len: usize) -> Vec<T> {
    assert!(!values.is_empty(), "cannot resample an empty series");
    (0..out_len)
        .map(|j| {
            let idx = ((j * to_hop) as f64 / from_hop as f64).round() as usize;
            values[idx.min(values.len() - 1)]
        })
        .collect()
}

/// Hamming window of the given length.
pub fn hamming(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|n| 0.54 - 0.46 * (2.0 * std::f32::consts::PI * n as f32 / (len - 1) as f32).cos())
        .collect()
}
