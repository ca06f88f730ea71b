use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tuning constants for the adaptive VAD threshold recurrence.
///
/// These values are calibrated against the periodicity feature's dynamic
/// range; downstream smoothing and refinement assume them. Change with care.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VadTuning {
    /// Minimum ratio between the speech peak and the noise floor.
    pub min_ratio_spnf: f32,
    /// Additive offset applied to every derived threshold.
    pub th_offset: f32,
    /// Hard lower bound for the tracked noise floors.
    pub min_feature_val: f32,
}

impl Default for VadTuning {
    fn default() -> Self {
        Self {
            min_ratio_spnf: 2.5,
            th_offset: 10.0,
            min_feature_val: 15.0,
        }
    }
}

/// All externally tunable parameters of the engine.
///
/// Defaults reproduce the calibrated production values; a TOML file may
/// override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Expected input sample rate. Inputs at any other rate are rejected.
    pub sample_rate_hz: u32,
    /// Analysis frame length in milliseconds.
    pub frame_len_ms: f32,
    /// Frame hop in milliseconds.
    pub hop_ms: f32,
    /// Frames per processing chunk. Chunks are independent; no detection
    /// state crosses a chunk boundary.
    pub chunk_frames: usize,
    /// Analysis window for the periodicity feature, milliseconds. Pitch
    /// analysis needs finer bins than the energy frames give: the trough
    /// probe sits half a pitch period above each harmonic, and with short
    /// windows it lands inside the harmonic's own mainlobe.
    pub pitch_frame_ms: f32,
    /// Hop of the periodicity analysis, milliseconds. Features are
    /// nearest-neighbor resampled onto the 10 ms frame grid.
    pub pitch_hop_ms: f32,
    /// Lower edge of the pitch search range, Hz.
    pub pitch_low_hz: f32,
    /// Upper edge of the pitch search range, Hz.
    pub pitch_high_hz: f32,
    /// Harmonics summed per pitch candidate (the fundamental is skipped).
    pub num_harmonics: usize,
    /// Half-width in bins of the beam summed at each harmonic.
    pub beam_width: usize,
    /// Frequencies below this are ramp-suppressed before pitch scanning, Hz.
    pub highpass_hz: f32,
    /// Speech runs separated by a gap no larger than this are merged, seconds.
    pub tolerance_sec: f64,
    /// Merged runs shorter than this are discarded, seconds.
    pub discard_short_sec: f64,
    /// Median window applied to the per-frame channel labels before
    /// refinement; odd. Runs shorter than half the window are erased.
    pub label_median_window: usize,
    /// Length of the ones kernel used to grow detected voiced regions of the
    /// per-channel VAD flags.
    pub extension_kernel: usize,
    /// Frame budget for the gap-fusing pass; the merge kernel is
    /// `merge_budget - extension_kernel` and the pass only runs when that
    /// is positive (it is not, at the defaults).
    pub merge_budget: usize,
    pub vad: VadTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 16_000,
            frame_len_ms: 25.0,
            hop_ms: 10.0,
            chunk_frames: 20_000,
            pitch_frame_ms: 100.0,
            pitch_hop_ms: 20.0,
            pitch_low_hz: 80.0,
            pitch_high_hz: 250.0,
            num_harmonics: 6,
            beam_width: 2,
            highpass_hz: 800.0,
            tolerance_sec: 0.5,
            discard_short_sec: 0.5,
            label_median_window: 51,
            extension_kernel: 40,
            merge_budget: 20,
            vad: VadTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Load the configuration, overlaying an optional TOML file on the
    /// calibrated defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&EngineConfig::default())?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn frame_len_samples(&self) -> usize {
        (self.sample_rate_hz as f32 * self.frame_len_ms / 1000.0) as usize
    }

    pub fn hop_samples(&self) -> usize {
        (self.sample_rate_hz as f32 * self.hop_ms / 1000.0) as usize
    }

    /// Seconds of audio advanced per frame.
    pub fn hop_sec(&self) -> f64 {
        self.hop_ms as f64 / 1000.0
    }

    /// Samples covered by one full chunk of `chunk_frames` frames.
    pub fn chunk_span_samples(&self) -> usize {
        (self.chunk_frames - 1) * self.hop_samples() + self.frame_len_samples()
    }
}
