use xtalk_foundation::VadTuning;

/// Recurrence state of the adaptive noise-floor detector.
///
/// The state is a plain value; `step` is a pure function so the recurrence
/// can be driven and inspected frame by frame. A fresh state is created per
/// channel per chunk and nothing carries across chunk boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThresholdState {
    pub frame_idx: u32,
    /// Periodicity feature seen this frame.
    pub val: f32,
    /// Fast noise floor (0.99 / 0.01 decay).
    pub nf: f32,
    /// Slow noise floor (0.999 / 0.001 decay).
    pub slow_nf: f32,
    /// Running estimate of the speech feature level.
    pub speech_var: f32,
    /// Informational threshold tracking the noise floor.
    pub th: f32,
    /// Decision threshold: frames with `val > th2` are voiced.
    pub th2: f32,
    pub vad_flag: bool,
}

/// Advance the recurrence by one frame.
///
/// Frames 1 and 2 warm up: the floors grow monotonically to the running max
/// of the feature and flags stay off. From frame 3 the floors decay toward
/// the feature, are clamped down when the feature undercuts them (never
/// below `min_feature_val`), and the voiced decision is `val > th2`.
pub fn step(s: ThresholdState, val: f32, tuning: &VadTuning) -> ThresholdState {
    let mut n = s;
    n.frame_idx += 1;

    if n.frame_idx < 3 {
        n.vad_flag = false;
        if n.frame_idx == 1 {
            n.nf = val;
            n.slow_nf = val;
        }
        n.nf = n.nf.max(val);
        n.slow_nf = n.slow_nf.max(val);
        n.speech_var = tuning.min_ratio_spnf * n.nf + tuning.th_offset;
        n.th = n.slow_nf + tuning.th_offset;
        n.th2 = 1.3 * n.slow_nf + tuning.th_offset;
        n.val = val;
        return n;
    }

    n.val = val;
    n.speech_var = (0.8 * n.speech_var + 0.2 * val).max(n.th2);
    if val > n.th2 {
        n.vad_flag = true;
        n.speech_var = n.speech_var.max(val);
    } else {
        n.vad_flag = false;
    }

    n.nf = 0.99 * n.nf + 0.01 * val;
    n.slow_nf = 0.999 * n.slow_nf + 0.001 * val;
    if val < n.slow_nf {
        n.slow_nf = val.max(tuning.min_feature_val);
    }
    if val < n.nf {
        n.nf = val.max(tuning.min_feature_val);
    }
    n.th = n.nf + tuning.th_offset;
    n.th2 = 1.3 * n.nf + tuning.th_offset;
    n
}

/// Run the detector over a whole feature series.
pub fn detect(features: &[f32], tuning: &VadTuning) -> Vec<bool> {
    let mut state = ThresholdState::default();
    features
        .iter()
        .map(|&val| {
            state = step(state, val, tuning);
            state.vad_flag
        })
        .collect()
}
