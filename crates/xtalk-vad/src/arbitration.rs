/// Total per-frame energy below which no channel is credited with speech.
///
/// Conditioning dither leaves digitally silent frames around 1e-15; a single
/// nonzero 16-bit sample already pushes a frame's power past 1e-7. Anything
/// under this floor is silence on every channel at once, and handing such a
/// frame to the share argmax would just amplify dither noise into a label.
const SILENCE_FLOOR: f32 = 1e-12;

/// Pick the provisional active-speaker channel per frame.
///
/// `energies` is channel-major: one power series per channel, all the same
/// length. Each frame's energies are normalized to shares summing to one and
/// the channel with the largest share wins. Labels are 1-based; frames whose
/// total energy sits under `SILENCE_FLOOR` get label 0 (silence) directly.
/// Ties go to the lowest channel id (an implementation detail, not a
/// semantic).
pub fn dominant_channels(energies: &[Vec<f32>]) -> Vec<u32> {
    let Some(first) = energies.first() else {
        return Vec::new();
    };
    let nframes = first.len();
    debug_assert!(energies.iter().all(|e| e.len() == nframes));

    let mut labels = Vec::with_capacity(nframes);
    for j in 0..nframes {
        let total: f32 = energies.iter().map(|e| e[j]).sum();
        if total <= SILENCE_FLOOR {
            labels.push(0);
            continue;
        }
        let mut best = 0usize;
        let mut best_share = f32::NEG_INFINITY;
        for (c, e) in energies.iter().enumerate() {
            let share = e[j] / total;
            if share > best_share {
                best_share = share;
                best = c;
            }
        }
        labels.push(best as u32 + 1);
    }
    labels
}
