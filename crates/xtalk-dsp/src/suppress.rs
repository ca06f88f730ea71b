use rand::Rng;

use crate::frame::FrameGrid;

/// Attenuation divisor driving leaked crosstalk toward numerical silence.
const SUPPRESS_DIV: f32 = 1e10;

/// Suppress crosstalk in place.
///
/// For every frame whose refined label differs from a channel's own id
/// (silence, label 0, differs from all of them), each sample in that frame's
/// window is replaced by sign-preserving noise of magnitude around 1e-10.
/// Exact zeros are left alone so true digital silence stays silent; the
/// active channel is untouched. The last frame's window is stretched to the
/// buffer end, so samples past the final complete frame are still treated.
pub fn suppress_inactive<R: Rng>(
    channels: &mut [&mut [f32]],
    labels: &[u32],
    grid: &FrameGrid,
    rng: &mut R,
) {
    if channels.is_empty() {
        return;
    }
    let total = channels[0].len();
    for (j, &label) in labels.iter().enumerate() {
        let mut span = grid.frame_span(j, total);
        if j == labels.len() - 1 {
            span.end = total;
        }
        for (c, channel) in channels.iter_mut().enumerate() {
            if c as u32 + 1 == label {
                continue;
            }
            for sample in channel[span.clone()].iter_mut() {
                if *sample == 0.0 {
                    continue;
                }
                *sample = *sample * rng.gen::<f32>() / (sample.abs() * SUPPRESS_DIV);
            }
        }
    }
}
