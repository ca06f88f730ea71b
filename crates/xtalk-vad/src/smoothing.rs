//! Temporal smoothing of per-frame label and flag sequences.
//!
//! Applied per chunk. The channel label sequence takes a single long median
//! filter; the per-channel VAD flags take a short median, an extension pass
//! growing voiced regions to catch onsets and offsets the detector
//! under-calls, and a gap-fusing merge pass that only runs when its kernel
//! length works out positive.

/// Median filter with an odd window; the first and last `window / 2`
/// frames are passed through unchanged.
pub fn median_filter(labels: &[u32], window: usize) -> Vec<u32> {
    assert!(window % 2 == 1, "median window must be odd");
    let half = window / 2;
    let mut out = labels.to_vec();
    if labels.len() < window {
        return out;
    }
    let mut scratch = vec![0u32; window];
    for i in half..labels.len() - half {
        scratch.copy_from_slice(&labels[i - half..=i + half]);
        scratch.sort_unstable();
        out[i] = scratch[half];
    }
    out
}

/// Grow every non-silence region by convolving its indicator with a ones
/// kernel of `kernel` frames and thresholding at > 0.5 (roughly
/// `kernel / 2` frames each side). Frames that become active take the label
/// of the nearest labeled frame, earlier frames winning ties.
pub fn extend_labels(labels: &[u32], kernel: usize) -> Vec<u32> {
    if kernel < 2 || labels.is_empty() {
        return labels.to_vec();
    }
    let n = labels.len();
    let left = (kernel - 1) / 2;
    let right = kernel / 2;

    let mut active = vec![false; n];
    for (i, slot) in active.iter_mut().enumerate() {
        let lo = i.saturating_sub(left);
        let hi = (i + right + 1).min(n);
        *slot = labels[lo..hi].iter().any(|&l| l != 0);
    }

    let nearest = nearest_labels(labels);
    labels
        .iter()
        .zip(active)
        .zip(nearest)
        .map(|((&l, on), near)| if l != 0 { l } else if on { near } else { 0 })
        .collect()
}

/// Fuse segments separated by short gaps. The kernel length is
/// `merge_budget - extension_kernel`; at the default budget it is not
/// positive and the pass leaves the sequence alone.
pub fn merge_labels(labels: &[u32], merge_budget: usize, extension_kernel: usize) -> Vec<u32> {
    if merge_budget <= extension_kernel {
        return labels.to_vec();
    }
    extend_labels(labels, merge_budget - extension_kernel)
}

/// Per-channel binary VAD flags get the same treatment before refinement:
/// median 3, extension, and the guarded merge.
pub fn post_process_flags(flags: &[bool], extension_kernel: usize, merge_budget: usize) -> Vec<bool> {
    let as_labels: Vec<u32> = flags.iter().map(|&f| f as u32).collect();
    let smoothed = median_filter(&as_labels, 3);
    let extended = extend_labels(&smoothed, extension_kernel);
    let merged = merge_labels(&extended, merge_budget, extension_kernel);
    merged.into_iter().map(|l| l != 0).collect()
}

/// For each frame, the closest non-silence label (distance measured in
/// frames, left neighbor preferred on ties); 0 where no labeled frame exists.
fn nearest_labels(labels: &[u32]) -> Vec<u32> {
    let n = labels.len();
    let mut left: Vec<Option<(usize, u32)>> = vec![None; n];
    let mut last: Option<(usize, u32)> = None;
    for i in 0..n {
        if labels[i] != 0 {
            last = Some((i, labels[i]));
        }
        left[i] = last;
    }
    let mut right: Vec<Option<(usize, u32)>> = vec![None; n];
    let mut next: Option<(usize, u32)> = None;
    for i in (0..n).rev() {
        if labels[i] != 0 {
            next = Some((i, labels[i]));
        }
        right[i] = next;
    }
    (0..n)
        .map(|i| match (left[i], right[i]) {
            (Some((li, ll)), Some((ri, rl))) => {
                if i - li <= ri - i {
                    ll
                } else {
                    rl
                }
            }
            (Some((_, ll)), None) => ll,
            (None, Some((_, rl))) => rl,
            (None, None) => 0,
        })
        .collect()
}
