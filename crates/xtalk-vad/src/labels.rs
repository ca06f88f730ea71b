/// A maximal run of identical label values, `stop` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRun {
    pub start: usize,
    pub stop: usize,
    pub label: u32,
}

/// Run-length decode a label sequence. Segments are always derived from
/// labels, never authored directly.
pub fn runs(labels: &[u32]) -> Vec<LabelRun> {
    let mut out = Vec::new();
    let mut iter = labels.iter().enumerate();
    let Some((_, &first)) = iter.next() else {
        return out;
    };
    let mut start = 0usize;
    let mut label = first;
    for (i, &l) in iter {
        if l != label {
            out.push(LabelRun { start, stop: i - 1, label });
            start = i;
            label = l;
        }
    }
    out.push(LabelRun {
        start,
        stop: labels.len() - 1,
        label,
    });
    out
}

/// Inverse of `runs` for a known frame count.
pub fn runs_to_labels(runs: &[LabelRun], nframes: usize) -> Vec<u32> {
    let mut labels = vec![0u32; nframes];
    for run in runs {
        for l in labels[run.start..=run.stop.min(nframes - 1)].iter_mut() {
            *l = run.label;
        }
    }
    labels
}

/// Relabel runs with no pitch evidence of voicing as silence.
///
/// For each non-silence run, the owning channel's VAD flags over the run's
/// span are consulted; if their median is zero (no strict majority voiced),
/// the whole run becomes label 0. This removes energy-dominant but unvoiced
/// runs such as chair squeaks and breath noise.
pub fn refine(labels: &[u32], vad_flags: &[Vec<bool>]) -> Vec<u32> {
    let mut out = labels.to_vec();
    for run in runs(labels) {
        if run.label == 0 {
            continue;
        }
        let Some(flags) = vad_flags.get(run.label as usize - 1) else {
            continue;
        };
        let span_end = (run.stop + 1).min(flags.len());
        if run.start >= span_end {
            continue;
        }
        let span = &flags[run.start..span_end];
        let voiced = span.iter().filter(|&&f| f).count();
        if voiced * 2 < span.len() {
            tracing::debug!(
                start = run.start,
                stop = run.stop,
                label = run.label,
                "relabeling unvoiced run as silence"
            );
            for l in out[run.start..=run.stop].iter_mut() {
                *l = 0;
            }
        }
    }
    out
}
