use rand::Rng;
use tracing::{debug, info};

use xtalk_dsp::conditioning::condition;
use xtalk_dsp::frame::resample_nearest;
use xtalk_dsp::{suppress_inactive, EnergyExtractor, FrameGrid, PeriodicityExtractor, PitchConfig};
use xtalk_foundation::{EngineConfig, EngineError};
use xtalk_vad::smoothing::{median_filter, post_process_flags};
use xtalk_vad::{detect, dominant_channels, merge_runs, refine, runs, SpeechRun};

/// Run the whole engine over in-memory channel buffers.
///
/// The recording is processed in fixed-size chunks; each chunk runs the full
/// pipeline (features, arbitration, smoothing, refinement, suppression) and
/// its suppressed samples are written back in place before the next chunk is
/// touched. Detection state never crosses a chunk boundary.
///
/// Returns the merged, duration-filtered speech runs per channel; the
/// buffers themselves come back crosstalk-suppressed.
pub fn process<R: Rng>(
    cfg: &EngineConfig,
    channels: &mut [Vec<f32>],
    rng: &mut R,
) -> Result<Vec<Vec<SpeechRun>>, EngineError> {
    validate(cfg, channels)?;

    let grid = FrameGrid::from_config(cfg);
    let pitch_grid = FrameGrid::new(cfg.sample_rate_hz, cfg.pitch_frame_ms, cfg.pitch_hop_ms);
    let energy_ex = EnergyExtractor::new(grid);
    let pitch_ex = PeriodicityExtractor::new(pitch_grid, cfg.sample_rate_hz, PitchConfig::from_config(cfg));

    let nsamples = channels[0].len();
    let span = cfg.chunk_span_samples();
    let hop_sec = cfg.hop_sec();
    let mut raw_runs: Vec<Vec<SpeechRun>> = vec![Vec::new(); channels.len()];

    let mut start = 0usize;
    let mut chunk_idx = 0usize;
    while start < nsamples {
        let end = (start + span).min(nsamples);
        let nframes = grid.num_frames(end - start);
        if nframes == 0 {
            debug!(start, end, "tail shorter than one frame, leaving it untouched");
            break;
        }
        info!(chunk = chunk_idx, start, end, frames = nframes, "processing chunk");

        let mut energies = Vec::with_capacity(channels.len());
        let mut flags = Vec::with_capacity(channels.len());
        for channel in channels.iter() {
            let chunk = &channel[start..end];
            energies.push(energy_ex.power_sum(&condition(chunk, rng)));
            let features = pitch_ex.features(chunk, rng);
            let channel_flags = if features.is_empty() {
                vec![false; nframes]
            } else {
                let detected = detect(&features, &cfg.vad);
                let aligned = resample_nearest(&detected, pitch_grid.hop, grid.hop, nframes);
                post_process_flags(&aligned, cfg.extension_kernel, cfg.merge_budget)
            };
            debug!(
                chunk = chunk_idx,
                voiced = channel_flags.iter().filter(|&&f| f).count(),
                frames = nframes,
                "channel VAD evidence"
            );
            flags.push(channel_flags);
        }

        // a long median on the labels; onset/offset growth happens on the
        // flags above, never on the label sequence itself
        let labels = dominant_channels(&energies);
        let labels = median_filter(&labels, cfg.label_median_window);
        let labels = refine(&labels, &flags);

        let offset_sec = chunk_idx as f64 * cfg.chunk_frames as f64 * hop_sec;
        for run in runs(&labels) {
            if run.label > 0 {
                raw_runs[run.label as usize - 1].push(SpeechRun {
                    start_sec: offset_sec + run.start as f64 * hop_sec,
                    end_sec: offset_sec + run.stop as f64 * hop_sec,
                });
            }
        }

        let mut views: Vec<&mut [f32]> = channels
            .iter_mut()
            .map(|c| &mut c[start..end])
            .collect();
        suppress_inactive(&mut views, &labels, &grid, rng);

        start += span;
        chunk_idx += 1;
    }

    Ok(raw_runs
        .iter()
        .map(|r| merge_runs(r, cfg.tolerance_sec, cfg.discard_short_sec))
        .collect())
}

fn validate(cfg: &EngineConfig, channels: &[Vec<f32>]) -> Result<(), EngineError> {
    let Some(first) = channels.first() else {
        return Err(EngineError::NoChannels);
    };
    for (index, channel) in channels.iter().enumerate() {
        if channel.len() != first.len() {
            return Err(EngineError::LengthMismatch {
                index,
                got: channel.len(),
                expected: first.len(),
            });
        }
    }
    if first.len() < cfg.frame_len_samples() {
        return Err(EngineError::TooShort {
            samples: first.len(),
            frame_len: cfg.frame_len_samples(),
        });
    }
    Ok(())
}
