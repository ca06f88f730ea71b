use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use xtalk_foundation::EngineConfig;
use xtalk_vad::DiarizationEntry;

use crate::controller;
use crate::error::AppError;
use crate::wav;

/// Everything one batch run produced.
pub struct JobOutput {
    /// Crosstalk-suppressed WAV per channel, under `<out>/vad/`.
    pub cleaned_wavs: Vec<PathBuf>,
    /// Diarization file per channel, under `<out>/diarization/`.
    pub seg_files: Vec<PathBuf>,
    pub entries: Vec<Vec<DiarizationEntry>>,
}

/// Run the full batch job: read, process, write.
///
/// `seed` pins the jitter source for reproducible runs; `None` seeds from
/// entropy.
pub fn run_job(
    cfg: &EngineConfig,
    inputs: &[PathBuf],
    out_dir: &Path,
    seed: Option<u64>,
) -> Result<JobOutput, AppError> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut channels = wav::read_channels(inputs, cfg.sample_rate_hz)?;
    info!(
        channels = channels.len(),
        samples = channels[0].len(),
        "inputs loaded"
    );

    let merged = controller::process(cfg, &mut channels, &mut rng)?;

    let vad_dir = out_dir.join("vad");
    let diar_dir = out_dir.join("diarization");
    fs::create_dir_all(&vad_dir)?;
    fs::create_dir_all(&diar_dir)?;

    let mut cleaned_wavs = Vec::with_capacity(inputs.len());
    let mut seg_files = Vec::with_capacity(inputs.len());
    let mut entries = Vec::with_capacity(inputs.len());

    for (i, input) in inputs.iter().enumerate() {
        let file_name = input
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| format!("chan{}.wav", i + 1).into());
        let wav_path = vad_dir.join(&file_name);
        wav::write_channel(&wav_path, &channels[i], cfg.sample_rate_hz)?;
        info!(path = %wav_path.display(), "written cleaned audio");

        let stem = input
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| format!("chan{}", i + 1).into());
        let mut seg_path = diar_dir.join(stem);
        seg_path.set_extension("seg");

        let channel_entries: Vec<DiarizationEntry> = merged[i]
            .iter()
            .map(|run| DiarizationEntry::from_run(i as u32 + 1, run))
            .collect();
        let mut body = String::new();
        for entry in &channel_entries {
            body.push_str(&entry.to_string());
            body.push('\n');
        }
        fs::write(&seg_path, body)?;
        info!(
            path = %seg_path.display(),
            segments = channel_entries.len(),
            "written diarization file"
        );

        cleaned_wavs.push(wav_path);
        seg_files.push(seg_path);
        entries.push(channel_entries);
    }

    Ok(JobOutput { cleaned_wavs, seg_files, entries })
}
