//! End-to-end engine tests on synthetic two-channel recordings:
//! WAV in, cleaned WAV + diarization files out.

use std::f32::consts::PI;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use xtalk_app::{run_job, wav};
use xtalk_foundation::EngineConfig;
use xtalk_vad::DiarizationEntry;

const SR: u32 = 16_000;

/// 200 Hz tone between `from` and `to` seconds, silence elsewhere.
fn tone_channel(total_sec: f32, from: f32, to: f32, amp: f32) -> Vec<f32> {
    let n = (total_sec * SR as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SR as f32;
            if t >= from && t < to {
                (2.0 * PI * 200.0 * t).sin() * amp
            } else {
                0.0
            }
        })
        .collect()
}

/// Low-level white noise floor, the kind a live lapel mic always picks up.
fn noise_channel(total_sec: f32, amp: f32, seed: u64) -> Vec<f32> {
    let n = (total_sec * SR as f32) as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-amp..amp)).collect()
}

fn write_inputs(dir: &std::path::Path, channels: &[Vec<f32>]) -> Vec<PathBuf> {
    channels
        .iter()
        .enumerate()
        .map(|(i, samples)| {
            let path = dir.join(format!("chan{}.wav", i + 1));
            wav::write_channel(&path, samples, SR).unwrap();
            path
        })
        .collect()
}

fn parse_seg_file(path: &std::path::Path) -> Vec<DiarizationEntry> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|row| DiarizationEntry::parse_row(row).expect("well-formed row"))
        .collect()
}

#[test]
fn tone_burst_against_live_mic_floor_yields_one_exact_segment() {
    let dir = tempfile::tempdir().unwrap();
    // channel 1: 200 Hz tone from 1.0 s to 4.0 s; channel 2: mic noise floor
    let inputs = write_inputs(
        dir.path(),
        &[
            tone_channel(10.0, 1.0, 4.0, 0.5),
            noise_channel(10.0, 0.005, 99),
        ],
    );
    let out = run_job(&EngineConfig::default(), &inputs, dir.path(), Some(7)).unwrap();

    assert_eq!(out.entries[0].len(), 1, "channel 1 should carry one segment");
    let entry = out.entries[0][0];
    assert!(
        (95..=100).contains(&entry.start_cs),
        "start {} cs, expected ~100",
        entry.start_cs
    );
    assert!(
        (295..=305).contains(&entry.dur_cs),
        "duration {} cs, expected ~300",
        entry.dur_cs
    );
    assert!(out.entries[1].is_empty(), "channel 2 must have no segments");

    // channel 2 is suppressed to numerical silence over the full recording,
    // including the samples past the last complete frame
    let cleaned2 = wav::read_channel(&out.cleaned_wavs[1], 1, SR).unwrap();
    assert!(cleaned2.iter().all(|&s| s.abs() <= 1.0 / 32768.0));

    // channel 1's tone region comes back untouched
    let original1 = wav::read_channel(&inputs[0], 0, SR).unwrap();
    let cleaned1 = wav::read_channel(&out.cleaned_wavs[0], 0, SR).unwrap();
    let tone_range = (SR as usize)..(4 * SR as usize);
    assert_eq!(original1[tone_range.clone()], cleaned1[tone_range]);
}

#[test]
fn literal_silent_second_channel_scenario() {
    let dir = tempfile::tempdir().unwrap();
    // channel 2 is digital silence; frames under the silence floor are
    // labeled silence outright, so the boundaries stay as sharp as with a
    // noise floor
    let inputs = write_inputs(
        dir.path(),
        &[tone_channel(10.0, 1.0, 4.0, 0.5), vec![0.0f32; 160_000]],
    );
    let out = run_job(&EngineConfig::default(), &inputs, dir.path(), Some(11)).unwrap();

    assert_eq!(out.entries[0].len(), 1);
    let entry = out.entries[0][0];
    assert!((95..=100).contains(&entry.start_cs), "start {} cs", entry.start_cs);
    assert!((295..=305).contains(&entry.dur_cs), "duration {} cs", entry.dur_cs);
    assert!(out.entries[1].is_empty());

    // a channel that was digital silence stays digital silence
    let cleaned2 = wav::read_channel(&out.cleaned_wavs[1], 1, SR).unwrap();
    assert!(cleaned2.iter().all(|&s| s == 0.0));
}

#[test]
fn burst_below_discard_threshold_emits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(
        dir.path(),
        &[
            tone_channel(10.0, 1.0, 1.3, 0.5),
            noise_channel(10.0, 0.005, 17),
        ],
    );
    let out = run_job(&EngineConfig::default(), &inputs, dir.path(), Some(3)).unwrap();
    assert!(out.entries[0].is_empty(), "0.3 s burst is below the 0.5 s minimum");
    assert!(out.entries[1].is_empty());
    assert_eq!(std::fs::read_to_string(&out.seg_files[0]).unwrap(), "");
}

#[test]
fn emitted_segments_respect_merge_and_discard_rules() {
    let dir = tempfile::tempdir().unwrap();
    // two tone bursts 0.3 s apart merge into one segment; a third, far one
    // stands alone
    let mut ch1 = tone_channel(12.0, 1.0, 2.0, 0.5);
    for (i, s) in tone_channel(12.0, 2.3, 3.0, 0.5).into_iter().enumerate() {
        if s != 0.0 {
            ch1[i] = s;
        }
    }
    for (i, s) in tone_channel(12.0, 8.0, 9.5, 0.5).into_iter().enumerate() {
        if s != 0.0 {
            ch1[i] = s;
        }
    }
    let inputs = write_inputs(dir.path(), &[ch1, noise_channel(12.0, 0.005, 23)]);
    let cfg = EngineConfig::default();
    let out = run_job(&cfg, &inputs, dir.path(), Some(5)).unwrap();

    let entries = &out.entries[0];
    assert_eq!(entries.len(), 2, "close bursts merge, far one stays: {:?}", entries);
    for entry in entries {
        assert!(entry.dur_cs as f64 / 100.0 >= cfg.discard_short_sec);
    }
    for pair in entries.windows(2) {
        let gap = pair[1].start_cs as f64 - (pair[0].start_cs + pair[0].dur_cs) as f64;
        assert!(gap / 100.0 > cfg.tolerance_sec, "gap {} cs survived merging", gap);
    }
}

#[test]
fn diarization_files_round_trip_losslessly() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(
        dir.path(),
        &[
            tone_channel(10.0, 1.0, 4.0, 0.5),
            noise_channel(10.0, 0.005, 31),
        ],
    );
    let out = run_job(&EngineConfig::default(), &inputs, dir.path(), Some(13)).unwrap();
    for (seg_file, entries) in out.seg_files.iter().zip(&out.entries) {
        assert_eq!(&parse_seg_file(seg_file), entries);
    }
}

#[test]
fn rerunning_on_suppressed_output_detects_no_new_speech() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(
        dir.path(),
        &[
            tone_channel(10.0, 1.0, 4.0, 0.5),
            noise_channel(10.0, 0.005, 47),
        ],
    );
    let cfg = EngineConfig::default();
    let first = run_job(&cfg, &inputs, &dir.path().join("pass1"), Some(19)).unwrap();
    assert!(first.entries[1].is_empty());

    // feed the cleaned output straight back in
    let second = run_job(&cfg, &first.cleaned_wavs, &dir.path().join("pass2"), Some(19)).unwrap();
    assert!(
        second.entries[1].is_empty(),
        "suppressed channel must stay below detection thresholds"
    );
    let cleaned2 = wav::read_channel(&second.cleaned_wavs[1], 1, SR).unwrap();
    assert!(cleaned2.iter().all(|&s| s.abs() <= 1.0 / 32768.0));
}

#[test]
fn silent_channel_file_is_empty_even_for_wall_to_wall_speech() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(
        dir.path(),
        &[tone_channel(10.0, 0.0, 10.0, 0.5), vec![0.0f32; 160_000]],
    );
    let out = run_job(&EngineConfig::default(), &inputs, dir.path(), Some(29)).unwrap();
    assert!(out.entries[1].is_empty());
    assert_eq!(std::fs::read_to_string(&out.seg_files[1]).unwrap(), "");
    let cleaned2 = wav::read_channel(&out.cleaned_wavs[1], 1, SR).unwrap();
    assert!(cleaned2.iter().all(|&s| s == 0.0));
}
