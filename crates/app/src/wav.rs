use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use xtalk_foundation::EngineError;

use crate::error::AppError;

/// Read one mono 16-bit PCM WAV into normalized f32 samples.
///
/// Channel count and sample rate are validated here; the original tool
/// trusted its inputs and silently corrupted results on mismatches.
pub fn read_channel(path: &Path, index: usize, expected_rate: u32) -> Result<Vec<f32>, AppError> {
    let mut reader = WavReader::open(path).map_err(|source| AppError::Wav {
        path: path.display().to_string(),
        source,
    })?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(EngineError::NotMono { index, channels: spec.channels }.into());
    }
    if spec.sample_rate != expected_rate {
        return Err(EngineError::SampleRateMismatch {
            index,
            got: spec.sample_rate,
            expected: expected_rate,
        }
        .into());
    }
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(AppError::UnsupportedFormat {
            path: path.display().to_string(),
            detail: format!(
                "{}-bit {:?}, expected 16-bit integer PCM",
                spec.bits_per_sample, spec.sample_format
            ),
        });
    }
    let samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
    let samples = samples.map_err(|source| AppError::Wav {
        path: path.display().to_string(),
        source,
    })?;
    Ok(samples.into_iter().map(|s| s as f32 / 32768.0).collect())
}

/// Read all channel files and require identical lengths.
pub fn read_channels(paths: &[impl AsRef<Path>], expected_rate: u32) -> Result<Vec<Vec<f32>>, AppError> {
    if paths.is_empty() {
        return Err(EngineError::NoChannels.into());
    }
    let mut channels: Vec<Vec<f32>> = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let samples = read_channel(path.as_ref(), index, expected_rate)?;
        if let Some(first) = channels.first() {
            if samples.len() != first.len() {
                return Err(EngineError::LengthMismatch {
                    index,
                    got: samples.len(),
                    expected: first.len(),
                }
                .into());
            }
        }
        channels.push(samples);
    }
    Ok(channels)
}

/// Write normalized f32 samples back out as mono 16-bit PCM.
pub fn write_channel(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AppError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|source| AppError::Wav {
        path: path.display().to_string(),
        source,
    })?;
    for &s in samples {
        let quantized = (s * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer.write_sample(quantized).map_err(|source| AppError::Wav {
            path: path.display().to_string(),
            source,
        })?;
    }
    writer.finalize().map_err(|source| AppError::Wav {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ch1.wav");
        let samples: Vec<f32> = (0..1000).map(|i| ((i % 100) as f32 - 50.0) / 128.0).collect();
        write_channel(&path, &samples, 16_000).unwrap();
        let back = read_channel(&path, 0, 16_000).unwrap();
        assert_eq!(back.len(), samples.len());
        for (a, b) in samples.iter().zip(&back) {
            assert_relative_eq!(a, b, epsilon = 1.0 / 32768.0);
        }
    }

    #[test]
    fn wrong_sample_rate_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ch1.wav");
        write_channel(&path, &[0.0; 100], 8_000).unwrap();
        let err = read_channel(&path, 0, 16_000).unwrap_err();
        assert!(matches!(
            err,
            AppError::Engine(EngineError::SampleRateMismatch { got: 8_000, .. })
        ));
    }

    #[test]
    fn mismatched_lengths_are_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_channel(&a, &[0.0; 200], 16_000).unwrap();
        write_channel(&b, &[0.0; 100], 16_000).unwrap();
        let err = read_channels(&[&a, &b], 16_000).unwrap_err();
        assert!(matches!(
            err,
            AppError::Engine(EngineError::LengthMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn empty_channel_list_is_rejected() {
        let paths: Vec<std::path::PathBuf> = Vec::new();
        let err = read_channels(&paths, 16_000).unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::NoChannels)));
    }
}
