use thiserror::Error;

/// Errors raised by the crosstalk-removal engine.
///
/// All of these are fatal to the current job: the engine never produces
/// partial results. Retry policy, if any, belongs to the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no input channels supplied")]
    NoChannels,

    #[error("channel {index} has {got} samples, expected {expected}")]
    LengthMismatch {
        index: usize,
        got: usize,
        expected: usize,
    },

    #[error("channel {index} has sample rate {got} Hz, expected {expected} Hz")]
    SampleRateMismatch { index: usize, got: u32, expected: u32 },

    #[error("channel {index} is not mono ({channels} channels)")]
    NotMono { index: usize, channels: u16 },

    #[error("recording too short: {samples} samples is less than one frame ({frame_len})")]
    TooShort { samples: usize, frame_len: usize },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
