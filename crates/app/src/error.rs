use thiserror::Error;

use xtalk_foundation::EngineError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("WAV error in {path}: {source}")]
    Wav {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("unsupported WAV format in {path}: {detail}")]
    UnsupportedFormat { path: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
