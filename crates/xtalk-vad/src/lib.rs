pub mod arbitration;
pub mod labels;
pub mod segments;
pub mod smoothing;
pub mod threshold;

pub use arbitration::dominant_channels;
pub use labels::{refine, runs, runs_to_labels, LabelRun};
pub use segments::{merge_runs, DiarizationEntry, SpeechRun};
pub use threshold::{detect, step, ThresholdState};
