pub mod controller;
pub mod error;
pub mod job;
pub mod wav;

pub use error::AppError;
pub use job::{run_job, JobOutput};
