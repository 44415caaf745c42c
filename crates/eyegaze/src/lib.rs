#![forbid(unsafe_code)]

pub mod math;
pub mod observer;
pub mod status;
pub mod tracker;
pub mod types;

pub use math::Pose;
pub use observer::{GazeObserver, NullObserver, TracingObserver};
pub use status::{set_tracker_status, tracker_status};
pub use tracker::GazeTracker;
pub use types::{EmulationState, GazeSample, TrackerType};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GazeError {
    #[error("eye tracker not supported: {0}")]
    NotSupported(String),
    #[error("eye tracker error: {0}")]
    Backend(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GazeError {
    pub fn not_supported(msg: impl std::fmt::Display) -> Self {
        Self::NotSupported(msg.to_string())
    }

    pub fn backend(msg: impl std::fmt::Display) -> Self {
        Self::Backend(msg.to_string())
    }
}

pub type GazeResult<T> = Result<T, GazeError>;
