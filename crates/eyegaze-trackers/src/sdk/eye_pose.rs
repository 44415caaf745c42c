//! Trackers whose source reports a pose per eye, already in view space.

use eyegaze::{GazeResult, GazeSample, GazeTracker, TrackerType};
use openxr as xr;
use tracing::debug;

use crate::eyes::{combined_direction, eyes_available, EyeReading};

pub trait EyePoseSource: Send + Sync {
    /// Acquires per-session resources.
    fn start(&mut self, session: xr::sys::Session) -> GazeResult<()>;

    fn stop(&mut self) {}

    /// Left then right eye, relative to the view space, at `time`.
    fn read(&self, time: xr::Time) -> GazeResult<[EyeReading; 2]>;
}

pub struct EyePoseTracker {
    source: Box<dyn EyePoseSource>,
    tracker_type: TrackerType,
    threshold: f32,
}

impl EyePoseTracker {
    pub fn new(source: Box<dyn EyePoseSource>, tracker_type: TrackerType, threshold: f32) -> Self {
        Self {
            source,
            tracker_type,
            threshold,
        }
    }

    fn usable_eyes(&self, time: xr::Time) -> Option<[EyeReading; 2]> {
        match self.source.read(time) {
            Ok(eyes) => eyes_available(&eyes[0], &eyes[1], self.threshold).then_some(eyes),
            Err(e) => {
                debug!("{} eye gaze query failed: {}", self.tracker_type, e);
                None
            }
        }
    }
}

impl GazeTracker for EyePoseTracker {
    fn start(&mut self, session: xr::sys::Session) -> GazeResult<()> {
        self.source.start(session)
    }

    fn stop(&mut self) {
        self.source.stop();
    }

    fn is_gaze_available(&self, time: xr::Time) -> bool {
        self.usable_eyes(time).is_some()
    }

    fn gaze(&self, time: xr::Time) -> GazeSample {
        self.usable_eyes(time)
            .and_then(|[left, right]| combined_direction(&left, &right))
            .map(GazeSample::new)
            .unwrap_or(GazeSample::INVALID)
    }

    fn tracker_type(&self) -> TrackerType {
        self.tracker_type
    }
}
