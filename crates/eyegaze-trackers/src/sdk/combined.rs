//! Trackers whose SDK reports one combined gaze vector.

use eyegaze::{GazeResult, GazeSample, GazeTracker, TrackerType};
use glam::Vec3;
use openxr as xr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedReading {
    pub direction: Vec3,
    pub confidence: f32,
    pub valid: bool,
}

impl CombinedReading {
    /// Averages two per-eye forward vectors. Both eyes must be tracked.
    pub fn from_eye_forwards(left: Option<Vec3>, right: Option<Vec3>) -> Self {
        match (left, right) {
            (Some(left), Some(right)) => Self {
                direction: (left + right) / 2.0,
                confidence: 1.0,
                valid: true,
            },
            _ => Self {
                direction: Vec3::ZERO,
                confidence: 0.0,
                valid: false,
            },
        }
    }
}

pub trait CombinedGazeSource: Send + Sync {
    /// Starts streaming. Called when the session starts.
    fn start(&mut self) -> GazeResult<()> {
        Ok(())
    }

    fn read(&self) -> GazeResult<CombinedReading>;
}

pub struct CombinedGazeTracker {
    source: Box<dyn CombinedGazeSource>,
    tracker_type: TrackerType,
    threshold: f32,
    mirror_xz: bool,
}

impl CombinedGazeTracker {
    pub fn new(source: Box<dyn CombinedGazeSource>, tracker_type: TrackerType, threshold: f32) -> Self {
        Self {
            source,
            tracker_type,
            threshold,
            mirror_xz: false,
        }
    }

    /// The source's X and Z axes point the opposite way from OpenXR's.
    pub fn mirrored_xz(mut self) -> Self {
        self.mirror_xz = true;
        self
    }

    fn usable_reading(&self) -> Option<CombinedReading> {
        match self.source.read() {
            Ok(reading) => (reading.valid && reading.confidence >= self.threshold).then_some(reading),
            Err(e) => {
                debug!("{} read failed: {}", self.tracker_type, e);
                None
            }
        }
    }
}

impl GazeTracker for CombinedGazeTracker {
    fn start(&mut self, _session: xr::sys::Session) -> GazeResult<()> {
        self.source.start()
    }

    fn stop(&mut self) {}

    fn is_gaze_available(&self, _time: xr::Time) -> bool {
        self.usable_reading().is_some()
    }

    fn gaze(&self, _time: xr::Time) -> GazeSample {
        let Some(reading) = self.usable_reading() else {
            return GazeSample::INVALID;
        };
        let mut direction = reading.direction;
        if self.mirror_xz {
            direction.x = -direction.x;
            direction.z = -direction.z;
        }
        direction
            .try_normalize()
            .map(GazeSample::new)
            .unwrap_or(GazeSample::INVALID)
    }

    fn tracker_type(&self) -> TrackerType {
        self.tracker_type
    }
}
