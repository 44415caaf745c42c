//! Trackers whose SDK reports per-eye gaze as tangents of the gaze angles.

use eyegaze::math::{angles_from_tangents, unit_vector_from_angles};
use eyegaze::{GazeError, GazeResult, GazeSample, GazeTracker, TrackerType};
use glam::{Vec2, Vec3};
use openxr as xr;
use tracing::{debug, trace};

use super::DeviceIdentity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeTangent {
    /// `tan(yaw)`, `tan(pitch)`; +x right, +y up.
    pub tangent: Vec2,
    pub valid: bool,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentReading {
    /// SDK clock of the sample. Zero means the SDK has no gaze.
    pub timestamp_seconds: f64,
    pub left: EyeTangent,
    pub right: EyeTangent,
}

/// A vendor client producing [`TangentReading`]s.
pub trait TangentGazeSource: Send + Sync {
    /// Identity of the connected headset.
    fn device_identity(&self) -> GazeResult<DeviceIdentity>;

    fn start(&mut self) -> GazeResult<()> {
        Ok(())
    }

    fn read(&self) -> GazeResult<TangentReading>;
}

pub struct TangentGazeTracker {
    source: Box<dyn TangentGazeSource>,
    tracker_type: TrackerType,
    threshold: f32,
}

impl TangentGazeTracker {
    /// Fails with `NotSupported` unless the source reports `expected`.
    pub fn new(
        source: Box<dyn TangentGazeSource>,
        expected: DeviceIdentity,
        tracker_type: TrackerType,
        threshold: f32,
    ) -> GazeResult<Self> {
        let identity = source.device_identity()?;
        if identity != expected {
            return Err(GazeError::not_supported(format!(
                "{} headset {} is not {}",
                tracker_type, identity, expected
            )));
        }
        Ok(Self {
            source,
            tracker_type,
            threshold,
        })
    }

    fn usable_reading(&self) -> Option<TangentReading> {
        let reading = match self.source.read() {
            Ok(reading) => reading,
            Err(e) => {
                debug!("{} read failed: {}", self.tracker_type, e);
                return None;
            }
        };
        trace!(?reading, "tangent gaze");

        let eye_ok = |eye: &EyeTangent| eye.valid && eye.confidence > self.threshold;
        (reading.timestamp_seconds != 0.0 && eye_ok(&reading.left) && eye_ok(&reading.right))
            .then_some(reading)
    }
}

pub fn direction_from_tangents(left: Vec2, right: Vec2) -> Vec3 {
    let (pitch, yaw) = angles_from_tangents(left, right);
    unit_vector_from_angles(pitch, yaw)
}

impl GazeTracker for TangentGazeTracker {
    fn start(&mut self, _session: xr::sys::Session) -> GazeResult<()> {
        self.source.start()
    }

    fn stop(&mut self) {}

    fn is_gaze_available(&self, _time: xr::Time) -> bool {
        self.usable_reading().is_some()
    }

    fn gaze(&self, _time: xr::Time) -> GazeSample {
        match self.usable_reading() {
            Some(reading) => GazeSample::new(direction_from_tangents(
                reading.left.tangent,
                reading.right.tangent,
            )),
            None => GazeSample::INVALID,
        }
    }

    fn tracker_type(&self) -> TrackerType {
        self.tracker_type
    }
}
