use openxr as xr;

use crate::{GazeResult, GazeSample, TrackerType};

/// One physical or virtual eye tracking source.
///
/// Construction is where availability is decided: a constructor that cannot
/// find its device, service or shared resource returns
/// [`GazeError::NotSupported`](crate::GazeError::NotSupported) so the selector
/// can move on to the next candidate. Once built, a tracker never errors on
/// the sampling path; it reports an invalid sample instead.
pub trait GazeTracker: Send + Sync {
    /// Called once when the session this tracker backs is created.
    fn start(&mut self, session: xr::sys::Session) -> GazeResult<()>;

    /// Called when the session is destroyed.
    fn stop(&mut self);

    /// Cheap liveness check used for action activity. Must not mutate
    /// tracker-visible state.
    fn is_gaze_available(&self, time: xr::Time) -> bool;

    fn gaze(&self, time: xr::Time) -> GazeSample;

    fn tracker_type(&self) -> TrackerType;
}

impl<T: GazeTracker + ?Sized> GazeTracker for Box<T> {
    fn start(&mut self, session: xr::sys::Session) -> GazeResult<()> {
        (**self).start(session)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_gaze_available(&self, time: xr::Time) -> bool {
        (**self).is_gaze_available(time)
    }

    fn gaze(&self, time: xr::Time) -> GazeSample {
        (**self).gaze(time)
    }

    fn tracker_type(&self) -> TrackerType {
        (**self).tracker_type()
    }
}
