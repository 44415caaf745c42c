//! Eye gaze from `XR_FB_eye_tracking_social`.
//!
//! Runtimes exposing only the social extension (Quest Pro over Link) report
//! a pose per eye; the tracker slerps them into one gaze like the other
//! pose-based sources.

use std::sync::Arc;

use eyegaze::math::{identity_xr_pose, Pose};
use eyegaze::{GazeError, GazeResult};
use eyegaze_trackers::{EyePoseSource, EyeReading};
use openxr as xr;
use tracing::{debug, warn};

use crate::platform::{EyeGazeFb, XrPlatform};

#[derive(Clone, Copy)]
struct FbHandles {
    eye_tracker: xr::sys::EyeTrackerFB,
    view_space: xr::sys::Space,
}

pub struct FbEyeGazeSource<P> {
    platform: Arc<P>,
    handles: Option<FbHandles>,
}

impl<P: XrPlatform> FbEyeGazeSource<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self {
            platform,
            handles: None,
        }
    }
}

fn xr_error(call: &str, result: xr::sys::Result) -> GazeError {
    GazeError::backend(format!("{call} failed: {result}"))
}

fn reading(gaze: &EyeGazeFb) -> EyeReading {
    EyeReading {
        valid: gaze.is_valid,
        confidence: gaze.confidence,
        pose: Pose::from_xr(gaze.pose),
    }
}

impl<P: XrPlatform> EyePoseSource for FbEyeGazeSource<P> {
    fn start(&mut self, session: xr::sys::Session) -> GazeResult<()> {
        if self.handles.is_some() {
            return Ok(());
        }
        let eye_tracker = self
            .platform
            .create_eye_tracker_fb(session)
            .map_err(|e| xr_error("xrCreateEyeTrackerFB", e))?;
        let view_space = match self.platform.create_reference_space(
            session,
            xr::ReferenceSpaceType::VIEW,
            identity_xr_pose(),
        ) {
            Ok(space) => space,
            Err(e) => {
                if let Err(err) = self.platform.destroy_eye_tracker_fb(eye_tracker) {
                    debug!("xrDestroyEyeTrackerFB failed: {}", err);
                }
                return Err(xr_error("xrCreateReferenceSpace", e));
            }
        };
        self.handles = Some(FbHandles {
            eye_tracker,
            view_space,
        });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(handles) = self.handles.take() else {
            return;
        };
        if let Err(e) = self.platform.destroy_eye_tracker_fb(handles.eye_tracker) {
            warn!("xrDestroyEyeTrackerFB failed: {}", e);
        }
        if let Err(e) = self.platform.destroy_space(handles.view_space) {
            warn!("xrDestroySpace failed: {}", e);
        }
    }

    fn read(&self, time: xr::Time) -> GazeResult<[EyeReading; 2]> {
        let handles = self
            .handles
            .ok_or_else(|| GazeError::backend("eye tracker not started"))?;
        let gazes = self
            .platform
            .get_eye_gazes_fb(handles.eye_tracker, handles.view_space, time)
            .map_err(|e| xr_error("xrGetEyeGazesFB", e))?;
        Ok([reading(&gazes.gazes[0]), reading(&gazes.gazes[1])])
    }
}
