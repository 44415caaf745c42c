//! Virtual Desktop eye tracking over shared memory.
//!
//! Virtual Desktop's streamer publishes face (and optionally body) tracking
//! state into a named shared memory object. The tracker copies one snapshot
//! per query and evaluates validity and pose from that copy. No lock or
//! generation counter exists on the writer side, so a snapshot taken while
//! the writer is mid-update can mix fields of two frames. This is accepted.

mod layout;
pub mod region;

use std::marker::PhantomData;

use eyegaze::{GazeError, GazeResult, GazeSample, GazeTracker, TrackerType};
use openxr as xr;
use tracing::{debug, trace};

use crate::eyes::{combined_direction, eyes_available};

pub use layout::{
    BodyState, FaceState, SharedLayout, CONFIDENCE_COUNT, EXPRESSION_COUNT, HAND_JOINT_COUNT,
};
pub use region::SharedRegion;

pub struct VirtualDesktopTracker<L> {
    region: Box<dyn SharedRegion>,
    threshold: f32,
    _layout: PhantomData<fn() -> L>,
}

pub type FaceStateTracker = VirtualDesktopTracker<FaceState>;
pub type BodyStateTracker = VirtualDesktopTracker<BodyState>;

impl<L: SharedLayout> VirtualDesktopTracker<L> {
    pub fn open(name: &str, threshold: f32) -> GazeResult<Self> {
        let region = region::open_named(name, L::SIZE)?;
        debug!("opened shared memory {}", name);
        Self::with_region(region, threshold)
    }

    pub fn with_region(region: Box<dyn SharedRegion>, threshold: f32) -> GazeResult<Self> {
        if region.len() < L::SIZE {
            return Err(GazeError::not_supported(format!(
                "shared memory region is {} bytes, layout needs {}",
                region.len(),
                L::SIZE
            )));
        }
        Ok(Self {
            region,
            threshold,
            _layout: PhantomData,
        })
    }

    fn read(&self) -> Option<L> {
        let mut buf = vec![0u8; L::SIZE];
        if let Err(e) = self.region.snapshot(&mut buf) {
            debug!("shared memory snapshot failed: {}", e);
            return None;
        }
        L::decode(&buf)
    }
}

impl<L: SharedLayout> GazeTracker for VirtualDesktopTracker<L> {
    fn start(&mut self, _session: xr::sys::Session) -> GazeResult<()> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn is_gaze_available(&self, _time: xr::Time) -> bool {
        match self.read() {
            Some(state) => {
                let (left, right) = state.eyes();
                trace!(
                    left_valid = left.valid,
                    left_confidence = left.confidence,
                    right_valid = right.valid,
                    right_confidence = right.confidence,
                    "virtual desktop eyes"
                );
                eyes_available(&left, &right, self.threshold)
            }
            None => false,
        }
    }

    fn gaze(&self, _time: xr::Time) -> GazeSample {
        let Some(state) = self.read() else {
            return GazeSample::INVALID;
        };
        let (left, right) = state.eyes();
        if !eyes_available(&left, &right, self.threshold) {
            return GazeSample::INVALID;
        }
        combined_direction(&left, &right)
            .map(GazeSample::new)
            .unwrap_or(GazeSample::INVALID)
    }

    fn tracker_type(&self) -> TrackerType {
        TrackerType::VirtualDesktop
    }
}
