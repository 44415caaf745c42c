//! Trackers backed by vendor SDKs.
//!
//! The vendor clients themselves live outside this crate. A host that links
//! a client registers a factory for it in [`VendorSdk`]; a vendor without a
//! registered factory is reported as not supported.

mod combined;
mod eye_pose;
mod tangent;

use std::fmt;

use eyegaze::{GazeError, GazeResult, TrackerType};

pub use combined::{CombinedGazeSource, CombinedGazeTracker, CombinedReading};
pub use eye_pose::{EyePoseSource, EyePoseTracker};
pub use tangent::{
    direction_from_tangents, EyeTangent, TangentGazeSource, TangentGazeTracker, TangentReading,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    pub const PIMAX_CRYSTAL: Self = Self::new(0x34A4, 0x0012);

    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

pub type TangentSourceFactory =
    Box<dyn Fn() -> GazeResult<Box<dyn TangentGazeSource>> + Send + Sync>;
pub type CombinedSourceFactory =
    Box<dyn Fn() -> GazeResult<Box<dyn CombinedGazeSource>> + Send + Sync>;

#[derive(Default)]
pub struct VendorSdk {
    pimax: Option<TangentSourceFactory>,
    omnicept: Option<CombinedSourceFactory>,
    varjo: Option<CombinedSourceFactory>,
}

impl VendorSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pimax<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> GazeResult<Box<dyn TangentGazeSource>> + Send + Sync + 'static,
    {
        self.pimax = Some(Box::new(factory));
        self
    }

    /// Omnicept reports its combined gaze with X and Z mirrored.
    pub fn with_omnicept<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> GazeResult<Box<dyn CombinedGazeSource>> + Send + Sync + 'static,
    {
        self.omnicept = Some(Box::new(factory));
        self
    }

    pub fn with_varjo<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> GazeResult<Box<dyn CombinedGazeSource>> + Send + Sync + 'static,
    {
        self.varjo = Some(Box::new(factory));
        self
    }

    pub fn pimax(&self, threshold: f32) -> GazeResult<TangentGazeTracker> {
        let factory = self
            .pimax
            .as_ref()
            .ok_or_else(|| not_registered(TrackerType::Pimax))?;
        TangentGazeTracker::new(
            factory()?,
            DeviceIdentity::PIMAX_CRYSTAL,
            TrackerType::Pimax,
            threshold,
        )
    }

    pub fn omnicept(&self, threshold: f32) -> GazeResult<CombinedGazeTracker> {
        let factory = self
            .omnicept
            .as_ref()
            .ok_or_else(|| not_registered(TrackerType::Omnicept))?;
        Ok(CombinedGazeTracker::new(factory()?, TrackerType::Omnicept, threshold).mirrored_xz())
    }

    pub fn varjo(&self, threshold: f32) -> GazeResult<CombinedGazeTracker> {
        let factory = self
            .varjo
            .as_ref()
            .ok_or_else(|| not_registered(TrackerType::Varjo))?;
        Ok(CombinedGazeTracker::new(
            factory()?,
            TrackerType::Varjo,
            threshold,
        ))
    }
}

fn not_registered(tracker: TrackerType) -> GazeError {
    GazeError::not_supported(format!("{tracker} SDK is not available"))
}
