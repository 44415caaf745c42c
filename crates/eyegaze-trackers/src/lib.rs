//! Eye tracker backends.
//!
//! Every backend implements [`eyegaze::GazeTracker`]. Constructors decide
//! availability and return [`eyegaze::GazeError::NotSupported`] when their
//! device, service or shared resource is missing.

#![deny(unsafe_code)]

pub mod eyes;
pub mod osc;
pub mod sdk;
pub mod shared_memory;
pub mod simulated;
pub mod steam_link;

pub use eyes::{EyeReading, DEFAULT_CONFIDENCE_THRESHOLD};
pub use sdk::{
    CombinedGazeSource, CombinedGazeTracker, DeviceIdentity, EyePoseSource, EyePoseTracker,
    TangentGazeSource, TangentGazeTracker, VendorSdk,
};
pub use shared_memory::{BodyState, FaceState, SharedLayout, VirtualDesktopTracker};
pub use simulated::{PointerSource, SimulatedTracker};
pub use steam_link::{SteamLinkConfig, SteamLinkTracker};
