//! OpenXR eye gaze interaction (`XR_EXT_eye_gaze_interaction`) emulated on
//! top of the eyegaze trackers.
//!
//! The host owns the dispatch chain: it forwards every intercepted call to
//! [`GazeLayer`] and implements [`XrPlatform`] by calling the next layer.

#![forbid(unsafe_code)]

pub mod bindings;
pub mod layer;
pub mod paths;
pub mod platform;
pub mod provider;
pub mod selector;
pub mod social;

pub use layer::{located_flags, GazeLayer};
pub use platform::{
    ActionStatePose, EyeGazeFb, EyeGazesFb, FrameState, SpaceLocation, SuggestedBinding,
    SystemProperties, XrPlatform,
};
pub use provider::{DefaultTrackerProvider, TrackerProvider};
pub use selector::{select, BackendConfig, PlatformInfo, Selection, SharedLayoutKind};
