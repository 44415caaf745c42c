//! Picks the eye tracker backing a system.
//!
//! [`select`] is a pure decision over what the platform reported;
//! [`instantiate`] walks the resulting candidates and keeps the first one
//! that can be built.

use std::fmt;

use eyegaze::{GazeObserver, GazeTracker, TrackerType};
use tracing::{info, warn};

use crate::platform::SystemProperties;
use crate::provider::TrackerProvider;

/// Reports native eye gaze interaction without real eye tracking behind it.
pub const FALSE_POSITIVE_SYSTEM: &str = "Windows Mixed Reality";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformInfo {
    pub system_name: String,
    pub supports_eye_gaze_interaction: bool,
    pub supports_eye_tracking_social: bool,
}

impl From<&SystemProperties> for PlatformInfo {
    fn from(props: &SystemProperties) -> Self {
        Self {
            system_name: props.system_name.clone(),
            supports_eye_gaze_interaction: props.supports_eye_gaze_interaction,
            supports_eye_tracking_social: props.supports_eye_tracking_social,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedLayoutKind {
    Body,
    Face,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendConfig {
    Simulated,
    VirtualDesktop(SharedLayoutKind),
    SteamLink,
    Pimax,
    QuestPro,
    Omnicept,
    Varjo,
}

impl BackendConfig {
    pub fn tracker_type(self) -> TrackerType {
        match self {
            BackendConfig::Simulated => TrackerType::Simulated,
            BackendConfig::VirtualDesktop(_) => TrackerType::VirtualDesktop,
            BackendConfig::SteamLink => TrackerType::SteamLink,
            BackendConfig::Pimax => TrackerType::Pimax,
            BackendConfig::QuestPro => TrackerType::QuestPro,
            BackendConfig::Omnicept => TrackerType::Omnicept,
            BackendConfig::Varjo => TrackerType::Varjo,
        }
    }
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::VirtualDesktop(SharedLayoutKind::Body) => {
                f.write_str("Virtual Desktop (body state)")
            }
            BackendConfig::VirtualDesktop(SharedLayoutKind::Face) => {
                f.write_str("Virtual Desktop (face state)")
            }
            other => f.write_str(other.tracker_type().name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The runtime handles eye gaze interaction itself.
    Passthrough,
    /// Backends to try, in order. Empty when nothing applies.
    Candidates(Vec<BackendConfig>),
}

impl Selection {
    pub fn candidates(&self) -> &[BackendConfig] {
        match self {
            Selection::Passthrough => &[],
            Selection::Candidates(candidates) => candidates,
        }
    }
}

/// Identity dispatch, first matching row wins. Several runtimes match more
/// than one pattern (every SteamVR driver contains "SteamVR/OpenXR"), so
/// rows go from most to least specific and must stay in this order.
const IDENTITY_TABLE: &[(&[&str], &[BackendConfig])] = &[
    (
        &["Windows Mixed Reality", "SteamVR/OpenXR : holographic"],
        &[BackendConfig::Omnicept],
    ),
    (&["SteamVR/OpenXR : aapvr"], &[BackendConfig::Pimax]),
    (
        &["VirtualDesktopXR"],
        &[
            BackendConfig::VirtualDesktop(SharedLayoutKind::Body),
            BackendConfig::VirtualDesktop(SharedLayoutKind::Face),
        ],
    ),
    (
        &["SteamVR/OpenXR"],
        &[
            BackendConfig::Varjo,
            BackendConfig::VirtualDesktop(SharedLayoutKind::Body),
            BackendConfig::VirtualDesktop(SharedLayoutKind::Face),
            BackendConfig::SteamLink,
        ],
    ),
];

pub fn select(info: &PlatformInfo, simulate_tracker: Option<bool>) -> Selection {
    if info.supports_eye_gaze_interaction && !info.system_name.contains(FALSE_POSITIVE_SYSTEM) {
        return Selection::Passthrough;
    }

    if simulate_tracker == Some(true) {
        return Selection::Candidates(vec![BackendConfig::Simulated]);
    }

    if info.supports_eye_tracking_social {
        return Selection::Candidates(vec![BackendConfig::QuestPro]);
    }

    let candidates = IDENTITY_TABLE
        .iter()
        .find(|(patterns, _)| {
            patterns
                .iter()
                .any(|pattern| info.system_name.contains(pattern))
        })
        .map(|(_, candidates)| candidates.to_vec())
        .unwrap_or_default();
    Selection::Candidates(candidates)
}

/// Builds the first candidate that does not report itself unsupported.
pub fn instantiate(
    candidates: &[BackendConfig],
    provider: &dyn TrackerProvider,
    observer: &dyn GazeObserver,
) -> Option<Box<dyn GazeTracker>> {
    for &candidate in candidates {
        match provider.create(candidate) {
            Ok(tracker) => {
                info!("eye tracker: {}", candidate);
                observer.on_tracker_selected(tracker.tracker_type());
                return Some(tracker);
            }
            Err(e) => {
                warn!("{} unavailable: {}", candidate, e);
                observer.on_tracker_unavailable(candidate.tracker_type(), &e.to_string());
            }
        }
    }
    None
}
