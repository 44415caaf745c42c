use std::fmt;

use glam::Vec3;

/// A gaze direction in the view (head-local) frame: +X right, +Y up, -Z forward.
///
/// When `valid` is set, `direction` is the tracker's answer for this query. Most
/// backends guarantee unit length; the network backend forwards what it
/// received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub direction: Vec3,
    pub valid: bool,
}

impl GazeSample {
    pub const INVALID: Self = Self {
        direction: Vec3::ZERO,
        valid: false,
    };

    pub fn new(direction: Vec3) -> Self {
        Self {
            direction,
            valid: true,
        }
    }

    pub fn direction(&self) -> Option<Vec3> {
        self.valid.then_some(self.direction)
    }
}

impl Default for GazeSample {
    fn default() -> Self {
        Self::INVALID
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerType {
    None,
    /// The platform already implements eye gaze interaction.
    Passthrough,
    Simulated,
    Omnicept,
    Varjo,
    QuestPro,
    Pimax,
    VirtualDesktop,
    SteamLink,
}

impl TrackerType {
    pub fn name(self) -> &'static str {
        match self {
            TrackerType::None => "None",
            TrackerType::Passthrough => "Passthrough",
            TrackerType::Simulated => "Simulated",
            TrackerType::Omnicept => "HP Omnicept",
            TrackerType::Varjo => "Varjo",
            TrackerType::QuestPro => "Quest Pro",
            TrackerType::Pimax => "Pimax",
            TrackerType::VirtualDesktop => "Virtual Desktop",
            TrackerType::SteamLink => "Steam Link",
        }
    }
}

impl fmt::Display for TrackerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-session lifecycle of the emulation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulationState {
    Unbound,
    Bound(TrackerType),
    Stopped,
}

impl EmulationState {
    pub fn is_bound(self) -> bool {
        matches!(self, EmulationState::Bound(_))
    }
}

impl fmt::Display for EmulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulationState::Unbound => f.write_str("unbound"),
            EmulationState::Bound(tracker) => write!(f, "bound ({tracker})"),
            EmulationState::Stopped => f.write_str("stopped"),
        }
    }
}
