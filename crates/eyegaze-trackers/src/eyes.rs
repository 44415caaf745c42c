use eyegaze::math::{forward_unit_vector, Pose};
use glam::Vec3;

/// Confidence gate shared by the shared-memory and SDK backends.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// One eye as reported by a pose-style source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeReading {
    pub valid: bool,
    pub confidence: f32,
    pub pose: Pose,
}

impl EyeReading {
    pub const INVALID: Self = Self {
        valid: false,
        confidence: 0.0,
        pose: Pose::IDENTITY,
    };
}

/// Both eyes valid and both strictly above the threshold.
pub fn eyes_available(left: &EyeReading, right: &EyeReading, threshold: f32) -> bool {
    left.valid && right.valid && left.confidence > threshold && right.confidence > threshold
}

/// Midpoint of the two eye poses, projected along its forward axis.
pub fn combined_direction(left: &EyeReading, right: &EyeReading) -> Option<Vec3> {
    forward_unit_vector(left.pose.slerp(right.pose, 0.5))
}
