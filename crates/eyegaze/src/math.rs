//! Pose and gaze-vector math.
//!
//! Conventions follow OpenXR: right-handed, +X right, +Y up, -Z forward.
//! [`Pose::multiply`] composes like `xr::math::Pose::Multiply(a, b)`: the
//! result applies `a` first, then `b`.

use glam::{Quat, Vec2, Vec3};
use openxr as xr;

/// Tolerance used when checking that a direction is unit length.
pub const UNIT_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub orientation: Quat,
    pub position: Vec3,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    pub fn new(orientation: Quat, position: Vec3) -> Self {
        Self {
            orientation,
            position,
        }
    }

    pub fn from_rotation(orientation: Quat) -> Self {
        Self::new(orientation, Vec3::ZERO)
    }

    pub fn from_xr(pose: xr::Posef) -> Self {
        Self {
            orientation: Quat::from_xyzw(
                pose.orientation.x,
                pose.orientation.y,
                pose.orientation.z,
                pose.orientation.w,
            ),
            position: Vec3::new(pose.position.x, pose.position.y, pose.position.z),
        }
    }

    pub fn to_xr(self) -> xr::Posef {
        let [x, y, z, w] = self.orientation.to_array();
        xr::Posef {
            orientation: xr::Quaternionf { x, y, z, w },
            position: xr::Vector3f {
                x: self.position.x,
                y: self.position.y,
                z: self.position.z,
            },
        }
    }

    /// Applies `self`, then `other`.
    pub fn multiply(self, other: Pose) -> Pose {
        Pose {
            orientation: other.orientation * self.orientation,
            position: other.orientation * self.position + other.position,
        }
    }

    pub fn inverse(self) -> Pose {
        let orientation = self.orientation.conjugate();
        Pose {
            orientation,
            position: -(orientation * self.position),
        }
    }

    /// Spherical interpolation of the orientation, linear interpolation of
    /// the position.
    pub fn slerp(self, other: Pose, t: f32) -> Pose {
        Pose {
            orientation: self.orientation.slerp(other.orientation, t),
            position: self.position.lerp(other.position, t),
        }
    }

    pub fn transform_point(self, point: Vec3) -> Vec3 {
        self.orientation * point + self.position
    }

    pub fn abs_diff_eq(self, other: Pose, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && self.orientation.dot(other.orientation).abs() >= 1.0 - max_abs_diff
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub fn identity_xr_pose() -> xr::Posef {
    Pose::IDENTITY.to_xr()
}

pub fn is_unit(v: Vec3) -> bool {
    (v.length() - 1.0).abs() <= UNIT_TOLERANCE
}

/// Projects the pose's forward point (local -Z, translation included) and
/// normalises it.
pub fn forward_unit_vector(pose: Pose) -> Option<Vec3> {
    pose.transform_point(Vec3::NEG_Z).try_normalize()
}

/// Polar construction of a unit vector from pitch (up) and yaw (right), in
/// radians.
pub fn unit_vector_from_angles(pitch: f32, yaw: f32) -> Vec3 {
    Vec3::new(
        yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
}

/// Averages per-eye gaze tangents and converts them into `(pitch, yaw)`.
pub fn angles_from_tangents(left: Vec2, right: Vec2) -> (f32, f32) {
    let yaw = ((left.x + right.x) / 2.0).atan();
    let pitch = ((left.y + right.y) / 2.0).atan();
    (pitch, yaw)
}

/// Same composition order as `XMQuaternionRotationRollPitchYaw`: roll about
/// Z, then pitch about X, then yaw about Y.
pub fn rotation_roll_pitch_yaw(pitch: f32, yaw: f32, roll: f32) -> Quat {
    Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch) * Quat::from_rotation_z(roll)
}

/// Rotation taking the view forward axis onto the gaze direction.
pub fn gaze_rotation(direction: Vec3) -> Quat {
    rotation_roll_pitch_yaw(direction.y.atan(), -direction.x.atan(), 0.0)
}
