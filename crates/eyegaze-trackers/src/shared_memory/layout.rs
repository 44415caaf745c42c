//! Byte layouts of the structures Virtual Desktop publishes.
//!
//! Both are plain C structs with natural alignment, little-endian on every
//! platform the writer ships for. Field order and padding must match the
//! writer exactly.

use bytes::Buf;
use eyegaze::math::Pose;
use glam::{Quat, Vec3};

use crate::eyes::EyeReading;

pub const EXPRESSION_COUNT: usize = 63;
pub const CONFIDENCE_COUNT: usize = 2;
pub const HAND_JOINT_COUNT: usize = 26;

/// quaternion (x, y, z, w) followed by position (x, y, z)
const POSE_SIZE: usize = 28;

pub trait SharedLayout: Sized + Send + 'static {
    const SIZE: usize;

    /// Decodes one snapshot. `bytes` must hold at least `SIZE` bytes.
    fn decode(bytes: &[u8]) -> Option<Self>;

    fn eyes(&self) -> (EyeReading, EyeReading);
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceState {
    pub face_is_valid: bool,
    pub eye_following_blendshapes_valid: bool,
    pub expression_weights: [f32; EXPRESSION_COUNT],
    pub expression_confidences: [f32; CONFIDENCE_COUNT],
    pub left_eye_is_valid: bool,
    pub right_eye_is_valid: bool,
    pub left_eye_pose: Pose,
    pub right_eye_pose: Pose,
    pub left_eye_confidence: f32,
    pub right_eye_confidence: f32,
}

impl FaceState {
    fn read(buf: &mut &[u8]) -> Self {
        let face_is_valid = buf.get_u8() != 0;
        let eye_following_blendshapes_valid = buf.get_u8() != 0;
        buf.advance(2);

        let mut expression_weights = [0.0; EXPRESSION_COUNT];
        for weight in expression_weights.iter_mut() {
            *weight = buf.get_f32_le();
        }
        let mut expression_confidences = [0.0; CONFIDENCE_COUNT];
        for confidence in expression_confidences.iter_mut() {
            *confidence = buf.get_f32_le();
        }

        let left_eye_is_valid = buf.get_u8() != 0;
        let right_eye_is_valid = buf.get_u8() != 0;
        buf.advance(2);

        let left_eye_pose = read_pose(buf);
        let right_eye_pose = read_pose(buf);

        Self {
            face_is_valid,
            eye_following_blendshapes_valid,
            expression_weights,
            expression_confidences,
            left_eye_is_valid,
            right_eye_is_valid,
            left_eye_pose,
            right_eye_pose,
            left_eye_confidence: buf.get_f32_le(),
            right_eye_confidence: buf.get_f32_le(),
        }
    }
}

impl SharedLayout for FaceState {
    const SIZE: usize = 332;

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut buf = &bytes[..Self::SIZE];
        Some(Self::read(&mut buf))
    }

    fn eyes(&self) -> (EyeReading, EyeReading) {
        (
            EyeReading {
                valid: self.left_eye_is_valid,
                confidence: self.left_eye_confidence,
                pose: self.left_eye_pose,
            },
            EyeReading {
                valid: self.right_eye_is_valid,
                confidence: self.right_eye_confidence,
                pose: self.right_eye_pose,
            },
        )
    }
}

/// Body tracking state; the face block sits after the hand joints.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    pub body_is_valid: bool,
    pub left_hand_active: bool,
    pub right_hand_active: bool,
    pub face: FaceState,
}

impl BodyState {
    pub const FACE_OFFSET: usize = 4 + 2 * HAND_JOINT_COUNT * POSE_SIZE;
}

impl SharedLayout for BodyState {
    const SIZE: usize = Self::FACE_OFFSET + FaceState::SIZE;

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut buf = &bytes[..Self::SIZE];
        let body_is_valid = buf.get_u8() != 0;
        let left_hand_active = buf.get_u8() != 0;
        let right_hand_active = buf.get_u8() != 0;
        buf.advance(Self::FACE_OFFSET - 3);

        Some(Self {
            body_is_valid,
            left_hand_active,
            right_hand_active,
            face: FaceState::read(&mut buf),
        })
    }

    fn eyes(&self) -> (EyeReading, EyeReading) {
        self.face.eyes()
    }
}

fn read_pose(buf: &mut &[u8]) -> Pose {
    let orientation = Quat::from_xyzw(
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
        buf.get_f32_le(),
    );
    let position = Vec3::new(buf.get_f32_le(), buf.get_f32_le(), buf.get_f32_le());
    Pose::new(orientation, position)
}

/// Serialises a face block the way the writer lays it out. Test fixtures only.
#[cfg(test)]
pub(crate) fn encode_face(state: &FaceState, out: &mut Vec<u8>) {
    use bytes::BufMut;

    fn put_pose(out: &mut Vec<u8>, pose: &Pose) {
        for c in pose.orientation.to_array() {
            out.put_f32_le(c);
        }
        for c in pose.position.to_array() {
            out.put_f32_le(c);
        }
    }

    out.put_u8(state.face_is_valid as u8);
    out.put_u8(state.eye_following_blendshapes_valid as u8);
    out.put_bytes(0, 2);
    for w in state.expression_weights {
        out.put_f32_le(w);
    }
    for c in state.expression_confidences {
        out.put_f32_le(c);
    }
    out.put_u8(state.left_eye_is_valid as u8);
    out.put_u8(state.right_eye_is_valid as u8);
    out.put_bytes(0, 2);
    put_pose(out, &state.left_eye_pose);
    put_pose(out, &state.right_eye_pose);
    out.put_f32_le(state.left_eye_confidence);
    out.put_f32_le(state.right_eye_confidence);
}

#[cfg(test)]
pub(crate) fn face_fixture(left_confidence: f32, right_confidence: f32) -> FaceState {
    FaceState {
        face_is_valid: true,
        eye_following_blendshapes_valid: true,
        expression_weights: [0.0; EXPRESSION_COUNT],
        expression_confidences: [1.0; CONFIDENCE_COUNT],
        left_eye_is_valid: true,
        right_eye_is_valid: true,
        left_eye_pose: Pose::new(Quat::from_rotation_y(0.15), Vec3::new(-0.032, 0.0, 0.0)),
        right_eye_pose: Pose::new(Quat::from_rotation_y(0.05), Vec3::new(0.032, 0.0, 0.0)),
        left_eye_confidence: left_confidence,
        right_eye_confidence: right_confidence,
    }
}
