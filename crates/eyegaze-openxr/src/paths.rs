//! Path and extension names of the eye gaze interaction profile.

pub const EYE_GAZE_INTERACTION_EXTENSION: &str = "XR_EXT_eye_gaze_interaction";
pub const EYE_TRACKING_SOCIAL_EXTENSION: &str = "XR_FB_eye_tracking_social";

pub const EYES_USER_PATH: &str = "/user/eyes_ext";
pub const GAZE_INPUT_PATH: &str = "/user/eyes_ext/input/gaze_ext";
pub const GAZE_POSE_PATH: &str = "/user/eyes_ext/input/gaze_ext/pose";
pub const EYE_GAZE_PROFILE_PATH: &str = "/interaction_profiles/ext/eye_gaze_interaction";

/// Binding targets that make an action a gaze action.
pub fn is_gaze_binding(path: &str) -> bool {
    path == GAZE_POSE_PATH || path == GAZE_INPUT_PATH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaze_bindings() {
        assert!(is_gaze_binding("/user/eyes_ext/input/gaze_ext/pose"));
        assert!(is_gaze_binding("/user/eyes_ext/input/gaze_ext"));
        assert!(!is_gaze_binding("/user/hand/left/input/aim/pose"));
        assert!(!is_gaze_binding("/user/eyes_ext"));
    }
}
