//! The next layer down: whatever the host dispatch forwards calls to.
//!
//! Structures are reduced to the fields the gaze layer reads or writes.
//! Handles are the raw `openxr::sys` handles so a host can forward them to
//! the runtime unchanged.

use openxr as xr;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemProperties {
    pub system_name: String,
    /// `XrSystemEyeGazeInteractionPropertiesEXT::supportsEyeGazeInteraction`
    pub supports_eye_gaze_interaction: bool,
    /// `XrSystemEyeTrackingPropertiesFB::supportsEyeTracking`
    pub supports_eye_tracking_social: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SuggestedBinding {
    pub action: xr::sys::Action,
    pub binding: xr::Path,
}

#[derive(Debug, Clone, Copy)]
pub struct SpaceLocation {
    pub flags: xr::SpaceLocationFlags,
    pub pose: xr::Posef,
}

impl SpaceLocation {
    pub fn untracked() -> Self {
        Self {
            flags: xr::SpaceLocationFlags::EMPTY,
            pose: eyegaze::math::identity_xr_pose(),
        }
    }

    /// Both orientation and position are valid.
    pub fn is_valid(&self) -> bool {
        self.flags.contains(
            xr::SpaceLocationFlags::ORIENTATION_VALID | xr::SpaceLocationFlags::POSITION_VALID,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionStatePose {
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    pub predicted_display_time: xr::Time,
}

#[derive(Debug, Clone, Copy)]
pub struct EyeGazeFb {
    pub is_valid: bool,
    pub pose: xr::Posef,
    pub confidence: f32,
}

/// `XrEyeGazesFB`: left eye first.
#[derive(Debug, Clone, Copy)]
pub struct EyeGazesFb {
    pub gazes: [EyeGazeFb; 2],
    pub time: xr::Time,
}

pub trait XrPlatform: Send + Sync {
    fn get_system(
        &self,
        instance: xr::sys::Instance,
        form_factor: xr::FormFactor,
    ) -> xr::Result<xr::SystemId>;

    fn get_system_properties(
        &self,
        instance: xr::sys::Instance,
        system_id: xr::SystemId,
    ) -> xr::Result<SystemProperties>;

    fn create_session(
        &self,
        instance: xr::sys::Instance,
        system_id: xr::SystemId,
    ) -> xr::Result<xr::sys::Session>;

    fn destroy_session(&self, session: xr::sys::Session) -> xr::Result<()>;

    fn string_to_path(&self, instance: xr::sys::Instance, path: &str) -> xr::Result<xr::Path>;

    fn path_to_string(&self, instance: xr::sys::Instance, path: xr::Path) -> xr::Result<String>;

    fn suggest_interaction_profile_bindings(
        &self,
        instance: xr::sys::Instance,
        interaction_profile: xr::Path,
        bindings: &[SuggestedBinding],
    ) -> xr::Result<()>;

    fn create_reference_space(
        &self,
        session: xr::sys::Session,
        space_type: xr::ReferenceSpaceType,
        pose_in_reference_space: xr::Posef,
    ) -> xr::Result<xr::sys::Space>;

    fn create_action_space(
        &self,
        session: xr::sys::Session,
        action: xr::sys::Action,
        subaction_path: xr::Path,
        pose_in_action_space: xr::Posef,
    ) -> xr::Result<xr::sys::Space>;

    fn destroy_space(&self, space: xr::sys::Space) -> xr::Result<()>;

    fn locate_space(
        &self,
        space: xr::sys::Space,
        base_space: xr::sys::Space,
        time: xr::Time,
    ) -> xr::Result<SpaceLocation>;

    fn get_action_state_pose(
        &self,
        session: xr::sys::Session,
        action: xr::sys::Action,
        subaction_path: xr::Path,
    ) -> xr::Result<ActionStatePose>;

    fn get_current_interaction_profile(
        &self,
        session: xr::sys::Session,
        top_level_user_path: xr::Path,
    ) -> xr::Result<xr::Path>;

    fn wait_frame(&self, session: xr::sys::Session) -> xr::Result<FrameState>;

    fn begin_frame(&self, session: xr::sys::Session) -> xr::Result<()>;

    fn create_eye_tracker_fb(&self, session: xr::sys::Session) -> xr::Result<xr::sys::EyeTrackerFB>;

    fn destroy_eye_tracker_fb(&self, eye_tracker: xr::sys::EyeTrackerFB) -> xr::Result<()>;

    fn get_eye_gazes_fb(
        &self,
        eye_tracker: xr::sys::EyeTrackerFB,
        base_space: xr::sys::Space,
        time: xr::Time,
    ) -> xr::Result<EyeGazesFb>;
}
