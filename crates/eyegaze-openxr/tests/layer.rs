use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use eyegaze::math::{identity_xr_pose, Pose};
use eyegaze::{
    EmulationState, GazeError, GazeResult, GazeSample, GazeTracker, NullObserver, TrackerType,
};
use eyegaze_common::LayerConfig;
use eyegaze_openxr::paths::{
    EYES_USER_PATH, EYE_GAZE_INTERACTION_EXTENSION, EYE_GAZE_PROFILE_PATH, GAZE_POSE_PATH,
};
use eyegaze_openxr::{
    located_flags, ActionStatePose, BackendConfig, EyeGazesFb, FrameState, GazeLayer,
    SpaceLocation, SuggestedBinding, SystemProperties, TrackerProvider, XrPlatform,
};
use glam::{Quat, Vec3};
use openxr as xr;
use xr::sys::Handle;

const SYSTEM: u64 = 1;
const SESSION: u64 = 100;
const VIEW_SPACE: u64 = 200;
const STAGE_SPACE: u64 = 201;
const GAZE_ACTION: u64 = 7;
const HAND_ACTION: u64 = 8;
const PREDICTED_TIME: i64 = 123_456;

fn instance() -> xr::sys::Instance {
    xr::sys::Instance::from_raw(1)
}

fn session() -> xr::sys::Session {
    xr::sys::Session::from_raw(SESSION)
}

fn space(raw: u64) -> xr::sys::Space {
    xr::sys::Space::from_raw(raw)
}

fn action(raw: u64) -> xr::sys::Action {
    xr::sys::Action::from_raw(raw)
}

struct FakePlatform {
    props: SystemProperties,
    calls: Mutex<Vec<String>>,
    paths: Mutex<HashMap<String, u64>>,
    next_space: AtomicU64,
    view_location: Mutex<SpaceLocation>,
}

impl FakePlatform {
    fn new(system_name: &str, native: bool) -> Self {
        Self {
            props: SystemProperties {
                system_name: system_name.to_string(),
                supports_eye_gaze_interaction: native,
                supports_eye_tracking_social: false,
            },
            calls: Mutex::new(Vec::new()),
            paths: Mutex::new(HashMap::new()),
            next_space: AtomicU64::new(300),
            view_location: Mutex::new(SpaceLocation {
                flags: located_flags(),
                pose: identity_xr_pose(),
            }),
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn was_called(&self, call: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == call)
    }

    fn path(&self, path: &str) -> xr::Path {
        let mut paths = self.paths.lock().unwrap();
        let next = paths.len() as u64 + 1;
        xr::Path::from_raw(*paths.entry(path.to_string()).or_insert(next))
    }

    fn set_view_location(&self, location: SpaceLocation) {
        *self.view_location.lock().unwrap() = location;
    }
}

impl XrPlatform for FakePlatform {
    fn get_system(
        &self,
        _instance: xr::sys::Instance,
        _form_factor: xr::FormFactor,
    ) -> xr::Result<xr::SystemId> {
        self.record("get_system");
        Ok(xr::SystemId::from_raw(SYSTEM))
    }

    fn get_system_properties(
        &self,
        _instance: xr::sys::Instance,
        _system_id: xr::SystemId,
    ) -> xr::Result<SystemProperties> {
        Ok(self.props.clone())
    }

    fn create_session(
        &self,
        _instance: xr::sys::Instance,
        _system_id: xr::SystemId,
    ) -> xr::Result<xr::sys::Session> {
        Ok(session())
    }

    fn destroy_session(&self, _session: xr::sys::Session) -> xr::Result<()> {
        self.record("destroy_session");
        Ok(())
    }

    fn string_to_path(&self, _instance: xr::sys::Instance, path: &str) -> xr::Result<xr::Path> {
        Ok(self.path(path))
    }

    fn path_to_string(&self, _instance: xr::sys::Instance, path: xr::Path) -> xr::Result<String> {
        self.paths
            .lock()
            .unwrap()
            .iter()
            .find(|(_, raw)| **raw == path.into_raw())
            .map(|(name, _)| name.clone())
            .ok_or(xr::sys::Result::ERROR_PATH_INVALID)
    }

    fn suggest_interaction_profile_bindings(
        &self,
        _instance: xr::sys::Instance,
        _interaction_profile: xr::Path,
        _bindings: &[SuggestedBinding],
    ) -> xr::Result<()> {
        self.record("suggest_interaction_profile_bindings");
        Ok(())
    }

    fn create_reference_space(
        &self,
        _session: xr::sys::Session,
        space_type: xr::ReferenceSpaceType,
        _pose_in_reference_space: xr::Posef,
    ) -> xr::Result<xr::sys::Space> {
        assert_eq!(space_type, xr::ReferenceSpaceType::VIEW);
        self.record("create_reference_space");
        Ok(space(VIEW_SPACE))
    }

    fn create_action_space(
        &self,
        _session: xr::sys::Session,
        _action: xr::sys::Action,
        _subaction_path: xr::Path,
        _pose_in_action_space: xr::Posef,
    ) -> xr::Result<xr::sys::Space> {
        self.record("create_action_space");
        Ok(space(self.next_space.fetch_add(1, Ordering::SeqCst)))
    }

    fn destroy_space(&self, space: xr::sys::Space) -> xr::Result<()> {
        self.record(format!("destroy_space {}", space.into_raw()));
        Ok(())
    }

    fn locate_space(
        &self,
        space: xr::sys::Space,
        base_space: xr::sys::Space,
        _time: xr::Time,
    ) -> xr::Result<SpaceLocation> {
        self.record(format!(
            "locate_space {} {}",
            space.into_raw(),
            base_space.into_raw()
        ));
        if space.into_raw() == VIEW_SPACE {
            return Ok(*self.view_location.lock().unwrap());
        }
        Ok(SpaceLocation::untracked())
    }

    fn get_action_state_pose(
        &self,
        _session: xr::sys::Session,
        _action: xr::sys::Action,
        _subaction_path: xr::Path,
    ) -> xr::Result<ActionStatePose> {
        self.record("get_action_state_pose");
        Ok(ActionStatePose { is_active: false })
    }

    fn get_current_interaction_profile(
        &self,
        _session: xr::sys::Session,
        _top_level_user_path: xr::Path,
    ) -> xr::Result<xr::Path> {
        self.record("get_current_interaction_profile");
        Ok(xr::Path::from_raw(0))
    }

    fn wait_frame(&self, _session: xr::sys::Session) -> xr::Result<FrameState> {
        Ok(FrameState {
            predicted_display_time: xr::Time::from_nanos(PREDICTED_TIME),
        })
    }

    fn begin_frame(&self, _session: xr::sys::Session) -> xr::Result<()> {
        Ok(())
    }

    fn create_eye_tracker_fb(
        &self,
        _session: xr::sys::Session,
    ) -> xr::Result<xr::sys::EyeTrackerFB> {
        Err(xr::sys::Result::ERROR_FEATURE_UNSUPPORTED)
    }

    fn destroy_eye_tracker_fb(&self, _eye_tracker: xr::sys::EyeTrackerFB) -> xr::Result<()> {
        Ok(())
    }

    fn get_eye_gazes_fb(
        &self,
        _eye_tracker: xr::sys::EyeTrackerFB,
        _base_space: xr::sys::Space,
        _time: xr::Time,
    ) -> xr::Result<EyeGazesFb> {
        Err(xr::sys::Result::ERROR_FEATURE_UNSUPPORTED)
    }
}

/// Shared handle the test uses to steer a [`FakeTracker`] after the layer
/// took ownership of it.
#[derive(Default)]
struct TrackerControl {
    direction: Mutex<Option<Vec3>>,
    fail_start: bool,
    started: Mutex<u32>,
    stopped: Mutex<u32>,
    sampled_at: Mutex<Vec<i64>>,
}

impl TrackerControl {
    fn set_direction(&self, direction: Option<Vec3>) {
        *self.direction.lock().unwrap() = direction;
    }
}

struct FakeTracker {
    control: Arc<TrackerControl>,
    tracker_type: TrackerType,
}

impl GazeTracker for FakeTracker {
    fn start(&mut self, _session: xr::sys::Session) -> GazeResult<()> {
        if self.control.fail_start {
            return Err(GazeError::backend("device disconnected"));
        }
        *self.control.started.lock().unwrap() += 1;
        Ok(())
    }

    fn stop(&mut self) {
        *self.control.stopped.lock().unwrap() += 1;
    }

    fn is_gaze_available(&self, time: xr::Time) -> bool {
        self.control.sampled_at.lock().unwrap().push(time.as_nanos());
        self.control.direction.lock().unwrap().is_some()
    }

    fn gaze(&self, _time: xr::Time) -> GazeSample {
        match *self.control.direction.lock().unwrap() {
            Some(direction) => GazeSample::new(direction),
            None => GazeSample::INVALID,
        }
    }

    fn tracker_type(&self) -> TrackerType {
        self.tracker_type
    }
}

struct FakeProvider {
    available: Vec<BackendConfig>,
    control: Arc<TrackerControl>,
    requested: Arc<Mutex<Vec<BackendConfig>>>,
}

impl TrackerProvider for FakeProvider {
    fn create(&self, backend: BackendConfig) -> GazeResult<Box<dyn GazeTracker>> {
        self.requested.lock().unwrap().push(backend);
        if !self.available.contains(&backend) {
            return Err(GazeError::not_supported("not connected"));
        }
        Ok(Box::new(FakeTracker {
            control: Arc::clone(&self.control),
            tracker_type: backend.tracker_type(),
        }))
    }
}

struct Harness {
    layer: GazeLayer<FakePlatform>,
    platform: Arc<FakePlatform>,
    control: Arc<TrackerControl>,
    requested: Arc<Mutex<Vec<BackendConfig>>>,
}

impl Harness {
    fn build(
        platform: FakePlatform,
        config: LayerConfig,
        available: Vec<BackendConfig>,
        control: TrackerControl,
    ) -> Self {
        let platform = Arc::new(platform);
        let control = Arc::new(control);
        let requested = Arc::new(Mutex::new(Vec::new()));
        let provider = FakeProvider {
            available,
            control: Arc::clone(&control),
            requested: Arc::clone(&requested),
        };
        let layer = GazeLayer::with_parts(
            Arc::clone(&platform),
            config,
            Box::new(provider),
            Arc::new(NullObserver),
        );
        Self {
            layer,
            platform,
            control,
            requested,
        }
    }

    /// A SteamVR system with Steam Link gaze available.
    fn steam_link() -> Self {
        Self::build(
            FakePlatform::new("SteamVR/OpenXR : lighthouse", false),
            LayerConfig::default(),
            vec![BackendConfig::SteamLink],
            TrackerControl::default(),
        )
    }

    /// Instance with the extension enabled, system selected, session created.
    fn open(self) -> Self {
        self.layer
            .register_instance(instance(), &[EYE_GAZE_INTERACTION_EXTENSION]);
        let system = self
            .layer
            .get_system(instance(), xr::FormFactor::HEAD_MOUNTED_DISPLAY)
            .unwrap();
        self.layer.create_session(instance(), system).unwrap();
        self
    }

    fn suggest_gaze_binding(&self, gaze_action: u64) {
        let profile = self.platform.path(EYE_GAZE_PROFILE_PATH);
        let bindings = [SuggestedBinding {
            action: action(gaze_action),
            binding: self.platform.path(GAZE_POSE_PATH),
        }];
        self.layer
            .suggest_interaction_profile_bindings(instance(), profile, &bindings)
            .unwrap();
    }

    fn action_space(&self, raw_action: u64, offset: Pose) -> xr::sys::Space {
        self.layer
            .create_action_space(session(), action(raw_action), xr::Path::from_raw(0), offset.to_xr())
            .unwrap()
    }

    fn locate(&self, space: xr::sys::Space, base: xr::sys::Space) -> SpaceLocation {
        self.layer
            .locate_space(space, base, xr::Time::from_nanos(PREDICTED_TIME))
            .unwrap()
    }
}

fn forward(pose: xr::Posef) -> Vec3 {
    Pose::from_xr(pose).orientation * Vec3::NEG_Z
}

#[test]
fn native_support_passes_everything_through() {
    let harness = Harness::build(
        FakePlatform::new("Varjo XR-4", true),
        LayerConfig {
            simulate_tracker: Some(true),
            ..LayerConfig::default()
        },
        vec![BackendConfig::Simulated],
        TrackerControl::default(),
    )
    .open();

    assert!(harness.layer.is_passthrough());
    assert_eq!(harness.layer.tracker_type(), TrackerType::Passthrough);
    assert!(harness.requested.lock().unwrap().is_empty());
    assert!(!harness.platform.was_called("create_reference_space"));

    harness.suggest_gaze_binding(GAZE_ACTION);
    assert!(harness
        .platform
        .was_called("suggest_interaction_profile_bindings"));

    let gaze = harness.action_space(GAZE_ACTION, Pose::IDENTITY);
    assert!(harness.platform.was_called("create_action_space"));

    harness.locate(gaze, space(STAGE_SPACE));
    assert!(harness.platform.was_called(&format!(
        "locate_space {} {}",
        gaze.into_raw(),
        STAGE_SPACE
    )));

    harness
        .layer
        .get_action_state_pose(session(), action(GAZE_ACTION), xr::Path::from_raw(0))
        .unwrap();
    assert!(harness.platform.was_called("get_action_state_pose"));

    let eyes = harness.platform.path(EYES_USER_PATH);
    harness
        .layer
        .get_current_interaction_profile(session(), eyes)
        .unwrap();
    assert!(harness
        .platform
        .was_called("get_current_interaction_profile"));

    harness.layer.destroy_space(gaze).unwrap();
    assert!(harness
        .platform
        .was_called(&format!("destroy_space {}", gaze.into_raw())));

    let props = harness
        .layer
        .get_system_properties(instance(), xr::SystemId::from_raw(SYSTEM))
        .unwrap();
    assert!(props.supports_eye_gaze_interaction);
}

#[test]
fn layer_is_bypassed_without_the_extension() {
    let harness = Harness::steam_link();
    harness.layer.register_instance(instance(), &["XR_KHR_vulkan_enable2"]);
    let system = harness
        .layer
        .get_system(instance(), xr::FormFactor::HEAD_MOUNTED_DISPLAY)
        .unwrap();
    harness.layer.create_session(instance(), system).unwrap();

    assert!(harness.layer.is_bypassed());
    assert!(harness.requested.lock().unwrap().is_empty());

    harness.suggest_gaze_binding(GAZE_ACTION);
    assert!(harness
        .platform
        .was_called("suggest_interaction_profile_bindings"));
}

#[test]
fn selection_falls_through_unavailable_candidates() {
    let harness = Harness::steam_link().open();

    assert_eq!(
        *harness.requested.lock().unwrap(),
        vec![
            BackendConfig::Varjo,
            BackendConfig::VirtualDesktop(eyegaze_openxr::SharedLayoutKind::Body),
            BackendConfig::VirtualDesktop(eyegaze_openxr::SharedLayoutKind::Face),
            BackendConfig::SteamLink,
        ]
    );
    assert_eq!(harness.layer.tracker_type(), TrackerType::SteamLink);
    assert_eq!(
        harness.layer.emulation_state(),
        EmulationState::Bound(TrackerType::SteamLink)
    );
    assert_eq!(*harness.control.started.lock().unwrap(), 1);
    assert!(harness.platform.was_called("create_reference_space"));
}

#[test]
fn system_properties_advertise_emulated_support() {
    let harness = Harness::steam_link().open();
    let props = harness
        .layer
        .get_system_properties(instance(), xr::SystemId::from_raw(SYSTEM))
        .unwrap();
    assert!(props.supports_eye_gaze_interaction);

    let without_tracker = Harness::build(
        FakePlatform::new("SteamVR/OpenXR : lighthouse", false),
        LayerConfig::default(),
        Vec::new(),
        TrackerControl::default(),
    )
    .open();
    let props = without_tracker
        .layer
        .get_system_properties(instance(), xr::SystemId::from_raw(SYSTEM))
        .unwrap();
    assert!(!props.supports_eye_gaze_interaction);
    assert_eq!(without_tracker.layer.tracker_type(), TrackerType::None);
    assert_eq!(
        without_tracker.layer.emulation_state(),
        EmulationState::Unbound
    );
}

#[test]
fn start_failure_leaves_layer_unbound() {
    let harness = Harness::build(
        FakePlatform::new("SteamVR/OpenXR : lighthouse", false),
        LayerConfig::default(),
        vec![BackendConfig::SteamLink],
        TrackerControl {
            fail_start: true,
            ..TrackerControl::default()
        },
    )
    .open();

    assert_eq!(harness.layer.emulation_state(), EmulationState::Unbound);
    assert_eq!(harness.layer.tracker_type(), TrackerType::None);

    harness.suggest_gaze_binding(GAZE_ACTION);
    let state = harness
        .layer
        .get_action_state_pose(session(), action(GAZE_ACTION), xr::Path::from_raw(0))
        .unwrap();
    assert!(!state.is_active);
}

#[test]
fn gaze_profile_bindings_are_consumed() {
    let harness = Harness::steam_link().open();
    harness.suggest_gaze_binding(GAZE_ACTION);
    assert!(!harness
        .platform
        .was_called("suggest_interaction_profile_bindings"));

    let other_profile = harness
        .platform
        .path("/interaction_profiles/khr/simple_controller");
    harness
        .layer
        .suggest_interaction_profile_bindings(instance(), other_profile, &[])
        .unwrap();
    assert!(harness
        .platform
        .was_called("suggest_interaction_profile_bindings"));
}

#[test]
fn two_gaze_spaces_locate_relative_to_each_other() {
    let harness = Harness::steam_link().open();
    harness.suggest_gaze_binding(GAZE_ACTION);
    let a = harness.action_space(GAZE_ACTION, Pose::IDENTITY);
    let b = harness.action_space(GAZE_ACTION, Pose::IDENTITY);

    let location = harness.locate(a, b);
    assert_eq!(location.flags, located_flags());
    assert!(Pose::from_xr(location.pose).abs_diff_eq(Pose::IDENTITY, 1e-6));

    let offset = Pose::new(Quat::IDENTITY, Vec3::new(0.0, 0.0, -0.5));
    let c = harness.action_space(GAZE_ACTION, offset);
    let location = harness.locate(c, a);
    assert!(Pose::from_xr(location.pose).abs_diff_eq(offset, 1e-6));

    // No tracker query and nothing forwarded.
    assert!(harness.control.sampled_at.lock().unwrap().is_empty());
    assert!(!harness
        .platform
        .was_called(&format!("locate_space {} {}", a.into_raw(), b.into_raw())));
}

#[test]
fn gaze_space_follows_tracker_direction() {
    let harness = Harness::steam_link().open();
    harness.suggest_gaze_binding(GAZE_ACTION);
    let gaze = harness.action_space(GAZE_ACTION, Pose::IDENTITY);
    harness.platform.set_view_location(SpaceLocation {
        flags: located_flags(),
        pose: Pose::new(Quat::IDENTITY, Vec3::new(0.0, 1.6, 0.0)).to_xr(),
    });

    harness.control.set_direction(Some(Vec3::new(0.5, 0.0, -1.0)));
    let location = harness.locate(gaze, space(STAGE_SPACE));
    assert_eq!(location.flags, located_flags());
    let pose = Pose::from_xr(location.pose);
    assert!(pose.position.abs_diff_eq(Vec3::new(0.0, 1.6, 0.0), 1e-5));
    assert!(forward(location.pose).abs_diff_eq(Vec3::new(0.5, 0.0, -1.0).normalize(), 1e-5));
    assert!(harness.platform.was_called(&format!(
        "locate_space {} {}",
        VIEW_SPACE, STAGE_SPACE
    )));

    let inverted = harness.locate(space(STAGE_SPACE), gaze);
    assert_eq!(inverted.flags, located_flags());
    assert!(Pose::from_xr(inverted.pose)
        .multiply(pose)
        .abs_diff_eq(Pose::IDENTITY, 1e-5));
}

#[test]
fn action_space_offset_applies_in_view_space() {
    let harness = Harness::steam_link().open();
    harness.suggest_gaze_binding(GAZE_ACTION);
    let offset = Pose::new(Quat::IDENTITY, Vec3::new(0.0, 0.0, -0.5));
    let gaze = harness.action_space(GAZE_ACTION, offset);

    harness.control.set_direction(Some(Vec3::new(1.0, 0.0, -1.0)));
    let location = harness.locate(gaze, space(STAGE_SPACE));
    assert_eq!(location.flags, located_flags());
    let pose = Pose::from_xr(location.pose);
    assert!(pose.position.abs_diff_eq(Vec3::new(0.0, 0.0, -0.5), 1e-5));
    assert!(forward(location.pose).abs_diff_eq(Vec3::new(1.0, 0.0, -1.0).normalize(), 1e-5));
}

#[test]
fn gaze_spaces_are_untracked_without_a_tracker() {
    let harness = Harness::build(
        FakePlatform::new("SteamVR/OpenXR : lighthouse", false),
        LayerConfig::default(),
        Vec::new(),
        TrackerControl::default(),
    )
    .open();
    assert!(!harness.layer.emulation_state().is_bound());

    harness.suggest_gaze_binding(GAZE_ACTION);
    let a = harness.action_space(GAZE_ACTION, Pose::IDENTITY);
    let b = harness.action_space(GAZE_ACTION, Pose::IDENTITY);

    assert_eq!(harness.locate(a, b).flags, xr::SpaceLocationFlags::EMPTY);
    assert_eq!(
        harness.locate(a, space(STAGE_SPACE)).flags,
        xr::SpaceLocationFlags::EMPTY
    );
    assert_eq!(
        harness.locate(space(STAGE_SPACE), a).flags,
        xr::SpaceLocationFlags::EMPTY
    );
    assert!(!harness
        .platform
        .was_called(&format!("locate_space {} {}", a.into_raw(), b.into_raw())));
}

#[test]
fn unavailable_gaze_reports_no_flags() {
    let harness = Harness::steam_link().open();
    harness.suggest_gaze_binding(GAZE_ACTION);
    let gaze = harness.action_space(GAZE_ACTION, Pose::IDENTITY);

    harness.control.set_direction(None);
    let location = harness.locate(gaze, space(STAGE_SPACE));
    assert_eq!(location.flags, xr::SpaceLocationFlags::EMPTY);

    harness.control.set_direction(Some(Vec3::NEG_Z));
    harness.platform.set_view_location(SpaceLocation::untracked());
    let location = harness.locate(gaze, space(STAGE_SPACE));
    assert_eq!(location.flags, xr::SpaceLocationFlags::EMPTY);
}

#[test]
fn non_gaze_spaces_are_forwarded() {
    let harness = Harness::steam_link().open();
    harness.suggest_gaze_binding(GAZE_ACTION);
    let hand = harness.action_space(HAND_ACTION, Pose::IDENTITY);

    harness.locate(hand, space(STAGE_SPACE));
    assert!(harness.platform.was_called(&format!(
        "locate_space {} {}",
        hand.into_raw(),
        STAGE_SPACE
    )));
}

#[test]
fn space_created_before_bindings_becomes_gaze_space() {
    let harness = Harness::steam_link().open();
    let gaze = harness.action_space(GAZE_ACTION, Pose::IDENTITY);
    let other = harness.action_space(GAZE_ACTION, Pose::IDENTITY);

    // Located once before the binding exists: forwarded as a regular space.
    harness.locate(gaze, space(STAGE_SPACE));
    assert!(harness.platform.was_called(&format!(
        "locate_space {} {}",
        gaze.into_raw(),
        STAGE_SPACE
    )));

    harness.suggest_gaze_binding(GAZE_ACTION);
    let location = harness.locate(gaze, other);
    assert_eq!(location.flags, located_flags());
}

#[test]
fn action_state_uses_last_begun_frame_time() {
    let harness = Harness::steam_link().open();
    harness.suggest_gaze_binding(GAZE_ACTION);

    harness.layer.wait_frame(session()).unwrap();
    harness.layer.begin_frame(session()).unwrap();

    harness.control.set_direction(Some(Vec3::NEG_Z));
    let state = harness
        .layer
        .get_action_state_pose(session(), action(GAZE_ACTION), xr::Path::from_raw(0))
        .unwrap();
    assert!(state.is_active);
    assert_eq!(
        *harness.control.sampled_at.lock().unwrap(),
        vec![PREDICTED_TIME]
    );

    harness.control.set_direction(None);
    let state = harness
        .layer
        .get_action_state_pose(session(), action(GAZE_ACTION), xr::Path::from_raw(0))
        .unwrap();
    assert!(!state.is_active);
    assert!(!harness.platform.was_called("get_action_state_pose"));

    harness
        .layer
        .get_action_state_pose(session(), action(HAND_ACTION), xr::Path::from_raw(0))
        .unwrap();
    assert!(harness.platform.was_called("get_action_state_pose"));
}

#[test]
fn eyes_user_path_reports_gaze_profile() {
    let harness = Harness::steam_link().open();
    let eyes = harness.platform.path(EYES_USER_PATH);
    let profile = harness
        .layer
        .get_current_interaction_profile(session(), eyes)
        .unwrap();
    assert_eq!(profile, harness.platform.path(EYE_GAZE_PROFILE_PATH));
    assert!(!harness
        .platform
        .was_called("get_current_interaction_profile"));

    let left_hand = harness.platform.path("/user/hand/left");
    harness
        .layer
        .get_current_interaction_profile(session(), left_hand)
        .unwrap();
    assert!(harness
        .platform
        .was_called("get_current_interaction_profile"));
}

#[test]
fn tracked_space_destruction_is_not_forwarded() {
    let harness = Harness::steam_link().open();
    let gaze = harness.action_space(GAZE_ACTION, Pose::IDENTITY);

    harness.layer.destroy_space(gaze).unwrap();
    assert!(!harness
        .platform
        .was_called(&format!("destroy_space {}", gaze.into_raw())));

    harness.layer.destroy_space(space(STAGE_SPACE)).unwrap();
    assert!(harness
        .platform
        .was_called(&format!("destroy_space {}", STAGE_SPACE)));
}

#[test]
fn destroying_the_session_stops_the_tracker() {
    let harness = Harness::steam_link().open();
    harness.layer.destroy_session(session()).unwrap();

    assert!(harness.platform.was_called("destroy_session"));
    assert_eq!(*harness.control.stopped.lock().unwrap(), 1);
    assert_eq!(harness.layer.emulation_state(), EmulationState::Stopped);
}
