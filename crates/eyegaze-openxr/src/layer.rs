//! Eye gaze interaction emulation.
//!
//! [`GazeLayer`] sits between the application and the next layer
//! ([`XrPlatform`]). Calls unrelated to eye gaze, and every call when the
//! layer is bypassed or the runtime supports the profile natively, are
//! forwarded unchanged.
//!
//! Locks: the binding/space state has one mutex, held only for map lookups.
//! Tracker I/O and pose math happen after it is released, under the tracker
//! read lock. No two locks are held at the same time.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use eyegaze::math::{gaze_rotation, identity_xr_pose, Pose};
use eyegaze::status::{describe, set_tracker_status};
use eyegaze::{EmulationState, GazeObserver, GazeSample, GazeTracker, TracingObserver, TrackerType};
use eyegaze_common::LayerConfig;
use openxr as xr;
use xr::sys::Handle;
use tracing::{debug, info, warn};

use crate::bindings::GazeBindings;
use crate::paths::{is_gaze_binding, EYES_USER_PATH, EYE_GAZE_INTERACTION_EXTENSION, EYE_GAZE_PROFILE_PATH};
use crate::platform::{
    ActionStatePose, FrameState, SpaceLocation, SuggestedBinding, SystemProperties, XrPlatform,
};
use crate::provider::{DefaultTrackerProvider, TrackerProvider};
use crate::selector::{instantiate, select, PlatformInfo, Selection};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Flags reported for every emulated location. Gaze is orientation only,
/// but position is reported valid too so consumers can treat the space like
/// any other tracked space.
pub fn located_flags() -> xr::SpaceLocationFlags {
    xr::SpaceLocationFlags::ORIENTATION_VALID
        | xr::SpaceLocationFlags::POSITION_VALID
        | xr::SpaceLocationFlags::ORIENTATION_TRACKED
        | xr::SpaceLocationFlags::POSITION_TRACKED
}

#[derive(Debug, Default)]
struct SystemSlot {
    system_id: Option<u64>,
    tracker_type: Option<TrackerType>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    handle: u64,
    view_space: xr::sys::Space,
}

#[derive(Debug)]
struct SessionSlot {
    active: Option<ActiveSession>,
    state: EmulationState,
}

pub struct GazeLayer<P> {
    platform: Arc<P>,
    config: LayerConfig,
    provider: Box<dyn TrackerProvider>,
    observer: Arc<dyn GazeObserver>,
    bypass: AtomicBool,
    passthrough: AtomicBool,
    instance: Mutex<Option<xr::sys::Instance>>,
    system: Mutex<SystemSlot>,
    tracker: RwLock<Option<Box<dyn GazeTracker>>>,
    session: Mutex<SessionSlot>,
    bindings: Mutex<GazeBindings>,
    last_waited_time: AtomicI64,
    last_begun_time: AtomicI64,
}

impl<P: XrPlatform + 'static> GazeLayer<P> {
    pub fn new(platform: Arc<P>, config: LayerConfig) -> Self {
        let provider = DefaultTrackerProvider::new(Arc::clone(&platform), config.clone());
        Self::with_parts(platform, config, Box::new(provider), Arc::new(TracingObserver))
    }
}

impl<P: XrPlatform> GazeLayer<P> {
    pub fn with_parts(
        platform: Arc<P>,
        config: LayerConfig,
        provider: Box<dyn TrackerProvider>,
        observer: Arc<dyn GazeObserver>,
    ) -> Self {
        Self {
            platform,
            config,
            provider,
            observer,
            bypass: AtomicBool::new(false),
            passthrough: AtomicBool::new(false),
            instance: Mutex::new(None),
            system: Mutex::new(SystemSlot::default()),
            tracker: RwLock::new(None),
            session: Mutex::new(SessionSlot {
                active: None,
                state: EmulationState::Unbound,
            }),
            bindings: Mutex::new(GazeBindings::default()),
            last_waited_time: AtomicI64::new(0),
            last_begun_time: AtomicI64::new(0),
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass.load(Ordering::Acquire)
    }

    pub fn is_passthrough(&self) -> bool {
        self.passthrough.load(Ordering::Acquire)
    }

    /// Gaze handling applies: not bypassed and not deferring to the runtime.
    fn intercepting(&self) -> bool {
        !self.is_bypassed() && !self.is_passthrough()
    }

    pub fn tracker_type(&self) -> TrackerType {
        if self.is_passthrough() {
            return TrackerType::Passthrough;
        }
        lock(&self.system).tracker_type.unwrap_or(TrackerType::None)
    }

    pub fn emulation_state(&self) -> EmulationState {
        lock(&self.session).state
    }

    fn is_system_handled(&self, system_id: xr::SystemId) -> bool {
        lock(&self.system).system_id == Some(system_id.into_raw())
    }

    fn active_session(&self, session: xr::sys::Session) -> Option<ActiveSession> {
        lock(&self.session)
            .active
            .filter(|active| active.handle == session.into_raw())
    }

    fn set_state(&self, to: EmulationState) {
        let from = {
            let mut slot = lock(&self.session);
            std::mem::replace(&mut slot.state, to)
        };
        if from != to {
            info!("eye gaze emulation {} -> {}", from, to);
            self.observer.on_state_change(from, to);
        }
        set_tracker_status(describe(self.tracker_type(), to));
    }

    /// `xrCreateInstance`, after the next layer created `instance`. Without
    /// the eye gaze interaction extension the whole layer stays out of the
    /// way.
    pub fn register_instance(&self, instance: xr::sys::Instance, enabled_extensions: &[&str]) {
        let requested = enabled_extensions
            .iter()
            .any(|ext| *ext == EYE_GAZE_INTERACTION_EXTENSION);
        self.bypass.store(!requested, Ordering::Release);
        *lock(&self.instance) = Some(instance);
        if requested {
            debug!("{} requested, eye gaze layer active", EYE_GAZE_INTERACTION_EXTENSION);
        } else {
            info!(
                "{} not requested, eye gaze layer bypassed",
                EYE_GAZE_INTERACTION_EXTENSION
            );
        }
    }

    /// `xrGetSystem`. The first time a head-mounted system id is seen, the
    /// tracker for it is selected.
    pub fn get_system(
        &self,
        instance: xr::sys::Instance,
        form_factor: xr::FormFactor,
    ) -> xr::Result<xr::SystemId> {
        let system_id = self.platform.get_system(instance, form_factor)?;
        if self.is_bypassed() || form_factor != xr::FormFactor::HEAD_MOUNTED_DISPLAY {
            return Ok(system_id);
        }
        if self.is_system_handled(system_id) {
            return Ok(system_id);
        }

        let props = self.platform.get_system_properties(instance, system_id)?;
        info!("OpenXR system: {}", props.system_name);
        let info = PlatformInfo::from(&props);

        let (tracker, tracker_type) = match select(&info, self.config.simulate_tracker) {
            Selection::Passthrough => {
                self.passthrough.store(true, Ordering::Release);
                self.observer.on_passthrough(&info.system_name);
                (None, TrackerType::Passthrough)
            }
            Selection::Candidates(candidates) => {
                self.passthrough.store(false, Ordering::Release);
                let tracker = instantiate(&candidates, self.provider.as_ref(), self.observer.as_ref());
                let tracker_type = tracker
                    .as_ref()
                    .map(|t| t.tracker_type())
                    .unwrap_or(TrackerType::None);
                if tracker.is_none() {
                    info!("no eye tracker available for {}", info.system_name);
                }
                (tracker, tracker_type)
            }
        };

        *write(&self.tracker) = tracker;
        {
            let mut system = lock(&self.system);
            system.system_id = Some(system_id.into_raw());
            system.tracker_type = Some(tracker_type);
        }
        set_tracker_status(describe(tracker_type, self.emulation_state()));
        Ok(system_id)
    }

    /// `xrGetSystemProperties`. Advertises eye gaze interaction exactly when
    /// a tracker backs the system.
    pub fn get_system_properties(
        &self,
        instance: xr::sys::Instance,
        system_id: xr::SystemId,
    ) -> xr::Result<SystemProperties> {
        let mut props = self.platform.get_system_properties(instance, system_id)?;
        if self.intercepting() && self.is_system_handled(system_id) {
            props.supports_eye_gaze_interaction = read(&self.tracker).is_some();
        }
        Ok(props)
    }

    pub fn create_session(
        &self,
        instance: xr::sys::Instance,
        system_id: xr::SystemId,
    ) -> xr::Result<xr::sys::Session> {
        let session = self.platform.create_session(instance, system_id)?;
        if !self.intercepting() || !self.is_system_handled(system_id) {
            return Ok(session);
        }

        let view_space = match self.platform.create_reference_space(
            session,
            xr::ReferenceSpaceType::VIEW,
            identity_xr_pose(),
        ) {
            Ok(space) => space,
            Err(e) => {
                warn!("cannot create view space, eye gaze disabled for this session: {}", e);
                return Ok(session);
            }
        };
        lock(&self.session).active = Some(ActiveSession {
            handle: session.into_raw(),
            view_space,
        });

        let bound = {
            let mut tracker = write(&self.tracker);
            match tracker.as_mut().map(|t| (t.tracker_type(), t.start(session))) {
                Some((tracker_type, Ok(()))) => Some(tracker_type),
                Some((tracker_type, Err(e))) => {
                    warn!("{} failed to start: {}", tracker_type, e);
                    self.observer
                        .on_tracker_unavailable(tracker_type, &e.to_string());
                    *tracker = None;
                    None
                }
                None => None,
            }
        };

        match bound {
            Some(tracker_type) => self.set_state(EmulationState::Bound(tracker_type)),
            None => {
                lock(&self.system).tracker_type = Some(TrackerType::None);
                self.set_state(EmulationState::Unbound);
            }
        }
        Ok(session)
    }

    pub fn destroy_session(&self, session: xr::sys::Session) -> xr::Result<()> {
        self.platform.destroy_session(session)?;

        let was_active = {
            let mut slot = lock(&self.session);
            let matches = slot
                .active
                .is_some_and(|active| active.handle == session.into_raw());
            if matches {
                slot.active = None;
            }
            matches
        };
        if !was_active {
            return Ok(());
        }

        if self.emulation_state().is_bound() {
            if let Some(tracker) = write(&self.tracker).as_mut() {
                tracker.stop();
            }
            self.set_state(EmulationState::Stopped);
        }
        Ok(())
    }

    /// `xrSuggestInteractionProfileBindings`. The eye gaze profile is
    /// consumed here; the runtime would reject it as unknown.
    pub fn suggest_interaction_profile_bindings(
        &self,
        instance: xr::sys::Instance,
        interaction_profile: xr::Path,
        bindings: &[SuggestedBinding],
    ) -> xr::Result<()> {
        let forward = || {
            self.platform
                .suggest_interaction_profile_bindings(instance, interaction_profile, bindings)
        };
        if !self.intercepting() {
            return forward();
        }
        if self.platform.path_to_string(instance, interaction_profile)? != EYE_GAZE_PROFILE_PATH {
            return forward();
        }

        let mut gaze_actions = Vec::new();
        for binding in bindings {
            match self.platform.path_to_string(instance, binding.binding) {
                Ok(path) if is_gaze_binding(&path) => gaze_actions.push(binding.action),
                Ok(path) => debug!("ignoring eye gaze profile binding {}", path),
                Err(e) => debug!("unresolvable binding path: {}", e),
            }
        }

        let mut state = lock(&self.bindings);
        for action in gaze_actions {
            state.add_action(action);
        }
        Ok(())
    }

    /// `xrCreateActionSpace`. The space is created by the runtime; its action
    /// and offset are remembered for locating it later.
    pub fn create_action_space(
        &self,
        session: xr::sys::Session,
        action: xr::sys::Action,
        subaction_path: xr::Path,
        pose_in_action_space: xr::Posef,
    ) -> xr::Result<xr::sys::Space> {
        let space = self.platform.create_action_space(
            session,
            action,
            subaction_path,
            pose_in_action_space,
        )?;
        if self.intercepting() && self.active_session(session).is_some() {
            lock(&self.bindings).track_space(space, action, Pose::from_xr(pose_in_action_space));
        }
        Ok(space)
    }

    pub fn destroy_space(&self, space: xr::sys::Space) -> xr::Result<()> {
        if self.intercepting() && lock(&self.bindings).remove_space(space) {
            return Ok(());
        }
        self.platform.destroy_space(space)
    }

    pub fn locate_space(
        &self,
        space: xr::sys::Space,
        base_space: xr::sys::Space,
        time: xr::Time,
    ) -> xr::Result<SpaceLocation> {
        if !self.intercepting() {
            return self.platform.locate_space(space, base_space, time);
        }

        let (query_offset, base_offset) = {
            let mut bindings = lock(&self.bindings);
            (bindings.resolve(space), bindings.resolve(base_space))
        };

        if query_offset.is_none() && base_offset.is_none() {
            return self.platform.locate_space(space, base_space, time);
        }
        // Gaze spaces stay untracked until a tracker is bound.
        if !self.emulation_state().is_bound() {
            return Ok(SpaceLocation::untracked());
        }

        match (query_offset, base_offset) {
            (None, None) => self.platform.locate_space(space, base_space, time),
            (Some(query), Some(base)) => Ok(SpaceLocation {
                flags: located_flags(),
                pose: query.multiply(base.inverse()).to_xr(),
            }),
            (Some(query), None) => self.locate_gaze(query, base_space, time, false),
            (None, Some(base)) => self.locate_gaze(base, space, time, true),
        }
    }

    /// Locates a gaze space against a regular `other` space. With
    /// `gaze_is_base` the result is `other` relative to the gaze space.
    fn locate_gaze(
        &self,
        offset: Pose,
        other: xr::sys::Space,
        time: xr::Time,
        gaze_is_base: bool,
    ) -> xr::Result<SpaceLocation> {
        let Some(direction) = self.sample(time).direction() else {
            return Ok(SpaceLocation::untracked());
        };
        let Some(view_space) = lock(&self.session).active.map(|a| a.view_space) else {
            return Ok(SpaceLocation::untracked());
        };

        let view_in_other = self.platform.locate_space(view_space, other, time)?;
        if !view_in_other.is_valid() {
            return Ok(SpaceLocation::untracked());
        }

        let gaze_in_view = Pose::from_rotation(gaze_rotation(direction));
        // The action space offset is expressed in view space, after the gaze
        // rotation.
        let gaze_in_other = gaze_in_view
            .multiply(offset)
            .multiply(Pose::from_xr(view_in_other.pose));
        let pose = if gaze_is_base {
            gaze_in_other.inverse()
        } else {
            gaze_in_other
        };

        Ok(SpaceLocation {
            flags: located_flags(),
            pose: pose.to_xr(),
        })
    }

    /// `xrGetActionStatePose`. A gaze action is active while the tracker has
    /// gaze at the last begun frame.
    pub fn get_action_state_pose(
        &self,
        session: xr::sys::Session,
        action: xr::sys::Action,
        subaction_path: xr::Path,
    ) -> xr::Result<ActionStatePose> {
        let is_gaze_action = self.intercepting()
            && self.active_session(session).is_some()
            && lock(&self.bindings).is_gaze_action(action);
        if !is_gaze_action {
            return self
                .platform
                .get_action_state_pose(session, action, subaction_path);
        }

        let time = xr::Time::from_nanos(self.last_begun_time.load(Ordering::Acquire));
        Ok(ActionStatePose {
            is_active: self.is_gaze_available(time),
        })
    }

    pub fn get_current_interaction_profile(
        &self,
        session: xr::sys::Session,
        top_level_user_path: xr::Path,
    ) -> xr::Result<xr::Path> {
        let instance = *lock(&self.instance);
        if let Some(instance) = instance {
            if self.intercepting()
                && self.active_session(session).is_some()
                && self.emulation_state().is_bound()
                && self.platform.path_to_string(instance, top_level_user_path)? == EYES_USER_PATH
            {
                return self.platform.string_to_path(instance, EYE_GAZE_PROFILE_PATH);
            }
        }
        self.platform
            .get_current_interaction_profile(session, top_level_user_path)
    }

    pub fn wait_frame(&self, session: xr::sys::Session) -> xr::Result<FrameState> {
        let frame = self.platform.wait_frame(session)?;
        if self.active_session(session).is_some() {
            self.last_waited_time
                .store(frame.predicted_display_time.as_nanos(), Ordering::Release);
        }
        Ok(frame)
    }

    pub fn begin_frame(&self, session: xr::sys::Session) -> xr::Result<()> {
        self.platform.begin_frame(session)?;
        if self.active_session(session).is_some() {
            let waited = self.last_waited_time.load(Ordering::Acquire);
            self.last_begun_time.store(waited, Ordering::Release);
        }
        Ok(())
    }

    fn is_gaze_available(&self, time: xr::Time) -> bool {
        if !self.emulation_state().is_bound() {
            return false;
        }
        read(&self.tracker)
            .as_ref()
            .is_some_and(|tracker| tracker.is_gaze_available(time))
    }

    fn sample(&self, time: xr::Time) -> GazeSample {
        if !self.emulation_state().is_bound() {
            return GazeSample::INVALID;
        }
        let tracker = read(&self.tracker);
        let Some(tracker) = tracker.as_ref() else {
            return GazeSample::INVALID;
        };
        let sample = tracker.gaze(time);
        self.observer.on_sample(tracker.tracker_type(), sample.valid);
        sample
    }
}
