use tracing::{debug, info, trace, warn};

use crate::{EmulationState, TrackerType};

/// Diagnostic hooks invoked by the layer at fixed points.
///
/// Purely side-effecting: nothing an observer does feeds back into control
/// flow. All methods default to no-ops.
pub trait GazeObserver: Send + Sync {
    fn on_tracker_unavailable(&self, _tracker: TrackerType, _reason: &str) {}

    fn on_tracker_selected(&self, _tracker: TrackerType) {}

    fn on_passthrough(&self, _system_name: &str) {}

    fn on_state_change(&self, _from: EmulationState, _to: EmulationState) {}

    fn on_sample(&self, _tracker: TrackerType, _accepted: bool) {}
}

pub struct NullObserver;

impl GazeObserver for NullObserver {}

/// Forwards every observer event to `tracing`.
pub struct TracingObserver;

impl GazeObserver for TracingObserver {
    fn on_tracker_unavailable(&self, tracker: TrackerType, reason: &str) {
        warn!(%tracker, "eye tracker unavailable: {}", reason);
    }

    fn on_tracker_selected(&self, tracker: TrackerType) {
        info!(%tracker, "eye tracker selected");
    }

    fn on_passthrough(&self, system_name: &str) {
        info!(system = system_name, "runtime supports eye gaze interaction, passing through");
    }

    fn on_state_change(&self, from: EmulationState, to: EmulationState) {
        debug!(%from, %to, "emulation state change");
    }

    fn on_sample(&self, tracker: TrackerType, accepted: bool) {
        trace!(%tracker, accepted, "gaze sample");
    }
}
