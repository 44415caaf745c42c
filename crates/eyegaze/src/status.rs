use std::sync::{Mutex, OnceLock};

use crate::{EmulationState, TrackerType};

const DEFAULT_STATUS: &str = "Eye tracker: none";

static TRACKER_STATUS: OnceLock<Mutex<String>> = OnceLock::new();

fn status_cell() -> &'static Mutex<String> {
    TRACKER_STATUS.get_or_init(|| Mutex::new(DEFAULT_STATUS.to_string()))
}

pub fn tracker_status() -> String {
    match status_cell().lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub fn set_tracker_status(status: impl Into<String>) {
    let mut guard = match status_cell().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = status.into();
}

/// Formats the status line published for a tracker in a given state.
pub fn describe(tracker: TrackerType, state: EmulationState) -> String {
    match tracker {
        TrackerType::None => DEFAULT_STATUS.to_string(),
        TrackerType::Passthrough => "Eye tracker: provided by the runtime".to_string(),
        _ => format!("Eye tracker: {tracker} ({state})"),
    }
}
