//! Actions bound to the gaze input and the action spaces created on them.

use std::collections::{HashMap, HashSet};

use eyegaze::math::Pose;
use openxr as xr;
use xr::sys::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeMembership {
    Unresolved,
    Gaze,
    NotGaze,
}

/// Membership of a space whose action is (`true`) or is not bound to gaze.
///
/// `Gaze` is final. `NotGaze` is re-evaluated: bindings only ever grow, so a
/// space checked before its action was bound still becomes a gaze space.
pub fn resolve_membership(current: GazeMembership, action_is_bound: bool) -> GazeMembership {
    match current {
        GazeMembership::Gaze => GazeMembership::Gaze,
        GazeMembership::Unresolved | GazeMembership::NotGaze if action_is_bound => {
            GazeMembership::Gaze
        }
        GazeMembership::Unresolved | GazeMembership::NotGaze => GazeMembership::NotGaze,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActionSpace {
    pub action: u64,
    pub offset: Pose,
    pub membership: GazeMembership,
}

/// Guarded by one mutex in the layer; nothing here performs I/O.
#[derive(Debug, Default)]
pub struct GazeBindings {
    actions: HashSet<u64>,
    spaces: HashMap<u64, ActionSpace>,
}

impl GazeBindings {
    pub fn add_action(&mut self, action: xr::sys::Action) {
        self.actions.insert(action.into_raw());
    }

    pub fn is_gaze_action(&self, action: xr::sys::Action) -> bool {
        self.actions.contains(&action.into_raw())
    }

    pub fn track_space(&mut self, space: xr::sys::Space, action: xr::sys::Action, offset: Pose) {
        self.spaces.insert(
            space.into_raw(),
            ActionSpace {
                action: action.into_raw(),
                offset,
                membership: GazeMembership::Unresolved,
            },
        );
    }

    pub fn remove_space(&mut self, space: xr::sys::Space) -> bool {
        self.spaces.remove(&space.into_raw()).is_some()
    }

    /// The pose offset of `space` if it is a gaze space.
    pub fn resolve(&mut self, space: xr::sys::Space) -> Option<Pose> {
        let entry = self.spaces.get_mut(&space.into_raw())?;
        let bound = self.actions.contains(&entry.action);
        entry.membership = resolve_membership(entry.membership, bound);
        (entry.membership == GazeMembership::Gaze).then_some(entry.offset)
    }

    pub fn membership(&self, space: xr::sys::Space) -> Option<GazeMembership> {
        self.spaces.get(&space.into_raw()).map(|s| s.membership)
    }
}
