use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use eyegaze::{GazeResult, GazeTracker, TrackerType};
use eyegaze_common::LayerConfig;
use eyegaze_trackers::shared_memory::{BodyStateTracker, FaceStateTracker};
use eyegaze_trackers::{EyePoseTracker, SimulatedTracker, SteamLinkConfig, SteamLinkTracker, VendorSdk};

use crate::platform::XrPlatform;
use crate::selector::{BackendConfig, SharedLayoutKind};
use crate::social::FbEyeGazeSource;

/// Turns a selected candidate into a live tracker.
pub trait TrackerProvider: Send + Sync {
    /// Returns `GazeError::NotSupported` when the backend's device, service
    /// or resource is missing.
    fn create(&self, backend: BackendConfig) -> GazeResult<Box<dyn GazeTracker>>;
}

pub struct DefaultTrackerProvider<P> {
    platform: Arc<P>,
    config: LayerConfig,
    sdk: VendorSdk,
}

impl<P: XrPlatform + 'static> DefaultTrackerProvider<P> {
    pub fn new(platform: Arc<P>, config: LayerConfig) -> Self {
        Self::with_sdk(platform, config, VendorSdk::new())
    }

    pub fn with_sdk(platform: Arc<P>, config: LayerConfig, sdk: VendorSdk) -> Self {
        Self {
            platform,
            config,
            sdk,
        }
    }
}

impl<P: XrPlatform + 'static> TrackerProvider for DefaultTrackerProvider<P> {
    fn create(&self, backend: BackendConfig) -> GazeResult<Box<dyn GazeTracker>> {
        let threshold = self.config.confidence_threshold;
        Ok(match backend {
            BackendConfig::Simulated => Box::new(SimulatedTracker::new()?),
            BackendConfig::VirtualDesktop(SharedLayoutKind::Body) => Box::new(
                BodyStateTracker::open(&self.config.body_state_name, threshold)?,
            ),
            BackendConfig::VirtualDesktop(SharedLayoutKind::Face) => Box::new(
                FaceStateTracker::open(&self.config.face_state_name, threshold)?,
            ),
            BackendConfig::SteamLink => Box::new(SteamLinkTracker::new(SteamLinkConfig {
                bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.steam_link_port)),
                stale_after: self.config.network_stale_after(),
            })?),
            BackendConfig::QuestPro => Box::new(EyePoseTracker::new(
                Box::new(FbEyeGazeSource::new(Arc::clone(&self.platform))),
                TrackerType::QuestPro,
                threshold,
            )),
            BackendConfig::Pimax => Box::new(self.sdk.pimax(threshold)?),
            BackendConfig::Omnicept => Box::new(self.sdk.omnicept(threshold)?),
            BackendConfig::Varjo => Box::new(self.sdk.varjo(threshold)?),
        })
    }
}
