//! Steam Link eye tracking over OSC.
//!
//! Steam Link forwards the headset's gaze as `/sl/eyeTrackedGazePoint`
//! messages with three floats. Port 9015 is the "custom" OSC target in the
//! Steam Link settings (9000 is reserved for VRChat).
//!
//! The vector is stored as received. Unlike the other backends it is not
//! normalised here.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use eyegaze::{GazeError, GazeResult, GazeSample, GazeTracker, TrackerType};
use glam::Vec3;
use openxr as xr;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, trace, warn};

use crate::osc;

pub const STEAM_LINK_PORT: u16 = 9015;
pub const GAZE_ADDRESS: &str = "/sl/eyeTrackedGazePoint";
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(1);

/// Upper bound on how long `stop` waits for the listener to notice the stop
/// flag if the wake-up datagram is lost.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);
const MAX_DATAGRAM: usize = 4096;

#[derive(Debug, Clone, Copy)]
pub struct SteamLinkConfig {
    pub bind_addr: SocketAddr,
    pub stale_after: Duration,
}

impl Default for SteamLinkConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, STEAM_LINK_PORT)),
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

impl SteamLinkConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LatestGaze {
    direction: Vec3,
    received_at: Instant,
}

struct SharedState {
    latest: Mutex<Option<LatestGaze>>,
    stop: AtomicBool,
}

impl SharedState {
    fn latest(&self) -> Option<LatestGaze> {
        match self.latest.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn publish(&self, gaze: LatestGaze) {
        let mut guard = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(gaze);
    }
}

pub struct SteamLinkTracker {
    socket: Arc<UdpSocket>,
    state: Arc<SharedState>,
    stale_after: Duration,
    listener: Option<JoinHandle<()>>,
}

impl SteamLinkTracker {
    /// Binds the listening socket. The receive loop only runs once the
    /// tracker is started.
    pub fn new(config: SteamLinkConfig) -> GazeResult<Self> {
        let socket = bind_socket(config.bind_addr).map_err(|e| {
            GazeError::not_supported(format!("cannot listen on {}: {}", config.bind_addr, e))
        })?;
        debug!("steam link socket bound to {}", config.bind_addr);

        Ok(Self {
            socket: Arc::new(socket),
            state: Arc::new(SharedState {
                latest: Mutex::new(None),
                stop: AtomicBool::new(false),
            }),
            stale_after: config.stale_after,
            listener: None,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    fn fresh(&self) -> Option<LatestGaze> {
        self.state
            .latest()
            .filter(|gaze| gaze.received_at.elapsed() < self.stale_after)
    }

    fn wake_listener(&self) {
        let Ok(mut target) = self.socket.local_addr() else {
            return;
        };
        if target.ip().is_unspecified() {
            target.set_ip(Ipv4Addr::LOCALHOST.into());
        }
        if let Err(e) = self.socket.send_to(&[], target) {
            trace!("wake-up datagram failed: {}", e);
        }
    }
}

fn bind_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.bind(&addr.into())?;
    socket.set_read_timeout(Some(RECV_TIMEOUT))?;
    Ok(socket.into())
}

fn run(socket: &UdpSocket, state: &SharedState) {
    let mut buf = [0u8; MAX_DATAGRAM];
    while !state.stop.load(Ordering::Acquire) {
        let len = match socket.recv_from(&mut buf) {
            Ok((len, _from)) => len,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                continue;
            }
            Err(e) => {
                // Windows reports ICMP port-unreachable on UDP sockets as ConnectionReset.
                debug!("steam link receive error: {}", e);
                thread::sleep(RECV_TIMEOUT);
                continue;
            }
        };
        if len > 0 {
            process_datagram(&buf[..len], Instant::now(), state);
        }
    }
}

fn process_datagram(data: &[u8], now: Instant, state: &SharedState) {
    let packet = match osc::decode_packet(data) {
        Ok(packet) => packet,
        Err(e) => {
            debug!("dropping malformed OSC packet: {}", e);
            return;
        }
    };

    for msg in packet.into_messages() {
        if msg.address != GAZE_ADDRESS {
            continue;
        }
        match osc::gaze_point(&msg) {
            Ok(direction) if direction.is_nan() => {
                debug!("dropping NaN gaze point");
            }
            Ok(direction) => {
                trace!(?direction, "steam link gaze point");
                state.publish(LatestGaze {
                    direction,
                    received_at: now,
                });
            }
            Err(e) => debug!("dropping gaze message: {}", e),
        }
    }
}

impl GazeTracker for SteamLinkTracker {
    fn start(&mut self, _session: xr::sys::Session) -> GazeResult<()> {
        if self.listener.is_some() {
            return Ok(());
        }
        self.state.stop.store(false, Ordering::Release);

        let socket = Arc::clone(&self.socket);
        let state = Arc::clone(&self.state);
        let handle = thread::Builder::new()
            .name("eyegaze-steam-link".to_string())
            .spawn(move || run(&socket, &state))
            .map_err(|e| GazeError::backend(format!("thread spawn: {e}")))?;

        info!("steam link listener started");
        self.listener = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        let Some(handle) = self.listener.take() else {
            return;
        };
        self.state.stop.store(true, Ordering::Release);
        self.wake_listener();
        if handle.join().is_err() {
            warn!("steam link listener panicked");
        }
        info!("steam link listener stopped");
    }

    fn is_gaze_available(&self, _time: xr::Time) -> bool {
        self.fresh().is_some()
    }

    fn gaze(&self, _time: xr::Time) -> GazeSample {
        match self.fresh() {
            Some(gaze) => GazeSample::new(gaze.direction),
            None => GazeSample::INVALID,
        }
    }

    fn tracker_type(&self) -> TrackerType {
        TrackerType::SteamLink
    }
}

impl Drop for SteamLinkTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
