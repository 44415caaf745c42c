//! Pointer-driven tracker for testing without eye tracking hardware.
//!
//! The desktop pointer stands in for the gaze point. Its position is clamped
//! to a fixed square of the screen, normalised to `[0, 1]²` and turned into a
//! direction through a virtual screen placed in front of the eye.

use eyegaze::{GazeResult, GazeSample, GazeTracker, TrackerType};
use glam::Vec3;
use openxr as xr;
use tracing::debug;

pub const POINTER_RECT_MIN: i32 = 1;
pub const POINTER_RECT_MAX: i32 = 999;
pub const POINTER_SCALE: f32 = 1000.0;
/// Assumed eye-to-screen distance, as a fraction of the screen width.
pub const EYE_TO_SCREEN_DEPTH: f32 = 0.35;

pub trait PointerSource: Send + Sync {
    /// Current pointer position in screen pixels.
    fn position(&self) -> Option<(i32, i32)>;
}

pub fn direction_from_pointer(x: i32, y: i32) -> Vec3 {
    let u = x.clamp(POINTER_RECT_MIN, POINTER_RECT_MAX) as f32 / POINTER_SCALE;
    let v = y.clamp(POINTER_RECT_MIN, POINTER_RECT_MAX) as f32 / POINTER_SCALE;
    Vec3::new(u - 0.5, 0.5 - v, -EYE_TO_SCREEN_DEPTH).normalize()
}

pub struct SimulatedTracker {
    pointer: Box<dyn PointerSource>,
}

impl SimulatedTracker {
    /// Uses the desktop pointer of the current platform.
    pub fn new() -> GazeResult<Self> {
        Ok(Self::with_pointer(Box::new(platform::SystemPointer::open()?)))
    }

    pub fn with_pointer(pointer: Box<dyn PointerSource>) -> Self {
        Self { pointer }
    }
}

impl GazeTracker for SimulatedTracker {
    fn start(&mut self, _session: xr::sys::Session) -> GazeResult<()> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn is_gaze_available(&self, _time: xr::Time) -> bool {
        true
    }

    fn gaze(&self, _time: xr::Time) -> GazeSample {
        match self.pointer.position() {
            Some((x, y)) => GazeSample::new(direction_from_pointer(x, y)),
            None => {
                debug!("pointer position unavailable");
                GazeSample::INVALID
            }
        }
    }

    fn tracker_type(&self) -> TrackerType {
        TrackerType::Simulated
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use eyegaze::{GazeError, GazeResult};
    use tracing::debug;
    use x11rb::connection::Connection;
    use x11rb::protocol::xproto::{ConnectionExt, Window};
    use x11rb::rust_connection::RustConnection;

    use super::PointerSource;

    pub struct SystemPointer {
        conn: RustConnection,
        root: Window,
    }

    impl SystemPointer {
        pub fn open() -> GazeResult<Self> {
            let (conn, screen_num) = x11rb::connect(None)
                .map_err(|e| GazeError::not_supported(format!("no X11 display: {e}")))?;
            let root = conn
                .setup()
                .roots
                .get(screen_num)
                .map(|screen| screen.root)
                .ok_or_else(|| GazeError::not_supported("X11 screen not found"))?;
            Ok(Self { conn, root })
        }
    }

    impl PointerSource for SystemPointer {
        fn position(&self) -> Option<(i32, i32)> {
            let reply = match self.conn.query_pointer(self.root) {
                Ok(cookie) => cookie.reply(),
                Err(e) => {
                    debug!("query_pointer failed: {}", e);
                    return None;
                }
            };
            match reply {
                Ok(reply) => Some((reply.root_x as i32, reply.root_y as i32)),
                Err(e) => {
                    debug!("query_pointer reply failed: {}", e);
                    None
                }
            }
        }
    }
}

#[cfg(target_os = "windows")]
#[allow(unsafe_code)]
mod platform {
    use eyegaze::GazeResult;
    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

    use super::PointerSource;

    pub struct SystemPointer;

    impl SystemPointer {
        pub fn open() -> GazeResult<Self> {
            Ok(Self)
        }
    }

    impl PointerSource for SystemPointer {
        fn position(&self) -> Option<(i32, i32)> {
            let mut point = POINT::default();
            // SAFETY: `point` is a valid, writable POINT for the duration of the call.
            unsafe { GetCursorPos(&mut point) }.ok()?;
            Some((point.x, point.y))
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod platform {
    use eyegaze::{GazeError, GazeResult};

    use super::PointerSource;

    pub struct SystemPointer;

    impl SystemPointer {
        pub fn open() -> GazeResult<Self> {
            Err(GazeError::not_supported(
                "pointer tracking is not implemented for this platform",
            ))
        }
    }

    impl PointerSource for SystemPointer {
        fn position(&self) -> Option<(i32, i32)> {
            None
        }
    }
}
