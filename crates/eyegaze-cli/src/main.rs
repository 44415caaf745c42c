//! Eyegaze CLI tools: tracker selection, live samples, test datagrams.

#![forbid(unsafe_code)]

use std::net::{SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use eyegaze::{GazeTracker, TrackerType};
use eyegaze_common::LayerConfig;
use eyegaze_openxr::{select, PlatformInfo, Selection};
use eyegaze_trackers::osc::{encode_message, OscArg};
use eyegaze_trackers::shared_memory::{BodyStateTracker, FaceStateTracker};
use eyegaze_trackers::steam_link::GAZE_ADDRESS;
use eyegaze_trackers::{SimulatedTracker, SteamLinkConfig, SteamLinkTracker, VendorSdk};
use openxr as xr;
use xr::sys::Handle;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "eyegaze")]
#[command(about = "Eyegaze CLI tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show which tracker would back a system
    Select {
        /// System name as reported by the runtime
        #[arg(short, long)]
        system_name: String,

        /// The runtime reports native eye gaze interaction
        #[arg(long)]
        native: bool,

        /// The runtime reports XR_FB_eye_tracking_social
        #[arg(long)]
        social: bool,

        /// Simulated tracker override
        #[arg(long)]
        simulate: Option<bool>,
    },

    /// Start a tracker and print its samples
    Watch {
        #[arg(short, long, value_enum)]
        tracker: WatchTracker,

        /// How long to watch
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,

        /// Delay between samples
        #[arg(short, long, default_value_t = 100)]
        interval_ms: u64,
    },

    /// Send one gaze point to a Steam Link listener
    Send {
        /// Listener address (host:port)
        #[arg(short, long, default_value = "127.0.0.1:9015")]
        target: SocketAddr,

        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
    },

    /// Print the effective configuration
    Config,

    /// Show version information
    Version,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WatchTracker {
    Simulated,
    SteamLink,
    VdBody,
    VdFace,
    Pimax,
    Omnicept,
    Varjo,
}

fn build_tracker(kind: WatchTracker, config: &LayerConfig) -> Result<Box<dyn GazeTracker>> {
    let threshold = config.confidence_threshold;
    // No vendor client libraries are linked into the CLI.
    let sdk = VendorSdk::new();
    let tracker: Box<dyn GazeTracker> = match kind {
        WatchTracker::Simulated => Box::new(SimulatedTracker::new()?),
        WatchTracker::SteamLink => {
            let mut listener = SteamLinkConfig::with_port(config.steam_link_port);
            listener.stale_after = config.network_stale_after();
            Box::new(SteamLinkTracker::new(listener)?)
        }
        WatchTracker::VdBody => Box::new(BodyStateTracker::open(&config.body_state_name, threshold)?),
        WatchTracker::VdFace => Box::new(FaceStateTracker::open(&config.face_state_name, threshold)?),
        WatchTracker::Pimax => Box::new(sdk.pimax(threshold)?),
        WatchTracker::Omnicept => Box::new(sdk.omnicept(threshold)?),
        WatchTracker::Varjo => Box::new(sdk.varjo(threshold)?),
    };
    Ok(tracker)
}

fn print_selection(info: &PlatformInfo, simulate: Option<bool>) {
    match select(info, simulate) {
        Selection::Passthrough => {
            println!("{}: passthrough ({})", info.system_name, TrackerType::Passthrough);
        }
        Selection::Candidates(candidates) if candidates.is_empty() => {
            println!("{}: no eye tracker", info.system_name);
        }
        Selection::Candidates(candidates) => {
            println!("{}:", info.system_name);
            for (i, candidate) in candidates.iter().enumerate() {
                println!("  {}. {}", i + 1, candidate);
            }
        }
    }
}

fn watch(tracker: &mut dyn GazeTracker, seconds: u64, interval: Duration) -> Result<()> {
    tracker.start(xr::sys::Session::NULL)?;
    println!("Watching {} for {}s...", tracker.tracker_type(), seconds);

    let origin = Instant::now();
    let deadline = origin + Duration::from_secs(seconds);
    while Instant::now() < deadline {
        let elapsed = origin.elapsed();
        let time = xr::Time::from_nanos(elapsed.as_nanos() as i64);
        match tracker.gaze(time).direction() {
            Some(d) => println!(
                "{:>8.3}s  ({:+.4}, {:+.4}, {:+.4})",
                elapsed.as_secs_f32(),
                d.x,
                d.y,
                d.z
            ),
            None => println!("{:>8.3}s  no gaze", elapsed.as_secs_f32()),
        }
        thread::sleep(interval);
    }

    tracker.stop();
    Ok(())
}

fn main() -> Result<()> {
    eyegaze_common::init_tracing();

    let args = Args::parse();

    match args.command {
        Command::Select {
            system_name,
            native,
            social,
            simulate,
        } => {
            let info = PlatformInfo {
                system_name,
                supports_eye_gaze_interaction: native,
                supports_eye_tracking_social: social,
            };
            print_selection(&info, simulate);
        }
        Command::Watch {
            tracker,
            seconds,
            interval_ms,
        } => {
            let config = LayerConfig::load();
            let mut gaze = build_tracker(tracker, &config)
                .with_context(|| format!("cannot open {:?} tracker", tracker))?;
            watch(gaze.as_mut(), seconds, Duration::from_millis(interval_ms))?;
        }
        Command::Send { target, x, y, z } => {
            let socket = UdpSocket::bind("0.0.0.0:0")?;
            let datagram = encode_message(
                GAZE_ADDRESS,
                &[OscArg::Float(x), OscArg::Float(y), OscArg::Float(z)],
            );
            socket
                .send_to(&datagram, target)
                .with_context(|| format!("send to {}", target))?;
            debug!("sent {} bytes", datagram.len());
            println!("Sent ({}, {}, {}) to {}", x, y, z, target);
        }
        Command::Config => {
            let config = LayerConfig::load();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Version => {
            println!("eyegaze {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
