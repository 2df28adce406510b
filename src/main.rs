//! # zsurface-probe
//!
//! Connects to a spatial display server, presents one toplevel and logs the
//! ray focus callbacks it receives. The event loop is an external `poll(2)`
//! loop driving the client's prepare/read/dispatch/cancel protocol.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::os::fd::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use zsurface::{
    Client, ClientConfig, ClientError, ClientHandler, SeatCapabilities, TransportError, ViewId,
    WaylandTransport,
};

const POLL_TIMEOUT_MS: i32 = 250;

#[derive(Parser)]
#[command(name = "zsurface-probe")]
#[command(about = "Present a toplevel on a z11 server and log ray focus events")]
#[command(version, long_version = long_version())]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/zsurface/zsurface.toml")]
    config: String,

    /// Socket name or path (overrides the configuration file)
    #[arg(short, long)]
    socket: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Toplevel width in scene units
    #[arg(long, default_value_t = 0.4)]
    width: f32,

    /// Toplevel height in scene units
    #[arg(long, default_value_t = 0.3)]
    height: f32,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (built ",
        env!("BUILD_DATE"),
        " for ",
        env!("TARGET_TRIPLE"),
        ")"
    )
}

#[derive(Debug, Default)]
struct ProbeHandler {
    enters: u64,
    motions: u64,
    leaves: u64,
}

impl ClientHandler for ProbeHandler {
    fn pointer_enter(&mut self, view: ViewId, x: f32, y: f32) {
        self.enters += 1;
        info!("➡️ enter {:?} at ({:.3}, {:.3})", view, x, y);
    }

    fn pointer_motion(&mut self, x: f32, y: f32) {
        self.motions += 1;
        log::debug!("motion ({:.3}, {:.3})", x, y);
    }

    fn pointer_leave(&mut self) {
        self.leaves += 1;
        info!("⬅️ leave");
    }

    fn seat_capability(&mut self, capabilities: SeatCapabilities) {
        info!("🪑 seat capabilities: {:?}", capabilities);
    }

    fn button(&mut self, _serial: u32, _time: u32, button: u32, state: u32) {
        info!("🔘 button {:#x} state {}", button, state);
    }
}

type ProbeClient = Client<WaylandTransport, ProbeHandler, zsurface::PlaneHitTester>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match ClientConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration ({:#}), using defaults", e);
            ClientConfig::default()
        }
    };
    if cli.debug {
        config.logging.filter = "debug".to_string();
    }
    if let Some(socket) = cli.socket {
        config.connection.socket = Some(socket);
    }
    zsurface::logging::init(&config.logging);

    info!(
        "🚀 Starting zsurface-probe {} ({})",
        zsurface::VERSION,
        option_env!("GIT_COMMIT").unwrap_or("unknown commit")
    );

    let mut client = Client::connect_with_config(&config, ProbeHandler::default())
        .context("Failed to connect to the display server")?;
    client
        .wait_for_globals(config.connection.global_retry_budget)
        .context("Server did not announce the required globals")?;

    let toplevel = client.create_toplevel(cli.width, cli.height)?;
    info!("🪟 Presenting toplevel {}", toplevel);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    let result = run(&mut client, &running);
    if let Err(e) = &result {
        error!("❌ Event loop stopped: {:#}", e);
    }

    let handler = client.handler();
    info!(
        "📊 {} enter / {} motion / {} leave callbacks",
        handler.enters, handler.motions, handler.leaves
    );
    client.destroy_toplevel(toplevel);
    client.destroy();
    result
}

fn run(client: &mut ProbeClient, running: &AtomicBool) -> Result<()> {
    while running.load(Ordering::SeqCst) {
        client.dispatch_pending()?;

        loop {
            match client.prepare_read() {
                Ok(()) => break,
                Err(ClientError::Transport(TransportError::PendingEvents)) => {
                    client.dispatch_pending()?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut events = libc::POLLIN;
        match client.flush() {
            Ok(()) => {}
            Err(ClientError::Transport(TransportError::WouldBlock)) => events |= libc::POLLOUT,
            Err(e) => {
                client.cancel_read();
                return Err(e.into());
            }
        }

        let mut pollfd = libc::pollfd {
            fd: client.fd().as_raw_fd(),
            events,
            revents: 0,
        };
        // SAFETY: `pollfd` is a single valid entry for the duration of the call.
        let ready = unsafe { libc::poll(&mut pollfd, 1, POLL_TIMEOUT_MS) };
        if ready < 0 {
            client.cancel_read();
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err).context("poll failed");
        }

        if pollfd.revents & (libc::POLLERR | libc::POLLHUP) != 0 {
            client.cancel_read();
            warn!("display connection closed");
            return Ok(());
        }

        if pollfd.revents & libc::POLLIN != 0 {
            client.read_events()?;
            client.dispatch_pending()?;
        } else {
            client.cancel_read();
        }
    }
    info!("🛑 Shutting down");
    Ok(())
}
