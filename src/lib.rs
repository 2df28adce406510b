//! # zsurface
//!
//! Client library for presenting toplevels on a spatial (z11) display server
//! and receiving pointer input as 3D ray casts.
//!
//! ## Architecture
//!
//! - `registry`: the client's live toplevels, looked up by surface identity
//! - `hit_test`: ray/toplevel intersection, pluggable via `HitTester`
//! - `focus`: entered-view state turning hit results into enter/motion/leave
//! - `input`: decoding of raw ray events from the seat
//! - `transport`: the connection trait and the guarded prepare/read/dispatch loop
//! - `wayland`: the wayland-client transport speaking the z11 protocol
//! - `client`: the façade tying the above together
//! - `config`: TOML configuration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zsurface::{Client, ClientHandler, PlaneHitTester, ViewId};
//!
//! struct App;
//!
//! impl ClientHandler for App {
//!     fn pointer_enter(&mut self, view: ViewId, x: f32, y: f32) {
//!         println!("enter {:?} at ({}, {})", view, x, y);
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut client = Client::connect(None, App, PlaneHitTester::default())?;
//!     client.wait_for_globals(10)?;
//!     client.create_toplevel(0.5, 0.5)?;
//!     loop {
//!         client.dispatch()?;
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod focus;
pub mod globals;
pub mod handler;
pub mod input;
pub mod logging;
pub mod registry;
pub mod toplevel;
pub mod transport;
pub mod wayland;

#[cfg(test)]
mod test_support;

// Re-export main types for easy access
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind, TransportError};
pub use focus::{FocusTracker, FocusTransition};
pub use globals::{GlobalKind, GlobalSet, SeatCapabilities};
pub use handler::{ClientHandler, NoopHandler};
pub use hit_test::{HitResult, HitTester, PlaneHitTester};
pub use input::{InputDecoder, RayEvent};
pub use registry::ToplevelRegistry;
pub use toplevel::{SurfaceId, Toplevel, ViewId};
pub use transport::{EventLoop, MemoryTransport, ServerEvent, Transport};
pub use wayland::WaylandTransport;

/// Version information for zsurface
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
