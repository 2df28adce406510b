//! Connection transport and the guarded read protocol
//!
//! A [`Transport`] is the raw server connection. [`EventLoop`] wraps it with
//! the prepare/read/cancel bookkeeping that lets a caller plug the client into
//! an external readiness loop:
//!
//! ```text
//!   dispatch_pending ──► prepare_read ──► poll(fd) ──► read_events ──► dispatch_pending
//!                              │
//!                              └──────► cancel_read (nothing to read / shutdown)
//! ```
//!
//! `read_events` without a prepared read never reaches the transport.

use crate::error::{TransportError, TransportResult};
use crate::globals::{Global, GlobalKind};
use crate::input::RayEvent;
use crate::toplevel::SurfaceId;
use log::{trace, warn};
use std::os::fd::{AsRawFd, BorrowedFd};

pub mod memory;

pub use memory::MemoryTransport;

/// Events a transport hands to the client after dispatching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A global was announced in the registry.
    Global(Global),
    /// A global was withdrawn.
    GlobalRemoved { name: u32 },
    /// The seat capability mask changed.
    SeatCapabilities(u32),
    Ray(RayEvent),
}

/// The raw connection to the spatial server.
///
/// Implementations queue [`ServerEvent`]s as they decode them; the client
/// drains them through [`Transport::dispatch_pending`].
pub trait Transport {
    /// Block until the server has processed every request sent so far and
    /// all resulting events are queued.
    fn roundtrip(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize>;

    fn bind_global(&mut self, kind: GlobalKind, global: &Global) -> TransportResult<()>;

    /// Drop the proxy for a global the server withdrew.
    fn unbind_global(&mut self, kind: GlobalKind);

    /// Create the seat's ray device. Needs a bound seat.
    fn bind_ray(&mut self) -> TransportResult<()>;

    fn release_ray(&mut self);

    /// Allocate a toplevel surface on the server and return its identity.
    fn create_surface(&mut self, width: f32, height: f32) -> TransportResult<SurfaceId>;

    fn destroy_surface(&mut self, id: SurfaceId);

    /// Declare intent to read. Fails with `PendingEvents` when queued events
    /// must be dispatched first.
    fn prepare_read(&mut self) -> TransportResult<()>;

    /// Read whatever is available on the socket after `prepare_read`.
    fn read_events(&mut self) -> TransportResult<()>;

    fn cancel_read(&mut self);

    /// Move decoded events into `events` without blocking.
    fn dispatch_pending(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize>;

    fn flush(&mut self) -> TransportResult<()>;

    fn fd(&self) -> BorrowedFd<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Idle,
    Prepared,
}

/// Guarded driver for a [`Transport`].
#[derive(Debug)]
pub struct EventLoop<T: Transport> {
    transport: T,
    state: ReadState,
}

impl<T: Transport> EventLoop<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ReadState::Idle,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_reading(&self) -> bool {
        self.state == ReadState::Prepared
    }

    pub fn prepare_read(&mut self) -> TransportResult<()> {
        if self.state == ReadState::Prepared {
            return Err(TransportError::AlreadyReading);
        }
        self.transport.prepare_read()?;
        self.state = ReadState::Prepared;
        Ok(())
    }

    pub fn read_events(&mut self) -> TransportResult<()> {
        if self.state != ReadState::Prepared {
            return Err(TransportError::NotPrepared);
        }
        // the transport consumes the read intent whether or not the read succeeds
        self.state = ReadState::Idle;
        self.transport.read_events()
    }

    pub fn cancel_read(&mut self) {
        if self.state == ReadState::Prepared {
            self.transport.cancel_read();
            self.state = ReadState::Idle;
        }
    }

    pub fn dispatch_pending(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize> {
        self.transport.dispatch_pending(events)
    }

    pub fn flush(&mut self) -> TransportResult<()> {
        self.transport.flush()
    }

    pub fn roundtrip(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize> {
        if self.state == ReadState::Prepared {
            return Err(TransportError::AlreadyReading);
        }
        self.transport.roundtrip(events)
    }

    pub fn fd(&self) -> BorrowedFd<'_> {
        self.transport.fd()
    }

    /// Blocking convenience cycle: flush, wait for the fd, read, dispatch.
    ///
    /// Already queued events are returned without touching the socket.
    pub fn dispatch(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize> {
        let queued = self.dispatch_pending(events)?;
        if queued > 0 {
            return Ok(queued);
        }

        loop {
            match self.flush() {
                Ok(()) => break,
                Err(TransportError::WouldBlock) => {
                    wait_fd(self.fd(), libc::POLLOUT)?;
                }
                Err(e) => return Err(e),
            }
        }

        loop {
            match self.prepare_read() {
                Ok(()) => break,
                Err(TransportError::PendingEvents) => {
                    let queued = self.dispatch_pending(events)?;
                    if queued > 0 {
                        return Ok(queued);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        if let Err(e) = wait_fd(self.fd(), libc::POLLIN) {
            warn!("waiting for server events failed: {}", e);
            self.cancel_read();
            return Err(e);
        }
        self.read_events()?;
        self.dispatch_pending(events)
    }
}

/// Block until `fd` reports one of `events`.
fn wait_fd(fd: BorrowedFd<'_>, events: libc::c_short) -> TransportResult<()> {
    let mut pollfd = libc::pollfd {
        fd: fd.as_raw_fd(),
        events,
        revents: 0,
    };
    loop {
        // SAFETY: `pollfd` is a valid, exclusively borrowed array of length 1.
        let ret = unsafe { libc::poll(&mut pollfd, 1, -1) };
        if ret >= 0 {
            trace!("fd {} ready: {:#x}", pollfd.fd, pollfd.revents);
            return Ok(());
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(TransportError::Io(err));
        }
    }
}
