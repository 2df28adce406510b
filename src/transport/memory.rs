//! In-process transport for tests and headless runs.
//!
//! Events pushed with [`MemoryTransport::send`] sit "on the wire" until a
//! prepared read picks them up, exactly like bytes on a real socket. A unix
//! socket pair backs the pollable fd, so external readiness loops see the
//! transport become readable when events are sent.

use super::{ServerEvent, Transport};
use crate::error::{TransportError, TransportResult};
use crate::globals::{Global, GlobalKind, GlobalSet};
use crate::input::RayEvent;
use crate::toplevel::SurfaceId;
use log::debug;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::net::UnixStream;

#[derive(Debug)]
pub struct MemoryTransport {
    socket: UnixStream,
    peer: UnixStream,
    wire: VecDeque<ServerEvent>,
    queue: VecDeque<ServerEvent>,
    reading: bool,
    bound: GlobalSet,
    ray_bound: bool,
    surfaces: Vec<SurfaceId>,
    next_surface: u32,
    blocked_flushes: u32,
    flushes: u32,
    cancels: u32,
    reads: u32,
}

impl MemoryTransport {
    pub fn new() -> std::io::Result<Self> {
        let (socket, peer) = UnixStream::pair()?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            peer,
            wire: VecDeque::new(),
            queue: VecDeque::new(),
            reading: false,
            bound: GlobalSet::empty(),
            ray_bound: false,
            surfaces: Vec::new(),
            next_surface: 1,
            blocked_flushes: 0,
            flushes: 0,
            cancels: 0,
            reads: 0,
        })
    }

    /// Put an event on the wire; it is delivered by the next read or round-trip.
    pub fn send(&mut self, event: ServerEvent) {
        self.wire.push_back(event);
        // wake pollers; the byte content is irrelevant
        if let Err(e) = self.peer.write_all(&[0]) {
            debug!("memory transport wake-up write failed: {}", e);
        }
    }

    pub fn send_ray(&mut self, event: RayEvent) {
        self.send(ServerEvent::Ray(event));
    }

    /// Announce every global a client needs, numbered from 1.
    pub fn announce_required_globals(&mut self) {
        for (index, kind) in GlobalKind::ALL.iter().enumerate() {
            self.send(ServerEvent::Global(Global {
                name: index as u32 + 1,
                interface: kind.interface().to_string(),
                version: 1,
            }));
        }
    }

    /// Make the next `count` flushes fail with `WouldBlock`.
    pub fn block_flushes(&mut self, count: u32) {
        self.blocked_flushes = count;
    }

    pub fn bound_globals(&self) -> GlobalSet {
        self.bound
    }

    pub fn ray_bound(&self) -> bool {
        self.ray_bound
    }

    pub fn live_surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    pub fn flush_count(&self) -> u32 {
        self.flushes
    }

    pub fn cancel_count(&self) -> u32 {
        self.cancels
    }

    pub fn read_count(&self) -> u32 {
        self.reads
    }

    pub fn is_reading(&self) -> bool {
        self.reading
    }

    fn drain_socket(&mut self) -> TransportResult<()> {
        let mut buf = [0u8; 64];
        loop {
            match self.socket.read(&mut buf) {
                Ok(0) => return Ok(()),
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }

    fn take_wire(&mut self) -> TransportResult<()> {
        self.drain_socket()?;
        self.queue.extend(self.wire.drain(..));
        Ok(())
    }
}

impl Transport for MemoryTransport {
    fn roundtrip(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize> {
        self.flush()?;
        self.take_wire()?;
        self.dispatch_pending(events)
    }

    fn bind_global(&mut self, kind: GlobalKind, global: &Global) -> TransportResult<()> {
        debug!("memory transport binding {} (name {})", global.interface, global.name);
        self.bound |= kind.flag();
        Ok(())
    }

    fn unbind_global(&mut self, kind: GlobalKind) {
        self.bound.remove(kind.flag());
        if kind == GlobalKind::Seat {
            self.ray_bound = false;
        }
    }

    fn bind_ray(&mut self) -> TransportResult<()> {
        if !self.bound.contains(GlobalSet::SEAT) {
            return Err(TransportError::Protocol("no seat bound".into()));
        }
        self.ray_bound = true;
        Ok(())
    }

    fn release_ray(&mut self) {
        self.ray_bound = false;
    }

    fn create_surface(&mut self, _width: f32, _height: f32) -> TransportResult<SurfaceId> {
        if !self.bound.contains(GlobalSet::COMPOSITOR | GlobalSet::SHELL) {
            return Err(TransportError::Protocol("compositor or shell not bound".into()));
        }
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces.push(id);
        Ok(id)
    }

    fn destroy_surface(&mut self, id: SurfaceId) {
        self.surfaces.retain(|s| *s != id);
    }

    fn prepare_read(&mut self) -> TransportResult<()> {
        if !self.queue.is_empty() {
            return Err(TransportError::PendingEvents);
        }
        self.reading = true;
        Ok(())
    }

    fn read_events(&mut self) -> TransportResult<()> {
        if !self.reading {
            return Err(TransportError::NotPrepared);
        }
        self.reading = false;
        self.reads += 1;
        self.take_wire()
    }

    fn cancel_read(&mut self) {
        self.reading = false;
        self.cancels += 1;
    }

    fn dispatch_pending(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize> {
        let count = self.queue.len();
        events.extend(self.queue.drain(..));
        Ok(count)
    }

    fn flush(&mut self) -> TransportResult<()> {
        if self.blocked_flushes > 0 {
            self.blocked_flushes -= 1;
            return Err(TransportError::WouldBlock);
        }
        self.flushes += 1;
        Ok(())
    }

    fn fd(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }
}
