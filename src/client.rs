//! Client façade
//!
//! A [`Client`] owns the connection, the toplevel registry and the focus
//! state. Server events drained from the transport are routed here: registry
//! announcements bind globals, seat capability changes bind or release the
//! ray device, and ray events go through the input decoder to the
//! application's [`ClientHandler`].
//!
//! ```rust,no_run
//! use zsurface::{Client, NoopHandler, PlaneHitTester};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut client = Client::connect(None, NoopHandler, PlaneHitTester::default())?;
//!     client.wait_for_globals(10)?;
//!     let window = client.create_toplevel(0.4, 0.3)?;
//!     client.flush()?;
//!     client.destroy_toplevel(window);
//!     Ok(())
//! }
//! ```

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, ErrorKind};
use crate::globals::{GlobalKind, GlobalSet, SeatCapabilities};
use crate::handler::ClientHandler;
use crate::hit_test::{HitTester, PlaneHitTester};
use crate::input::InputDecoder;
use crate::registry::ToplevelRegistry;
use crate::toplevel::{ClientId, SurfaceId, Toplevel, ViewId};
use crate::transport::{EventLoop, ServerEvent, Transport};
use crate::wayland::WaylandTransport;
use log::{debug, info, warn};
use std::os::fd::BorrowedFd;

pub struct Client<T, H, Ht>
where
    T: Transport,
    H: ClientHandler,
    Ht: HitTester,
{
    id: ClientId,
    event_loop: EventLoop<T>,
    bound: GlobalSet,
    /// Registry name of each bound global.
    global_names: Vec<(u32, GlobalKind)>,
    capabilities: SeatCapabilities,
    ray_bound: bool,
    registry: ToplevelRegistry,
    decoder: InputDecoder,
    handler: H,
    hit_tester: Ht,
    last_error: Option<ErrorKind>,
    scratch: Vec<ServerEvent>,
    torn_down: bool,
}

impl<H: ClientHandler, Ht: HitTester> Client<WaylandTransport, H, Ht> {
    /// Connect to the spatial display server over wayland.
    ///
    /// `socket` is a socket name or path; `None` uses `WAYLAND_DISPLAY`.
    pub fn connect(socket: Option<&str>, handler: H, hit_tester: Ht) -> ClientResult<Self> {
        let transport = WaylandTransport::connect(socket)?;
        Self::new(transport, handler, hit_tester)
    }
}

impl<H: ClientHandler> Client<WaylandTransport, H, PlaneHitTester> {
    /// Connect using the socket and hit test plane from `config`.
    pub fn connect_with_config(config: &ClientConfig, handler: H) -> ClientResult<Self> {
        Self::connect(
            config.connection.socket.as_deref(),
            handler,
            PlaneHitTester::new(config.hit_test.plane_z),
        )
    }
}

impl<T, H, Ht> Client<T, H, Ht>
where
    T: Transport,
    H: ClientHandler,
    Ht: HitTester,
{
    /// Wrap an open transport and run the initial registry round-trip.
    pub fn new(transport: T, handler: H, hit_tester: Ht) -> ClientResult<Self> {
        let mut client = Self {
            id: ClientId::next(),
            event_loop: EventLoop::new(transport),
            bound: GlobalSet::empty(),
            global_names: Vec::new(),
            capabilities: SeatCapabilities::empty(),
            ray_bound: false,
            registry: ToplevelRegistry::new(),
            decoder: InputDecoder::new(),
            handler,
            hit_tester,
            last_error: None,
            scratch: Vec::new(),
            torn_down: false,
        };
        client.roundtrip()?;
        Ok(client)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Round-trip once and report whether every required global is bound.
    ///
    /// There is no retry here; see [`Client::wait_for_globals`].
    pub fn check_globals(&mut self) -> ClientResult<()> {
        self.roundtrip()?;
        let missing = self.bound.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            self.fail(ClientError::MissingGlobals(missing))
        }
    }

    /// Call [`Client::check_globals`] up to `budget` times.
    ///
    /// Returns the number of attempts it took. A budget of 0 only checks
    /// what is already bound, without a round-trip.
    pub fn wait_for_globals(&mut self, budget: u32) -> ClientResult<u32> {
        if budget == 0 {
            let missing = self.bound.missing();
            return if missing.is_empty() {
                Ok(0)
            } else {
                self.fail(ClientError::MissingGlobals(missing))
            };
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.check_globals() {
                Ok(()) => {
                    info!("✅ All globals bound after {} round-trip(s)", attempt);
                    return Ok(attempt);
                }
                Err(ClientError::MissingGlobals(missing)) if attempt < budget => {
                    debug!("still missing globals {:?} (attempt {})", missing, attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Allocate a toplevel on the server and track it.
    pub fn create_toplevel(&mut self, width: f32, height: f32) -> ClientResult<SurfaceId> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return self.fail(ClientError::InvalidSize { width, height });
        }
        let id = match self.event_loop.transport_mut().create_surface(width, height) {
            Ok(id) => id,
            Err(e) => return self.fail(e.into()),
        };
        self.registry.insert(Toplevel::new(id, width, height, self.id));
        info!("🪟 Created toplevel {} ({}x{})", id, width, height);
        Ok(id)
    }

    /// Destroy a toplevel. Returns `false` if it is not ours.
    pub fn destroy_toplevel(&mut self, id: SurfaceId) -> bool {
        self.decoder.forget_toplevel(id);
        match self.registry.remove(id) {
            Some(toplevel) => {
                debug_assert_eq!(toplevel.owner(), self.id);
                self.event_loop.transport_mut().destroy_surface(id);
                debug!("destroyed toplevel {}", id);
                true
            }
            None => false,
        }
    }

    pub fn toplevel(&self, id: SurfaceId) -> Option<&Toplevel> {
        self.registry.find(id)
    }

    pub fn toplevels(&self) -> &ToplevelRegistry {
        &self.registry
    }

    pub fn entered_toplevel(&self) -> Option<SurfaceId> {
        self.decoder.entered_toplevel()
    }

    pub fn entered_view(&self) -> Option<ViewId> {
        self.decoder.entered_view()
    }

    pub fn bound_globals(&self) -> GlobalSet {
        self.bound
    }

    pub fn capabilities(&self) -> SeatCapabilities {
        self.capabilities
    }

    pub fn has_ray(&self) -> bool {
        self.ray_bound
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn transport(&self) -> &T {
        self.event_loop.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.event_loop.transport_mut()
    }

    /// Kind of the most recent failure on this client, if any.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn prepare_read(&mut self) -> ClientResult<()> {
        let result = self.event_loop.prepare_read();
        self.record(result)
    }

    pub fn read_events(&mut self) -> ClientResult<()> {
        let result = self.event_loop.read_events();
        self.record(result)
    }

    pub fn cancel_read(&mut self) {
        self.event_loop.cancel_read();
    }

    /// Run callbacks for events already read. Never blocks.
    pub fn dispatch_pending(&mut self) -> ClientResult<usize> {
        let mut events = std::mem::take(&mut self.scratch);
        let result = self.event_loop.dispatch_pending(&mut events);
        self.finish_dispatch(events, result)
    }

    /// Flush, wait for events, read and dispatch them.
    pub fn dispatch(&mut self) -> ClientResult<usize> {
        let mut events = std::mem::take(&mut self.scratch);
        let result = self.event_loop.dispatch(&mut events);
        self.finish_dispatch(events, result)
    }

    pub fn flush(&mut self) -> ClientResult<()> {
        let result = self.event_loop.flush();
        self.record(result)
    }

    /// Descriptor to poll for readability. Owned by the client.
    pub fn fd(&self) -> BorrowedFd<'_> {
        self.event_loop.fd()
    }

    /// Clear focus, destroy every toplevel, release the ray device.
    ///
    /// Dropping the client does the same; the connection closes on drop.
    pub fn destroy(mut self) {
        self.teardown();
    }

    fn roundtrip(&mut self) -> ClientResult<usize> {
        let mut events = std::mem::take(&mut self.scratch);
        let result = self.event_loop.roundtrip(&mut events);
        self.finish_dispatch(events, result)
    }

    fn finish_dispatch(
        &mut self,
        mut events: Vec<ServerEvent>,
        result: crate::error::TransportResult<usize>,
    ) -> ClientResult<usize> {
        let mut outcome = result.map_err(ClientError::from);
        let count = events.len();
        for event in events.drain(..) {
            if let Err(e) = self.handle_event(event) {
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }
        self.scratch = events;
        let outcome = outcome.map(|_| count);
        self.record(outcome)
    }

    fn handle_event(&mut self, event: ServerEvent) -> ClientResult<()> {
        match event {
            ServerEvent::Global(global) => {
                let Some(kind) = GlobalKind::from_interface(&global.interface) else {
                    return Ok(());
                };
                if self.bound.contains(kind.flag()) {
                    debug!(
                        "{} announced again as name {}, keeping the first",
                        global.interface, global.name
                    );
                    return Ok(());
                }
                self.event_loop.transport_mut().bind_global(kind, &global)?;
                self.bound |= kind.flag();
                self.global_names.push((global.name, kind));
                info!("🔗 Bound {} v{}", global.interface, global.version);
            }
            ServerEvent::GlobalRemoved { name } => {
                let Some(index) = self.global_names.iter().position(|(n, _)| *n == name) else {
                    return Ok(());
                };
                let (_, kind) = self.global_names.remove(index);
                self.bound.remove(kind.flag());
                warn!("global {} withdrawn by server", kind.interface());
                if kind == GlobalKind::Seat {
                    self.release_ray();
                    self.capabilities = SeatCapabilities::empty();
                }
                self.event_loop.transport_mut().unbind_global(kind);
            }
            ServerEvent::SeatCapabilities(bits) => {
                let capabilities = SeatCapabilities::from_bits_retain(bits);
                self.capabilities = capabilities;
                let mut bound = Ok(());
                if capabilities.contains(SeatCapabilities::RAY) {
                    if !self.ray_bound {
                        bound = self.event_loop.transport_mut().bind_ray();
                        if bound.is_ok() {
                            self.ray_bound = true;
                            info!("🎯 Ray device bound");
                        }
                    }
                } else {
                    self.release_ray();
                }
                self.handler.seat_capability(capabilities);
                bound?;
            }
            ServerEvent::Ray(ray) => {
                if !self.ray_bound {
                    debug!("ray event without a bound ray device: {:?}", ray);
                    return Ok(());
                }
                self.decoder
                    .decode(ray, &self.registry, &self.hit_tester, &mut self.handler);
            }
        }
        Ok(())
    }

    fn release_ray(&mut self) {
        if self.ray_bound {
            self.event_loop.transport_mut().release_ray();
            self.ray_bound = false;
            self.decoder.release(&mut self.handler);
            info!("Ray device released");
        }
    }

    fn record<R>(&mut self, result: Result<R, impl Into<ClientError>>) -> ClientResult<R> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => self.fail(e.into()),
        }
    }

    fn fail<R>(&mut self, error: ClientError) -> ClientResult<R> {
        self.last_error = Some(error.kind());
        Err(error)
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.decoder.reset();
        self.event_loop.cancel_read();
        let transport = self.event_loop.transport_mut();
        for toplevel in self.registry.drain() {
            transport.destroy_surface(toplevel.id());
        }
        if self.ray_bound {
            transport.release_ray();
            self.ray_bound = false;
        }
        if let Err(e) = transport.flush() {
            debug!("flush during teardown failed: {}", e);
        }
    }
}

impl<T, H, Ht> Drop for Client<T, H, Ht>
where
    T: Transport,
    H: ClientHandler,
    Ht: HitTester,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
