//! wayland-client backed transport
//!
//! Speaks the z11 protocol over a real display connection. Registry, seat and
//! ray events are turned into [`ServerEvent`]s inside the wayland-client
//! dispatch callbacks and queued until the client drains them.

pub mod protocol;

use crate::error::{TransportError, TransportResult};
use crate::globals::{Global, GlobalKind};
use crate::input::{RawVec3, RayEvent};
use crate::toplevel::SurfaceId;
use crate::transport::{ServerEvent, Transport};
use log::{debug, info, warn};
use protocol::{
    z11_compositor::Z11Compositor, z11_cuboid_window::Z11CuboidWindow, z11_opengl::Z11Opengl,
    z11_opengl_render_component_manager::Z11OpenglRenderComponentManager, z11_ray, z11_ray::Z11Ray,
    z11_seat, z11_seat::Z11Seat, z11_shell::Z11Shell, z11_virtual_object::Z11VirtualObject,
};
use std::collections::VecDeque;
use std::env;
use std::os::fd::BorrowedFd;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use wayland_client::backend::{Backend, WaylandError};
use wayland_client::protocol::{wl_registry, wl_shm::WlShm};
use wayland_client::{
    delegate_noop, Connection, Dispatch, DispatchError, EventQueue, Proxy, QueueHandle,
};

/// Events collected by the dispatch callbacks.
#[derive(Debug, Default)]
pub struct WaylandState {
    events: VecDeque<ServerEvent>,
}

#[derive(Debug, Default)]
struct BoundGlobals {
    compositor: Option<Z11Compositor>,
    opengl: Option<Z11Opengl>,
    shm: Option<WlShm>,
    render_component_manager: Option<Z11OpenglRenderComponentManager>,
    shell: Option<Z11Shell>,
    seat: Option<Z11Seat>,
}

#[derive(Debug)]
struct CuboidToplevel {
    id: SurfaceId,
    virtual_object: Z11VirtualObject,
    window: Z11CuboidWindow,
}

/// Transport over a wayland-client [`Connection`].
pub struct WaylandTransport {
    connection: Connection,
    backend: Backend,
    queue: EventQueue<WaylandState>,
    qh: QueueHandle<WaylandState>,
    state: WaylandState,
    registry: wl_registry::WlRegistry,
    globals: BoundGlobals,
    ray: Option<Z11Ray>,
    toplevels: Vec<CuboidToplevel>,
    read_guard: Option<wayland_client::backend::ReadEventsGuard>,
}

impl WaylandTransport {
    /// Connect to `socket`, or to `WAYLAND_DISPLAY` when `None`.
    ///
    /// Relative socket names are resolved under `XDG_RUNTIME_DIR`.
    pub fn connect(socket: Option<&str>) -> TransportResult<Self> {
        let connection = match socket {
            Some(name) => {
                let path = socket_path(name)?;
                let stream = UnixStream::connect(&path).map_err(|e| {
                    TransportError::Connect(format!("{}: {}", path.display(), e))
                })?;
                Connection::from_socket(stream)
                    .map_err(|e| TransportError::Connect(e.to_string()))?
            }
            None => {
                Connection::connect_to_env().map_err(|e| TransportError::Connect(e.to_string()))?
            }
        };
        info!("🔌 Connected to display server");

        let backend = connection.backend();
        let queue = connection.new_event_queue();
        let qh = queue.handle();
        let registry = connection.display().get_registry(&qh, ());

        Ok(Self {
            connection,
            backend,
            queue,
            qh,
            state: WaylandState::default(),
            registry,
            globals: BoundGlobals::default(),
            ray: None,
            toplevels: Vec::new(),
            read_guard: None,
        })
    }

    fn bind<I>(&self, global: &Global) -> I
    where
        I: Proxy + 'static,
        WaylandState: Dispatch<I, ()>,
    {
        let version = global.version.min(I::interface().version);
        self.registry
            .bind::<I, (), WaylandState>(global.name, version, &self.qh, ())
    }

    fn drain(&mut self, events: &mut Vec<ServerEvent>) -> usize {
        let count = self.state.events.len();
        events.extend(self.state.events.drain(..));
        count
    }
}

impl Transport for WaylandTransport {
    fn roundtrip(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize> {
        self.queue
            .roundtrip(&mut self.state)
            .map_err(dispatch_error)?;
        Ok(self.drain(events))
    }

    fn bind_global(&mut self, kind: GlobalKind, global: &Global) -> TransportResult<()> {
        debug!("binding {} (name {}, v{})", global.interface, global.name, global.version);
        match kind {
            GlobalKind::Compositor => self.globals.compositor = Some(self.bind(global)),
            GlobalKind::OpenGl => self.globals.opengl = Some(self.bind(global)),
            GlobalKind::Shm => self.globals.shm = Some(self.bind(global)),
            GlobalKind::RenderComponentManager => {
                self.globals.render_component_manager = Some(self.bind(global))
            }
            GlobalKind::Shell => self.globals.shell = Some(self.bind(global)),
            GlobalKind::Seat => self.globals.seat = Some(self.bind(global)),
        }
        Ok(())
    }

    fn unbind_global(&mut self, kind: GlobalKind) {
        debug!("unbinding {}", kind.interface());
        match kind {
            GlobalKind::Compositor => self.globals.compositor = None,
            GlobalKind::OpenGl => {
                if let Some(opengl) = self.globals.opengl.take() {
                    opengl.destroy();
                }
            }
            GlobalKind::Shm => self.globals.shm = None,
            GlobalKind::RenderComponentManager => {
                if let Some(manager) = self.globals.render_component_manager.take() {
                    manager.destroy();
                }
            }
            GlobalKind::Shell => self.globals.shell = None,
            GlobalKind::Seat => {
                // the ray belongs to the seat
                self.release_ray();
                self.globals.seat = None;
            }
        }
    }

    fn bind_ray(&mut self) -> TransportResult<()> {
        let seat = self
            .globals
            .seat
            .as_ref()
            .ok_or_else(|| TransportError::Protocol("no z11_seat bound".into()))?;
        if self.ray.is_none() {
            self.ray = Some(seat.get_ray(&self.qh, ()));
        }
        Ok(())
    }

    fn release_ray(&mut self) {
        if let Some(ray) = self.ray.take() {
            ray.destroy();
        }
    }

    fn create_surface(&mut self, width: f32, height: f32) -> TransportResult<SurfaceId> {
        let (Some(compositor), Some(shell)) = (&self.globals.compositor, &self.globals.shell)
        else {
            return Err(TransportError::Protocol(
                "z11_compositor and z11_shell must be bound".into(),
            ));
        };

        let virtual_object = compositor.create_virtual_object(&self.qh, ());
        let window =
            shell.get_cuboid_window(&virtual_object, f64::from(width), f64::from(height), &self.qh, ());
        virtual_object.commit();

        let id = SurfaceId(window.id().protocol_id());
        self.toplevels.push(CuboidToplevel {
            id,
            virtual_object,
            window,
        });
        Ok(id)
    }

    fn destroy_surface(&mut self, id: SurfaceId) {
        if let Some(index) = self.toplevels.iter().position(|t| t.id == id) {
            let toplevel = self.toplevels.remove(index);
            toplevel.window.destroy();
            toplevel.virtual_object.destroy();
        }
    }

    fn prepare_read(&mut self) -> TransportResult<()> {
        if self.read_guard.is_some() {
            return Err(TransportError::AlreadyReading);
        }
        if !self.state.events.is_empty() {
            return Err(TransportError::PendingEvents);
        }
        match self.queue.prepare_read() {
            Some(guard) => {
                self.read_guard = Some(guard);
                Ok(())
            }
            None => Err(TransportError::PendingEvents),
        }
    }

    fn read_events(&mut self) -> TransportResult<()> {
        let guard = self.read_guard.take().ok_or(TransportError::NotPrepared)?;
        guard.read().map(|_| ()).map_err(wayland_error)
    }

    fn cancel_read(&mut self) {
        // dropping the guard cancels the read
        self.read_guard = None;
    }

    fn dispatch_pending(&mut self, events: &mut Vec<ServerEvent>) -> TransportResult<usize> {
        self.queue
            .dispatch_pending(&mut self.state)
            .map_err(dispatch_error)?;
        Ok(self.drain(events))
    }

    fn flush(&mut self) -> TransportResult<()> {
        self.connection.flush().map_err(wayland_error)
    }

    fn fd(&self) -> BorrowedFd<'_> {
        self.backend.poll_fd()
    }
}

fn socket_path(name: &str) -> TransportResult<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return Ok(path);
    }
    let runtime_dir = env::var_os("XDG_RUNTIME_DIR")
        .ok_or_else(|| TransportError::Connect("XDG_RUNTIME_DIR is not set".into()))?;
    Ok(PathBuf::from(runtime_dir).join(path))
}

fn wayland_error(err: WaylandError) -> TransportError {
    match err {
        WaylandError::Io(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
            TransportError::WouldBlock
        }
        WaylandError::Io(e) => TransportError::Io(e),
        other => TransportError::Protocol(other.to_string()),
    }
}

fn dispatch_error(err: DispatchError) -> TransportError {
    match err {
        DispatchError::Backend(e) => wayland_error(e),
        other => TransportError::Protocol(other.to_string()),
    }
}

/// Recover the raw wire word behind a `fixed` argument.
///
/// wayland-client hands out `fixed` as `raw / 256.0` in an `f64`, which holds
/// every `i32` exactly.
fn fixed_word(value: f64) -> i32 {
    (value * 256.0).round() as i32
}

fn fixed_vec3(x: f64, y: f64, z: f64) -> RawVec3 {
    [fixed_word(x), fixed_word(y), fixed_word(z)]
}

fn window_id(window: Option<Z11CuboidWindow>) -> Option<SurfaceId> {
    window.map(|w| SurfaceId(w.id().protocol_id()))
}

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => state.events.push_back(ServerEvent::Global(Global {
                name,
                interface,
                version,
            })),
            wl_registry::Event::GlobalRemove { name } => {
                state.events.push_back(ServerEvent::GlobalRemoved { name })
            }
            _ => {}
        }
    }
}

impl Dispatch<Z11Seat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &Z11Seat,
        event: z11_seat::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let z11_seat::Event::Capability { capabilities } = event {
            state
                .events
                .push_back(ServerEvent::SeatCapabilities(capabilities));
        }
    }
}

impl Dispatch<Z11Ray, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &Z11Ray,
        event: z11_ray::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let ray = match event {
            z11_ray::Event::Enter {
                serial,
                cuboid_window,
                ray_origin_x,
                ray_origin_y,
                ray_origin_z,
                ray_direction_x,
                ray_direction_y,
                ray_direction_z,
            } => RayEvent::Enter {
                serial,
                surface: window_id(cuboid_window),
                origin: fixed_vec3(ray_origin_x, ray_origin_y, ray_origin_z),
                direction: fixed_vec3(ray_direction_x, ray_direction_y, ray_direction_z),
            },
            z11_ray::Event::Leave {
                serial,
                cuboid_window,
            } => RayEvent::Leave {
                serial,
                surface: window_id(cuboid_window),
            },
            z11_ray::Event::Motion {
                time,
                ray_origin_x,
                ray_origin_y,
                ray_origin_z,
                ray_direction_x,
                ray_direction_y,
                ray_direction_z,
            } => RayEvent::Motion {
                time,
                origin: fixed_vec3(ray_origin_x, ray_origin_y, ray_origin_z),
                direction: fixed_vec3(ray_direction_x, ray_direction_y, ray_direction_z),
            },
            z11_ray::Event::Button {
                serial,
                time,
                button,
                state: button_state,
            } => RayEvent::Button {
                serial,
                time,
                button,
                state: button_state,
            },
            _ => {
                warn!("unhandled z11_ray event");
                return;
            }
        };
        state.events.push_back(ServerEvent::Ray(ray));
    }
}

delegate_noop!(WaylandState: ignore WlShm);
delegate_noop!(WaylandState: ignore Z11Compositor);
delegate_noop!(WaylandState: ignore Z11Opengl);
delegate_noop!(WaylandState: ignore Z11OpenglRenderComponentManager);
delegate_noop!(WaylandState: ignore Z11Shell);
delegate_noop!(WaylandState: ignore Z11VirtualObject);
delegate_noop!(WaylandState: ignore Z11CuboidWindow);
