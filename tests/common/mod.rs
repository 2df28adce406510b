// Shared fixtures for zsurface integration tests
//
// Builds clients on top of the in-memory transport and records every
// callback so tests can assert on exact callback sequences.

#![allow(dead_code)]

use cgmath::Vector3;
use zsurface::input::encode_vec3;
use zsurface::{
    Client, ClientHandler, MemoryTransport, PlaneHitTester, RayEvent, SeatCapabilities,
    ServerEvent, SurfaceId, ViewId,
};

pub type TestClient = Client<MemoryTransport, RecordingHandler, PlaneHitTester>;

#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    Enter(ViewId, f32, f32),
    Motion(f32, f32),
    Leave,
    Seat(SeatCapabilities),
    Button(u32, u32, u32, u32),
}

#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub calls: Vec<Callback>,
}

impl RecordingHandler {
    pub fn take(&mut self) -> Vec<Callback> {
        std::mem::take(&mut self.calls)
    }
}

impl ClientHandler for RecordingHandler {
    fn pointer_enter(&mut self, view: ViewId, x: f32, y: f32) {
        self.calls.push(Callback::Enter(view, x, y));
    }

    fn pointer_motion(&mut self, x: f32, y: f32) {
        self.calls.push(Callback::Motion(x, y));
    }

    fn pointer_leave(&mut self) {
        self.calls.push(Callback::Leave);
    }

    fn seat_capability(&mut self, capabilities: SeatCapabilities) {
        self.calls.push(Callback::Seat(capabilities));
    }

    fn button(&mut self, serial: u32, time: u32, button: u32, state: u32) {
        self.calls.push(Callback::Button(serial, time, button, state));
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Client on a server that has not announced anything yet.
pub fn bare_client() -> TestClient {
    init_logging();
    let transport = MemoryTransport::new().expect("socket pair");
    Client::new(transport, RecordingHandler::default(), PlaneHitTester::default())
        .expect("client construction")
}

/// Client with every global bound and a ray device, callbacks cleared.
pub fn ready_client() -> TestClient {
    init_logging();
    let mut transport = MemoryTransport::new().expect("socket pair");
    transport.announce_required_globals();
    transport.send(ServerEvent::SeatCapabilities(SeatCapabilities::RAY.bits()));
    let mut client = Client::new(transport, RecordingHandler::default(), PlaneHitTester::default())
        .expect("client construction");
    assert!(client.has_ray());
    client.handler_mut().take();
    client
}

/// Read and dispatch whatever the server has sent.
pub fn pump(client: &mut TestClient) -> usize {
    client.prepare_read().expect("prepare_read");
    client.read_events().expect("read_events");
    client.dispatch_pending().expect("dispatch_pending")
}

/// A ray pointing straight down the z axis through `(x, y)`.
pub fn ray_through(x: f32, y: f32) -> ([i32; 3], [i32; 3]) {
    (
        encode_vec3(Vector3::new(x, y, 1.0)),
        encode_vec3(Vector3::new(0.0, 0.0, -1.0)),
    )
}

pub fn enter(surface: SurfaceId, x: f32, y: f32) -> RayEvent {
    let (origin, direction) = ray_through(x, y);
    RayEvent::Enter {
        serial: 1,
        surface: Some(surface),
        origin,
        direction,
    }
}

pub fn motion(x: f32, y: f32) -> RayEvent {
    let (origin, direction) = ray_through(x, y);
    RayEvent::Motion {
        time: 0,
        origin,
        direction,
    }
}

pub fn leave(surface: SurfaceId) -> RayEvent {
    RayEvent::Leave {
        serial: 2,
        surface: Some(surface),
    }
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {} to be close to {}",
        actual,
        expected
    );
}
