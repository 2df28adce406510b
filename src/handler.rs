//! Application callbacks.

use crate::globals::SeatCapabilities;
use crate::toplevel::ViewId;

/// Hooks the client invokes while dispatching server events.
///
/// Every method has an empty default, so an application only implements the
/// ones it cares about. Callbacks run synchronously inside
/// `Client::dispatch_pending` and friends.
pub trait ClientHandler {
    fn pointer_enter(&mut self, _view: ViewId, _x: f32, _y: f32) {}

    fn pointer_motion(&mut self, _x: f32, _y: f32) {}

    fn pointer_leave(&mut self) {}

    /// Runs after the client has bound or released the ray device.
    fn seat_capability(&mut self, _capabilities: SeatCapabilities) {}

    /// Raw ray button event, passed through untouched.
    fn button(&mut self, _serial: u32, _time: u32, _button: u32, _state: u32) {}
}

/// Handler that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl ClientHandler for NoopHandler {}
