//! Shared helpers for unit tests.

use crate::globals::SeatCapabilities;
use crate::handler::ClientHandler;
use crate::toplevel::ViewId;

#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    Enter(ViewId, f32, f32),
    Motion(f32, f32),
    Leave,
    Seat(SeatCapabilities),
    Button(u32, u32, u32, u32),
}

/// Records every callback in order.
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
