//! Ray input decoding
//!
//! Raw ray events from the seat are resolved against the toplevel registry,
//! hit tested, and fed to the [`FocusTracker`]. Ray coordinates arrive as
//! 32-bit wire words holding IEEE-754 floats bit for bit, not as scaled
//! fixed-point numbers.

use crate::focus::{FocusTracker, FocusTransition};
use crate::handler::ClientHandler;
use crate::hit_test::{HitResult, HitTester};
use crate::registry::ToplevelRegistry;
use crate::toplevel::{SurfaceId, ViewId};
use cgmath::Vector3;
use log::debug;

/// Three raw 32-bit wire words.
pub type RawVec3 = [i32; 3];

/// Events emitted by a bound ray device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayEvent {
    Enter {
        serial: u32,
        surface: Option<SurfaceId>,
        origin: RawVec3,
        direction: RawVec3,
    },
    Motion {
        time: u32,
        origin: RawVec3,
        direction: RawVec3,
    },
    Leave {
        serial: u32,
        surface: Option<SurfaceId>,
    },
    Button {
        serial: u32,
        time: u32,
        button: u32,
        state: u32,
    },
}

/// Reinterpret a wire word as the float whose bits it carries.
pub fn decode_word(word: i32) -> f32 {
    f32::from_bits(word as u32)
}

/// Inverse of [`decode_word`].
pub fn encode_word(value: f32) -> i32 {
    value.to_bits() as i32
}

pub fn decode_vec3(raw: RawVec3) -> Vector3<f32> {
    Vector3::new(decode_word(raw[0]), decode_word(raw[1]), decode_word(raw[2]))
}

pub fn encode_vec3(value: Vector3<f32>) -> RawVec3 {
    [encode_word(value.x), encode_word(value.y), encode_word(value.z)]
}

/// Tracks which toplevel the ray is over and owns the focus state.
#[derive(Debug, Default)]
pub struct InputDecoder {
    entered_toplevel: Option<SurfaceId>,
    focus: FocusTracker,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entered_toplevel(&self) -> Option<SurfaceId> {
        self.entered_toplevel
    }

    pub fn entered_view(&self) -> Option<ViewId> {
        self.focus.entered_view()
    }

    /// Single entry point for every ray event.
    pub fn decode<T, H>(
        &mut self,
        event: RayEvent,
        registry: &ToplevelRegistry,
        hit_tester: &T,
        handler: &mut H,
    ) -> FocusTransition
    where
        T: HitTester + ?Sized,
        H: ClientHandler + ?Sized,
    {
        match event {
            RayEvent::Enter {
                serial,
                surface,
                origin,
                direction,
            } => self.on_enter(serial, surface, origin, direction, registry, hit_tester, handler),
            RayEvent::Motion {
                time,
                origin,
                direction,
            } => self.on_motion(time, origin, direction, registry, hit_tester, handler),
            RayEvent::Leave { serial, surface } => self.on_leave(serial, surface, handler),
            RayEvent::Button {
                serial,
                time,
                button,
                state,
            } => {
                handler.button(serial, time, button, state);
                FocusTransition::Unchanged
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn on_enter<T, H>(
        &mut self,
        serial: u32,
        surface: Option<SurfaceId>,
        origin: RawVec3,
        direction: RawVec3,
        registry: &ToplevelRegistry,
        hit_tester: &T,
        handler: &mut H,
    ) -> FocusTransition
    where
        T: HitTester + ?Sized,
        H: ClientHandler + ?Sized,
    {
        let Some(toplevel) = surface.and_then(|id| registry.find(id)) else {
            debug!("ray enter (serial {}) on unknown surface {:?}, ignoring", serial, surface);
            self.entered_toplevel = None;
            return FocusTransition::Unchanged;
        };

        self.entered_toplevel = Some(toplevel.id());
        let result = hit_tester.hit_test(decode_vec3(origin), decode_vec3(direction), toplevel);
        self.focus.step(result, handler)
    }

    fn on_motion<T, H>(
        &mut self,
        _time: u32,
        origin: RawVec3,
        direction: RawVec3,
        registry: &ToplevelRegistry,
        hit_tester: &T,
        handler: &mut H,
    ) -> FocusTransition
    where
        T: HitTester + ?Sized,
        H: ClientHandler + ?Sized,
    {
        let Some(toplevel) = self.entered_toplevel.and_then(|id| registry.find(id)) else {
            return FocusTransition::Unchanged;
        };

        let result = hit_tester.hit_test(decode_vec3(origin), decode_vec3(direction), toplevel);
        self.focus.step(result, handler)
    }

    fn on_leave<H>(&mut self, serial: u32, surface: Option<SurfaceId>, handler: &mut H) -> FocusTransition
    where
        H: ClientHandler + ?Sized,
    {
        debug!("ray leave (serial {}) from {:?}", serial, surface);
        self.entered_toplevel = None;
        self.focus.step(HitResult::Miss, handler)
    }

    /// The toplevel `id` is going away: drop any focus it holds, silently.
    pub fn forget_toplevel(&mut self, id: SurfaceId) {
        if self.entered_toplevel == Some(id) {
            self.entered_toplevel = None;
            self.focus.reset();
        }
        if self.focus.entered_view().map(|view| view.surface) == Some(id) {
            self.focus.reset();
        }
    }

    /// The ray device was released: end any focus with a final leave.
    pub fn release<H: ClientHandler + ?Sized>(&mut self, handler: &mut H) -> FocusTransition {
        self.entered_toplevel = None;
        self.focus.clear(handler)
    }

    /// Forget everything without callbacks.
    pub fn reset(&mut self) {
        self.entered_toplevel = None;
        self.focus.reset();
    }
}
