//! Server globals the client binds and the seat capability mask.

use bitflags::bitflags;

/// Announced global as seen in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    pub name: u32,
    pub interface: String,
    pub version: u32,
}

/// The six globals a client needs before it can present toplevels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalKind {
    Compositor,
    OpenGl,
    Shm,
    RenderComponentManager,
    Shell,
    Seat,
}

impl GlobalKind {
    pub const ALL: [GlobalKind; 6] = [
        GlobalKind::Compositor,
        GlobalKind::OpenGl,
        GlobalKind::Shm,
        GlobalKind::RenderComponentManager,
        GlobalKind::Shell,
        GlobalKind::Seat,
    ];

    /// Match a registry interface name.
    pub fn from_interface(interface: &str) -> Option<Self> {
        match interface {
            "z11_compositor" => Some(GlobalKind::Compositor),
            "z11_opengl" => Some(GlobalKind::OpenGl),
            "wl_shm" => Some(GlobalKind::Shm),
            "z11_opengl_render_component_manager" => Some(GlobalKind::RenderComponentManager),
            "z11_shell" => Some(GlobalKind::Shell),
            "z11_seat" => Some(GlobalKind::Seat),
            _ => None,
        }
    }

    pub fn interface(&self) -> &'static str {
        match self {
            GlobalKind::Compositor => "z11_compositor",
            GlobalKind::OpenGl => "z11_opengl",
            GlobalKind::Shm => "wl_shm",
            GlobalKind::RenderComponentManager => "z11_opengl_render_component_manager",
            GlobalKind::Shell => "z11_shell",
            GlobalKind::Seat => "z11_seat",
        }
    }

    pub fn flag(&self) -> GlobalSet {
        match self {
            GlobalKind::Compositor => GlobalSet::COMPOSITOR,
            GlobalKind::OpenGl => GlobalSet::OPENGL,
            GlobalKind::Shm => GlobalSet::SHM,
            GlobalKind::RenderComponentManager => GlobalSet::RENDER_COMPONENT_MANAGER,
            GlobalKind::Shell => GlobalSet::SHELL,
            GlobalKind::Seat => GlobalSet::SEAT,
        }
    }
}

bitflags! {
    /// Set of bound globals.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GlobalSet: u8 {
        const COMPOSITOR = 1 << 0;
        const OPENGL = 1 << 1;
        const SHM = 1 << 2;
        const RENDER_COMPONENT_MANAGER = 1 << 3;
        const SHELL = 1 << 4;
        const SEAT = 1 << 5;
        const REQUIRED = Self::COMPOSITOR.bits()
            | Self::OPENGL.bits()
            | Self::SHM.bits()
            | Self::RENDER_COMPONENT_MANAGER.bits()
            | Self::SHELL.bits()
            | Self::SEAT.bits();
    }
}

impl GlobalSet {
    /// Required globals not contained in this set.
    pub fn missing(&self) -> GlobalSet {
        GlobalSet::REQUIRED.difference(*self)
    }
}

bitflags! {
    /// Input devices a seat currently offers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SeatCapabilities: u32 {
        const RAY = 1 << 0;
        const KEYBOARD = 1 << 1;
    }
}
