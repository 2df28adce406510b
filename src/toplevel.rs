//! Toplevel handles and the identity types that correlate server events.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Server-side identity of a toplevel's surface.
///
/// Stable for the lifetime of the toplevel; inbound ray events carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// An interactive region inside a toplevel, as recognised by a hit tester.
///
/// Only equality matters to focus tracking; `index` 0 is the root view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    pub surface: SurfaceId,
    pub index: u32,
}

impl ViewId {
    pub fn root(surface: SurfaceId) -> Self {
        Self { surface, index: 0 }
    }
}

/// Non-owning back-reference from a toplevel to the client that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ClientId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A rectangular surface presented to the spatial server.
#[derive(Debug, Clone, PartialEq)]
pub struct Toplevel {
    id: SurfaceId,
    width: f32,
    height: f32,
    owner: ClientId,
}

impl Toplevel {
    pub fn new(id: SurfaceId, width: f32, height: f32, owner: ClientId) -> Self {
        Self {
            id,
            width,
            height,
            owner,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Client this toplevel belongs to. Used for validation only.
    pub fn owner(&self) -> ClientId {
        self.owner
    }

    pub fn root_view(&self) -> ViewId {
        ViewId::root(self.id)
    }
}
