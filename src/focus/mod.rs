//! Pointer focus tracking
//!
//! Turns successive hit results into enter/motion/leave callbacks. A view
//! never sees motion without a prior enter, and every enter is eventually
//! paired with exactly one leave.

use crate::handler::ClientHandler;
use crate::hit_test::HitResult;
use crate::toplevel::ViewId;
use log::trace;

/// Which callbacks a single [`FocusTracker::step`] fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTransition {
    Unchanged,
    Leave,
    Enter,
    LeaveEnter,
    Motion,
}

impl FocusTransition {
    pub fn entered(&self) -> bool {
        matches!(self, FocusTransition::Enter | FocusTransition::LeaveEnter)
    }

    pub fn left(&self) -> bool {
        matches!(self, FocusTransition::Leave | FocusTransition::LeaveEnter)
    }
}

/// Holds the currently entered view.
#[derive(Debug, Default, Clone)]
pub struct FocusTracker {
    entered: Option<ViewId>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entered_view(&self) -> Option<ViewId> {
        self.entered
    }

    /// Feed one hit result, firing callbacks on `handler` before returning.
    pub fn step<H: ClientHandler + ?Sized>(
        &mut self,
        result: HitResult,
        handler: &mut H,
    ) -> FocusTransition {
        let previous = self.entered;
        let next = result.view();
        let mut left = false;
        let mut transition = FocusTransition::Unchanged;

        if previous.is_some() && previous != next {
            handler.pointer_leave();
            left = true;
            transition = FocusTransition::Leave;
        }

        if let HitResult::Hit { view, x, y } = result {
            if previous != Some(view) {
                handler.pointer_enter(view, x, y);
                transition = if left {
                    FocusTransition::LeaveEnter
                } else {
                    FocusTransition::Enter
                };
            } else {
                handler.pointer_motion(x, y);
                transition = FocusTransition::Motion;
            }
        }

        self.entered = next;
        if transition != FocusTransition::Unchanged {
            trace!("focus {:?}: {:?} -> {:?}", transition, previous, next);
        }
        transition
    }

    /// Drop the entered view, firing `pointer_leave` if one was entered.
    pub fn clear<H: ClientHandler + ?Sized>(&mut self, handler: &mut H) -> FocusTransition {
        self.step(HitResult::Miss, handler)
    }

    /// Forget the entered view without any callback.
    pub fn reset(&mut self) {
        self.entered = None;
    }
}
