//! Module used to communicate changes in the history.

use core::fmt::{self, Debug, Formatter};
use core::mem;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The signal describes the state change done to the history.
///
/// The history emits a signal after an action lands on the main undo
/// sequence (a fresh call or a redo) and after a successful undo. Queries
/// such as [`can_undo`](crate::History::can_undo) are meant to be re-run by
/// the receiver; the signal only says that something happened.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Signal {
    /// A unit was applied and recorded on the undo sequence.
    Applied,
    /// A unit was undone and moved to the redo sequence.
    Undone,
}

/// Handles signals emitted by the history.
///
/// This allows you to trigger events, such as updating the enabled state of
/// undo/redo menu entries, on certain state changes.
pub trait Slot {
    /// Receives a signal that describes the state change done to the history.
    fn on_emit(&mut self, signal: Signal);
}

impl Slot for () {
    fn on_emit(&mut self, _: Signal) {}
}

impl<F: FnMut(Signal)> Slot for F {
    fn on_emit(&mut self, signal: Signal) {
        self(signal)
    }
}

/// Slot wrapper that adds some additional functionality.
pub(crate) struct Socket(Option<Box<dyn Slot>>);

impl Socket {
    pub fn connect(&mut self, slot: Option<Box<dyn Slot>>) -> Option<Box<dyn Slot>> {
        mem::replace(&mut self.0, slot)
    }

    pub fn disconnect(&mut self) -> Option<Box<dyn Slot>> {
        self.0.take()
    }

    pub fn is_vacant(&self) -> bool {
        self.0.is_none()
    }
}

impl Default for Socket {
    fn default() -> Self {
        Socket(None)
    }
}

impl Debug for Socket {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Socket")
            .field(&self.0.as_ref().map(|_| "..."))
            .finish()
    }
}
