//! Records reversible operations as they execute and maintains an undo-redo
//! history over them.
//!
//! It is an implementation of the command pattern where a command is
//! registered once as a pair of operations — a forward one and a backward
//! one — bound together by a mutable transfer state. Calling the registered
//! [`Command`] runs the forward operation immediately and records the
//! resulting [`Action`] with the history; [`stack()`] gives access to the
//! history to undo, redo, group, and query what happened.
//!
//! # Features
//!
//! * [`undoable`] registers a description template and a forward operation;
//!   the backward operation is attached builder-style with [`Command::undo`].
//! * [`stack()`] returns the current thread's [`History`], which keeps the
//!   undo and redo sequences, a save point for tracking unsaved changes, and
//!   an optional [`Slot`] that is notified of state changes.
//! * [`group()`] collects every command called within a scope into a single
//!   [`Group`] that undoes and redoes as one unit; groups nest.
//! * An error during the initial run of a command is never recorded. An
//!   error while replaying a recorded unit clears the whole history before
//!   it is returned, so a half-undone unit can never corrupt later replays.
//! * Configurable display formatting is provided through
//!   [`History::display`], colored when the `colored` feature is enabled,
//!   with per-entry timestamps when the `chrono` feature is enabled.
//!
//! # Examples
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use retrace::{stack, undoable, Value};
//!
//! let seq = Rc::new(RefCell::new(vec![1, 2, 3, 4]));
//!
//! let add = undoable("Add pos {pos}", {
//!     let seq = Rc::clone(&seq);
//!     move |_, state| {
//!         let item = state.arg(0).and_then(Value::as_int).unwrap_or_default();
//!         seq.borrow_mut().push(item);
//!         state.insert("pos", seq.borrow().len() - 1);
//!         Ok(Value::Nil)
//!     }
//! })
//! .undo({
//!     let seq = Rc::clone(&seq);
//!     move |_, state| {
//!         let pos = state.get("pos").and_then(Value::as_int).unwrap_or_default();
//!         seq.borrow_mut().remove(pos as usize);
//!         Ok(())
//!     }
//! });
//!
//! add.call([Value::from(5)])?;
//! assert_eq!(*seq.borrow(), [1, 2, 3, 4, 5]);
//! assert_eq!(stack().undo_text().as_deref(), Some("Undo Add pos 4"));
//!
//! stack().undo().unwrap()?;
//! assert_eq!(*seq.borrow(), [1, 2, 3, 4]);
//!
//! stack().redo().unwrap()?;
//! assert_eq!(*seq.borrow(), [1, 2, 3, 4, 5]);
//! # Ok::<(), retrace::Error>(())
//! ```
//!
//! The transfer state is how the two operations talk to each other: the
//! forward operation records the position it inserted at, the backward
//! operation reads it back, and the description template formats it. The
//! forward operation is re-run verbatim on redo, so it has to be written to
//! be safely repeatable from its recorded state — that contract is on the
//! operation author, not checked by the history.

#![deny(missing_docs)]

mod action;
mod command;
mod entry;
mod error;
mod format;
mod group;
mod history;
mod slot;
mod stack;
mod state;
mod value;

pub use self::{
    action::{Action, BackwardFn, ForwardFn, Owner, Unit},
    command::{undoable, Command},
    error::{Error, OpKind, OperationError, Result},
    group::Group,
    history::{Builder, Display, History},
    slot::{Signal, Slot},
    stack::{group, stack, Stack},
    state::{TransferState, ARGS, KWARGS},
    value::Value,
};
