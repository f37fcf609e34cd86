//! The unit contract and the closure-backed action.

use crate::format;
use crate::{OperationError, Result, TransferState, Value};
use core::any::Any;
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// The owning instance a command can be bound to.
///
/// Operations receive the owner as their leading argument and downcast it to
/// the concrete type they were registered for.
pub type Owner = Rc<dyn Any>;

/// The forward operation of an action.
///
/// Receives the bound owner (if any) and the action's transfer state; the
/// original call arguments are read back out of the state, which is what
/// makes redo a verbatim re-run. Expected to record in the state whatever
/// the backward operation needs.
pub type ForwardFn =
    dyn Fn(Option<&Owner>, &mut TransferState) -> core::result::Result<Value, OperationError>;

/// The backward operation of an action.
///
/// Receives the same transfer state the forward operation wrote. Treat it as
/// read-only input; only add data needed by further nested undos.
pub type BackwardFn =
    dyn Fn(Option<&Owner>, &mut TransferState) -> core::result::Result<(), OperationError>;

/// An opaque entry in the history.
///
/// Everything the [`History`](crate::History) stores goes through this
/// contract: [`Action`] for single reversible operations and
/// [`Group`](crate::Group) for composites.
pub trait Unit {
    /// Runs the forward behavior. Called once when the unit is created and
    /// again, verbatim, on every redo; the output of redos is discarded.
    fn apply(&mut self) -> Result<Value>;

    /// Reverses the effect of the most recent [`apply`](Unit::apply).
    fn undo(&mut self) -> Result<()>;

    /// The formatted description of the unit.
    fn text(&self) -> String;
}

impl<U: Unit + ?Sized> Unit for Box<U> {
    fn apply(&mut self) -> Result<Value> {
        (**self).apply()
    }

    fn undo(&mut self) -> Result<()> {
        (**self).undo()
    }

    fn text(&self) -> String {
        (**self).text()
    }
}

/// A single reversible operation instance with its own transfer state.
///
/// Created by calling a [`Command`](crate::Command); the forward operation
/// has already run by the time the action reaches the history.
pub struct Action {
    template: String,
    forward: Rc<ForwardFn>,
    backward: Rc<BackwardFn>,
    owner: Option<Owner>,
    state: TransferState,
}

impl Action {
    /// Returns an action over `forward` and `backward` with an empty
    /// transfer state.
    ///
    /// Most actions are created by calling a [`Command`](crate::Command)
    /// instead, which seeds the state with the call arguments.
    pub fn new<F, B>(template: impl Into<String>, forward: F, backward: B) -> Action
    where
        F: Fn(Option<&Owner>, &mut TransferState) -> core::result::Result<Value, OperationError>
            + 'static,
        B: Fn(Option<&Owner>, &mut TransferState) -> core::result::Result<(), OperationError>
            + 'static,
    {
        Action::from_parts(
            template.into(),
            Rc::new(forward),
            Rc::new(backward),
            None,
            TransferState::new(),
        )
    }

    pub(crate) fn from_parts(
        template: String,
        forward: Rc<ForwardFn>,
        backward: Rc<BackwardFn>,
        owner: Option<Owner>,
        state: TransferState,
    ) -> Action {
        Action {
            template,
            forward,
            backward,
            owner,
            state,
        }
    }

    /// The action's transfer state.
    pub fn state(&self) -> &TransferState {
        &self.state
    }

    /// Mutable access to the action's transfer state.
    pub fn state_mut(&mut self) -> &mut TransferState {
        &mut self.state
    }
}

impl Unit for Action {
    fn apply(&mut self) -> Result<Value> {
        (self.forward)(self.owner.as_ref(), &mut self.state).map_err(Into::into)
    }

    fn undo(&mut self) -> Result<()> {
        (self.backward)(self.owner.as_ref(), &mut self.state).map_err(Into::into)
    }

    fn text(&self) -> String {
        format::expand(&self.template, &|key| {
            self.state.get(key).map(ToString::to_string)
        })
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Action")
            .field("template", &self.template)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
