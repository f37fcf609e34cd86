//! Registration of reversible operations.

use crate::action::{Action, BackwardFn, ForwardFn, Owner, Unit};
use crate::error::OpKind;
use crate::{stack, Error, History, OperationError, Result, TransferState, Value};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use tracing::trace;

/// Registers a reversible operation under a description template.
///
/// This is the usual entry point: bind the forward operation here and attach
/// the backward one with [`Command::undo`]. Calling the finished command
/// runs the forward operation immediately and records the resulting
/// [`Action`] with the current thread's history.
///
/// # Examples
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use retrace::{stack, undoable, Value};
///
/// let seq = Rc::new(RefCell::new(vec![1, 2, 3, 4]));
/// let add = undoable("Add pos {pos}", {
///     let seq = Rc::clone(&seq);
///     move |_, state| {
///         let item = state.arg(0).and_then(Value::as_int).unwrap_or_default();
///         seq.borrow_mut().push(item);
///         state.insert("pos", seq.borrow().len() - 1);
///         Ok(Value::Nil)
///     }
/// })
/// .undo({
///     let seq = Rc::clone(&seq);
///     move |_, state| {
///         let pos = state.get("pos").and_then(Value::as_int).unwrap_or_default();
///         seq.borrow_mut().remove(pos as usize);
///         Ok(())
///     }
/// });
///
/// add.call([Value::from(5)])?;
/// assert_eq!(*seq.borrow(), [1, 2, 3, 4, 5]);
/// assert_eq!(stack().undo_text().as_deref(), Some("Undo Add pos 4"));
/// stack().undo().unwrap()?;
/// assert_eq!(*seq.borrow(), [1, 2, 3, 4]);
/// # Ok::<(), retrace::Error>(())
/// ```
pub fn undoable<F>(template: impl Into<String>, forward: F) -> Command
where
    F: Fn(Option<&Owner>, &mut TransferState) -> core::result::Result<Value, OperationError>
        + 'static,
{
    Command::new(template).does(forward)
}

/// A reusable definition of a reversible operation.
///
/// A command pairs a description template with a forward and a backward
/// operation. Each call seeds a fresh [`TransferState`] with the call
/// arguments, runs the forward operation, and submits the resulting
/// [`Action`] to the current receiver of the history — the main undo
/// sequence, or the active group.
///
/// Commands are cheap to clone; clones share the registered operations.
#[derive(Clone, Default)]
pub struct Command {
    template: String,
    forward: Option<Rc<ForwardFn>>,
    backward: Option<Rc<BackwardFn>>,
    owner: Option<Owner>,
}

impl Command {
    /// Returns a command with no operations attached.
    pub fn new(template: impl Into<String>) -> Command {
        Command {
            template: template.into(),
            forward: None,
            backward: None,
            owner: None,
        }
    }

    /// Attaches the forward operation.
    pub fn does<F>(mut self, forward: F) -> Command
    where
        F: Fn(Option<&Owner>, &mut TransferState) -> core::result::Result<Value, OperationError>
            + 'static,
    {
        self.forward = Some(Rc::new(forward));
        self
    }

    /// Attaches the backward operation.
    pub fn undo<B>(mut self, backward: B) -> Command
    where
        B: Fn(Option<&Owner>, &mut TransferState) -> core::result::Result<(), OperationError>
            + 'static,
    {
        self.backward = Some(Rc::new(backward));
        self
    }

    /// Binds `owner` as the instance this command operates on.
    ///
    /// The bound owner is handed to both operations as their leading
    /// argument, where it can be downcast to its concrete type. Unbound
    /// commands pass `None`.
    pub fn bind(mut self, owner: Owner) -> Command {
        self.owner = Some(owner);
        self
    }

    /// The description template the command was registered with.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Calls the command with positional arguments.
    ///
    /// The forward operation runs immediately, so its side effects are
    /// visible once this returns, and its output is handed back to the
    /// caller. The recorded action is submitted to the current thread's
    /// history.
    ///
    /// # Errors
    /// [`Error::Unconfigured`] if either operation is missing; the forward
    /// operation's own error, unrecorded, if the initial run fails.
    pub fn call(&self, args: impl IntoIterator<Item = Value>) -> Result<Value> {
        self.call_with(args, [])
    }

    /// Calls the command with positional and keyword arguments.
    pub fn call_with(
        &self,
        args: impl IntoIterator<Item = Value>,
        kwargs: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Value> {
        stack::with(|history| self.call_in(history, args, kwargs))
    }

    /// Calls the command against a specific history instead of the
    /// thread-local one.
    pub fn call_in(
        &self,
        history: &History,
        args: impl IntoIterator<Item = Value>,
        kwargs: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Value> {
        let forward = self
            .forward
            .clone()
            .ok_or(Error::Unconfigured(OpKind::Do))?;
        let backward = self
            .backward
            .clone()
            .ok_or(Error::Unconfigured(OpKind::Undo))?;
        let state = TransferState::seeded(args.into_iter().collect(), kwargs.into_iter().collect());
        let mut action = Action::from_parts(
            self.template.clone(),
            forward,
            backward,
            self.owner.clone(),
            state,
        );
        trace!(template = %self.template, "command called");
        // A failure here propagates before anything is recorded.
        let output = action.apply()?;
        history.append(action);
        Ok(output)
    }
}

impl Debug for Command {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Command")
            .field("template", &self.template)
            .field("forward", &self.forward.is_some())
            .field("backward", &self.backward.is_some())
            .field("bound", &self.owner.is_some())
            .finish()
    }
}
