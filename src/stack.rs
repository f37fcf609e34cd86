//! The per-thread history singleton.

use crate::{History, Result, Slot, Unit};

thread_local! {
    static STACK: History = History::new();
}

pub(crate) fn with<R>(f: impl FnOnce(&History) -> R) -> R {
    STACK.with(f)
}

/// Returns a handle to the current thread's [`History`].
///
/// The history is created lazily on first use and lives for the rest of the
/// thread. Every registered [`Command`](crate::Command) submits here when
/// called through [`Command::call`](crate::Command::call). The execution
/// model is single-threaded and synchronous; each thread gets its own
/// independent history, which also keeps reentrant nesting working — a
/// backward operation may call further registered commands, and their
/// actions land on whatever receiver is current at that moment.
///
/// # Examples
/// ```
/// use retrace::{stack, undoable, Value};
///
/// let noop = undoable("Noop", |_, _| Ok(Value::Nil)).undo(|_, _| Ok(()));
/// noop.call([])?;
/// assert!(stack().can_undo());
/// stack().undo().unwrap()?;
/// assert!(stack().can_redo());
/// stack().clear();
/// assert!(!stack().can_redo());
/// # Ok::<(), retrace::Error>(())
/// ```
pub fn stack() -> Stack {
    Stack
}

/// Collects every command called inside `f` into one group on the current
/// thread's history.
///
/// See [`History::group`].
///
/// # Examples
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use retrace::{group, stack, undoable, Value};
///
/// let seq: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
/// let add = undoable("Add", {
///     let seq = Rc::clone(&seq);
///     move |_, state| {
///         seq.borrow_mut()
///             .push(state.arg(0).and_then(Value::as_int).unwrap_or_default());
///         Ok(Value::Nil)
///     }
/// })
/// .undo({
///     let seq = Rc::clone(&seq);
///     move |_, _| {
///         seq.borrow_mut().pop();
///         Ok(())
///     }
/// });
///
/// group("Add {count} items", || {
///     for item in [4, 6, 8] {
///         add.call([Value::from(item)])?;
///     }
///     Ok::<_, retrace::Error>(())
/// })?;
/// assert_eq!(stack().undo_count(), 1);
/// stack().undo().unwrap()?;
/// assert!(seq.borrow().is_empty());
/// # Ok::<(), retrace::Error>(())
/// ```
pub fn group<T, E>(
    template: impl Into<String>,
    f: impl FnOnce() -> core::result::Result<T, E>,
) -> core::result::Result<T, E> {
    with(|history| history.group(template, f))
}

/// A copyable handle to the current thread's [`History`].
///
/// All methods proxy to the underlying history; see [`History`] for their
/// behavior.
#[derive(Copy, Clone, Debug, Default)]
pub struct Stack;

impl Stack {
    /// See [`History::can_undo`].
    pub fn can_undo(self) -> bool {
        with(History::can_undo)
    }

    /// See [`History::can_redo`].
    pub fn can_redo(self) -> bool {
        with(History::can_redo)
    }

    /// See [`History::undo_count`].
    pub fn undo_count(self) -> usize {
        with(History::undo_count)
    }

    /// See [`History::redo_count`].
    pub fn redo_count(self) -> usize {
        with(History::redo_count)
    }

    /// See [`History::append`].
    pub fn append(self, unit: impl Unit + 'static) {
        with(|history| history.append(unit));
    }

    /// See [`History::undo`].
    pub fn undo(self) -> Option<Result<()>> {
        with(History::undo)
    }

    /// See [`History::redo`].
    pub fn redo(self) -> Option<Result<()>> {
        with(History::redo)
    }

    /// See [`History::group`].
    pub fn group<T, E>(
        self,
        template: impl Into<String>,
        f: impl FnOnce() -> core::result::Result<T, E>,
    ) -> core::result::Result<T, E> {
        with(|history| history.group(template, f))
    }

    /// See [`History::undo_text`].
    pub fn undo_text(self) -> Option<String> {
        with(History::undo_text)
    }

    /// See [`History::redo_text`].
    pub fn redo_text(self) -> Option<String> {
        with(History::redo_text)
    }

    /// See [`History::savepoint`].
    pub fn savepoint(self) {
        with(History::savepoint);
    }

    /// See [`History::has_changed`].
    pub fn has_changed(self) -> bool {
        with(History::has_changed)
    }

    /// See [`History::clear`].
    pub fn clear(self) {
        with(History::clear);
    }

    /// See [`History::connect`].
    pub fn connect(self, slot: impl Slot + 'static) -> Option<Box<dyn Slot>> {
        with(|history| history.connect(slot))
    }

    /// See [`History::disconnect`].
    pub fn disconnect(self) -> Option<Box<dyn Slot>> {
        with(History::disconnect)
    }
}
