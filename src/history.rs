//! The history of recorded units.

use crate::entry::Entry;
use crate::format::Format;
use crate::slot::Socket;
use crate::{Group, Result, Signal, Slot, Unit};
use core::cell::RefCell;
use core::fmt::{self, Debug, Formatter};
use core::num::NonZeroUsize;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// A history of units with undo-redo and grouping.
///
/// The history owns two sequences: units that can be undone and units that
/// can be redone, both most-recent-last. Recording a new unit on the undo
/// side invalidates the redo side. Failure while replaying a recorded unit
/// invalidates the whole history: the unit already ran partway, so the
/// recorded sequences no longer correspond to the application state and
/// keeping them would risk corrupt undos later.
///
/// A `History` is an ordinary value that can be constructed and owned
/// directly; [`stack()`](crate::stack()) returns a handle to the lazily-created
/// per-thread instance that registered [`Command`](crate::Command)s submit
/// to.
///
/// # Examples
/// ```
/// use retrace::{Action, History, TransferState, Unit, Value};
///
/// let history = History::new();
/// let mut add = Action::new(
///     "Add {item}",
///     |_, state: &mut TransferState| {
///         state.insert("item", 5);
///         Ok(Value::Nil)
///     },
///     |_, _: &mut TransferState| Ok(()),
/// );
/// add.apply()?;
/// history.append(add);
/// assert_eq!(history.undo_text().as_deref(), Some("Undo Add 5"));
/// history.undo().unwrap()?;
/// assert!(history.can_redo());
/// # Ok::<(), retrace::Error>(())
/// ```
pub struct History {
    inner: RefCell<Inner>,
    socket: RefCell<Socket>,
}

struct Inner {
    undos: VecDeque<Entry>,
    redos: Vec<Entry>,
    receivers: Vec<Vec<Box<dyn Unit>>>,
    saved: Option<usize>,
    limit: NonZeroUsize,
}

impl Inner {
    fn push_bounded(&mut self, entry: Entry) {
        if self.undos.len() == self.limit.get() {
            self.undos.pop_front();
            self.saved = self.saved.and_then(|saved| saved.checked_sub(1));
        }
        self.undos.push_back(entry);
    }
}

impl History {
    /// Returns a new unbounded history.
    pub fn new() -> History {
        Builder::new().build()
    }

    /// Returns a builder for a history.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Returns `true` if there is a unit to undo.
    pub fn can_undo(&self) -> bool {
        !self.inner.borrow().undos.is_empty()
    }

    /// Returns `true` if there is a unit to redo.
    pub fn can_redo(&self) -> bool {
        !self.inner.borrow().redos.is_empty()
    }

    /// Returns the number of units on the undo sequence.
    pub fn undo_count(&self) -> usize {
        self.inner.borrow().undos.len()
    }

    /// Returns the number of units on the redo sequence.
    pub fn redo_count(&self) -> usize {
        self.inner.borrow().redos.len()
    }

    /// Returns the limit of the history.
    pub fn limit(&self) -> usize {
        self.inner.borrow().limit.get()
    }

    /// Records `unit` with the current receiver.
    ///
    /// While a [`group`](History::group) scope is active the unit lands in
    /// that group and nothing else changes. Otherwise the unit is recorded
    /// on the undo sequence (the oldest unit falls off once the
    /// [limit](Builder::limit) is reached), the redo sequence is
    /// invalidated, and [`Signal::Applied`] is emitted.
    ///
    /// The unit is recorded as-is; its forward behavior is expected to have
    /// run already.
    pub fn append(&self, unit: impl Unit + 'static) {
        self.append_boxed(Box::new(unit));
    }

    pub(crate) fn append_boxed(&self, unit: Box<dyn Unit>) {
        let mut inner = self.inner.borrow_mut();
        if let Some(frame) = inner.receivers.last_mut() {
            frame.push(unit);
            return;
        }
        inner.push_bounded(Entry::new(unit));
        inner.redos.clear();
        trace!(undos = inner.undos.len(), "recorded unit");
        drop(inner);
        self.emit(Signal::Applied);
    }

    /// Undoes the most recent unit.
    ///
    /// Returns `None` if there is nothing to undo. On success the unit moves
    /// to the redo sequence and [`Signal::Undone`] is emitted. On failure
    /// the entire history is [cleared](History::clear) and the operation's
    /// error is returned: the failed unit ran partway, so the recorded
    /// history can no longer be trusted.
    pub fn undo(&self) -> Option<Result<()>> {
        let mut entry = self.inner.borrow_mut().undos.pop_back()?;
        trace!("undo");
        match entry.unit.undo() {
            Ok(()) => {
                self.inner.borrow_mut().redos.push(entry);
                self.emit(Signal::Undone);
                Some(Ok(()))
            }
            Err(err) => {
                warn!(error = %err, "undo failed, invalidating history");
                self.clear();
                Some(Err(err))
            }
        }
    }

    /// Redoes the most recent undone unit by re-running its forward
    /// behavior. The forward output is discarded.
    ///
    /// Returns `None` if there is nothing to redo. On success the unit moves
    /// back to the undo sequence and [`Signal::Applied`] is emitted; on
    /// failure the entire history is [cleared](History::clear) and the
    /// operation's error is returned.
    pub fn redo(&self) -> Option<Result<()>> {
        let mut entry = self.inner.borrow_mut().redos.pop()?;
        trace!("redo");
        match entry.unit.apply() {
            Ok(_) => {
                self.inner.borrow_mut().push_bounded(entry);
                self.emit(Signal::Applied);
                Some(Ok(()))
            }
            Err(err) => {
                warn!(error = %err, "redo failed, invalidating history");
                self.clear();
                Some(Err(err))
            }
        }
    }

    /// Collects every unit recorded inside `f` into one group.
    ///
    /// On `Ok` the group is submitted as a single unit to whatever receiver
    /// was active before the scope began, so groups nest. On `Err` (or a
    /// panic inside `f`) nothing is submitted and the collected units are
    /// discarded. An empty group is still submitted and undoes as a no-op.
    pub fn group<T, E>(
        &self,
        template: impl Into<String>,
        f: impl FnOnce() -> core::result::Result<T, E>,
    ) -> core::result::Result<T, E> {
        let template = template.into();
        self.inner.borrow_mut().receivers.push(Vec::new());
        let frame = FrameGuard { history: self };
        let out = f();
        let units = frame.finish();
        match out {
            Ok(value) => {
                // `units` is gone if the history was invalidated inside `f`.
                if let Some(units) = units {
                    debug!(count = units.len(), "group closed");
                    self.append_boxed(Box::new(Group::with_units(template, units)));
                }
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }

    /// Returns `"Undo "` plus the text of the next unit to undo, trimmed.
    pub fn undo_text(&self) -> Option<String> {
        let inner = self.inner.borrow();
        let entry = inner.undos.back()?;
        Some(format!("Undo {}", entry.unit.text()).trim().to_string())
    }

    /// Returns `"Redo "` plus the text of the next unit to redo, trimmed.
    pub fn redo_text(&self) -> Option<String> {
        let inner = self.inner.borrow();
        let entry = inner.redos.last()?;
        Some(format!("Redo {}", entry.unit.text()).trim().to_string())
    }

    /// Marks the current position as the saved state.
    pub fn savepoint(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.saved = Some(inner.undos.len());
    }

    /// Returns `true` if the history has moved since the last
    /// [`savepoint`](History::savepoint).
    ///
    /// Without a save point this is always `true`, also right after
    /// [`clear`](History::clear).
    pub fn has_changed(&self) -> bool {
        let inner = self.inner.borrow();
        inner.saved != Some(inner.undos.len())
    }

    /// Removes every unit from the history without undoing them, unsets the
    /// save point, and drops any active receiver frames.
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.undos.clear();
        inner.redos.clear();
        inner.receivers.clear();
        inner.saved = None;
        debug!("history cleared");
    }

    /// Sets how signals are handled when the history changes.
    ///
    /// The previous slot is returned if it exists.
    pub fn connect(&self, slot: impl Slot + 'static) -> Option<Box<dyn Slot>> {
        self.socket.borrow_mut().connect(Some(Box::new(slot)))
    }

    /// Removes and returns the slot if it exists.
    pub fn disconnect(&self) -> Option<Box<dyn Slot>> {
        self.socket.borrow_mut().disconnect()
    }

    /// Returns a structure for configurable formatting of the history.
    pub fn display(&self) -> Display {
        Display::from(self)
    }

    // The slot is taken out while it runs so a hook that triggers further
    // history changes does not recurse into itself.
    fn emit(&self, signal: Signal) {
        let taken = self.socket.borrow_mut().disconnect();
        if let Some(mut slot) = taken {
            slot.on_emit(signal);
            let mut socket = self.socket.borrow_mut();
            if socket.is_vacant() {
                socket.connect(Some(slot));
            }
        }
    }
}

impl Default for History {
    fn default() -> History {
        History::new()
    }
}

impl Debug for History {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("History")
            .field("undos", &inner.undos)
            .field("redos", &inner.redos)
            .field("receivers", &inner.receivers.len())
            .field("saved", &inner.saved)
            .field("limit", &inner.limit)
            .finish()
    }
}

// Pops the receiver frame pushed by `group` even if the closure panics, so
// a failed scope never leaves the receiver redirected.
struct FrameGuard<'a> {
    history: &'a History,
}

impl FrameGuard<'_> {
    fn finish(self) -> Option<Vec<Box<dyn Unit>>> {
        let units = self.history.inner.borrow_mut().receivers.pop();
        core::mem::forget(self);
        units
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.history.inner.borrow_mut().receivers.pop();
    }
}

/// Builder for a [`History`].
///
/// # Examples
/// ```
/// # use retrace::History;
/// let history = History::builder()
///     .limit(100)
///     .capacity(100)
///     .connect(|signal: retrace::Signal| { let _ = signal; })
///     .build();
/// assert_eq!(history.limit(), 100);
/// ```
#[derive(Default)]
pub struct Builder {
    capacity: usize,
    limit: Option<NonZeroUsize>,
    saved: bool,
    slot: Option<Box<dyn Slot>>,
}

impl Builder {
    /// Returns a builder for a history.
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Sets the capacity for the history.
    pub fn capacity(mut self, capacity: usize) -> Builder {
        self.capacity = capacity;
        self
    }

    /// Sets the `limit` of the history.
    ///
    /// # Panics
    /// Panics if `limit` is `0`.
    pub fn limit(mut self, limit: usize) -> Builder {
        self.limit = Some(NonZeroUsize::new(limit).expect("limit can not be `0`"));
        self
    }

    /// Sets if the history starts out at a save point.
    /// By default it does not, so `has_changed` starts out `true`.
    pub fn saved(mut self, saved: bool) -> Builder {
        self.saved = saved;
        self
    }

    /// Connects the slot.
    pub fn connect(mut self, slot: impl Slot + 'static) -> Builder {
        self.slot = Some(Box::new(slot));
        self
    }

    /// Builds the history.
    pub fn build(self) -> History {
        let mut socket = Socket::default();
        socket.connect(self.slot);
        History {
            inner: RefCell::new(Inner {
                undos: VecDeque::with_capacity(self.capacity),
                redos: Vec::new(),
                receivers: Vec::new(),
                saved: self.saved.then_some(0),
                limit: self.limit.unwrap_or(NonZeroUsize::MAX),
            }),
            socket: RefCell::new(socket),
        }
    }
}

impl Debug for Builder {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Builder")
            .field("capacity", &self.capacity)
            .field("limit", &self.limit)
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}

/// Configurable display formatting for a [`History`].
///
/// Lists the undo sequence newest-first with the head position on top,
/// marking the current head and the save point.
pub struct Display<'a> {
    history: &'a History,
    format: Format,
}

impl Display<'_> {
    /// Show colored output (on by default).
    ///
    /// Requires the `colored` feature to be enabled.
    #[cfg(feature = "colored")]
    pub fn colored(&mut self, on: bool) -> &mut Self {
        self.format.colored = on;
        self
    }

    /// Show the head label (on by default).
    pub fn head(&mut self, on: bool) -> &mut Self {
        self.format.head = on;
        self
    }

    /// Show the save point label (on by default).
    pub fn saved(&mut self, on: bool) -> &mut Self {
        self.format.saved = on;
        self
    }

    fn fmt_entry(
        &self,
        f: &mut fmt::Formatter,
        at: usize,
        head: usize,
        saved: Option<usize>,
        entry: Option<&Entry>,
    ) -> fmt::Result {
        self.format.position(f, at)?;
        #[cfg(feature = "chrono")]
        if let Some(entry) = entry {
            self.format.timestamp(f, &entry.timestamp)?;
        }
        self.format.labels(f, at == head, saved == Some(at))?;
        if let Some(entry) = entry {
            self.format.message(f, &entry.unit.text())?;
        }
        writeln!(f)
    }
}

impl<'a> From<&'a History> for Display<'a> {
    fn from(history: &'a History) -> Self {
        Display {
            history,
            format: Format::default(),
        }
    }
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.history.inner.borrow();
        let head = inner.undos.len();
        for (i, entry) in inner.undos.iter().enumerate().rev() {
            self.fmt_entry(f, i + 1, head, inner.saved, Some(entry))?;
        }
        self.fmt_entry(f, 0, head, inner.saved, None)
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use crate::{Error, Result, Signal, Unit, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Push {
        target: Rc<RefCell<String>>,
        ch: char,
    }

    impl Push {
        fn new(target: &Rc<RefCell<String>>, ch: char) -> Push {
            Push {
                target: Rc::clone(target),
                ch,
            }
        }
    }

    impl Unit for Push {
        fn apply(&mut self) -> Result<Value> {
            self.target.borrow_mut().push(self.ch);
            Ok(Value::Nil)
        }

        fn undo(&mut self) -> Result<()> {
            self.target.borrow_mut().pop();
            Ok(())
        }

        fn text(&self) -> String {
            format!("push {}", self.ch)
        }
    }

    struct FailUndo;

    impl Unit for FailUndo {
        fn apply(&mut self) -> Result<Value> {
            Ok(Value::Nil)
        }

        fn undo(&mut self) -> Result<()> {
            Err(Error::Operation("broken".into()))
        }

        fn text(&self) -> String {
            String::new()
        }
    }

    fn applied(history: &History, unit: impl Unit + 'static) {
        let mut unit = unit;
        unit.apply().unwrap();
        history.append(unit);
    }

    #[test]
    fn undo_moves_units_between_sequences() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        applied(&history, Push::new(&target, 'a'));
        applied(&history, Push::new(&target, 'b'));
        assert_eq!(*target.borrow(), "ab");
        assert_eq!(history.undo_count(), 2);

        history.undo().unwrap().unwrap();
        assert_eq!(*target.borrow(), "a");
        assert_eq!((history.undo_count(), history.redo_count()), (1, 1));

        history.redo().unwrap().unwrap();
        assert_eq!(*target.borrow(), "ab");
        assert_eq!((history.undo_count(), history.redo_count()), (2, 0));
    }

    #[test]
    fn append_invalidates_redo() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        applied(&history, Push::new(&target, 'a'));
        applied(&history, Push::new(&target, 'b'));
        history.undo().unwrap().unwrap();
        assert!(history.can_redo());
        applied(&history, Push::new(&target, 'c'));
        assert!(!history.can_redo());
        assert_eq!(*target.borrow(), "ac");
    }

    #[test]
    fn undo_redo_on_empty_history_is_a_noop() {
        let history = History::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn replay_failure_invalidates_history() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        applied(&history, Push::new(&target, 'a'));
        applied(&history, FailUndo);
        assert!(history.undo().unwrap().is_err());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.has_changed());
    }

    #[test]
    fn savepoint_tracks_position() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        assert!(history.has_changed());
        applied(&history, Push::new(&target, 'a'));
        history.savepoint();
        assert!(!history.has_changed());
        applied(&history, Push::new(&target, 'b'));
        assert!(history.has_changed());
        history.undo().unwrap().unwrap();
        assert!(!history.has_changed());
        history.clear();
        assert!(history.has_changed());
    }

    #[test]
    fn limit_drops_the_oldest_unit() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::builder().limit(2).build();
        applied(&history, Push::new(&target, 'a'));
        history.savepoint();
        applied(&history, Push::new(&target, 'b'));
        applied(&history, Push::new(&target, 'c'));
        assert_eq!(history.undo_count(), 2);
        // The save point shifted down with the dropped unit.
        history.undo().unwrap().unwrap();
        history.undo().unwrap().unwrap();
        assert_eq!(*target.borrow(), "a");
        assert!(history.undo().is_none());
    }

    #[test]
    fn savepoint_falls_off_with_the_limit() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::builder().limit(1).build();
        history.savepoint();
        assert!(!history.has_changed());
        applied(&history, Push::new(&target, 'a'));
        assert!(history.has_changed());
        applied(&history, Push::new(&target, 'b'));
        // Marker dropped off the front, so nothing compares saved anymore.
        history.undo().unwrap().unwrap();
        assert!(history.has_changed());
    }

    #[test]
    fn group_collects_into_one_unit() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        history
            .group::<_, Error>("Add {count}", || {
                applied(&history, Push::new(&target, 'a'));
                applied(&history, Push::new(&target, 'b'));
                applied(&history, Push::new(&target, 'c'));
                Ok(())
            })
            .unwrap();
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.undo_text().as_deref(), Some("Undo Add 3"));
        history.undo().unwrap().unwrap();
        assert_eq!(*target.borrow(), "");
        history.redo().unwrap().unwrap();
        assert_eq!(*target.borrow(), "abc");
    }

    #[test]
    fn groups_nest() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        history
            .group::<_, Error>("outer", || {
                applied(&history, Push::new(&target, 'a'));
                history.group::<_, Error>("inner", || {
                    applied(&history, Push::new(&target, 'b'));
                    Ok(())
                })?;
                applied(&history, Push::new(&target, 'c'));
                Ok(())
            })
            .unwrap();
        assert_eq!(history.undo_count(), 1);
        history.undo().unwrap().unwrap();
        assert_eq!(*target.borrow(), "");
    }

    #[test]
    fn failed_group_is_discarded() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        let result: core::result::Result<(), &str> = history.group("g", || {
            applied(&history, Push::new(&target, 'a'));
            Err("nope")
        });
        assert!(result.is_err());
        assert_eq!(history.undo_count(), 0);
        // The side effects of the collected units are not rolled back.
        assert_eq!(*target.borrow(), "a");
    }

    #[test]
    fn group_append_does_not_invalidate_redo() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        applied(&history, Push::new(&target, 'a'));
        history.undo().unwrap().unwrap();
        assert!(history.can_redo());
        history
            .group::<_, Error>("g", || {
                applied(&history, Push::new(&target, 'b'));
                // Still redoable, the group has not landed yet.
                assert!(history.can_redo());
                Ok(())
            })
            .unwrap();
        assert!(!history.can_redo());
    }

    #[test]
    fn signals_are_emitted() {
        let signals = Rc::new(RefCell::new(Vec::new()));
        let history = History::builder()
            .connect({
                let signals = Rc::clone(&signals);
                move |signal: Signal| signals.borrow_mut().push(signal)
            })
            .build();
        let target = Rc::new(RefCell::new(String::new()));
        applied(&history, Push::new(&target, 'a'));
        history.undo().unwrap().unwrap();
        history.redo().unwrap().unwrap();
        assert_eq!(
            *signals.borrow(),
            [Signal::Applied, Signal::Undone, Signal::Applied]
        );
    }

    #[test]
    fn texts() {
        let target = Rc::new(RefCell::new(String::new()));
        let history = History::new();
        assert_eq!(history.undo_text(), None);
        assert_eq!(history.redo_text(), None);
        applied(&history, Push::new(&target, 'a'));
        assert_eq!(history.undo_text().as_deref(), Some("Undo push a"));
        history.undo().unwrap().unwrap();
        assert_eq!(history.redo_text().as_deref(), Some("Redo push a"));
    }

    #[test]
    fn empty_text_trims_cleanly() {
        let history = History::new();
        applied(&history, FailUndo);
        assert_eq!(history.undo_text().as_deref(), Some("Undo"));
    }
}
