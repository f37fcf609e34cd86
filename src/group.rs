//! An ordered composite of units that does and undoes as one.

use crate::format;
use crate::{Result, Unit, Value};
use core::fmt::{self, Debug, Formatter};

/// A group of units recorded as a single entry in the history.
///
/// Children apply in insertion order and undo in exact reverse order. A
/// group is normally collected with [`History::group`](crate::History::group)
/// or the free [`group()`](crate::group()) function, but can also be assembled by
/// hand and appended like any other unit. A group with no children is legal
/// and is a no-op.
///
/// The description template recognizes one placeholder, `{count}`, the
/// number of children.
pub struct Group {
    template: String,
    units: Vec<Box<dyn Unit>>,
}

impl Group {
    /// Returns an empty group.
    pub fn new(template: impl Into<String>) -> Group {
        Group::with_units(template, Vec::new())
    }

    pub(crate) fn with_units(template: impl Into<String>, units: Vec<Box<dyn Unit>>) -> Group {
        Group {
            template: template.into(),
            units,
        }
    }

    /// Adds `unit` at the end of the group.
    pub fn push(&mut self, unit: impl Unit + 'static) {
        self.units.push(Box::new(unit));
    }

    /// Returns the number of children.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Unit for Group {
    fn apply(&mut self) -> Result<Value> {
        for unit in &mut self.units {
            unit.apply()?;
        }
        Ok(Value::Nil)
    }

    fn undo(&mut self) -> Result<()> {
        for unit in self.units.iter_mut().rev() {
            unit.undo()?;
        }
        Ok(())
    }

    fn text(&self) -> String {
        let count = self.units.len();
        format::expand(&self.template, &|key| {
            (key == "count").then(|| count.to_string())
        })
    }
}

impl Debug for Group {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Group")
            .field("template", &self.template)
            .field("len", &self.units.len())
            .finish_non_exhaustive()
    }
}
