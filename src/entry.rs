//! Wrapper around a recorded unit with additional metadata.

use crate::Unit;
#[cfg(feature = "chrono")]
use chrono::{DateTime, Utc};
use core::fmt::{self, Debug, Formatter};

pub(crate) struct Entry {
    pub unit: Box<dyn Unit>,
    #[cfg(feature = "chrono")]
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    pub fn new(unit: Box<dyn Unit>) -> Entry {
        Entry {
            unit,
            #[cfg(feature = "chrono")]
            timestamp: Utc::now(),
        }
    }
}

impl Debug for Entry {
    #[cfg(not(feature = "chrono"))]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Entry")
            .field("text", &self.unit.text())
            .finish()
    }

    #[cfg(feature = "chrono")]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Entry")
            .field("text", &self.unit.text())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
