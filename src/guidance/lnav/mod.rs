//! Lateral guidance
//!
//! The hold-entry transition and the path segment types it publishes for
//! display.

pub mod hold_entry;
pub mod path;

pub use hold_entry::{classify_entry, EntryState, EntryType, HoldEntryTransition};
pub use path::PathVector;
