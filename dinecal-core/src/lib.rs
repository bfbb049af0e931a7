//! Core types for dinecal.
//!
//! Shared by the `dinecal` client and `dinecal-server`:
//! - `event`: the record shape the API stores and returns
//! - `entry`: the calendar-side projection of a record
//! - `draft`: unsaved form input and its serialization into a record

pub mod draft;
pub mod entry;
pub mod error;
pub mod event;

pub use draft::{Draft, SchemaVersion};
pub use entry::{CalendarEntry, EntryProps, normalize};
pub use error::{DineCalError, DineCalResult};
pub use event::{Category, EventId, EventRecord, EventUpdate};
