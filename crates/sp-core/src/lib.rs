//! Core domain logic for the study planner.
//!
//! This crate contains the hour-grid engine:
//! - Slots: per-hour subject assignments with checklist notes
//! - Grouping: deriving contiguous display blocks from a day's slots
//! - Planning: collision-aware create/edit, move, resize and delete with
//!   two-phase removal
//! - Subjects and per-day to-do lists

pub mod grouping;
pub mod key;
pub mod note;
mod planner;
pub mod slot;
mod store;
pub mod subject;
mod todo;
pub mod types;

pub use grouping::{Block, group_day};
pub use key::{END_HOUR, FIRST_HOUR, KeyError, LAST_HOUR, SlotKey};
pub use note::{NoteEdit, NoteError};
pub use planner::{Edit, Moved, PlanError, Planner, Removal, Resize};
pub use slot::{Lifecycle, NoteItem, Slot};
pub use store::{SlotBatch, SlotStore};
pub use subject::{Subject, SubjectCatalog};
pub use todo::TodoBook;
pub use types::{NoteId, SubjectId, ValidationError};
