//! Per-date to-do checklists, independent of the hour grid.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::note::{NoteEdit, NoteError};
use crate::slot::NoteItem;

/// To-do lists keyed by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoBook {
    days: BTreeMap<NaiveDate, Vec<NoteItem>>,
}

impl TodoBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The list for `date`; empty when nothing was added.
    pub fn items(&self, date: NaiveDate) -> &[NoteItem] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    /// Replaces the list for `date`, dropping the entry when empty.
    pub fn set_items(&mut self, date: NaiveDate, items: Vec<NoteItem>) {
        if items.is_empty() {
            self.days.remove(&date);
        } else {
            self.days.insert(date, items);
        }
    }

    /// Applies a note edit to the list for `date`, returning the new list.
    ///
    /// A failed edit leaves the list as it was.
    pub fn apply(&mut self, date: NaiveDate, edit: &NoteEdit) -> Result<&[NoteItem], NoteError> {
        let mut items = self.items(date).to_vec();
        edit.apply(&mut items)?;
        self.set_items(date, items);
        Ok(self.items(date))
    }

    /// Dates with at least one item.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }
}
