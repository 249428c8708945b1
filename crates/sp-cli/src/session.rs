//! One CLI invocation's view of the planner: the database, the loaded
//! schedule and the subject catalog.

use std::time::Duration;

use anyhow::{Context, Result, bail};

use sp_core::{Planner, Removal, Slot, Subject, SubjectCatalog};
use sp_db::Database;

use crate::Config;

/// Loaded planner state plus the connection it was read from.
pub struct Session {
    db: Database,
    planner: Planner,
    subjects: Vec<Subject>,
    removal_delay: Duration,
    saved_revision: u64,
}

impl Session {
    /// Opens the configured database, creating its directory if necessary.
    pub fn open(config: &Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create database directory")?;
        }
        let db = Database::open(&config.database_path)
            .with_context(|| format!("failed to open {}", config.database_path.display()))?;
        Self::from_database(db, config.removal_delay())
    }

    /// Loads the schedule and subjects, seeding the default subjects into a
    /// fresh database.
    pub fn from_database(mut db: Database, removal_delay: Duration) -> Result<Self> {
        db.seed_default_subjects()
            .context("failed to seed default subjects")?;
        let slots = db.load_slots().context("failed to load schedule")?;
        let planner = Planner::from_slots(slots).context("stored schedule is invalid")?;
        let subjects = db.list_subjects().context("failed to load subjects")?;
        tracing::debug!(
            slots = planner.store().len(),
            subjects = subjects.len(),
            "loaded planner"
        );
        Ok(Self {
            db,
            planner,
            subjects,
            removal_delay,
            saved_revision: 0,
        })
    }

    pub const fn planner(&self) -> &Planner {
        &self.planner
    }

    pub const fn planner_mut(&mut self) -> &mut Planner {
        &mut self.planner
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub const fn db(&self) -> &Database {
        &self.db
    }

    pub const fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Re-reads the subject catalog after it was changed through [`Self::db_mut`].
    pub fn reload_subjects(&mut self) -> Result<()> {
        self.subjects = self.db.list_subjects().context("failed to load subjects")?;
        Ok(())
    }

    /// Waits out the exit transition, then physically removes the slots.
    ///
    /// Returns the number of slots removed.
    pub fn finish_removal(&mut self, removal: &Removal) -> usize {
        if removal.is_empty() {
            return 0;
        }
        if !self.removal_delay.is_zero() {
            std::thread::sleep(self.removal_delay);
        }
        self.planner.remove_all(&removal.keys).len()
    }

    /// Replaces the whole schedule with `slots` and persists it at once.
    ///
    /// Every slot must reference a known subject. Returns the number of slots
    /// stored.
    pub fn replace_schedule(&mut self, slots: Vec<Slot>) -> Result<usize> {
        if let Some(slot) = slots
            .iter()
            .find(|slot| self.subjects.subject(&slot.subject_id).is_none())
        {
            bail!("unknown subject {} at {}", slot.subject_id, slot.key);
        }
        let planner = Planner::from_slots(slots).context("imported schedule is invalid")?;
        let written = self
            .db
            .save_slots(&planner.snapshot())
            .context("failed to save schedule")?;
        self.planner = planner;
        self.saved_revision = self.planner.revision();
        Ok(written)
    }

    /// Persists the schedule if it changed since it was loaded or last saved.
    ///
    /// Returns whether a snapshot was written.
    pub fn save(&mut self) -> Result<bool> {
        if self.planner.revision() == self.saved_revision {
            return Ok(false);
        }
        let written = self
            .db
            .save_slots(&self.planner.snapshot())
            .context("failed to save schedule")?;
        self.saved_revision = self.planner.revision();
        tracing::debug!(slots = written, revision = self.saved_revision, "saved schedule");
        Ok(true)
    }

    /// An empty in-memory session with no removal delay.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::from_database(Database::open_in_memory().unwrap(), Duration::ZERO).unwrap()
    }
}
