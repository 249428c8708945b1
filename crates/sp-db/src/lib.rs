//! Storage layer for the study planner.
//!
//! Persists the slot snapshot, the subject catalog, the daily to-do lists and
//! the daily distraction logs using `rusqlite`. The grid engine never calls into this crate; callers hand
//! it a snapshot after a committed mutation.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Share it across threads only behind a `Mutex`.
//!
//! # Schema
//!
//! - `slots.id` is the slot key in `YYYY-MM-DD-HH` form, the same identity
//!   used by exported snapshots. `date` and `hour` are stored alongside for
//!   range queries.
//! - `slots.memo` and `todos.items` hold JSON arrays of note items.
//! - Slot lifecycle flags are transient and never stored; everything loads
//!   back as stable.
//! - `PRAGMA user_version` is [`SEEDED_VERSION`] once the default subjects
//!   have been offered, so an emptied catalog stays empty.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use sp_core::subject::default_subjects;
use sp_core::{KeyError, NoteItem, Slot, SlotKey, Subject, SubjectId, ValidationError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored slot key is not a valid grid key.
    #[error("invalid slot key {key:?}")]
    InvalidKey {
        key: String,
        #[source]
        source: KeyError,
    },
    /// A stored identifier failed validation.
    #[error("invalid {what} in row {row}")]
    InvalidId {
        what: &'static str,
        row: String,
        #[source]
        source: ValidationError,
    },
    /// A stored note list is not valid JSON.
    #[error("invalid note data for {row}")]
    InvalidNotes {
        row: String,
        #[source]
        source: serde_json::Error,
    },
    /// A stored date could not be parsed.
    #[error("invalid date {0:?}")]
    InvalidDate(String),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `user_version` recorded after the default subjects were seeded.
pub const SEEDED_VERSION: u32 = 1;

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS subjects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                position INTEGER NOT NULL
            );

            -- Slots table: one row per occupied hour
            -- id: 'YYYY-MM-DD-HH'
            -- memo: JSON array of {id, text, completed}
            CREATE TABLE IF NOT EXISTS slots (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                hour INTEGER NOT NULL,
                subject_id TEXT NOT NULL,
                memo TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_slots_date ON slots(date);
            CREATE INDEX IF NOT EXISTS idx_slots_subject ON slots(subject_id);

            CREATE TABLE IF NOT EXISTS todos (
                date TEXT PRIMARY KEY,
                items TEXT NOT NULL
            );

            -- Distractions table: free-form log text per date
            CREATE TABLE IF NOT EXISTS distractions (
                date TEXT PRIMARY KEY,
                text TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Loads every stored slot, ordered by key.
    pub fn load_slots(&self) -> Result<Vec<Slot>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, subject_id, memo FROM slots ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut slots = Vec::new();
        for row in rows {
            let (id, subject_id, memo) = row?;
            slots.push(slot_from_row(id, subject_id, &memo)?);
        }
        Ok(slots)
    }

    /// Replaces the stored slots with `slots`. Returns the number written.
    pub fn save_slots(&mut self, slots: &[Slot]) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM slots", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO slots (id, date, hour, subject_id, memo) VALUES (?, ?, ?, ?, ?)",
            )?;
            for slot in slots {
                let id = slot.key.to_string();
                let memo = serde_json::to_string(&slot.notes).map_err(|source| {
                    DbError::InvalidNotes {
                        row: id.clone(),
                        source,
                    }
                })?;
                stmt.execute(params![
                    id,
                    slot.key.date.format(DATE_FORMAT).to_string(),
                    slot.key.hour,
                    slot.subject_id.as_str(),
                    memo,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(slots = slots.len(), "saved slot snapshot");
        Ok(slots.len())
    }

    /// Whether any stored slot references the subject.
    pub fn subject_in_use(&self, id: &SubjectId) -> Result<bool, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM slots WHERE subject_id = ?",
            params![id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Lists subjects in insertion order.
    pub fn list_subjects(&self) -> Result<Vec<Subject>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM subjects ORDER BY position ASC, id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut subjects = Vec::new();
        for row in rows {
            let (id, name, color) = row?;
            let id = SubjectId::new(id.clone()).map_err(|source| DbError::InvalidId {
                what: "subject ID",
                row: id,
                source,
            })?;
            subjects.push(Subject::new(id, name, color));
        }
        Ok(subjects)
    }

    /// Inserts or replaces a subject, appending new ones at the end.
    pub fn upsert_subject(&mut self, subject: &Subject) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO subjects (id, name, color, position)
            VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(position), 0) + 1 FROM subjects))
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, color = excluded.color
            ",
            params![subject.id.as_str(), subject.name, subject.color],
        )?;
        Ok(())
    }

    /// Removes a subject. Returns whether it existed.
    pub fn remove_subject(&mut self, id: &SubjectId) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM subjects WHERE id = ?", params![id.as_str()])?;
        Ok(removed > 0)
    }

    /// Seeds the default subjects into a database that was never seeded.
    ///
    /// Returns the number inserted. Zero when the database was seeded before
    /// or already holds subjects; either way it is marked as seeded.
    pub fn seed_default_subjects(&mut self) -> Result<usize, DbError> {
        let version: u32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version >= SEEDED_VERSION {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let count: i64 = tx.query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))?;
        let defaults = if count == 0 { default_subjects() } else { Vec::new() };
        {
            let mut stmt = tx.prepare(
                "INSERT INTO subjects (id, name, color, position) VALUES (?, ?, ?, ?)",
            )?;
            for (position, subject) in (1_i64..).zip(&defaults) {
                stmt.execute(params![
                    subject.id.as_str(),
                    subject.name,
                    subject.color,
                    position
                ])?;
            }
        }
        tx.execute_batch(&format!("PRAGMA user_version = {SEEDED_VERSION};"))?;
        tx.commit()?;
        tracing::debug!(subjects = defaults.len(), "seeded default subjects");
        Ok(defaults.len())
    }

    /// Loads the to-do list of one date.
    pub fn load_todos(&self, date: NaiveDate) -> Result<Vec<NoteItem>, DbError> {
        let key = date.format(DATE_FORMAT).to_string();
        let items: Option<String> = self
            .conn
            .query_row(
                "SELECT items FROM todos WHERE date = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        items.map_or_else(
            || Ok(Vec::new()),
            |items| {
                serde_json::from_str(&items)
                    .map_err(|source| DbError::InvalidNotes { row: key, source })
            },
        )
    }

    /// Stores the to-do list of one date; an empty list deletes the row.
    pub fn save_todos(&mut self, date: NaiveDate, items: &[NoteItem]) -> Result<(), DbError> {
        let key = date.format(DATE_FORMAT).to_string();
        if items.is_empty() {
            self.conn
                .execute("DELETE FROM todos WHERE date = ?", params![key])?;
            return Ok(());
        }
        let json = serde_json::to_string(items).map_err(|source| DbError::InvalidNotes {
            row: key.clone(),
            source,
        })?;
        self.conn.execute(
            "INSERT OR REPLACE INTO todos (date, items) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }

    /// Dates that have a stored to-do list, ascending.
    pub fn todo_dates(&self) -> Result<Vec<NaiveDate>, DbError> {
        let mut stmt = self.conn.prepare("SELECT date FROM todos ORDER BY date ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut dates = Vec::new();
        for row in rows {
            let text = row?;
            let date = NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map_err(|_| DbError::InvalidDate(text))?;
            dates.push(date);
        }
        Ok(dates)
    }

    /// Loads the distraction log of one date; empty when none was written.
    pub fn load_distractions(&self, date: NaiveDate) -> Result<String, DbError> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT text FROM distractions WHERE date = ?",
                params![date.format(DATE_FORMAT).to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text.unwrap_or_default())
    }

    /// Stores the distraction log of one date; blank text deletes the row.
    pub fn save_distractions(&mut self, date: NaiveDate, text: &str) -> Result<(), DbError> {
        let key = date.format(DATE_FORMAT).to_string();
        if text.trim().is_empty() {
            self.conn
                .execute("DELETE FROM distractions WHERE date = ?", params![key])?;
            return Ok(());
        }
        self.conn.execute(
            "INSERT OR REPLACE INTO distractions (date, text) VALUES (?, ?)",
            params![key, text],
        )?;
        Ok(())
    }
}

fn slot_from_row(id: String, subject_id: String, memo: &str) -> Result<Slot, DbError> {
    let key: SlotKey = id
        .parse()
        .map_err(|source| DbError::InvalidKey {
            key: id.clone(),
            source,
        })?;
    let subject_id = SubjectId::new(subject_id).map_err(|source| DbError::InvalidId {
        what: "subject ID",
        row: id.clone(),
        source,
    })?;
    let notes: Vec<NoteItem> =
        serde_json::from_str(memo).map_err(|source| DbError::InvalidNotes { row: id, source })?;
    Ok(Slot::new(key, subject_id, notes))
}

#[cfg(test)]
mod tests {
    use super::*;

    use sp_core::{Lifecycle, Planner};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn key(hour: u32) -> SlotKey {
        SlotKey::new(date(), hour).unwrap()
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "slots"),
            vec!["id", "date", "hour", "subject_id", "memo"]
        );
        assert_eq!(
            table_columns(&db.conn, "subjects"),
            vec!["id", "name", "color", "position"]
        );
        assert_eq!(table_columns(&db.conn, "todos"), vec!["date", "items"]);
        assert_eq!(
            table_columns(&db.conn, "distractions"),
            vec!["date", "text"]
        );
    }

    #[test]
    fn slots_roundtrip_as_stable() {
        let mut db = Database::open_in_memory().unwrap();
        let mut planner = Planner::new();
        planner
            .create_or_edit(key(9), "1", vec![NoteItem::new("chapter 2")])
            .unwrap();
        planner.create_or_edit(key(10), "2", Vec::new()).unwrap();

        db.save_slots(&planner.snapshot()).unwrap();
        let loaded = db.load_slots().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].key, key(9));
        assert_eq!(loaded[0].notes[0].text, "chapter 2");
        assert!(loaded.iter().all(|s| s.lifecycle == Lifecycle::Stable));
    }

    #[test]
    fn save_slots_replaces_previous_snapshot() {
        let mut db = Database::open_in_memory().unwrap();
        let subject = SubjectId::new("1").unwrap();
        db.save_slots(&[
            Slot::new(key(9), subject.clone(), Vec::new()),
            Slot::new(key(10), subject.clone(), Vec::new()),
        ])
        .unwrap();
        db.save_slots(&[Slot::new(key(12), subject, Vec::new())])
            .unwrap();

        let keys: Vec<String> = db
            .load_slots()
            .unwrap()
            .iter()
            .map(|s| s.key.to_string())
            .collect();
        assert_eq!(keys, vec!["2024-01-01-12"]);
    }

    #[test]
    fn load_rejects_corrupt_key() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO slots (id, date, hour, subject_id, memo) VALUES ('2024-01-01-03', '2024-01-01', 3, '1', '[]')",
                [],
            )
            .unwrap();

        let err = db.load_slots().unwrap_err();
        assert!(matches!(err, DbError::InvalidKey { .. }));
    }

    #[test]
    fn seed_only_fills_empty_catalog() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.seed_default_subjects().unwrap(), 8);
        assert_eq!(db.seed_default_subjects().unwrap(), 0);

        let subjects = db.list_subjects().unwrap();
        assert_eq!(subjects.len(), 8);
        assert_eq!(subjects[0].name, "Civil Law");
    }

    #[test]
    fn emptied_catalog_is_not_reseeded() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sp.db");
        {
            let mut db = Database::open(&path).unwrap();
            assert_eq!(db.seed_default_subjects().unwrap(), 8);
            for subject in db.list_subjects().unwrap() {
                db.remove_subject(&subject.id).unwrap();
            }
        }

        let mut db = Database::open(&path).unwrap();
        assert_eq!(db.seed_default_subjects().unwrap(), 0);
        assert!(db.list_subjects().unwrap().is_empty());
    }

    #[test]
    fn existing_catalog_is_marked_seeded() {
        let mut db = Database::open_in_memory().unwrap();
        let own = Subject::new(SubjectId::new("1").unwrap(), "Statistics", "cyan");
        db.upsert_subject(&own).unwrap();

        assert_eq!(db.seed_default_subjects().unwrap(), 0);
        db.remove_subject(&own.id).unwrap();
        assert_eq!(db.seed_default_subjects().unwrap(), 0);
        assert!(db.list_subjects().unwrap().is_empty());
    }

    #[test]
    fn upsert_subject_keeps_position() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_default_subjects().unwrap();

        let renamed = Subject::new(SubjectId::new("1").unwrap(), "Civil Law II", "blue");
        db.upsert_subject(&renamed).unwrap();
        let added = Subject::new(SubjectId::new("9").unwrap(), "Statistics", "cyan");
        db.upsert_subject(&added).unwrap();

        let subjects = db.list_subjects().unwrap();
        assert_eq!(subjects[0].name, "Civil Law II");
        assert_eq!(subjects.last().unwrap().name, "Statistics");
    }

    #[test]
    fn subject_usage_and_removal() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_default_subjects().unwrap();
        let civil = SubjectId::new("1").unwrap();
        db.save_slots(&[Slot::new(key(9), civil.clone(), Vec::new())])
            .unwrap();

        assert!(db.subject_in_use(&civil).unwrap());
        assert!(!db.subject_in_use(&SubjectId::new("2").unwrap()).unwrap());

        assert!(db.remove_subject(&SubjectId::new("2").unwrap()).unwrap());
        assert!(!db.remove_subject(&SubjectId::new("2").unwrap()).unwrap());
        assert_eq!(db.list_subjects().unwrap().len(), 7);
    }

    #[test]
    fn todos_roundtrip_per_date() {
        let mut db = Database::open_in_memory().unwrap();
        let items = vec![NoteItem::new("mock exam"), NoteItem::new("flashcards")];

        db.save_todos(date(), &items).unwrap();
        assert_eq!(db.load_todos(date()).unwrap(), items);
        assert!(db.load_todos(date().succ_opt().unwrap()).unwrap().is_empty());
        assert_eq!(db.todo_dates().unwrap(), vec![date()]);

        db.save_todos(date(), &[]).unwrap();
        assert!(db.todo_dates().unwrap().is_empty());
    }

    #[test]
    fn distractions_are_kept_per_date() {
        let mut db = Database::open_in_memory().unwrap();
        let next = date().succ_opt().unwrap();

        db.save_distractions(date(), "10:30 phone\n15:00 visitor").unwrap();
        assert_eq!(
            db.load_distractions(date()).unwrap(),
            "10:30 phone\n15:00 visitor"
        );
        assert_eq!(db.load_distractions(next).unwrap(), "");

        db.save_distractions(date(), "  ").unwrap();
        assert_eq!(db.load_distractions(date()).unwrap(), "");
    }

    #[test]
    fn file_database_persists_across_opens() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sp.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.save_slots(&[Slot::new(key(9), SubjectId::new("1").unwrap(), Vec::new())])
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.load_slots().unwrap().len(), 1);
    }
}
