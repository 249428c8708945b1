//! Export and import of the slot snapshot as JSON.
//!
//! The format is an array of `{"id": "YYYY-MM-DD-HH", "subjectId": .., "memo":
//! [{"id", "text", "completed"}]}` objects, one per occupied hour.

use std::io::{Read, Write};

use anyhow::{Context, Result};

use sp_core::Slot;

use crate::Session;

/// Writes every slot as a pretty-printed JSON array.
pub fn run<W: Write>(writer: &mut W, session: &Session) -> Result<()> {
    let snapshot = session.planner().snapshot();
    writeln!(writer, "{}", serde_json::to_string_pretty(&snapshot)?)?;
    tracing::debug!(slots = snapshot.len(), "exported schedule");
    Ok(())
}

/// Replaces the schedule with a snapshot read from `reader`.
pub fn import<R: Read, W: Write>(reader: R, writer: &mut W, session: &mut Session) -> Result<()> {
    let slots: Vec<Slot> =
        serde_json::from_reader(reader).context("failed to parse schedule snapshot")?;
    let written = session.replace_schedule(slots)?;
    writeln!(writer, "Imported {written} slots")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use sp_core::{NoteId, NoteItem, SlotKey};

    use insta::assert_snapshot;

    fn key(hour: u32) -> SlotKey {
        SlotKey::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), hour).unwrap()
    }

    #[test]
    fn export_uses_persisted_shape() {
        let mut session = Session::in_memory();
        let notes = vec![NoteItem {
            id: NoteId::new("n1").unwrap(),
            text: "chapter 2".to_string(),
            completed: true,
        }];
        session
            .planner_mut()
            .create_or_edit(key(9), "1", notes)
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &session).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r#"
        [
          {
            "id": "2024-01-01-09",
            "subjectId": "1",
            "memo": [
              {
                "id": "n1",
                "text": "chapter 2",
                "completed": true
              }
            ]
          }
        ]
        "#);
    }

    #[test]
    fn import_replaces_schedule() {
        let mut session = Session::in_memory();
        session
            .planner_mut()
            .create_or_edit(key(15), "2", Vec::new())
            .unwrap();
        session.save().unwrap();

        let input = r#"[
            {"id": "2024-01-01-09", "subjectId": "1", "memo": []},
            {"id": "2024-01-01-10", "subjectId": "1"}
        ]"#;
        let mut output = Vec::new();
        import(input.as_bytes(), &mut output, &mut session).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @"Imported 2 slots");
        let blocks = session.planner().blocks(key(9).date);
        assert_eq!(blocks.len(), 1);
        assert_eq!((blocks[0].start_hour, blocks[0].end_hour), (9, 11));
        assert_eq!(session.db().load_slots().unwrap().len(), 2);
    }

    #[test]
    fn import_rejects_unknown_subject() {
        let mut session = Session::in_memory();
        session
            .planner_mut()
            .create_or_edit(key(15), "2", Vec::new())
            .unwrap();
        session.save().unwrap();

        let input = r#"[{"id": "2024-01-01-09", "subjectId": "42", "memo": []}]"#;
        let mut output = Vec::new();
        let err = import(input.as_bytes(), &mut output, &mut session).unwrap_err();

        assert_eq!(err.to_string(), "unknown subject 42 at 2024-01-01-09");
        assert!(output.is_empty());
        assert_eq!(session.db().load_slots().unwrap()[0].key, key(15));
    }

    #[test]
    fn import_rejects_keys_outside_grid() {
        let mut session = Session::in_memory();
        let input = r#"[{"id": "2024-01-01-03", "subjectId": "1", "memo": []}]"#;
        let mut output = Vec::new();
        assert!(import(input.as_bytes(), &mut output, &mut session).is_err());
        assert!(session.planner().store().is_empty());
    }
}
