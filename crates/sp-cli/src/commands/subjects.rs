//! Subject commands: list, add, rename and remove study subjects.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Subcommand;

use sp_core::subject::{PALETTE, first_available_color, is_palette_color, next_subject_id};
use sp_core::{Subject, SubjectCatalog, SubjectId};

use crate::Session;

#[derive(Debug, Subcommand)]
pub enum SubjectsAction {
    /// List subjects.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add a subject.
    Add {
        /// Display name.
        name: String,
        /// Palette colour; defaults to the first one not in use.
        #[arg(long)]
        color: Option<String>,
    },
    /// Change the display name of a subject.
    Rename {
        /// Subject ID.
        id: String,
        /// New display name.
        name: String,
    },
    /// Remove a subject that no slot uses.
    Remove {
        /// Subject ID.
        id: String,
    },
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, action: &SubjectsAction) -> Result<()> {
    match action {
        SubjectsAction::List { json } => list(writer, session.subjects(), *json),
        SubjectsAction::Add { name, color } => add(writer, session, name, color.as_deref()),
        SubjectsAction::Rename { id, name } => rename(writer, session, id, name),
        SubjectsAction::Remove { id } => remove(writer, session, id),
    }
}

fn list<W: Write>(writer: &mut W, subjects: &[Subject], json: bool) -> Result<()> {
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(subjects)?)?;
        return Ok(());
    }
    if subjects.is_empty() {
        writeln!(writer, "No subjects.")?;
        return Ok(());
    }
    let width = subjects.iter().map(|s| s.id.as_str().len()).max().unwrap_or(0);
    for subject in subjects {
        writeln!(
            writer,
            "{:>width$}  {:<8} {}",
            subject.id.as_str(),
            subject.color,
            subject.name
        )?;
    }
    Ok(())
}

fn add<W: Write>(
    writer: &mut W,
    session: &mut Session,
    name: &str,
    color: Option<&str>,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("subject name cannot be empty");
    }
    let subjects = session.subjects();
    if subjects.iter().any(|s| s.name == name) {
        bail!("subject already exists: {name}");
    }
    let color = match color {
        Some(color) if is_palette_color(color) => color,
        Some(color) => bail!(
            "unknown color: {color}. Choose one of: {}",
            PALETTE.join(", ")
        ),
        None => first_available_color(subjects),
    };

    let subject = Subject::new(next_subject_id(subjects), name, color);
    session.db_mut().upsert_subject(&subject)?;
    session.reload_subjects()?;
    tracing::debug!(id = %subject.id, name, color, "added subject");
    writeln!(
        writer,
        "Added subject {} ({}, {})",
        subject.id, subject.name, subject.color
    )?;
    Ok(())
}

fn rename<W: Write>(writer: &mut W, session: &mut Session, id: &str, name: &str) -> Result<()> {
    let id = SubjectId::new(id)?;
    let name = name.trim();
    if name.is_empty() {
        bail!("subject name cannot be empty");
    }
    let subjects = session.subjects();
    let Some(current) = subjects.subject(&id) else {
        bail!("subject not found: {id}");
    };
    if subjects.iter().any(|s| s.id != id && s.name == name) {
        bail!("subject already exists: {name}");
    }

    let old = current.name.clone();
    let renamed = Subject::new(id.clone(), name, current.color.clone());
    session.db_mut().upsert_subject(&renamed)?;
    session.reload_subjects()?;
    tracing::debug!(%id, %old, name, "renamed subject");
    writeln!(writer, "Renamed subject {id}: {old} -> {name}")?;
    Ok(())
}

fn remove<W: Write>(writer: &mut W, session: &mut Session, id: &str) -> Result<()> {
    let id = SubjectId::new(id)?;
    let Some(name) = session.subjects().subject(&id).map(|s| s.name.clone()) else {
        bail!("subject not found: {id}");
    };
    if session.db().subject_in_use(&id)? {
        bail!("subject {id} ({name}) is still scheduled");
    }

    session.db_mut().remove_subject(&id)?;
    session.reload_subjects()?;
    tracing::debug!(%id, "removed subject");
    writeln!(writer, "Removed subject {id} ({name})")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use sp_core::SlotKey;

    use insta::assert_snapshot;

    fn subjects(session: &mut Session, action: &SubjectsAction) -> Result<String> {
        let mut output = Vec::new();
        run(&mut output, session, action)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn list_default_subjects() {
        let mut session = Session::in_memory();
        let output = subjects(&mut session, &SubjectsAction::List { json: false }).unwrap();

        assert_snapshot!(output, @r"
        1  blue     Civil Law
        2  green    Social Insurance Law
        3  yellow   Labor Law I
        4  purple   Business Administration
        5  red      Labor Law
        6  orange   Administrative Litigation
        7  teal     Human Resources
        8  pink     Business Economics
        ");
    }

    #[test]
    fn add_picks_next_id_and_free_color() {
        let mut session = Session::in_memory();
        let output = subjects(
            &mut session,
            &SubjectsAction::Add {
                name: "Statistics".to_string(),
                color: None,
            },
        )
        .unwrap();

        assert_snapshot!(output, @"Added subject 9 (Statistics, slate)");
        assert_eq!(session.subjects().len(), 9);
    }

    #[test]
    fn add_rejects_unknown_color_and_duplicates() {
        let mut session = Session::in_memory();
        let err = subjects(
            &mut session,
            &SubjectsAction::Add {
                name: "Statistics".to_string(),
                color: Some("mauve".to_string()),
            },
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("unknown color: mauve"));

        let err = subjects(
            &mut session,
            &SubjectsAction::Add {
                name: "Civil Law".to_string(),
                color: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "subject already exists: Civil Law");
    }

    #[test]
    fn rename_keeps_id_color_and_position() {
        let mut session = Session::in_memory();
        let output = subjects(
            &mut session,
            &SubjectsAction::Rename {
                id: "3".to_string(),
                name: " Labor Law II ".to_string(),
            },
        )
        .unwrap();

        assert_snapshot!(output, @"Renamed subject 3: Labor Law I -> Labor Law II");
        let renamed = &session.subjects()[2];
        assert_eq!(renamed.id.as_str(), "3");
        assert_eq!(renamed.name, "Labor Law II");
        assert_eq!(renamed.color, "yellow");
    }

    #[test]
    fn rename_rejects_unknown_id_and_taken_name() {
        let mut session = Session::in_memory();
        let err = subjects(
            &mut session,
            &SubjectsAction::Rename {
                id: "42".to_string(),
                name: "Statistics".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "subject not found: 42");

        let err = subjects(
            &mut session,
            &SubjectsAction::Rename {
                id: "3".to_string(),
                name: "Civil Law".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "subject already exists: Civil Law");
    }

    #[test]
    fn remove_refuses_scheduled_subject() {
        let mut session = Session::in_memory();
        let key = SlotKey::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 9).unwrap();
        session
            .planner_mut()
            .create_or_edit(key, "1", Vec::new())
            .unwrap();
        session.save().unwrap();

        let err = subjects(&mut session, &SubjectsAction::Remove { id: "1".to_string() })
            .unwrap_err();
        assert_eq!(err.to_string(), "subject 1 (Civil Law) is still scheduled");

        let output =
            subjects(&mut session, &SubjectsAction::Remove { id: "2".to_string() }).unwrap();
        assert_snapshot!(output, @"Removed subject 2 (Social Insurance Law)");
        assert_eq!(session.subjects().len(), 7);
    }
}
