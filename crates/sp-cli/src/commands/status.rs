//! Status command for showing where the planner keeps its data.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::Session;

pub fn run<W: Write>(writer: &mut W, session: &Session, database_path: &Path) -> Result<()> {
    let store = session.planner().store();
    let dates = store.dates();

    writeln!(writer, "Study planner status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "Subjects: {}", session.subjects().len())?;

    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        writeln!(writer, "No hours scheduled.")?;
        return Ok(());
    };
    writeln!(
        writer,
        "Scheduled: {} hours on {} days ({first} to {last})",
        store.len(),
        dates.len()
    )?;
    Ok(())
}
