//! Study subjects and their colour palette.
//!
//! Subjects live outside the grid engine: slots only hold a [`SubjectId`]
//! and renderers resolve it through a [`SubjectCatalog`].

use serde::{Deserialize, Serialize};

use crate::types::SubjectId;

/// Colours a subject can take, in suggestion order.
pub const PALETTE: [&str; 18] = [
    "slate", "red", "orange", "amber", "yellow", "lime", "green", "emerald", "teal", "cyan", "sky",
    "blue", "indigo", "violet", "purple", "fuchsia", "pink", "rose",
];

/// A study subject with its display colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub color: String,
}

impl Subject {
    pub fn new(id: SubjectId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Lookup from subject ID to display attributes.
pub trait SubjectCatalog {
    fn subject(&self, id: &SubjectId) -> Option<&Subject>;

    /// Display name, falling back to the raw ID for unknown subjects.
    fn display_name<'a>(&'a self, id: &'a SubjectId) -> &'a str {
        self.subject(id).map_or(id.as_str(), |s| s.name.as_str())
    }
}

impl SubjectCatalog for [Subject] {
    fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.iter().find(|s| &s.id == id)
    }
}

impl SubjectCatalog for Vec<Subject> {
    fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.as_slice().subject(id)
    }
}

/// Whether `color` is one of the palette colours.
pub fn is_palette_color(color: &str) -> bool {
    PALETTE.contains(&color)
}

/// The first palette colour no subject uses yet, or the first colour when
/// all are taken.
pub fn first_available_color(subjects: &[Subject]) -> &'static str {
    PALETTE
        .iter()
        .find(|color| !subjects.iter().any(|s| s.color == **color))
        .copied()
        .unwrap_or(PALETTE[0])
}

/// Next free numeric subject ID (`max + 1`, ignoring non-numeric IDs).
pub fn next_subject_id(subjects: &[Subject]) -> SubjectId {
    let next = subjects
        .iter()
        .filter_map(|s| s.id.as_str().parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1);
    SubjectId::from_number(next)
}

/// The subjects a fresh planner starts with.
pub fn default_subjects() -> Vec<Subject> {
    [
        ("Civil Law", "blue"),
        ("Social Insurance Law", "green"),
        ("Labor Law I", "yellow"),
        ("Business Administration", "purple"),
        ("Labor Law", "red"),
        ("Administrative Litigation", "orange"),
        ("Human Resources", "teal"),
        ("Business Economics", "pink"),
    ]
    .into_iter()
    .zip(1_u64..)
    .map(|((name, color), n)| Subject::new(SubjectId::from_number(n), name, color))
    .collect()
}
