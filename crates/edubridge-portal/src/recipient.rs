//! Message recipients.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::records::{Student, Teacher};

/// Which directory a recipient came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    Student,
    Teacher,
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientKind::Student => f.write_str("Student"),
            RecipientKind::Teacher => f.write_str("Teacher"),
        }
    }
}

/// A resolved message recipient.
///
/// Students and teachers share one numeric id space in requests but are
/// addressed differently by the portal, so the kind travels with the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    pub kind: RecipientKind,
    pub id: i64,
    pub display_name: String,
}

impl Recipient {
    pub fn from_student(student: &Student) -> Self {
        Self {
            kind: RecipientKind::Student,
            id: student.person_id,
            display_name: student.name.clone(),
        }
    }

    pub fn from_teacher(teacher: &Teacher) -> Self {
        Self {
            kind: RecipientKind::Teacher,
            id: teacher.person_id,
            display_name: teacher.name.clone(),
        }
    }

    /// Address used by the portal's messaging endpoint, e.g. `Student-42`.
    pub fn portal_id(&self) -> String {
        format!("{}-{}", self.kind, self.id)
    }
}
