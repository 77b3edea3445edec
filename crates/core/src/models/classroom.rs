//! Classroom model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved class roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    /// Opaque id, unique within the document
    pub id: String,
    pub name: String,
    /// Student names in the order they were entered. Duplicates are allowed.
    pub students: Vec<String>,
}

impl Classroom {
    pub fn new(name: String, students: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            students,
        }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Students as newline-separated text, ready for an edit box
    pub fn students_text(&self) -> String {
        self.students.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_classroom_gets_unique_id() {
        let a = Classroom::new("1r ESO A".into(), vec!["Laia".into()]);
        let b = Classroom::new("1r ESO A".into(), vec!["Laia".into()]);
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_students_text() {
        let c = Classroom::new("Group".into(), vec!["Jan".into(), "Martina".into()]);
        assert_eq!(c.students_text(), "Jan\nMartina");
        assert_eq!(c.len(), 2);
    }
}
