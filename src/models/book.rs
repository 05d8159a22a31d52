//! Book and physical copy models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Borrower field value meaning "not borrowed"
pub const SHELF: &str = "SHELF";

/// Borrow state of one physical copy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyStatus {
    #[default]
    OnShelf,
    Borrowed(String),
}

impl CopyStatus {
    pub fn is_on_shelf(&self) -> bool {
        matches!(self, CopyStatus::OnShelf)
    }

    pub fn borrower(&self) -> Option<&str> {
        match self {
            CopyStatus::OnShelf => None,
            CopyStatus::Borrowed(student_id) => Some(student_id),
        }
    }

    /// Value written to the borrower column
    pub fn as_field(&self) -> &str {
        self.borrower().unwrap_or(SHELF)
    }
}

impl From<&str> for CopyStatus {
    fn from(field: &str) -> Self {
        match field.trim() {
            "" | SHELF => CopyStatus::OnShelf,
            student_id => CopyStatus::Borrowed(student_id.to_string()),
        }
    }
}

/// One borrowable unit of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopy {
    pub label: String,
    pub sequence: u32,
    pub status: CopyStatus,
}

impl BookCopy {
    pub fn new(isbn: &str, sequence: u32) -> Self {
        Self {
            label: copy_label(isbn, sequence),
            sequence,
            status: CopyStatus::OnShelf,
        }
    }
}

/// Label of the `sequence`-th copy of a book: `{isbn}_{sequence}`
pub fn copy_label(isbn: &str, sequence: u32) -> String {
    format!("{}_{}", isbn, sequence)
}

/// Split a copy label back into its ISBN and sequence number
pub fn parse_copy_label(label: &str) -> Option<(&str, u32)> {
    let (isbn, sequence) = label.rsplit_once('_')?;
    if isbn.is_empty() {
        return None;
    }
    sequence.parse().ok().map(|sequence| (isbn, sequence))
}

/// Book title with its owned copies, ordered by sequence number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub isbn: String,
    pub copies: Vec<BookCopy>,
}

impl Book {
    /// Number of copies currently owned
    pub fn quantity(&self) -> usize {
        self.copies.len()
    }

    pub fn available(&self) -> usize {
        self.copies.iter().filter(|c| c.status.is_on_shelf()).count()
    }

    pub fn copy(&self, label: &str) -> Option<&BookCopy> {
        self.copies.iter().find(|c| c.label == label)
    }

    pub fn copy_mut(&mut self, label: &str) -> Option<&mut BookCopy> {
        self.copies.iter_mut().find(|c| c.label == label)
    }

    pub fn max_sequence(&self) -> u32 {
        self.copies.iter().map(|c| c.sequence).max().unwrap_or(0)
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 49, message = "Title must be 1 to 49 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: String,
    #[validate(range(max = 10000, message = "Quantity must be at most 10000"))]
    pub quantity: u32,
}

/// Update book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 49, message = "Title must be 1 to 49 characters"))]
    pub title: String,
    #[validate(range(max = 10000, message = "Quantity must be at most 10000"))]
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_label() {
        assert_eq!(copy_label("978-1", 3), "978-1_3");
        assert_eq!(parse_copy_label("978-1_3"), Some(("978-1", 3)));
        assert_eq!(parse_copy_label("isbn_with_under_12"), Some(("isbn_with_under", 12)));
        assert_eq!(parse_copy_label("978-1"), None);
        assert_eq!(parse_copy_label("_4"), None);
        assert_eq!(parse_copy_label("978-1_x"), None);
    }

    #[test]
    fn test_copy_status_field() {
        assert_eq!(CopyStatus::from("SHELF"), CopyStatus::OnShelf);
        assert_eq!(CopyStatus::from(" S001 "), CopyStatus::Borrowed("S001".into()));
        assert_eq!(CopyStatus::Borrowed("S001".into()).as_field(), "S001");
        assert_eq!(CopyStatus::OnShelf.as_field(), SHELF);
    }
}
