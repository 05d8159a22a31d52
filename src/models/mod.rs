//! Data models for Library Desk

pub mod author;
pub mod book;
pub mod book_author;
pub mod loan;
pub mod student;

// Re-export commonly used types
pub use author::{Author, AuthorInput};
pub use book::{Book, BookCopy, CopyStatus, CreateBook, UpdateBook, SHELF};
pub use book_author::BookAuthor;
pub use loan::{LoanDate, LoanTransaction, OperationType, ReturnReceipt};
pub use student::{CreateStudent, Student, UpdateStudent, DEFAULT_SCORE};

use crate::error::{AppError, AppResult};

/// Reject values that would break the comma-delimited storage files
pub fn ensure_plain_fields(fields: &[&str]) -> AppResult<()> {
    match fields.iter().find(|f| f.contains(',') || f.contains('\n')) {
        Some(field) => Err(AppError::Validation(format!(
            "'{}' must not contain commas or line breaks",
            field
        ))),
        None => Ok(()),
    }
}
