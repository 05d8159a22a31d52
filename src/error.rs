//! Error types for Library Desk

use thiserror::Error;

/// Numeric error codes reported by the console alongside each message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NoSuchData = 2,
    NoSuchStudent = 3,
    MemoryFailure = 4,
    Duplicate = 5,
    InsufficientScore = 6,
    NoCopiesAvailable = 7,
    NotBorrowedByStudent = 8,
    LoanRecordMissing = 9,
    CopyOnLoan = 10,
    BadValue = 11,
    BadDate = 12,
    IoFailure = 13,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Relation already exists: book {isbn} / author {author_id}")]
    DuplicateRelation { isbn: String, author_id: u32 },

    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Student {0} has an insufficient score")]
    InsufficientScore(String),

    #[error("No copies of {0} available on shelf")]
    NoCopiesAvailable(String),

    #[error("Copy {label} is not borrowed by student {student_id}")]
    NotBorrowedByStudent { student_id: String, label: String },

    #[error("No borrow record for copy {label} by student {student_id}")]
    LoanRecordMissing { student_id: String, label: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date '{0}', expected DD.MM.YYYY")]
    InvalidDate(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Code printed by the shell next to the message
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::DuplicateRelation { .. } => ErrorCode::Duplicate,
            AppError::AllocationFailure(_) => ErrorCode::MemoryFailure,
            AppError::StudentNotFound(_) => ErrorCode::NoSuchStudent,
            AppError::InsufficientScore(_) => ErrorCode::InsufficientScore,
            AppError::NoCopiesAvailable(_) => ErrorCode::NoCopiesAvailable,
            AppError::NotBorrowedByStudent { .. } => ErrorCode::NotBorrowedByStudent,
            AppError::LoanRecordMissing { .. } => ErrorCode::LoanRecordMissing,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::InvalidDate(_) => ErrorCode::BadDate,
            AppError::BusinessRule(_) => ErrorCode::CopyOnLoan,
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                ErrorCode::IoFailure
            }
            AppError::Parse(_) => ErrorCode::BadValue,
            AppError::Config(_) => ErrorCode::Failure,
        }
    }

    /// Build a `NotFound` for a lookup miss on a given kind of record
    pub fn not_found(kind: &str, key: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} {} not found", kind, key))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
