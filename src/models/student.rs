//! Student (borrower) model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Score given to a student when no configuration overrides it
pub const DEFAULT_SCORE: i32 = 100;

/// Student record, keyed by an externally supplied id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub surname: String,
    pub score: i32,
}

impl Student {
    pub fn new(student_id: &str, name: &str, surname: &str, score: i32) -> Self {
        Self {
            student_id: student_id.to_string(),
            name: name.to_string(),
            surname: surname.to_string(),
            score,
        }
    }

    /// Borrowing is only allowed while the score stays above zero
    pub fn can_borrow(&self) -> bool {
        self.score > 0
    }
}

/// Register student request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(length(min = 1, max = 19, message = "Student id must be 1 to 19 characters"))]
    pub student_id: String,
    #[validate(length(min = 1, max = 49, message = "Name must be 1 to 49 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 49, message = "Surname must be 1 to 49 characters"))]
    pub surname: String,
}

/// Update student request (full field replace)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStudent {
    #[validate(length(min = 1, max = 49, message = "Name must be 1 to 49 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 49, message = "Surname must be 1 to 49 characters"))]
    pub surname: String,
    pub score: i32,
}
