//! Author model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Author record, keyed by a sequential numeric id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u32,
    pub name: String,
    pub surname: String,
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Create or update author request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuthorInput {
    #[validate(length(min = 1, max = 49, message = "Name must be 1 to 49 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 49, message = "Surname must be 1 to 49 characters"))]
    pub surname: String,
}

impl AuthorInput {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
        }
    }
}
