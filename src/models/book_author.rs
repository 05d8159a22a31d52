//! Book-Author junction model (N:M relationship)

use serde::{Deserialize, Serialize};

/// Join row linking a book (by ISBN) to an author (by id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookAuthor {
    pub isbn: String,
    pub author_id: u32,
}

impl BookAuthor {
    pub fn new(isbn: &str, author_id: u32) -> Self {
        Self {
            isbn: isbn.to_string(),
            author_id,
        }
    }
}
