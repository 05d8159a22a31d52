//! Author store

use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::Author,
};

/// Authors kept in ascending id order
#[derive(Debug, Clone, Default)]
pub struct AuthorsRepository {
    authors: BTreeMap<u32, Author>,
}

impl AuthorsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with a known id, as read back from storage.
    /// Returns false when the id is already taken.
    pub fn insert(&mut self, author: Author) -> bool {
        if self.authors.contains_key(&author.id) {
            return false;
        }
        self.authors.insert(author.id, author);
        true
    }

    /// Add an author with the next id (highest existing id + 1, starting at 1)
    pub fn add(&mut self, name: &str, surname: &str) -> AppResult<Author> {
        let id = self
            .max_id()
            .checked_add(1)
            .ok_or_else(|| AppError::AllocationFailure("author id space exhausted".to_string()))?;

        let author = Author {
            id,
            name: name.to_string(),
            surname: surname.to_string(),
        };
        self.authors.insert(id, author.clone());
        Ok(author)
    }

    pub fn delete(&mut self, id: u32) -> bool {
        self.authors.remove(&id).is_some()
    }

    pub fn update(&mut self, id: u32, name: &str, surname: &str) -> bool {
        match self.authors.get_mut(&id) {
            Some(author) => {
                author.name = name.to_string();
                author.surname = surname.to_string();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u32) -> Option<&Author> {
        self.authors.get(&id)
    }

    /// Snapshot in ascending id order
    pub fn list(&self) -> Vec<&Author> {
        self.authors.values().collect()
    }

    pub fn max_id(&self) -> u32 {
        self.authors.keys().next_back().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}
