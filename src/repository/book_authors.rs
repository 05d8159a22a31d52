//! Book-Author link table

use indexmap::IndexSet;

use crate::{
    error::{AppError, AppResult},
    models::BookAuthor,
};

/// Unordered set of (ISBN, author id) pairs
#[derive(Debug, Clone, Default)]
pub struct BookAuthorsRepository {
    links: IndexSet<BookAuthor>,
}

impl BookAuthorsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair. Returns `Ok(false)` if it is already present.
    pub fn link(&mut self, isbn: &str, author_id: u32) -> AppResult<bool> {
        let link = BookAuthor::new(isbn, author_id);
        if self.links.contains(&link) {
            return Ok(false);
        }
        self.links
            .try_reserve(1)
            .map_err(|e| AppError::AllocationFailure(e.to_string()))?;
        Ok(self.links.insert(link))
    }

    /// Remove a pair by swapping the last entry into its slot
    pub fn unlink(&mut self, isbn: &str, author_id: u32) -> bool {
        self.links.swap_remove(&BookAuthor::new(isbn, author_id))
    }

    /// Drop every pair that references the author; returns how many went
    pub fn remove_author(&mut self, author_id: u32) -> usize {
        let before = self.links.len();
        self.links.retain(|l| l.author_id != author_id);
        before - self.links.len()
    }

    /// Drop every pair that references the book; returns how many went
    pub fn remove_book(&mut self, isbn: &str) -> usize {
        let before = self.links.len();
        self.links.retain(|l| l.isbn != isbn);
        before - self.links.len()
    }

    pub fn count_links(&self, author_id: u32) -> usize {
        self.links.iter().filter(|l| l.author_id == author_id).count()
    }

    pub fn authors_of(&self, isbn: &str) -> Vec<u32> {
        self.links
            .iter()
            .filter(|l| l.isbn == isbn)
            .map(|l| l.author_id)
            .collect()
    }

    pub fn books_of(&self, author_id: u32) -> Vec<&str> {
        self.links
            .iter()
            .filter(|l| l.author_id == author_id)
            .map(|l| l.isbn.as_str())
            .collect()
    }

    /// Entries in storage order
    pub fn entries(&self) -> impl Iterator<Item = &BookAuthor> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
