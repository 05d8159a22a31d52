//! In-memory record stores

pub mod authors;
pub mod book_authors;
pub mod books;
pub mod loans;
pub mod students;

/// All stores of the library, owned together
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub authors: authors::AuthorsRepository,
    pub students: students::StudentsRepository,
    pub books: books::BooksRepository,
    pub book_authors: book_authors::BookAuthorsRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete an author and every link that references it.
    /// Returns false (and changes nothing) if the author does not exist.
    pub fn delete_author(&mut self, author_id: u32) -> bool {
        if !self.authors.delete(author_id) {
            return false;
        }
        let removed = self.book_authors.remove_author(author_id);
        tracing::debug!("Removed {} link(s) of author {}", removed, author_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_author_cascades_links() {
        let mut repository = Repository::new();
        let author = repository.authors.add("Ursula", "Le Guin").unwrap();
        repository.book_authors.link("978-1", author.id).unwrap();
        repository.book_authors.link("978-2", author.id).unwrap();

        assert!(repository.delete_author(author.id));
        assert_eq!(repository.book_authors.count_links(author.id), 0);
        assert!(repository.authors.get(author.id).is_none());
    }

    #[test]
    fn test_delete_missing_author_keeps_links() {
        let mut repository = Repository::new();
        repository.book_authors.link("978-1", 5).unwrap();

        assert!(!repository.delete_author(5));
        assert_eq!(repository.book_authors.count_links(5), 1);
    }
}
