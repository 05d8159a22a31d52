//! Persistence adapters
//!
//! Every save rewrites the whole backing file of one store from the current
//! in-memory state. Loading a missing file yields an empty store.

pub mod csv;

pub use self::csv::CsvStorage;

use crate::{
    error::AppResult,
    repository::{
        authors::AuthorsRepository, book_authors::BookAuthorsRepository,
        books::BooksRepository, loans::LoansRepository, students::StudentsRepository,
        Repository,
    },
};

/// Full-snapshot load and save of each store
#[cfg_attr(test, mockall::automock)]
pub trait Storage {
    /// Read every store
    fn load(&self) -> AppResult<Repository>;

    fn save_authors(&self, authors: &AuthorsRepository) -> AppResult<()>;

    fn save_students(&self, students: &StudentsRepository) -> AppResult<()>;

    /// Book titles and quantities
    fn save_books(&self, books: &BooksRepository) -> AppResult<()>;

    /// Borrow state of every copy
    fn save_copies(&self, books: &BooksRepository) -> AppResult<()>;

    fn save_book_authors(&self, links: &BookAuthorsRepository) -> AppResult<()>;

    fn save_loans(&self, loans: &LoansRepository) -> AppResult<()>;
}

/// Write every store, stopping at the first failure
pub fn save_all<S: Storage + ?Sized>(storage: &S, repository: &Repository) -> AppResult<()> {
    storage.save_authors(&repository.authors)?;
    storage.save_students(&repository.students)?;
    storage.save_books(&repository.books)?;
    storage.save_copies(&repository.books)?;
    storage.save_book_authors(&repository.book_authors)?;
    storage.save_loans(&repository.loans)?;
    Ok(())
}
