//! Business logic services
//!
//! `Services` owns every store and the persistence adapter. Each operation
//! mutates the in-memory stores, then rewrites the files of the stores it
//! touched. A failed write is logged and dropped; the in-memory state stays
//! authoritative until the next successful save.

pub mod authors;
pub mod catalog;
pub mod loans;
pub mod students;

use crate::{
    config::LoanConfig,
    error::AppResult,
    repository::Repository,
    storage::{self, Storage},
};

/// Application state: the stores, their storage and the loan rules
#[derive(Debug)]
pub struct Services<S: Storage> {
    repository: Repository,
    storage: S,
    loan_config: LoanConfig,
}

impl<S: Storage> Services<S> {
    pub fn new(repository: Repository, storage: S, loan_config: LoanConfig) -> Self {
        Self {
            repository,
            storage,
            loan_config,
        }
    }

    /// Build the services from whatever the storage currently holds
    pub fn load(storage: S, loan_config: LoanConfig) -> AppResult<Self> {
        let repository = storage.load()?;
        Ok(Self::new(repository, storage, loan_config))
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn loan_config(&self) -> &LoanConfig {
        &self.loan_config
    }

    /// Rewrite every file
    pub fn save_all(&self) -> AppResult<()> {
        storage::save_all(&self.storage, &self.repository)
    }

    /// Run one save; failures are reported and the write is dropped
    fn persist<F>(&self, what: &str, save: F)
    where
        F: FnOnce(&S, &Repository) -> AppResult<()>,
    {
        if let Err(e) = save(&self.storage, &self.repository) {
            tracing::error!("Failed to save {}: {}", what, e);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::AuthorInput;
    use crate::storage::MockStorage;

    #[test]
    fn test_load_uses_storage_snapshot() {
        let mut storage = MockStorage::new();
        storage.expect_load().times(1).returning(|| {
            let mut repository = Repository::new();
            repository.students.add("S001", "Alan", "Turing", 100)?;
            Ok(repository)
        });

        let services = Services::load(storage, LoanConfig::default()).unwrap();
        assert!(services.repository().students.exists("S001"));
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let mut storage = MockStorage::new();
        storage
            .expect_save_authors()
            .times(1)
            .returning(|_| Err(AppError::Io(std::io::Error::other("disk full"))));

        let mut services = test_support::services(storage);
        let author = services.add_author(AuthorInput::new("Orhan", "Pamuk")).unwrap();
        assert!(services.repository().authors.get(author.id).is_some());
    }

    #[test]
    fn test_save_all_writes_every_file() {
        let mut storage = MockStorage::new();
        storage.expect_save_authors().times(1).returning(|_| Ok(()));
        storage.expect_save_students().times(1).returning(|_| Ok(()));
        storage.expect_save_books().times(1).returning(|_| Ok(()));
        storage.expect_save_copies().times(1).returning(|_| Ok(()));
        storage.expect_save_book_authors().times(1).returning(|_| Ok(()));
        storage.expect_save_loans().times(1).returning(|_| Ok(()));

        let services = test_support::services(storage);
        services.save_all().unwrap();
    }
}
