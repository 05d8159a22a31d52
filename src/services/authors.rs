//! Author management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{ensure_plain_fields, Author, AuthorInput, Book},
    storage::Storage,
};

use super::Services;

impl<S: Storage> Services<S> {
    /// Register a new author with the next free id
    pub fn add_author(&mut self, input: AuthorInput) -> AppResult<Author> {
        input.validate()?;
        ensure_plain_fields(&[&input.name, &input.surname])?;

        let author = self.repository.authors.add(&input.name, &input.surname)?;
        tracing::info!("Added author {} ({})", author.id, author.full_name());

        self.persist("authors", |s, r| s.save_authors(&r.authors));
        Ok(author)
    }

    pub fn update_author(&mut self, id: u32, input: AuthorInput) -> AppResult<Author> {
        input.validate()?;
        ensure_plain_fields(&[&input.name, &input.surname])?;

        if !self.repository.authors.update(id, &input.name, &input.surname) {
            return Err(AppError::not_found("Author", id));
        }
        self.persist("authors", |s, r| s.save_authors(&r.authors));
        self.author(id).cloned()
    }

    /// Delete an author and every book link that references it
    pub fn delete_author(&mut self, id: u32) -> AppResult<()> {
        if !self.repository.delete_author(id) {
            return Err(AppError::not_found("Author", id));
        }
        tracing::info!("Deleted author {}", id);

        self.persist("book-author links", |s, r| s.save_book_authors(&r.book_authors));
        self.persist("authors", |s, r| s.save_authors(&r.authors));
        Ok(())
    }

    pub fn author(&self, id: u32) -> AppResult<&Author> {
        self.repository
            .authors
            .get(id)
            .ok_or_else(|| AppError::not_found("Author", id))
    }

    pub fn list_authors(&self) -> Vec<&Author> {
        self.repository.authors.list()
    }

    /// Books linked to an author; links to books that no longer exist are left out
    pub fn books_of_author(&self, id: u32) -> AppResult<Vec<&Book>> {
        self.author(id)?;
        Ok(self
            .repository
            .book_authors
            .books_of(id)
            .into_iter()
            .filter_map(|isbn| self.repository.books.get(isbn))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::models::AuthorInput;
    use crate::services::test_support::{accepting_storage, services};
    use crate::storage::MockStorage;

    #[test]
    fn test_add_assigns_next_id_and_saves() {
        let mut storage = MockStorage::new();
        storage.expect_save_authors().times(2).returning(|_| Ok(()));

        let mut services = services(storage);
        assert_eq!(services.add_author(AuthorInput::new("Orhan", "Pamuk")).unwrap().id, 1);
        assert_eq!(services.add_author(AuthorInput::new("Elif", "Shafak")).unwrap().id, 2);
    }

    #[test]
    fn test_invalid_input_is_rejected_before_mutation() {
        let mut services = services(MockStorage::new());
        assert!(matches!(
            services.add_author(AuthorInput::new("", "Pamuk")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            services.add_author(AuthorInput::new("Orhan", "Pa,muk")),
            Err(AppError::Validation(_))
        ));
        assert!(services.list_authors().is_empty());
    }

    #[test]
    fn test_delete_cascades_and_saves_links() {
        let mut storage = MockStorage::new();
        storage.expect_save_authors().times(2).returning(|_| Ok(()));
        storage.expect_save_books().times(1).returning(|_| Ok(()));
        storage.expect_save_copies().times(1).returning(|_| Ok(()));
        storage.expect_save_book_authors().times(2).returning(|_| Ok(()));

        let mut services = services(storage);
        let author = services.add_author(AuthorInput::new("Frank", "Herbert")).unwrap();
        services
            .add_book(crate::models::CreateBook {
                title: "Dune".into(),
                isbn: "978-1".into(),
                quantity: 1,
            })
            .unwrap();
        services.link_author("978-1", author.id).unwrap();

        services.delete_author(author.id).unwrap();
        assert_eq!(services.repository().book_authors.count_links(author.id), 0);
        assert!(services.authors_of_book("978-1").unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_author_reports_not_found() {
        let mut services = services(MockStorage::new());
        assert!(matches!(services.delete_author(3), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_author() {
        let mut services = services(accepting_storage());
        let author = services.add_author(AuthorInput::new("Sait", "Faik")).unwrap();

        let updated = services
            .update_author(author.id, AuthorInput::new("Sait Faik", "Abasiyanik"))
            .unwrap();
        assert_eq!(updated.surname, "Abasiyanik");
        assert!(matches!(
            services.update_author(99, AuthorInput::new("x", "y")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_books_of_author() {
        let mut services = services(accepting_storage());
        let author = services.add_author(AuthorInput::new("Stanislaw", "Lem")).unwrap();
        for (title, isbn) in [("Solaris", "1"), ("Fiasco", "2")] {
            services
                .add_book(crate::models::CreateBook {
                    title: title.into(),
                    isbn: isbn.into(),
                    quantity: 1,
                })
                .unwrap();
            services.link_author(isbn, author.id).unwrap();
        }

        let titles: Vec<&str> = services
            .books_of_author(author.id)
            .unwrap()
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Solaris", "Fiasco"]);
    }
}
