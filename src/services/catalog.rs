//! Catalog management service: books, their copies and author links

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{ensure_plain_fields, Author, Book, CreateBook, UpdateBook},
    storage::Storage,
};

use super::Services;

impl<S: Storage> Services<S> {
    /// Create a book and its shelf copies
    pub fn add_book(&mut self, input: CreateBook) -> AppResult<Book> {
        input.validate()?;
        ensure_plain_fields(&[&input.title, &input.isbn])?;
        if input.isbn.contains('_') {
            return Err(AppError::Validation(format!(
                "ISBN '{}' must not contain '_'",
                input.isbn
            )));
        }

        let book = self
            .repository
            .books
            .add(&input.title, &input.isbn, input.quantity)?;
        tracing::info!("Added book {} with {} copies", book.isbn, book.quantity());

        self.persist("books", |s, r| s.save_books(&r.books));
        self.persist("copies", |s, r| s.save_copies(&r.books));
        Ok(book)
    }

    pub fn update_book(&mut self, isbn: &str, input: UpdateBook) -> AppResult<Book> {
        input.validate()?;
        ensure_plain_fields(&[&input.title])?;

        if !self.repository.books.update(isbn, &input.title, input.quantity)? {
            return Err(AppError::not_found("Book", isbn));
        }
        tracing::info!("Updated book {} ({} copies)", isbn, input.quantity);

        self.persist("books", |s, r| s.save_books(&r.books));
        self.persist("copies", |s, r| s.save_copies(&r.books));
        self.book(isbn).cloned()
    }

    /// Delete a book, its copies and its author links.
    /// A book with copies out on loan is kept.
    pub fn delete_book(&mut self, isbn: &str) -> AppResult<()> {
        let book = self.book(isbn)?;
        let on_loan = book.quantity() - book.available();
        if on_loan > 0 {
            return Err(AppError::BusinessRule(format!(
                "Book {} has {} copies on loan",
                isbn, on_loan
            )));
        }

        self.repository.books.delete(isbn);
        let links = self.repository.book_authors.remove_book(isbn);
        tracing::info!("Deleted book {} and {} author link(s)", isbn, links);

        self.persist("books", |s, r| s.save_books(&r.books));
        self.persist("copies", |s, r| s.save_copies(&r.books));
        if links > 0 {
            self.persist("book-author links", |s, r| s.save_book_authors(&r.book_authors));
        }
        Ok(())
    }

    pub fn book(&self, isbn: &str) -> AppResult<&Book> {
        self.repository
            .books
            .get(isbn)
            .ok_or_else(|| AppError::not_found("Book", isbn))
    }

    pub fn list_books(&self) -> Vec<&Book> {
        self.repository.books.list()
    }

    /// Every book with the authors linked to it
    pub fn list_books_with_authors(&self) -> Vec<(&Book, Vec<&Author>)> {
        self.list_books()
            .into_iter()
            .map(|book| (book, self.linked_authors(&book.isbn)))
            .collect()
    }

    pub fn authors_of_book(&self, isbn: &str) -> AppResult<Vec<&Author>> {
        self.book(isbn)?;
        Ok(self.linked_authors(isbn))
    }

    fn linked_authors(&self, isbn: &str) -> Vec<&Author> {
        self.repository
            .book_authors
            .authors_of(isbn)
            .into_iter()
            .filter_map(|id| self.repository.authors.get(id))
            .collect()
    }

    /// Link an existing author to an existing book
    pub fn link_author(&mut self, isbn: &str, author_id: u32) -> AppResult<()> {
        self.book(isbn)?;
        self.author(author_id)?;

        if !self.repository.book_authors.link(isbn, author_id)? {
            return Err(AppError::DuplicateRelation {
                isbn: isbn.to_string(),
                author_id,
            });
        }
        tracing::debug!("Linked author {} to book {}", author_id, isbn);

        self.persist("book-author links", |s, r| s.save_book_authors(&r.book_authors));
        Ok(())
    }

    pub fn unlink_author(&mut self, isbn: &str, author_id: u32) -> AppResult<()> {
        if !self.repository.book_authors.unlink(isbn, author_id) {
            return Err(AppError::NotFound(format!(
                "Author {} is not linked to book {}",
                author_id, isbn
            )));
        }
        tracing::debug!("Unlinked author {} from book {}", author_id, isbn);

        self.persist("book-author links", |s, r| s.save_book_authors(&r.book_authors));
        Ok(())
    }
}
