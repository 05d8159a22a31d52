//! Book store, including the copies each book owns

use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    models::book::{parse_copy_label, Book, BookCopy, CopyStatus},
};

/// Books keyed by ISBN, kept sorted by (title, isbn)
#[derive(Debug, Clone, Default)]
pub struct BooksRepository {
    books: IndexMap<String, Book>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book with `quantity` copies labelled `{isbn}_1` .. `{isbn}_{quantity}`, all on shelf
    pub fn add(&mut self, title: &str, isbn: &str, quantity: u32) -> AppResult<Book> {
        if self.books.contains_key(isbn) {
            return Err(AppError::Conflict(format!(
                "Book with ISBN {} already exists",
                isbn
            )));
        }

        let book = Book {
            title: title.to_string(),
            isbn: isbn.to_string(),
            copies: (1..=quantity).map(|seq| BookCopy::new(isbn, seq)).collect(),
        };
        self.books.insert(isbn.to_string(), book.clone());
        self.sort();
        Ok(book)
    }

    /// Remove a book together with its copies
    pub fn delete(&mut self, isbn: &str) -> Option<Book> {
        self.books.shift_remove(isbn)
    }

    /// Rename a book and grow or shrink its copy set to `quantity`.
    ///
    /// New copies continue the numbering after the highest existing label.
    /// When shrinking, the highest-numbered copies on the shelf are removed
    /// first; copies out on loan are never dropped, so the update fails if
    /// too few copies are on the shelf. Returns `Ok(false)` for an unknown ISBN.
    pub fn update(&mut self, isbn: &str, title: &str, quantity: u32) -> AppResult<bool> {
        let Some(book) = self.books.get_mut(isbn) else {
            return Ok(false);
        };

        let target = quantity as usize;
        let current = book.quantity();

        if target < current {
            let excess = current - target;
            let mut removable: Vec<u32> = book
                .copies
                .iter()
                .filter(|c| c.status.is_on_shelf())
                .map(|c| c.sequence)
                .collect();
            if removable.len() < excess {
                return Err(AppError::BusinessRule(format!(
                    "Cannot reduce {} to {} copies: {} copies are on loan",
                    isbn,
                    quantity,
                    current - removable.len()
                )));
            }
            removable.sort_unstable_by(|a, b| b.cmp(a));
            removable.truncate(excess);
            book.copies.retain(|c| !removable.contains(&c.sequence));
        } else if target > current {
            let added = (target - current) as u32;
            let range = book
                .max_sequence()
                .checked_add(1)
                .and_then(|next| Some(next..=next.checked_add(added - 1)?))
                .ok_or_else(|| {
                    AppError::AllocationFailure(format!("Copy labels of {} are exhausted", isbn))
                })?;
            book.copies.extend(range.map(|seq| BookCopy::new(isbn, seq)));
        }

        book.title = title.to_string();
        self.sort();
        Ok(true)
    }

    /// First copy of `isbn` that is on the shelf, in copy order
    pub fn find_available_copy(&self, isbn: &str) -> Option<&str> {
        self.books
            .get(isbn)?
            .copies
            .iter()
            .find(|c| c.status.is_on_shelf())
            .map(|c| c.label.as_str())
    }

    /// Resolve a copy label to its copy
    pub fn copy(&self, label: &str) -> Option<&BookCopy> {
        let (isbn, _) = parse_copy_label(label)?;
        self.books.get(isbn)?.copy(label)
    }

    fn copy_mut(&mut self, label: &str) -> Option<&mut BookCopy> {
        let (isbn, _) = parse_copy_label(label)?;
        self.books.get_mut(isbn)?.copy_mut(label)
    }

    pub fn is_on_shelf(&self, label: &str) -> bool {
        self.copy(label)
            .map(|c| c.status.is_on_shelf())
            .unwrap_or(false)
    }

    pub fn is_borrowed_by(&self, label: &str, student_id: &str) -> bool {
        self.copy(label)
            .and_then(|c| c.status.borrower())
            .map(|borrower| borrower == student_id)
            .unwrap_or(false)
    }

    /// Mark a copy as borrowed by `student_id`
    pub fn borrow(&mut self, label: &str, student_id: &str) -> AppResult<()> {
        let copy = self
            .copy_mut(label)
            .ok_or_else(|| AppError::not_found("Copy", label))?;
        copy.status = CopyStatus::Borrowed(student_id.to_string());
        Ok(())
    }

    /// Put a copy back on the shelf
    pub fn return_copy(&mut self, label: &str) -> AppResult<()> {
        let copy = self
            .copy_mut(label)
            .ok_or_else(|| AppError::not_found("Copy", label))?;
        copy.status = CopyStatus::OnShelf;
        Ok(())
    }

    /// Apply a borrower read back from storage to an existing copy.
    /// Returns false when the book or the copy does not exist.
    pub fn restore_copy(&mut self, label: &str, isbn: &str, status: CopyStatus) -> bool {
        match self.books.get_mut(isbn).and_then(|b| b.copy_mut(label)) {
            Some(copy) => {
                copy.status = status;
                true
            }
            None => false,
        }
    }

    /// Replace the copy set of a book with copies read back from storage.
    /// The count must match the book's quantity and labels must be distinct;
    /// returns false otherwise or when the book does not exist.
    pub fn replace_copies(&mut self, isbn: &str, mut copies: Vec<BookCopy>) -> bool {
        match self.books.get_mut(isbn) {
            Some(book) if book.quantity() == copies.len() => {
                copies.sort_by_key(|c| c.sequence);
                if copies.windows(2).any(|w| w[0].sequence == w[1].sequence) {
                    return false;
                }
                book.copies = copies;
                true
            }
            _ => false,
        }
    }

    /// Copies currently held by a student, with their book
    pub fn borrowed_by(&self, student_id: &str) -> Vec<(&Book, &BookCopy)> {
        self.copies()
            .filter(|(_, c)| c.status.borrower() == Some(student_id))
            .collect()
    }

    /// Every copy in store order, paired with its book
    pub fn copies(&self) -> impl Iterator<Item = (&Book, &BookCopy)> {
        self.books
            .values()
            .flat_map(|book| book.copies.iter().map(move |copy| (book, copy)))
    }

    pub fn get(&self, isbn: &str) -> Option<&Book> {
        self.books.get(isbn)
    }

    /// Snapshot in (title, isbn) order
    pub fn list(&self) -> Vec<&Book> {
        self.books.values().collect()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn sort(&mut self) {
        self.books
            .sort_by(|_, a, _, b| (&a.title, &a.isbn).cmp(&(&b.title, &b.isbn)));
    }
}
