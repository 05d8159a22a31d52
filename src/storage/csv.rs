//! Comma-delimited flat files, one per store.
//!
//! Fields are written verbatim with no quoting, so values must not contain
//! commas or line breaks (inputs are checked before they reach a store).
//! Reading is best effort: lines that do not have the expected shape are
//! logged and skipped.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::parse_copy_label, Author, BookCopy, CopyStatus, LoanDate, LoanTransaction,
        OperationType,
    },
    repository::{
        authors::AuthorsRepository, book_authors::BookAuthorsRepository,
        books::BooksRepository, loans::LoansRepository, students::StudentsRepository,
        Repository,
    },
};

use super::Storage;

pub const AUTHORS_FILE: &str = "authors.csv";
pub const STUDENTS_FILE: &str = "students.csv";
pub const BOOKS_FILE: &str = "books.csv";
pub const COPIES_FILE: &str = "copies.csv";
pub const BOOK_AUTHORS_FILE: &str = "book_authors.csv";
pub const LOANS_FILE: &str = "loans.csv";

const AUTHORS_HEADER: &str = "AuthorID,Name,Surname";
const STUDENTS_HEADER: &str = "StudentID,Name,Surname,Score";
const BOOKS_HEADER: &str = "Title,ISBN,Quantity";
const COPIES_HEADER: &str = "LabelNo,ISBN,BorrowerID";

/// Storage backed by CSV files in a data directory
#[derive(Debug, Clone)]
pub struct CsvStorage {
    data_dir: PathBuf,
}

impl CsvStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Contents of a data file, or `None` if it is missing or unreadable.
    /// Lines that are not valid UTF-8 are blanked so they get skipped.
    fn read(&self, file: &str) -> Option<String> {
        let path = self.path(file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("File not found: {}, starting empty", path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("Cannot read {}: {}, starting empty", path.display(), e);
                return None;
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        if !text.contains(char::REPLACEMENT_CHARACTER) {
            return Some(text.into_owned());
        }
        let lines: Vec<&str> = text
            .lines()
            .enumerate()
            .map(|(idx, line)| {
                if line.contains(char::REPLACEMENT_CHARACTER) {
                    skip(file, idx + 1, "invalid UTF-8");
                    ""
                } else {
                    line
                }
            })
            .collect();
        Some(lines.join("\n"))
    }

    fn write(&self, file: &str, contents: &str) -> AppResult<()> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.path(file);
        fs::write(&path, contents)?;
        tracing::debug!("Saved {}", path.display());
        Ok(())
    }
}

impl Storage for CsvStorage {
    fn load(&self) -> AppResult<Repository> {
        let mut repository = Repository::new();

        if let Some(text) = self.read(AUTHORS_FILE) {
            repository.authors = parse_authors(&text);
        }
        if let Some(text) = self.read(STUDENTS_FILE) {
            repository.students = parse_students(&text);
        }
        if let Some(text) = self.read(BOOKS_FILE) {
            repository.books = parse_books(&text);
        }
        if let Some(text) = self.read(COPIES_FILE) {
            restore_copies(&mut repository.books, &text);
        }
        if let Some(text) = self.read(BOOK_AUTHORS_FILE) {
            repository.book_authors = parse_book_authors(&text);
        }
        if let Some(text) = self.read(LOANS_FILE) {
            repository.loans = parse_loans(&text);
        }

        tracing::info!(
            "Loaded {} authors, {} students, {} books, {} links, {} loan records from {}",
            repository.authors.len(),
            repository.students.len(),
            repository.books.len(),
            repository.book_authors.len(),
            repository.loans.len(),
            self.data_dir.display()
        );
        Ok(repository)
    }

    fn save_authors(&self, authors: &AuthorsRepository) -> AppResult<()> {
        self.write(AUTHORS_FILE, &format_authors(authors))
    }

    fn save_students(&self, students: &StudentsRepository) -> AppResult<()> {
        self.write(STUDENTS_FILE, &format_students(students))
    }

    fn save_books(&self, books: &BooksRepository) -> AppResult<()> {
        self.write(BOOKS_FILE, &format_books(books))
    }

    fn save_copies(&self, books: &BooksRepository) -> AppResult<()> {
        self.write(COPIES_FILE, &format_copies(books))
    }

    fn save_book_authors(&self, links: &BookAuthorsRepository) -> AppResult<()> {
        self.write(BOOK_AUTHORS_FILE, &format_book_authors(links))
    }

    fn save_loans(&self, loans: &LoansRepository) -> AppResult<()> {
        self.write(LOANS_FILE, &format_loans(loans))
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Non-empty lines with their 1-based line numbers, optionally skipping a header
fn records(text: &str, has_header: bool) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(usize::from(has_header))
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Split a line into exactly `n` trimmed fields; the last one keeps any extra commas
fn split_fields(line: &str, n: usize) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line.splitn(n, ',').map(str::trim).collect();
    (fields.len() == n).then_some(fields)
}

fn parse_number<T: std::str::FromStr>(field: &str, what: &str) -> AppResult<T> {
    field
        .parse()
        .map_err(|_| AppError::Parse(format!("invalid {} '{}'", what, field)))
}

fn skip(file: &str, line_no: usize, reason: impl std::fmt::Display) {
    tracing::warn!("{}:{}: skipping record ({})", file, line_no, reason);
}

pub fn parse_authors(text: &str) -> AuthorsRepository {
    let mut authors = AuthorsRepository::new();
    for (line_no, line) in records(text, true) {
        let parsed = split_fields(line, 3)
            .ok_or_else(|| AppError::Parse("expected 3 fields".into()))
            .and_then(|f| {
                Ok(Author {
                    id: parse_number(f[0], "author id")?,
                    name: f[1].to_string(),
                    surname: f[2].to_string(),
                })
            });
        match parsed {
            Ok(author) => {
                let id = author.id;
                if !authors.insert(author) {
                    skip(AUTHORS_FILE, line_no, format!("duplicate author id {}", id));
                }
            }
            Err(e) => skip(AUTHORS_FILE, line_no, e),
        }
    }
    authors
}

pub fn parse_students(text: &str) -> StudentsRepository {
    let mut students = StudentsRepository::new();
    for (line_no, line) in records(text, true) {
        let result = split_fields(line, 4)
            .ok_or_else(|| AppError::Parse("expected 4 fields".into()))
            .and_then(|f| {
                let score = parse_number(f[3], "score")?;
                students.add(f[0], f[1], f[2], score)
            });
        if let Err(e) = result {
            skip(STUDENTS_FILE, line_no, e);
        }
    }
    students
}

pub fn parse_books(text: &str) -> BooksRepository {
    let mut books = BooksRepository::new();
    for (line_no, line) in records(text, true) {
        let result = split_fields(line, 3)
            .ok_or_else(|| AppError::Parse("expected 3 fields".into()))
            .and_then(|f| {
                let quantity = parse_number(f[2], "quantity")?;
                books.add(f[0], f[1], quantity)
            });
        if let Err(e) = result {
            skip(BOOKS_FILE, line_no, e);
        }
    }
    books
}

/// Apply saved copies to the books rebuilt from `books.csv`.
///
/// When a book's saved copies match its quantity they replace the generated
/// ones, which keeps labels left with gaps by earlier quantity changes.
/// Otherwise only the borrower of each matching label is restored.
/// A label seen twice keeps its first line.
pub fn restore_copies(books: &mut BooksRepository, text: &str) {
    let mut saved: IndexMap<String, Vec<(usize, BookCopy)>> = IndexMap::new();
    for (line_no, line) in records(text, true) {
        let Some(f) = split_fields(line, 3) else {
            skip(COPIES_FILE, line_no, "expected 3 fields");
            continue;
        };
        match parse_copy_label(f[0]) {
            Some((isbn, sequence)) if isbn == f[1] => {
                let entries = saved.entry(isbn.to_string()).or_default();
                if entries.iter().any(|(_, c)| c.sequence == sequence) {
                    skip(COPIES_FILE, line_no, format!("duplicate copy label {}", f[0]));
                    continue;
                }
                entries.push((
                    line_no,
                    BookCopy {
                        label: f[0].to_string(),
                        sequence,
                        status: CopyStatus::from(f[2]),
                    },
                ));
            }
            _ => skip(COPIES_FILE, line_no, format!("bad copy label {}", f[0])),
        }
    }

    for (isbn, entries) in saved {
        let copies: Vec<BookCopy> = entries.iter().map(|(_, c)| c.clone()).collect();
        if books.replace_copies(&isbn, copies) {
            continue;
        }
        for (line_no, copy) in entries {
            if !books.restore_copy(&copy.label, &isbn, copy.status) {
                skip(COPIES_FILE, line_no, format!("unknown copy {}", copy.label));
            }
        }
    }
}

pub fn parse_book_authors(text: &str) -> BookAuthorsRepository {
    let mut links = BookAuthorsRepository::new();
    for (line_no, line) in records(text, false) {
        let result = split_fields(line, 2)
            .ok_or_else(|| AppError::Parse("expected 2 fields".into()))
            .and_then(|f| {
                let author_id = parse_number(f[1], "author id")?;
                links.link(f[0], author_id)
            });
        match result {
            Ok(true) => {}
            Ok(false) => skip(BOOK_AUTHORS_FILE, line_no, "duplicate relation"),
            Err(e) => skip(BOOK_AUTHORS_FILE, line_no, e),
        }
    }
    links
}

pub fn parse_loans(text: &str) -> LoansRepository {
    let mut transactions = Vec::new();
    for (line_no, line) in records(text, false) {
        let parsed = split_fields(line, 4)
            .ok_or_else(|| AppError::Parse("expected 4 fields".into()))
            .and_then(|f| {
                let code: u8 = parse_number(f[2], "operation type")?;
                Ok(LoanTransaction {
                    student_id: f[0].to_string(),
                    label: f[1].to_string(),
                    operation: OperationType::try_from(code)?,
                    date: f[3].parse::<LoanDate>()?,
                })
            });
        match parsed {
            Ok(transaction) => transactions.push(transaction),
            Err(e) => skip(LOANS_FILE, line_no, e),
        }
    }
    LoansRepository::from_newest_first(transactions)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

pub fn format_authors(authors: &AuthorsRepository) -> String {
    let mut out = format!("{}\n", AUTHORS_HEADER);
    for a in authors.list() {
        let _ = writeln!(out, "{},{},{}", a.id, a.name, a.surname);
    }
    out
}

pub fn format_students(students: &StudentsRepository) -> String {
    let mut out = format!("{}\n", STUDENTS_HEADER);
    for s in students.list() {
        let _ = writeln!(out, "{},{},{},{}", s.student_id, s.name, s.surname, s.score);
    }
    out
}

pub fn format_books(books: &BooksRepository) -> String {
    let mut out = format!("{}\n", BOOKS_HEADER);
    for b in books.list() {
        let _ = writeln!(out, "{},{},{}", b.title, b.isbn, b.quantity());
    }
    out
}

pub fn format_copies(books: &BooksRepository) -> String {
    let mut out = format!("{}\n", COPIES_HEADER);
    for (book, copy) in books.copies() {
        let _ = writeln!(out, "{},{},{}", copy.label, book.isbn, copy.status.as_field());
    }
    out
}

pub fn format_book_authors(links: &BookAuthorsRepository) -> String {
    let mut out = String::new();
    for link in links.entries() {
        let _ = writeln!(out, "{},{}", link.isbn, link.author_id);
    }
    out
}

/// Ledger lines, newest first
pub fn format_loans(loans: &LoansRepository) -> String {
    let mut out = String::new();
    for t in loans.newest_first() {
        let _ = writeln!(
            out,
            "{},{},{},{}",
            t.student_id, t.label, t.operation as u8, t.date
        );
    }
    out
}
