//! Interactive menu console
//!
//! Reads one answer per line from any `BufRead` and writes menus and results
//! to any `Write`. Operation errors are printed with their code and the menu
//! is shown again; only I/O failures on the console itself end the session.

use std::io::{BufRead, ErrorKind, Write};
use std::str::FromStr;

use crate::{
    error::{AppError, AppResult},
    models::{AuthorInput, CreateBook, CreateStudent, UpdateBook, UpdateStudent},
    services::Services,
    storage::Storage,
};

const MAIN_MENU: &str = "\n=== Library Desk ===\n1. Author Ops\n2. Student Ops\n3. Book Ops\n0. Exit";
const AUTHOR_MENU: &str = "\n--- Author Menu ---\n1. Add Author\n2. Update Author\n3. Delete Author\n4. List Authors\n5. Books of Author\n0. Back";
const STUDENT_MENU: &str = "\n--- Student Menu ---\n1. Add Student\n2. Update Student\n3. Delete Student\n4. List Students\n5. Borrow/Return\n6. Non-returned Books\n7. Loan History\n0. Back";
const BOOK_MENU: &str = "\n--- Book Menu ---\n1. Add Book\n2. Update Book\n3. Delete Book\n4. List Books\n5. Assign Author to Book\n6. Remove Author from Book\n0. Back";

pub struct Shell<'a, S: Storage, R: BufRead, W: Write> {
    services: &'a mut Services<S>,
    input: R,
    output: W,
}

impl<'a, S: Storage, R: BufRead, W: Write> Shell<'a, S, R, W> {
    pub fn new(services: &'a mut Services<S>, input: R, output: W) -> Self {
        Self {
            services,
            input,
            output,
        }
    }

    /// Run the main menu until Exit or end of input, then save every store
    pub fn run(&mut self) -> AppResult<()> {
        match self.main_menu() {
            Ok(()) => {}
            Err(e) if is_end_of_input(&e) => tracing::debug!("Input closed, leaving the menu"),
            Err(e) => return Err(e),
        }

        if let Err(e) = self.services.save_all() {
            tracing::error!("Failed to save on exit: {}", e);
            self.report(&e)?;
        }
        writeln!(self.output, "Exiting...")?;
        Ok(())
    }

    fn main_menu(&mut self) -> AppResult<()> {
        loop {
            match self.choice(MAIN_MENU)? {
                0 => return Ok(()),
                1 => self.submenu(AUTHOR_MENU, Self::author_action)?,
                2 => self.submenu(STUDENT_MENU, Self::student_action)?,
                3 => self.submenu(BOOK_MENU, Self::book_action)?,
                other => self.unknown(other)?,
            }
        }
    }

    fn submenu(&mut self, menu: &str, action: fn(&mut Self, u32) -> AppResult<()>) -> AppResult<()> {
        loop {
            let choice = self.choice(menu)?;
            if choice == 0 {
                return Ok(());
            }
            match action(self, choice) {
                Ok(()) => {}
                Err(e) if is_end_of_input(&e) => return Err(e),
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn author_action(&mut self, choice: u32) -> AppResult<()> {
        match choice {
            1 => {
                let input = AuthorInput::new(self.prompt("Name")?, self.prompt("Surname")?);
                let author = self.services.add_author(input)?;
                writeln!(self.output, "Added author {} ({})", author.id, author.full_name())?;
            }
            2 => {
                let id = self.prompt_number("Author ID")?;
                let input = AuthorInput::new(self.prompt("Name")?, self.prompt("Surname")?);
                self.services.update_author(id, input)?;
                writeln!(self.output, "Updated author {}", id)?;
            }
            3 => {
                let id: u32 = self.prompt_number("Author ID to delete")?;
                self.services.delete_author(id)?;
                writeln!(self.output, "Deleted author {}", id)?;
            }
            4 => self.list_authors()?,
            5 => {
                let id = self.prompt_number("Author ID")?;
                let books = self.services.books_of_author(id)?;
                if books.is_empty() {
                    writeln!(self.output, "No books linked to author {}", id)?;
                }
                for book in books {
                    writeln!(self.output, "{} (ISBN: {})", book.title, book.isbn)?;
                }
            }
            other => self.unknown(other)?,
        }
        Ok(())
    }

    fn student_action(&mut self, choice: u32) -> AppResult<()> {
        match choice {
            1 => {
                let input = CreateStudent {
                    student_id: self.prompt("ID")?,
                    name: self.prompt("Name")?,
                    surname: self.prompt("Surname")?,
                };
                let student = self.services.add_student(input)?;
                writeln!(self.output, "Added student {} (score {})", student.student_id, student.score)?;
            }
            2 => {
                let id = self.prompt("ID")?;
                let input = UpdateStudent {
                    name: self.prompt("Name")?,
                    surname: self.prompt("Surname")?,
                    score: self.prompt_number("Score")?,
                };
                self.services.update_student(&id, input)?;
                writeln!(self.output, "Updated student {}", id)?;
            }
            3 => {
                let id = self.prompt("ID to delete")?;
                self.services.delete_student(&id)?;
                writeln!(self.output, "Deleted student {}", id)?;
            }
            4 => {
                writeln!(self.output, "ID\tName\tScore")?;
                for s in self.services.list_students() {
                    writeln!(self.output, "{}\t{} {}\t{}", s.student_id, s.name, s.surname, s.score)?;
                }
            }
            5 => self.borrow_or_return()?,
            6 => {
                let open = self.services.non_returned();
                if open.is_empty() {
                    writeln!(self.output, "All books are on the shelf")?;
                }
                for (student, book, copy) in open {
                    writeln!(
                        self.output,
                        "{}\t{} {}\t{}\t{}",
                        student.student_id, student.name, student.surname, copy.label, book.title
                    )?;
                }
            }
            7 => {
                let id = self.prompt("Student ID")?;
                for t in self.services.student_history(&id)? {
                    writeln!(self.output, "{}\t{}\t{}", t.date, t.operation, t.label)?;
                }
            }
            other => self.unknown(other)?,
        }
        Ok(())
    }

    fn borrow_or_return(&mut self) -> AppResult<()> {
        writeln!(self.output, "1. Borrow\n2. Return")?;
        let op: u32 = self.prompt_number("Select")?;
        let student_id = self.prompt("Student ID")?;
        match op {
            1 => {
                let isbn = self.prompt("Book ISBN")?;
                let date = self.prompt("Date (DD.MM.YYYY)")?;
                let label = self.services.process_loan(&student_id, &isbn, &date)?;
                writeln!(self.output, "Borrowed {}", label)?;
            }
            2 => {
                let label = self.prompt("Label (ISBN_1)")?;
                let date = self.prompt("Date (DD.MM.YYYY)")?;
                let receipt = self.services.process_return(&student_id, &label, &date)?;
                write!(self.output, "Returned {} after {} days", receipt.label, receipt.days_elapsed)?;
                if receipt.penalty_applied {
                    write!(self.output, ", late penalty -{}", self.services.loan_config().late_penalty)?;
                }
                writeln!(self.output)?;
            }
            other => self.unknown(other)?,
        }
        Ok(())
    }

    fn book_action(&mut self, choice: u32) -> AppResult<()> {
        match choice {
            1 => {
                let input = CreateBook {
                    title: self.prompt("Title")?,
                    isbn: self.prompt("ISBN")?,
                    quantity: self.prompt_number("Quantity")?,
                };
                let book = self.services.add_book(input)?;
                writeln!(self.output, "Added {} with {} copies", book.isbn, book.quantity())?;
            }
            2 => {
                let isbn = self.prompt("ISBN")?;
                let input = UpdateBook {
                    title: self.prompt("Title")?,
                    quantity: self.prompt_number("Quantity")?,
                };
                let book = self.services.update_book(&isbn, input)?;
                writeln!(self.output, "Updated {} ({} copies)", book.isbn, book.quantity())?;
            }
            3 => {
                let isbn = self.prompt("ISBN")?;
                self.services.delete_book(&isbn)?;
                writeln!(self.output, "Deleted book {}", isbn)?;
            }
            4 => {
                for (book, authors) in self.services.list_books_with_authors() {
                    let names: Vec<String> = authors.iter().map(|a| a.full_name()).collect();
                    writeln!(
                        self.output,
                        "{} (ISBN: {}) Qty: {} Available: {} Authors: {}",
                        book.title,
                        book.isbn,
                        book.quantity(),
                        book.available(),
                        if names.is_empty() { "-".to_string() } else { names.join(", ") }
                    )?;
                }
            }
            5 => {
                for book in self.services.list_books() {
                    writeln!(self.output, "ISBN: {} | Title: {}", book.isbn, book.title)?;
                }
                let isbn = self.prompt("Book ISBN to link")?;
                self.list_authors()?;
                let author_id = self.prompt_number("Author ID")?;
                self.services.link_author(&isbn, author_id)?;
                writeln!(self.output, "Book {} linked to author {}", isbn, author_id)?;
            }
            6 => {
                let isbn = self.prompt("Book ISBN")?;
                let author_id = self.prompt_number("Author ID")?;
                self.services.unlink_author(&isbn, author_id)?;
                writeln!(self.output, "Author {} removed from book {}", author_id, isbn)?;
            }
            other => self.unknown(other)?,
        }
        Ok(())
    }

    fn list_authors(&mut self) -> AppResult<()> {
        writeln!(self.output, "ID\tName")?;
        for a in self.services.list_authors() {
            writeln!(self.output, "{}\t{}", a.id, a.full_name())?;
        }
        Ok(())
    }

    fn report(&mut self, error: &AppError) -> AppResult<()> {
        writeln!(self.output, "error [{:?}]: {}", error.code(), error)?;
        Ok(())
    }

    fn unknown(&mut self, choice: u32) -> AppResult<()> {
        writeln!(self.output, "Unknown option {}", choice)?;
        Ok(())
    }

    /// Show a menu and read a numeric choice; anything unparsable re-shows the menu
    fn choice(&mut self, menu: &str) -> AppResult<u32> {
        loop {
            writeln!(self.output, "{}", menu)?;
            match self.prompt_number("Choice") {
                Ok(choice) => return Ok(choice),
                Err(e) if is_end_of_input(&e) => return Err(e),
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn prompt(&mut self, label: &str) -> AppResult<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "end of input",
            )));
        }
        Ok(line.trim().to_string())
    }

    fn prompt_number<T: FromStr>(&mut self, label: &str) -> AppResult<T> {
        let answer = self.prompt(label)?;
        answer
            .parse()
            .map_err(|_| AppError::Validation(format!("'{}' is not a valid number", answer)))
    }
}

fn is_end_of_input(error: &AppError) -> bool {
    matches!(error, AppError::Io(e) if e.kind() == ErrorKind::UnexpectedEof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{accepting_storage, services};
    use crate::storage::MockStorage;

    fn run_script(services: &mut Services<MockStorage>, script: &str) -> String {
        let mut output = Vec::new();
        Shell::new(services, script.as_bytes(), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_borrow_through_menus() {
        let mut services = services(accepting_storage());
        let script = "2\n1\nS001\nAlan\nTuring\n0\n\
                      3\n1\nDune\n978-1\n2\n0\n\
                      2\n5\n1\nS001\n978-1\n01.01.2024\n0\n0\n";

        let output = run_script(&mut services, script);
        assert!(output.contains("Added student S001 (score 100)"));
        assert!(output.contains("Borrowed 978-1_1"));
        assert!(output.ends_with("Exiting...\n"));
        assert!(services.repository().books.is_borrowed_by("978-1_1", "S001"));
    }

    #[test]
    fn test_errors_are_reported_with_code() {
        let mut services = services(accepting_storage());
        let script = "2\n5\n1\nS404\n978-1\n01.01.2024\n0\n0\n";

        let output = run_script(&mut services, script);
        assert!(output.contains("error [NoSuchStudent]: Student not found: S404"));
    }

    #[test]
    fn test_bad_number_shows_menu_again() {
        let mut services = services(accepting_storage());
        let output = run_script(&mut services, "abc\n9\n0\n");

        assert!(output.contains("error [BadValue]"));
        assert!(output.contains("Unknown option 9"));
    }

    #[test]
    fn test_end_of_input_saves_and_exits() {
        let mut storage = MockStorage::new();
        storage.expect_save_authors().times(2).returning(|_| Ok(()));
        storage.expect_save_students().times(1).returning(|_| Ok(()));
        storage.expect_save_books().times(1).returning(|_| Ok(()));
        storage.expect_save_copies().times(1).returning(|_| Ok(()));
        storage.expect_save_book_authors().times(1).returning(|_| Ok(()));
        storage.expect_save_loans().times(1).returning(|_| Ok(()));

        let mut services = services(storage);
        let output = run_script(&mut services, "1\n1\nUrsula\nLe Guin\n");

        assert!(output.contains("Added author 1 (Ursula Le Guin)"));
        assert!(output.ends_with("Exiting...\n"));
    }

    #[test]
    fn test_list_books_with_authors() {
        let mut services = services(accepting_storage());
        let script = "1\n1\nFrank\nHerbert\n0\n\
                      3\n1\nDune\n978-1\n1\n5\n978-1\n1\n4\n0\n0\n";

        let output = run_script(&mut services, script);
        assert!(output.contains("Book 978-1 linked to author 1"));
        assert!(output.contains("Dune (ISBN: 978-1) Qty: 1 Available: 1 Authors: Frank Herbert"));
    }
}
