//! End-to-end tests against CSV files in a temporary data directory

use std::fs;

use library_desk::{
    config::LoanConfig,
    models::{AuthorInput, CreateBook, CreateStudent, UpdateBook},
    services::Services,
    shell::Shell,
    storage::{csv, CsvStorage},
    AppError,
};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Services<CsvStorage> {
    Services::load(CsvStorage::new(dir.path()), LoanConfig::default())
        .expect("Failed to load data directory")
}

fn seed(services: &mut Services<CsvStorage>) {
    services
        .add_student(CreateStudent {
            student_id: "S001".into(),
            name: "Alan".into(),
            surname: "Turing".into(),
        })
        .unwrap();
    services
        .add_book(CreateBook {
            title: "Dune".into(),
            isbn: "978-1".into(),
            quantity: 2,
        })
        .unwrap();
    let author = services
        .add_author(AuthorInput::new("Frank", "Herbert"))
        .unwrap();
    services.link_author("978-1", author.id).unwrap();
}

#[test]
fn test_empty_directory_starts_empty() {
    let dir = TempDir::new().unwrap();
    let services = open(&dir);

    assert!(services.list_authors().is_empty());
    assert!(services.list_students().is_empty());
    assert!(services.list_books().is_empty());
}

#[test]
fn test_operations_are_written_through() {
    let dir = TempDir::new().unwrap();
    let mut services = open(&dir);
    seed(&mut services);

    let books = fs::read_to_string(dir.path().join(csv::BOOKS_FILE)).unwrap();
    assert_eq!(books, "Title,ISBN,Quantity\nDune,978-1,2\n");

    let copies = fs::read_to_string(dir.path().join(csv::COPIES_FILE)).unwrap();
    assert_eq!(
        copies,
        "LabelNo,ISBN,BorrowerID\n978-1_1,978-1,SHELF\n978-1_2,978-1,SHELF\n"
    );

    let links = fs::read_to_string(dir.path().join(csv::BOOK_AUTHORS_FILE)).unwrap();
    assert_eq!(links, "978-1,1\n");
}

#[test]
fn test_loan_survives_reload_and_late_return_is_penalised() {
    let dir = TempDir::new().unwrap();
    {
        let mut services = open(&dir);
        seed(&mut services);
        let label = services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        assert_eq!(label, "978-1_1");
    }

    let mut services = open(&dir);
    assert!(services.repository().books.is_borrowed_by("978-1_1", "S001"));
    assert_eq!(services.non_returned().len(), 1);

    let receipt = services
        .process_return("S001", "978-1_1", "20.01.2024")
        .unwrap();
    assert_eq!(receipt.days_elapsed, 19);
    assert!(receipt.penalty_applied);

    let loans = fs::read_to_string(dir.path().join(csv::LOANS_FILE)).unwrap();
    assert_eq!(loans, "S001,978-1_1,1,20.01.2024\nS001,978-1_1,0,01.01.2024\n");

    let reloaded = open(&dir);
    assert_eq!(reloaded.student("S001").unwrap().score, 90);
    assert!(reloaded.repository().books.is_on_shelf("978-1_1"));
    assert_eq!(reloaded.student_history("S001").unwrap().len(), 2);
}

#[test]
fn test_shrunk_book_keeps_loaned_copy_across_reload() {
    let dir = TempDir::new().unwrap();
    {
        let mut services = open(&dir);
        seed(&mut services);
        services
            .update_book(
                "978-1",
                UpdateBook {
                    title: "Dune".into(),
                    quantity: 3,
                },
            )
            .unwrap();
        services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        services.process_return("S001", "978-1_2", "02.01.2024").unwrap();
        services
            .update_book(
                "978-1",
                UpdateBook {
                    title: "Dune".into(),
                    quantity: 2,
                },
            )
            .unwrap();
    }

    let services = open(&dir);
    let book = services.book("978-1").unwrap();
    let labels: Vec<&str> = book.copies.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["978-1_1", "978-1_3"]);
    assert!(services.repository().books.is_borrowed_by("978-1_3", "S001"));
}

#[test]
fn test_deleting_author_rewrites_links() {
    let dir = TempDir::new().unwrap();
    let mut services = open(&dir);
    seed(&mut services);

    services.delete_author(1).unwrap();
    let links = fs::read_to_string(dir.path().join(csv::BOOK_AUTHORS_FILE)).unwrap();
    assert!(links.is_empty());

    let reloaded = open(&dir);
    assert!(reloaded.authors_of_book("978-1").unwrap().is_empty());
    assert!(matches!(reloaded.author(1), Err(AppError::NotFound(_))));
}

#[test]
fn test_shell_session_saves_on_exit() {
    let dir = TempDir::new().unwrap();
    let mut services = open(&dir);
    let script = "2\n1\nS002\nGrace\nHopper\n0\n0\n";

    let mut output = Vec::new();
    Shell::new(&mut services, script.as_bytes(), &mut output)
        .run()
        .unwrap();

    let students = fs::read_to_string(dir.path().join(csv::STUDENTS_FILE)).unwrap();
    assert_eq!(students, "StudentID,Name,Surname,Score\nS002,Grace,Hopper,100\n");
    assert!(dir.path().join(csv::LOANS_FILE).exists());
}
