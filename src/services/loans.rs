//! Borrow and return workflow
//!
//! A copy moves from the shelf to a student and back. Every precondition is
//! checked before the first mutation, so a rejected request leaves copies,
//! scores and the ledger untouched.

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookCopy, LoanDate, LoanTransaction, ReturnReceipt, Student},
    storage::Storage,
};

use super::Services;

impl<S: Storage> Services<S> {
    /// Lend the first shelf copy of `isbn` to a student. Returns the copy label.
    pub fn process_loan(&mut self, student_id: &str, isbn: &str, date: &str) -> AppResult<String> {
        let date: LoanDate = date.parse()?;

        if !self.repository.students.exists(student_id) {
            return Err(AppError::StudentNotFound(student_id.to_string()));
        }
        if !self.repository.students.has_positive_score(student_id) {
            return Err(AppError::InsufficientScore(student_id.to_string()));
        }
        let label = self
            .repository
            .books
            .find_available_copy(isbn)
            .ok_or_else(|| AppError::NoCopiesAvailable(isbn.to_string()))?
            .to_string();

        self.repository.books.borrow(&label, student_id)?;
        self.repository
            .loans
            .append(LoanTransaction::borrow(student_id, &label, date));
        tracing::info!("Student {} borrowed {} on {}", student_id, label, date);

        self.persist("loans", |s, r| s.save_loans(&r.loans));
        self.persist("copies", |s, r| s.save_copies(&r.books));
        Ok(label)
    }

    /// Take a copy back from a student, applying the late penalty when due
    pub fn process_return(
        &mut self,
        student_id: &str,
        label: &str,
        date: &str,
    ) -> AppResult<ReturnReceipt> {
        let date: LoanDate = date.parse()?;

        if !self.repository.students.exists(student_id) {
            return Err(AppError::StudentNotFound(student_id.to_string()));
        }
        if !self.repository.books.is_borrowed_by(label, student_id) {
            return Err(AppError::NotBorrowedByStudent {
                student_id: student_id.to_string(),
                label: label.to_string(),
            });
        }
        let borrowed_on = self
            .repository
            .loans
            .latest_borrow(student_id, label)
            .map(|t| t.date)
            .ok_or_else(|| AppError::LoanRecordMissing {
                student_id: student_id.to_string(),
                label: label.to_string(),
            })?;

        let days_elapsed = borrowed_on.days_until(date);
        let penalty_applied = days_elapsed > self.loan_config.max_days;
        if penalty_applied {
            self.repository
                .students
                .adjust_score(student_id, -self.loan_config.late_penalty);
            tracing::info!(
                "Late return of {} by {} ({} days), score -{}",
                label,
                student_id,
                days_elapsed,
                self.loan_config.late_penalty
            );
        }

        self.repository.books.return_copy(label)?;
        self.repository
            .loans
            .append(LoanTransaction::returned(student_id, label, date));
        tracing::info!("Student {} returned {} on {}", student_id, label, date);

        self.persist("loans", |s, r| s.save_loans(&r.loans));
        self.persist("copies", |s, r| s.save_copies(&r.books));
        self.persist("students", |s, r| s.save_students(&r.students));

        Ok(ReturnReceipt {
            label: label.to_string(),
            days_elapsed,
            penalty_applied,
        })
    }

    /// Students currently holding copies, in student id order
    pub fn non_returned(&self) -> Vec<(&Student, &Book, &BookCopy)> {
        self.repository
            .students
            .list()
            .into_iter()
            .flat_map(|student| {
                self.repository
                    .books
                    .borrowed_by(&student.student_id)
                    .into_iter()
                    .map(move |(book, copy)| (student, book, copy))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{AppError, ErrorCode};
    use crate::models::{CreateBook, CreateStudent, OperationType, UpdateStudent};
    use crate::services::test_support::{accepting_storage, services};
    use crate::services::Services;
    use crate::storage::MockStorage;

    fn library(storage: MockStorage) -> Services<MockStorage> {
        let mut services = services(storage);
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
        services
    }

    fn score(services: &Services<MockStorage>) -> i32 {
        services.student("S001").unwrap().score
    }

    #[test]
    fn test_late_return_scenario() {
        let mut services = library(accepting_storage());

        let label = services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        assert_eq!(label, "978-1_1");
        assert!(services.repository().books.is_borrowed_by(&label, "S001"));

        let receipt = services.process_return("S001", &label, "20.01.2024").unwrap();
        assert_eq!(receipt.days_elapsed, 19);
        assert!(receipt.penalty_applied);
        assert_eq!(score(&services), 90);
        assert!(services.repository().books.is_on_shelf(&label));
        assert!(!services.repository().books.is_borrowed_by(&label, "S001"));

        let ops: Vec<OperationType> = services
            .repository()
            .loans
            .newest_first()
            .map(|t| t.operation)
            .collect();
        assert_eq!(ops, vec![OperationType::Return, OperationType::Borrow]);
    }

    #[test]
    fn test_penalty_boundary() {
        let mut services = library(accepting_storage());

        let first = services.process_loan("S001", "978-1", "01.03.2024").unwrap();
        let second = services.process_loan("S001", "978-1", "01.03.2024").unwrap();
        assert_ne!(first, second);

        let on_time = services.process_return("S001", &first, "16.03.2024").unwrap();
        assert_eq!(on_time.days_elapsed, 15);
        assert!(!on_time.penalty_applied);
        assert_eq!(score(&services), 100);

        let late = services.process_return("S001", &second, "17.03.2024").unwrap();
        assert_eq!(late.days_elapsed, 16);
        assert!(late.penalty_applied);
        assert_eq!(score(&services), 90);
    }

    #[test]
    fn test_early_return_date_has_no_penalty() {
        let mut services = library(accepting_storage());
        let label = services.process_loan("S001", "978-1", "10.01.2024").unwrap();

        let receipt = services.process_return("S001", &label, "01.01.2024").unwrap();
        assert_eq!(receipt.days_elapsed, -9);
        assert!(!receipt.penalty_applied);
        assert_eq!(score(&services), 100);
    }

    #[test]
    fn test_insufficient_score_changes_nothing() {
        let mut services = library(accepting_storage());
        services
            .update_student(
                "S001",
                UpdateStudent {
                    name: "Alan".into(),
                    surname: "Turing".into(),
                    score: 0,
                },
            )
            .unwrap();

        let err = services.process_loan("S001", "978-1", "01.01.2024").unwrap_err();
        assert!(matches!(err, AppError::InsufficientScore(_)));
        assert_eq!(err.code(), ErrorCode::InsufficientScore);
        assert_eq!(services.book("978-1").unwrap().available(), 2);
        assert!(services.repository().loans.is_empty());
    }

    #[test]
    fn test_loan_precondition_order() {
        let mut services = library(accepting_storage());

        assert!(matches!(
            services.process_loan("S404", "978-1", "1.1.2024"),
            Err(AppError::InvalidDate(_))
        ));
        assert!(matches!(
            services.process_loan("S404", "978-1", "01.01.2024"),
            Err(AppError::StudentNotFound(_))
        ));
        assert!(matches!(
            services.process_loan("S001", "404", "01.01.2024"),
            Err(AppError::NoCopiesAvailable(_))
        ));

        services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        assert!(matches!(
            services.process_loan("S001", "978-1", "01.01.2024"),
            Err(AppError::NoCopiesAvailable(_))
        ));
    }

    #[test]
    fn test_return_of_copy_not_held_changes_nothing() {
        let mut services = library(accepting_storage());

        let err = services
            .process_return("S001", "978-1_1", "05.01.2024")
            .unwrap_err();
        assert!(matches!(err, AppError::NotBorrowedByStudent { .. }));
        assert_eq!(score(&services), 100);
        assert!(services.repository().loans.is_empty());

        assert!(matches!(
            services.process_return("S404", "978-1_1", "05.01.2024"),
            Err(AppError::StudentNotFound(_))
        ));
        assert!(matches!(
            services.process_return("S001", "978-1_1", "5/1/2024"),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_return_without_ledger_entry() {
        let mut services = library(accepting_storage());
        services
            .repository
            .books
            .borrow("978-1_2", "S001")
            .unwrap();

        let err = services
            .process_return("S001", "978-1_2", "05.01.2024")
            .unwrap_err();
        assert!(matches!(err, AppError::LoanRecordMissing { .. }));
        assert!(services.repository().books.is_borrowed_by("978-1_2", "S001"));
    }

    #[test]
    fn test_workflow_persists_touched_stores_only() {
        let mut storage = MockStorage::new();
        storage.expect_save_students().times(2).returning(|_| Ok(()));
        storage.expect_save_books().times(1).returning(|_| Ok(()));
        storage.expect_save_copies().times(3).returning(|_| Ok(()));
        storage.expect_save_loans().times(2).returning(|_| Ok(()));

        let mut services = library(storage);
        let label = services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        services.process_return("S001", &label, "02.01.2024").unwrap();
    }

    #[test]
    fn test_non_returned_lists_holders() {
        let mut services = library(accepting_storage());
        assert!(services.non_returned().is_empty());

        let label = services.process_loan("S001", "978-1", "01.01.2024").unwrap();
        let open = services.non_returned();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].0.student_id, "S001");
        assert_eq!(open[0].1.title, "Dune");
        assert_eq!(open[0].2.label, label);
    }
}
