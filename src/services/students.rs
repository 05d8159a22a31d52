//! Student management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{ensure_plain_fields, CreateStudent, LoanTransaction, Student, UpdateStudent},
    storage::Storage,
};

use super::Services;

impl<S: Storage> Services<S> {
    /// Register a student with the configured starting score
    pub fn add_student(&mut self, input: CreateStudent) -> AppResult<Student> {
        input.validate()?;
        ensure_plain_fields(&[&input.student_id, &input.name, &input.surname])?;

        let student = self.repository.students.add(
            &input.student_id,
            &input.name,
            &input.surname,
            self.loan_config.initial_score,
        )?;
        tracing::info!("Added student {}", student.student_id);

        self.persist("students", |s, r| s.save_students(&r.students));
        Ok(student)
    }

    pub fn update_student(&mut self, student_id: &str, input: UpdateStudent) -> AppResult<Student> {
        input.validate()?;
        ensure_plain_fields(&[&input.name, &input.surname])?;

        if !self
            .repository
            .students
            .update(student_id, &input.name, &input.surname, input.score)
        {
            return Err(AppError::StudentNotFound(student_id.to_string()));
        }
        self.persist("students", |s, r| s.save_students(&r.students));
        self.student(student_id).cloned()
    }

    /// Delete a student. Students still holding copies are kept.
    pub fn delete_student(&mut self, student_id: &str) -> AppResult<()> {
        if !self.repository.students.exists(student_id) {
            return Err(AppError::StudentNotFound(student_id.to_string()));
        }
        let held = self.repository.books.borrowed_by(student_id).len();
        if held > 0 {
            return Err(AppError::BusinessRule(format!(
                "Student {} still holds {} borrowed cop{}",
                student_id,
                held,
                if held == 1 { "y" } else { "ies" }
            )));
        }

        self.repository.students.delete(student_id);
        tracing::info!("Deleted student {}", student_id);

        self.persist("students", |s, r| s.save_students(&r.students));
        Ok(())
    }

    pub fn student(&self, student_id: &str) -> AppResult<&Student> {
        self.repository
            .students
            .get(student_id)
            .ok_or_else(|| AppError::StudentNotFound(student_id.to_string()))
    }

    pub fn list_students(&self) -> Vec<&Student> {
        self.repository.students.list()
    }

    /// Ledger entries of one student, newest first
    pub fn student_history(&self, student_id: &str) -> AppResult<Vec<&LoanTransaction>> {
        self.student(student_id)?;
        Ok(self.repository.loans.for_student(student_id))
    }
}
