//! Student store

use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::Student,
};

/// Students kept in ascending student id order
#[derive(Debug, Clone, Default)]
pub struct StudentsRepository {
    students: BTreeMap<String, Student>,
}

impl StudentsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a student. Ids are unique; a second add with the same id is a conflict.
    pub fn add(&mut self, student_id: &str, name: &str, surname: &str, score: i32) -> AppResult<Student> {
        if self.students.contains_key(student_id) {
            return Err(AppError::Conflict(format!(
                "Student with id {} already exists",
                student_id
            )));
        }
        let student = Student::new(student_id, name, surname, score);
        self.students.insert(student_id.to_string(), student.clone());
        Ok(student)
    }

    pub fn delete(&mut self, student_id: &str) -> bool {
        self.students.remove(student_id).is_some()
    }

    pub fn update(&mut self, student_id: &str, name: &str, surname: &str, score: i32) -> bool {
        match self.students.get_mut(student_id) {
            Some(student) => {
                student.name = name.to_string();
                student.surname = surname.to_string();
                student.score = score;
                true
            }
            None => false,
        }
    }

    /// Add `delta` to the score; unknown ids are ignored
    pub fn adjust_score(&mut self, student_id: &str, delta: i32) {
        if let Some(student) = self.students.get_mut(student_id) {
            student.score = student.score.saturating_add(delta);
        }
    }

    pub fn exists(&self, student_id: &str) -> bool {
        self.students.contains_key(student_id)
    }

    pub fn has_positive_score(&self, student_id: &str) -> bool {
        self.students
            .get(student_id)
            .map(Student::can_borrow)
            .unwrap_or(false)
    }

    pub fn get(&self, student_id: &str) -> Option<&Student> {
        self.students.get(student_id)
    }

    pub fn list(&self) -> Vec<&Student> {
        self.students.values().collect()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
