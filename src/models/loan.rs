//! Loan ledger model and the DD.MM.YYYY date type used by it

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

static DATE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid date regex"));

/// Calendar date written as `DD.MM.YYYY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoanDate(NaiveDate);

impl LoanDate {
    /// Signed number of calendar days from `self` to `later`
    pub fn days_until(&self, later: LoanDate) -> i64 {
        (later.0 - self.0).num_days()
    }
}

impl FromStr for LoanDate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !DATE_FORMAT.is_match(s) {
            return Err(AppError::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%d.%m.%Y")
            .map(Self)
            .map_err(|_| AppError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for LoanDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d.%m.%Y"))
    }
}

/// Ledger operation codes (0 = borrow, 1 = return on disk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperationType {
    Borrow = 0,
    Return = 1,
}

impl TryFrom<u8> for OperationType {
    type Error = AppError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(OperationType::Borrow),
            1 => Ok(OperationType::Return),
            other => Err(AppError::Parse(format!("unknown operation type {}", other))),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Borrow => write!(f, "BORROW"),
            OperationType::Return => write!(f, "RETURN"),
        }
    }
}

/// Immutable ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTransaction {
    pub student_id: String,
    pub label: String,
    pub operation: OperationType,
    pub date: LoanDate,
}

impl LoanTransaction {
    pub fn borrow(student_id: &str, label: &str, date: LoanDate) -> Self {
        Self {
            student_id: student_id.to_string(),
            label: label.to_string(),
            operation: OperationType::Borrow,
            date,
        }
    }

    pub fn returned(student_id: &str, label: &str, date: LoanDate) -> Self {
        Self {
            student_id: student_id.to_string(),
            label: label.to_string(),
            operation: OperationType::Return,
            date,
        }
    }
}

/// Outcome of a successful return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub label: String,
    pub days_elapsed: i64,
    pub penalty_applied: bool,
}
