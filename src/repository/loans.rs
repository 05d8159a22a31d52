//! Loan ledger (append-only)

use crate::models::{LoanTransaction, OperationType};

/// Chronological ledger; kept oldest-first in memory and written newest-first
#[derive(Debug, Clone, Default)]
pub struct LoansRepository {
    transactions: Vec<LoanTransaction>,
}

impl LoansRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from transactions listed newest-first, as stored on disk
    pub fn from_newest_first(mut transactions: Vec<LoanTransaction>) -> Self {
        transactions.reverse();
        Self { transactions }
    }

    pub fn append(&mut self, transaction: LoanTransaction) {
        self.transactions.push(transaction);
    }

    /// Most recently appended BORROW for this student and copy
    pub fn latest_borrow(&self, student_id: &str, label: &str) -> Option<&LoanTransaction> {
        self.newest_first().find(|t| {
            t.operation == OperationType::Borrow && t.student_id == student_id && t.label == label
        })
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &LoanTransaction> {
        self.transactions.iter().rev()
    }

    /// History of one student, newest first
    pub fn for_student(&self, student_id: &str) -> Vec<&LoanTransaction> {
        self.newest_first()
            .filter(|t| t.student_id == student_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
