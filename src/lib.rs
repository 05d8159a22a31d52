//! Library Desk
//!
//! A single-user library management console: authors, students, books with
//! numbered copies, and a borrow/return ledger with late-return penalties.
//! Every store is kept in memory and mirrored to comma-separated files.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod shell;
pub mod storage;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
