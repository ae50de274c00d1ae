//! QAT: QA Tracker
//!
//! Projects, test cases and defects in a local SQLite database, with a
//! bulk spreadsheet import that reconciles rows against existing records
//! by natural key.

pub mod cli;
pub mod core;
pub mod entities;
pub mod export;
pub mod import;
