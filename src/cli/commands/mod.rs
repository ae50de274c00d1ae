//! CLI command implementations

pub mod audit;
pub mod completions;
pub mod config;
pub mod defect;
pub mod export;
pub mod file;
pub mod import;
pub mod init;
pub mod project;
pub mod test_case;
pub mod user;
