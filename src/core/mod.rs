//! Core module - workspace, configuration, storage and shared field types

pub mod config;
pub mod entity;
pub mod store;
pub mod workspace;

pub use config::Config;
pub use entity::{Complexity, DefectStatus, Priority, Severity, TestCaseStatus};
pub use store::{
    format_timestamp, AuditEntry, ReferenceSource, Store, StoreError, TargetFilter,
    TargetRepository,
};
pub use workspace::{Workspace, WorkspaceError};
