//! Entity type definitions
//!
//! QAT stores the following entity types:
//!
//! **Reference data** (looked up during import, never written by it):
//! - [`Project`] - Top-level grouping identified by id, code or name
//! - [`User`] - Assignees, reporters and authors, identified by id or email
//! - [`ParentFile`] - Named test case file or defect file inside a project
//!
//! **Records** (created or updated by import, keyed by project + code):
//! - [`TestCase`] - Test case with steps, expectations and embedded test data
//! - [`Defect`] - Defect report with reproduction details and embedded input data

pub mod defect;
pub mod file;
pub mod project;
pub mod test_case;
pub mod user;

pub use defect::{Defect, DefectDraft};
pub use file::ParentFile;
pub use project::Project;
pub use test_case::{TestCase, TestCaseDraft};
pub use user::User;

use serde::{Deserialize, Serialize};

/// The two record kinds that can be imported and exported
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Test cases, grouped by test case files
    TestCase,
    /// Defects, grouped by defect files
    Defect,
}

impl EntityKind {
    /// Stable identifier used in audit entries and CLI arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::TestCase => "test-case",
            EntityKind::Defect => "defect",
        }
    }

    /// Human-readable plural, for messages
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::TestCase => "test cases",
            EntityKind::Defect => "defects",
        }
    }

    /// Column holding the external code half of the natural key
    pub fn code_column(&self) -> &'static str {
        match self {
            EntityKind::TestCase => "testCaseIdCode",
            EntityKind::Defect => "defectIdCode",
        }
    }

    /// Column referencing the parent file by id
    pub fn file_id_column(&self) -> &'static str {
        match self {
            EntityKind::TestCase => "testCaseFileId",
            EntityKind::Defect => "defectFileId",
        }
    }

    /// Column referencing the parent file by name
    pub fn file_name_column(&self) -> &'static str {
        match self {
            EntityKind::TestCase => "testCaseFileName",
            EntityKind::Defect => "defectFileName",
        }
    }

    /// Label for the parent file in row errors ("Test case file 3 not found")
    pub fn file_label(&self) -> &'static str {
        match self {
            EntityKind::TestCase => "Test case file",
            EntityKind::Defect => "Defect file",
        }
    }

    /// Table holding this kind's parent files
    pub fn files_table(&self) -> &'static str {
        match self {
            EntityKind::TestCase => "test_case_files",
            EntityKind::Defect => "defect_files",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
