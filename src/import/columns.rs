//! Column names recognized in import files
//!
//! Names are exact, case-sensitive matches against the header row.

use crate::entities::EntityKind;

// Reference columns, shared by both kinds
pub const PROJECT_ID: &str = "projectId";
pub const PROJECT_CODE: &str = "projectCode";
pub const PROJECT_NAME: &str = "projectName";

// Shared record columns
pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const MODULE: &str = "module";
pub const EXPECTED_RESULT: &str = "expectedResult";
pub const PRIORITY: &str = "priority";
pub const SEVERITY: &str = "severity";
pub const STATUS: &str = "status";

// Test case columns
pub const TEST_CASE_ID_CODE: &str = "testCaseIdCode";
pub const PRECONDITIONS: &str = "preconditions";
pub const STEPS: &str = "steps";
pub const COMPLEXITY: &str = "complexity";
pub const ESTIMATED_MINUTES: &str = "estimatedMinutes";
pub const TEST_DATA: &str = "testData";
pub const TEST_CASE_FILE_ID: &str = "testCaseFileId";
pub const TEST_CASE_FILE_NAME: &str = "testCaseFileName";
pub const AUTHOR: &str = "author";
pub const CREATED_DATE: &str = "createdDate";

// Defect columns
pub const DEFECT_ID_CODE: &str = "defectIdCode";
pub const STEPS_TO_REPRODUCE: &str = "stepsToReproduce";
pub const ACTUAL_RESULT: &str = "actualResult";
pub const ENVIRONMENT: &str = "environment";
pub const INPUT_DATA: &str = "inputData";
pub const DEFECT_FILE_ID: &str = "defectFileId";
pub const DEFECT_FILE_NAME: &str = "defectFileName";
pub const ASSIGNED_TO: &str = "assignedTo";
pub const REPORTED_BY: &str = "reportedBy";
pub const REPORTED_DATE: &str = "reportedDate";
pub const DUE_DATE: &str = "dueDate";
pub const RESOLVED_DATE: &str = "resolvedDate";

/// Columns written by export and by `--template`
///
/// Projects are referenced by code, files by name and users by email, so an
/// exported file re-imports into any workspace holding the same reference
/// data. Import additionally accepts `projectId`, `projectName` and the
/// parent file id column.
pub fn template_columns(kind: EntityKind) -> Vec<&'static str> {
    match kind {
        EntityKind::TestCase => vec![
            PROJECT_CODE,
            TEST_CASE_ID_CODE,
            TITLE,
            DESCRIPTION,
            MODULE,
            PRECONDITIONS,
            STEPS,
            EXPECTED_RESULT,
            PRIORITY,
            SEVERITY,
            COMPLEXITY,
            STATUS,
            ESTIMATED_MINUTES,
            TEST_DATA,
            TEST_CASE_FILE_NAME,
            AUTHOR,
            CREATED_DATE,
        ],
        EntityKind::Defect => vec![
            PROJECT_CODE,
            DEFECT_ID_CODE,
            TITLE,
            DESCRIPTION,
            MODULE,
            STEPS_TO_REPRODUCE,
            EXPECTED_RESULT,
            ACTUAL_RESULT,
            ENVIRONMENT,
            SEVERITY,
            PRIORITY,
            STATUS,
            TEST_CASE_ID_CODE,
            INPUT_DATA,
            DEFECT_FILE_NAME,
            ASSIGNED_TO,
            REPORTED_BY,
            REPORTED_DATE,
            DUE_DATE,
            RESOLVED_DATE,
        ],
    }
}

/// Example row matching [`template_columns`]
pub fn example_row(kind: EntityKind) -> Vec<&'static str> {
    match kind {
        EntityKind::TestCase => vec![
            "WEB",
            "TC-001",
            "Login with valid credentials",
            "User can sign in with email and password",
            "Authentication",
            "User account exists",
            "1. Open login page\n2. Enter credentials\n3. Submit",
            "Dashboard is shown",
            "High",
            "Medium",
            "Low",
            "Ready",
            "10",
            r#"{"email": "qa@example.com"}"#,
            "Smoke Suite",
            "qa@example.com",
            "2024-01-15",
        ],
        EntityKind::Defect => vec![
            "WEB",
            "BUG-001",
            "Login button unresponsive",
            "Clicking login does nothing on Safari",
            "Authentication",
            "1. Open login page in Safari\n2. Click login",
            "User is signed in",
            "Nothing happens",
            "Safari 17 / macOS",
            "High",
            "High",
            "Open",
            "TC-001",
            r#"{"browser": "safari"}"#,
            "Sprint 12",
            "dev@example.com",
            "qa@example.com",
            "2024-01-16",
            "2024-01-30",
            "",
        ],
    }
}
