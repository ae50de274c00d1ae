//! Enumerated field values shared by test cases and defects
//!
//! Every value is a single capitalized word ("High", "Closed"). Values are
//! stored and displayed in that form and parsed case-insensitively.

use serde::{Deserialize, Serialize};

/// Severity of a defect, or impact class of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn all() -> &'static [Severity] {
        &[
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ]
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Scheduling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn all() -> &'static [Priority] {
        &[
            Priority::Critical,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ]
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Effort class of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
        }
    }

    pub fn all() -> &'static [Complexity] {
        &[Complexity::Low, Complexity::Medium, Complexity::High]
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Complexity::Low),
            "medium" => Ok(Complexity::Medium),
            "high" => Ok(Complexity::High),
            _ => Err(format!("Unknown complexity: {}", s)),
        }
    }
}

/// Lifecycle of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TestCaseStatus {
    Draft,
    Ready,
    Active,
    Deprecated,
}

impl TestCaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestCaseStatus::Draft => "Draft",
            TestCaseStatus::Ready => "Ready",
            TestCaseStatus::Active => "Active",
            TestCaseStatus::Deprecated => "Deprecated",
        }
    }

    pub fn all() -> &'static [TestCaseStatus] {
        &[
            TestCaseStatus::Draft,
            TestCaseStatus::Ready,
            TestCaseStatus::Active,
            TestCaseStatus::Deprecated,
        ]
    }
}

impl std::fmt::Display for TestCaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TestCaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(TestCaseStatus::Draft),
            "ready" => Ok(TestCaseStatus::Ready),
            "active" => Ok(TestCaseStatus::Active),
            "deprecated" => Ok(TestCaseStatus::Deprecated),
            _ => Err(format!("Unknown test case status: {}", s)),
        }
    }
}

/// Lifecycle of a defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DefectStatus {
    New,
    Open,
    Assigned,
    Fixed,
    Retest,
    Reopened,
    Closed,
    Rejected,
    Deferred,
}

impl DefectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectStatus::New => "New",
            DefectStatus::Open => "Open",
            DefectStatus::Assigned => "Assigned",
            DefectStatus::Fixed => "Fixed",
            DefectStatus::Retest => "Retest",
            DefectStatus::Reopened => "Reopened",
            DefectStatus::Closed => "Closed",
            DefectStatus::Rejected => "Rejected",
            DefectStatus::Deferred => "Deferred",
        }
    }

    pub fn all() -> &'static [DefectStatus] {
        &[
            DefectStatus::New,
            DefectStatus::Open,
            DefectStatus::Assigned,
            DefectStatus::Fixed,
            DefectStatus::Retest,
            DefectStatus::Reopened,
            DefectStatus::Closed,
            DefectStatus::Rejected,
            DefectStatus::Deferred,
        ]
    }
}

impl std::fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DefectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(DefectStatus::New),
            "open" => Ok(DefectStatus::Open),
            "assigned" => Ok(DefectStatus::Assigned),
            "fixed" => Ok(DefectStatus::Fixed),
            "retest" => Ok(DefectStatus::Retest),
            "reopened" => Ok(DefectStatus::Reopened),
            "closed" => Ok(DefectStatus::Closed),
            "rejected" => Ok(DefectStatus::Rejected),
            "deferred" => Ok(DefectStatus::Deferred),
            _ => Err(format!("Unknown defect status: {}", s)),
        }
    }
}
