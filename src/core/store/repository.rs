//! Repository traits consumed by the import reconciler

use super::{Store, StoreError};
use crate::entities::{DefectDraft, EntityKind, ParentFile, Project, TestCaseDraft, User};

/// Read access to the reference data an import resolves against
pub trait ReferenceSource {
    fn projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Parent files of one kind across all projects
    fn parent_files(&self, kind: EntityKind) -> Result<Vec<ParentFile>, StoreError>;

    fn users(&self) -> Result<Vec<User>, StoreError>;
}

/// Natural-key lookup and writes for imported records
pub trait TargetRepository {
    fn find_test_case(&self, project_id: i64, code: &str) -> Result<Option<i64>, StoreError>;
    fn create_test_case(&mut self, draft: &TestCaseDraft) -> Result<i64, StoreError>;
    fn update_test_case(&mut self, id: i64, draft: &TestCaseDraft) -> Result<(), StoreError>;

    fn find_defect(&self, project_id: i64, code: &str) -> Result<Option<i64>, StoreError>;
    fn create_defect(&mut self, draft: &DefectDraft) -> Result<i64, StoreError>;
    fn update_defect(&mut self, id: i64, draft: &DefectDraft) -> Result<(), StoreError>;
}

impl ReferenceSource for Store {
    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        self.list_projects()
    }

    fn parent_files(&self, kind: EntityKind) -> Result<Vec<ParentFile>, StoreError> {
        self.list_parent_files(kind, None)
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        self.list_users()
    }
}

impl TargetRepository for Store {
    fn find_test_case(&self, project_id: i64, code: &str) -> Result<Option<i64>, StoreError> {
        self.find_test_case_id(project_id, code)
    }

    fn create_test_case(&mut self, draft: &TestCaseDraft) -> Result<i64, StoreError> {
        self.insert_test_case(draft)
    }

    fn update_test_case(&mut self, id: i64, draft: &TestCaseDraft) -> Result<(), StoreError> {
        Store::update_test_case(self, id, draft)
    }

    fn find_defect(&self, project_id: i64, code: &str) -> Result<Option<i64>, StoreError> {
        self.find_defect_id(project_id, code)
    }

    fn create_defect(&mut self, draft: &DefectDraft) -> Result<i64, StoreError> {
        self.insert_defect(draft)
    }

    fn update_defect(&mut self, id: i64, draft: &DefectDraft) -> Result<(), StoreError> {
        Store::update_defect(self, id, draft)
    }
}
