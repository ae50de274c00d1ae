//! Per-run reference index
//!
//! A read-only snapshot of projects, parent files and users, built once at
//! the start of an import and dropped when it ends.

use std::collections::HashMap;

use crate::core::{ReferenceSource, StoreError};
use crate::entities::{EntityKind, ParentFile, Project, User};

/// Lookup tables for resolving row references
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    projects: Vec<Project>,
    project_by_id: HashMap<i64, usize>,
    project_by_code: HashMap<String, usize>,
    project_by_name: HashMap<String, usize>,

    files: Vec<ParentFile>,
    file_by_id: HashMap<i64, usize>,
    file_by_project_and_name: HashMap<(i64, String), usize>,

    users: Vec<User>,
    user_by_id: HashMap<i64, usize>,
    user_by_email: HashMap<String, usize>,
}

impl ReferenceIndex {
    /// Load every reference table from the store
    ///
    /// Parent files are loaded for `kind` only.
    pub fn build<S: ReferenceSource + ?Sized>(
        source: &S,
        kind: EntityKind,
    ) -> Result<Self, StoreError> {
        let index = Self::from_parts(
            source.projects()?,
            source.parent_files(kind)?,
            source.users()?,
        );
        tracing::debug!(
            kind = %kind,
            projects = index.projects.len(),
            files = index.files.len(),
            users = index.users.len(),
            "built reference index"
        );
        Ok(index)
    }

    /// Index already-loaded reference data
    pub fn from_parts(projects: Vec<Project>, files: Vec<ParentFile>, users: Vec<User>) -> Self {
        let mut index = Self::default();

        for (i, project) in projects.iter().enumerate() {
            index.project_by_id.entry(project.id).or_insert(i);
            index
                .project_by_code
                .entry(project.code.to_lowercase())
                .or_insert(i);
            index
                .project_by_name
                .entry(project.name.to_lowercase())
                .or_insert(i);
        }

        for (i, file) in files.iter().enumerate() {
            index.file_by_id.entry(file.id).or_insert(i);
            index
                .file_by_project_and_name
                .entry((file.project_id, file.name.to_lowercase()))
                .or_insert(i);
        }

        for (i, user) in users.iter().enumerate() {
            index.user_by_id.entry(user.id).or_insert(i);
            index
                .user_by_email
                .entry(user.email.to_lowercase())
                .or_insert(i);
        }

        index.projects = projects;
        index.files = files;
        index.users = users;
        index
    }

    /// Resolve a project reference: numeric id, then code, then name
    pub fn project(&self, reference: &str) -> Option<&Project> {
        let reference = reference.trim();
        if let Some(project) = reference.parse::<i64>().ok().and_then(|id| self.project_by_id(id)) {
            return Some(project);
        }

        let key = reference.to_lowercase();
        self.project_by_code
            .get(&key)
            .or_else(|| self.project_by_name.get(&key))
            .map(|&i| &self.projects[i])
    }

    pub fn project_by_id(&self, id: i64) -> Option<&Project> {
        self.project_by_id.get(&id).map(|&i| &self.projects[i])
    }

    pub fn file_by_id(&self, id: i64) -> Option<&ParentFile> {
        self.file_by_id.get(&id).map(|&i| &self.files[i])
    }

    /// Parent file by name, scoped to one project
    pub fn file_by_name(&self, project_id: i64, name: &str) -> Option<&ParentFile> {
        self.file_by_project_and_name
            .get(&(project_id, name.trim().to_lowercase()))
            .map(|&i| &self.files[i])
    }

    /// Resolve a user reference: numeric id, then email
    pub fn user(&self, reference: &str) -> Option<&User> {
        let reference = reference.trim();
        if let Some(user) = reference.parse::<i64>().ok().and_then(|id| self.user_by_id(id)) {
            return Some(user);
        }
        self.user_by_email
            .get(&reference.to_lowercase())
            .map(|&i| &self.users[i])
    }

    pub fn user_by_id(&self, id: i64) -> Option<&User> {
        self.user_by_id.get(&id).map(|&i| &self.users[i])
    }
}
