//! Reference data: projects, users and parent files

use rusqlite::{params, Row};

use super::{format_timestamp, now, parse_datetime, Store, StoreError};
use crate::entities::{EntityKind, ParentFile, Project, User};

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(row, 4)?,
    })
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_datetime(row, 3)?,
    })
}

impl Store {
    /// Insert a project; fails on a duplicate code
    pub fn create_project(
        &mut self,
        code: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, StoreError> {
        let created_at = now();
        self.conn.execute(
            "INSERT INTO projects (code, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![code, name, description, format_timestamp(&created_at)],
        )?;

        Ok(Project {
            id: self.conn.last_insert_rowid(),
            code: code.to_string(),
            name: name.to_string(),
            description: description.map(String::from),
            created_at,
        })
    }

    /// All projects, oldest first
    pub fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, name, description, created_at FROM projects ORDER BY id",
        )?;
        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Insert a user; fails on a duplicate email (case-insensitive)
    pub fn create_user(&mut self, email: &str, name: Option<&str>) -> Result<User, StoreError> {
        let created_at = now();
        self.conn.execute(
            "INSERT INTO users (email, name, created_at) VALUES (?1, ?2, ?3)",
            params![email, name, format_timestamp(&created_at)],
        )?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            email: email.to_string(),
            name: name.map(String::from),
            created_at,
        })
    }

    /// All users, oldest first
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, email, name, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Insert a parent file into a project; names are unique per project and kind
    pub fn create_parent_file(
        &mut self,
        kind: EntityKind,
        project_id: i64,
        name: &str,
    ) -> Result<ParentFile, StoreError> {
        let created_at = now();
        self.conn.execute(
            &format!(
                "INSERT INTO {} (project_id, name, created_at) VALUES (?1, ?2, ?3)",
                kind.files_table()
            ),
            params![project_id, name, format_timestamp(&created_at)],
        )?;

        Ok(ParentFile {
            id: self.conn.last_insert_rowid(),
            kind,
            name: name.to_string(),
            project_id,
            created_at,
        })
    }

    /// Parent files of one kind, optionally restricted to a project
    pub fn list_parent_files(
        &self,
        kind: EntityKind,
        project_id: Option<i64>,
    ) -> Result<Vec<ParentFile>, StoreError> {
        let mut sql = format!(
            "SELECT id, name, project_id, created_at FROM {}",
            kind.files_table()
        );
        if project_id.is_some() {
            sql.push_str(" WHERE project_id = ?1");
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let map_row = |row: &Row| -> rusqlite::Result<ParentFile> {
            Ok(ParentFile {
                id: row.get(0)?,
                kind,
                name: row.get(1)?,
                project_id: row.get(2)?,
                created_at: parse_datetime(row, 3)?,
            })
        };

        let files = match project_id {
            Some(project_id) => stmt
                .query_map(params![project_id], map_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?,
        };
        Ok(files)
    }
}
