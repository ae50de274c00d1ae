//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{Store, StoreError, SCHEMA_VERSION};

impl Store {
    /// Create tables if missing and record the schema version
    pub(super) fn init_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);",
        )?;

        let found: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();

        if let Some(found) = found {
            if found > SCHEMA_VERSION {
                return Err(StoreError::UnsupportedSchema {
                    found,
                    supported: SCHEMA_VERSION,
                });
            }
        }

        self.conn.execute_batch(
            r#"
            -- Reference data
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS test_case_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                name TEXT NOT NULL COLLATE NOCASE,
                created_at TEXT NOT NULL,
                UNIQUE (project_id, name)
            );

            CREATE TABLE IF NOT EXISTS defect_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                name TEXT NOT NULL COLLATE NOCASE,
                created_at TEXT NOT NULL,
                UNIQUE (project_id, name)
            );

            -- Records, unique by natural key (project_id, external code)
            CREATE TABLE IF NOT EXISTS test_cases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                test_case_id_code TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                module TEXT,
                preconditions TEXT,
                steps TEXT,
                expected_result TEXT,
                priority TEXT,
                severity TEXT,
                complexity TEXT,
                status TEXT,
                estimated_minutes INTEGER,
                test_data TEXT,
                file_id INTEGER REFERENCES test_case_files(id) ON DELETE SET NULL,
                author_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                created_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (project_id, test_case_id_code)
            );
            CREATE INDEX IF NOT EXISTS idx_test_cases_file ON test_cases(file_id);
            CREATE INDEX IF NOT EXISTS idx_test_cases_status ON test_cases(status);

            CREATE TABLE IF NOT EXISTS defects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                defect_id_code TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                module TEXT,
                steps_to_reproduce TEXT,
                expected_result TEXT,
                actual_result TEXT,
                environment TEXT,
                severity TEXT,
                priority TEXT,
                status TEXT,
                test_case_id_code TEXT,
                input_data TEXT,
                file_id INTEGER REFERENCES defect_files(id) ON DELETE SET NULL,
                assigned_to_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                reported_by_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                reported_date TEXT,
                due_date TEXT,
                resolved_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (project_id, defect_id_code)
            );
            CREATE INDEX IF NOT EXISTS idx_defects_file ON defects(file_id);
            CREATE INDEX IF NOT EXISTS idx_defects_status ON defects(status);
            CREATE INDEX IF NOT EXISTS idx_defects_severity ON defects(severity);

            -- Audit trail
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                actor TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_kind TEXT NOT NULL,
                entity_id INTEGER,
                detail TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_audit_created ON audit_log(created_at);
            "#,
        )?;

        if found != Some(SCHEMA_VERSION) {
            self.conn.execute(
                "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
        }

        Ok(())
    }
}
