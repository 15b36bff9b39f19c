use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, TrackerError};
use crate::models::{NewProject, NewTask, Project, Task, TaskUpdate};

/// Database handle
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open or create the database file at `path`.
    ///
    /// Foreign-key enforcement is on for the connection: inserting a
    /// task with a dangling `project_id` fails with a constraint error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        tracing::debug!(path = %path.display(), "opening database");
        let conn = Connection::open(&path).map_err(|source| TrackerError::Connection {
            path: path.clone(),
            source,
        })?;
        Self::with_conn(conn, path)
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| TrackerError::Connection {
            path: path.clone(),
            source,
        })?;
        Self::with_conn(conn, path)
    }

    fn with_conn(conn: Connection, path: PathBuf) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|source| TrackerError::Connection {
                path: path.clone(),
                source,
            })?;
        Ok(Database { conn, path })
    }

    /// Idempotently create the `projects` and `tasks` tables.
    ///
    /// No-op if both tables already exist.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS projects (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    start_date TEXT,
                    end_date TEXT
                )",
                [],
            )
            .map_err(TrackerError::Schema)?;

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    project_id INTEGER NOT NULL,
                    name VARCHAR(250) NOT NULL,
                    description TEXT,
                    status VARCHAR(15) NOT NULL,
                    start_date TEXT NOT NULL,
                    end_date TEXT NOT NULL,
                    FOREIGN KEY (project_id) REFERENCES projects (id)
                )",
                [],
            )
            .map_err(TrackerError::Schema)?;

        tracing::debug!("schema ensured");
        Ok(())
    }

    // ==================== Project Operations ====================

    /// Insert a project and return its assigned id.
    pub fn insert_project(&self, project: &NewProject) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO projects (name, start_date, end_date) VALUES (?1, ?2, ?3)",
                params![project.name, project.start_date, project.end_date],
            )
            .map_err(classify)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All rows of the projects table.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, start_date, end_date FROM projects")
            .map_err(classify)?;
        let rows = stmt.query_map([], project_from_row).map_err(classify)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(classify)
    }

    // ==================== Task Operations ====================

    /// Insert a task and return its assigned id.
    pub fn insert_task(&self, task: &NewTask) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO tasks (project_id, name, description, status, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    task.project_id,
                    task.name,
                    task.description,
                    task.status,
                    task.start_date,
                    task.end_date
                ],
            )
            .map_err(classify)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Read a single task, `None` if the id matches no row.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        self.conn
            .query_row(
                "SELECT id, project_id, name, description, status, start_date, end_date
                 FROM tasks WHERE id = ?1",
                [id],
                task_from_row,
            )
            .optional()
            .map_err(classify)
    }

    /// All rows of the tasks table, in natural storage order.
    ///
    /// Callers must not assume any ordering.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, project_id, name, description, status, start_date, end_date
                 FROM tasks",
            )
            .map_err(classify)?;
        let rows = stmt.query_map([], task_from_row).map_err(classify)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(classify)
    }

    /// Update the five mutable fields of the task matching `id`.
    ///
    /// Returns the affected-row count: 0 when the id matches no row,
    /// which is not an error. Callers wanting confirmation check the
    /// count.
    pub fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<usize> {
        self.conn
            .execute(
                "UPDATE tasks
                 SET name = ?1, description = ?2, status = ?3, start_date = ?4, end_date = ?5
                 WHERE id = ?6",
                params![
                    update.name,
                    update.description,
                    update.status,
                    update.start_date,
                    update.end_date,
                    id
                ],
            )
            .map_err(classify)
    }

    /// Delete the task matching `id`.
    ///
    /// Same affected-count contract as [`update_task`](Self::update_task).
    pub fn delete_task(&self, id: i64) -> Result<usize> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", [id])
            .map_err(classify)
    }

    /// Close the handle, releasing the underlying connection.
    ///
    /// Dropping a `Database` also releases it; this form surfaces a
    /// close failure instead of discarding it.
    pub fn close(self) -> Result<()> {
        let Database { conn, path } = self;
        conn.close()
            .map_err(|(_, source)| TrackerError::Connection { path, source })
    }
}

/// Sort a statement failure into the constraint or pass-through bucket.
fn classify(err: rusqlite::Error) -> TrackerError {
    let constraint = matches!(
        &err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    );
    if constraint {
        TrackerError::Constraint(err)
    } else {
        TrackerError::Statement(err)
    }
}

// ==================== Row Parsers ====================

fn project_from_row(row: &Row) -> std::result::Result<Project, rusqlite::Error> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
    })
}

fn task_from_row(row: &Row) -> std::result::Result<Task, rusqlite::Error> {
    Ok(Task {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.ensure_schema().unwrap();
        db
    }

    fn cool_project() -> NewProject {
        NewProject {
            name: "Cool Project".to_string(),
            start_date: Some(day(2020, 1, 1)),
            end_date: Some(day(2020, 12, 31)),
        }
    }

    fn analysis_task(project_id: i64) -> NewTask {
        NewTask {
            project_id,
            name: "Analysis".to_string(),
            description: Some("Data analysis".to_string()),
            status: "started".to_string(),
            start_date: day(2020, 1, 5),
            end_date: day(2020, 1, 10),
        }
    }

    #[test]
    fn insert_project_returns_increasing_ids() {
        let db = setup();
        let first = db.insert_project(&cool_project()).unwrap();
        let second = db
            .insert_project(&NewProject {
                name: "Another".to_string(),
                start_date: None,
                end_date: None,
            })
            .unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn inserted_task_round_trips_through_list() {
        let db = setup();
        let project_id = db.insert_project(&cool_project()).unwrap();
        let new = analysis_task(project_id);
        let id = db.insert_task(&new).unwrap();

        let tasks = db.list_tasks().unwrap();
        let matching: Vec<_> = tasks.iter().filter(|t| t.id == id).collect();
        assert_eq!(matching.len(), 1);

        let task = matching[0];
        assert_eq!(task.project_id, project_id);
        assert_eq!(task.name, new.name);
        assert_eq!(task.description, new.description);
        assert_eq!(task.status, new.status);
        assert_eq!(task.start_date, new.start_date);
        assert_eq!(task.end_date, new.end_date);
    }

    #[test]
    fn project_dates_may_be_absent() {
        let db = setup();
        let id = db
            .insert_project(&NewProject {
                name: "Dateless".to_string(),
                start_date: None,
                end_date: None,
            })
            .unwrap();

        let projects = db.list_projects().unwrap();
        let project = projects.iter().find(|p| p.id == id).unwrap();
        assert_eq!(project.name, "Dateless");
        assert_eq!(project.start_date, None);
        assert_eq!(project.end_date, None);
    }

    #[test]
    fn update_changes_only_mutable_fields() {
        let db = setup();
        let project_id = db.insert_project(&cool_project()).unwrap();
        let id = db.insert_task(&analysis_task(project_id)).unwrap();

        let affected = db
            .update_task(
                id,
                &TaskUpdate {
                    name: "Design".to_string(),
                    description: Some("UI/UX Design".to_string()),
                    status: "completed".to_string(),
                    start_date: day(2020, 1, 15),
                    end_date: day(2020, 1, 20),
                },
            )
            .unwrap();
        assert_eq!(affected, 1);

        let task = db.get_task(id).unwrap().unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.project_id, project_id);
        assert_eq!(task.name, "Design");
        assert_eq!(task.description.as_deref(), Some("UI/UX Design"));
        assert_eq!(task.status, "completed");
        assert_eq!(task.start_date, day(2020, 1, 15));
        assert_eq!(task.end_date, day(2020, 1, 20));
    }

    #[test]
    fn update_on_missing_id_is_a_silent_miss() {
        let db = setup();
        let project_id = db.insert_project(&cool_project()).unwrap();
        db.insert_task(&analysis_task(project_id)).unwrap();
        let before = db.list_tasks().unwrap();

        let affected = db
            .update_task(
                999,
                &TaskUpdate {
                    name: "Ghost".to_string(),
                    description: None,
                    status: "pending".to_string(),
                    start_date: day(2021, 1, 1),
                    end_date: day(2021, 1, 2),
                },
            )
            .unwrap();
        assert_eq!(affected, 0);
        assert_eq!(db.list_tasks().unwrap(), before);
    }

    #[test]
    fn delete_on_missing_id_is_a_silent_miss() {
        let db = setup();
        let project_id = db.insert_project(&cool_project()).unwrap();
        db.insert_task(&analysis_task(project_id)).unwrap();
        let before = db.list_tasks().unwrap();

        let affected = db.delete_task(999).unwrap();
        assert_eq!(affected, 0);
        assert_eq!(db.list_tasks().unwrap(), before);
    }

    #[test]
    fn delete_removes_only_the_matching_row() {
        let db = setup();
        let project_id = db.insert_project(&cool_project()).unwrap();
        let keep = db.insert_task(&analysis_task(project_id)).unwrap();
        let gone = db
            .insert_task(&NewTask {
                project_id,
                name: "Development".to_string(),
                description: Some("Develop features".to_string()),
                status: "pending".to_string(),
                start_date: day(2020, 2, 1),
                end_date: day(2020, 3, 1),
            })
            .unwrap();

        let affected = db.delete_task(gone).unwrap();
        assert_eq!(affected, 1);

        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, keep);
    }

    #[test]
    fn task_ids_are_never_reused() {
        let db = setup();
        let project_id = db.insert_project(&cool_project()).unwrap();
        let first = db.insert_task(&analysis_task(project_id)).unwrap();
        db.delete_task(first).unwrap();

        let second = db.insert_task(&analysis_task(project_id)).unwrap();
        assert!(second > first);
    }

    #[test]
    fn dangling_project_id_is_rejected() {
        let db = setup();
        let result = db.insert_task(&analysis_task(999));
        assert!(matches!(result, Err(TrackerError::Constraint(_))));
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let db = setup();
        let project_id = db.insert_project(&cool_project()).unwrap();
        db.insert_task(&analysis_task(project_id)).unwrap();

        db.ensure_schema().unwrap();

        assert_eq!(db.list_projects().unwrap().len(), 1);
        assert_eq!(db.list_tasks().unwrap().len(), 1);
    }

    #[test]
    fn open_fails_on_an_unusable_path() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory is not a database file.
        let result = Database::open(dir.path());
        assert!(matches!(result, Err(TrackerError::Connection { .. })));
    }

    #[test]
    fn list_before_schema_is_a_statement_error() {
        let db = Database::open_in_memory().unwrap();
        let result = db.list_tasks();
        assert!(matches!(result, Err(TrackerError::Statement(_))));
    }

    #[test]
    fn close_releases_the_handle() {
        let db = setup();
        db.close().unwrap();
    }

    #[test]
    fn crud_scenario_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::open(dir.path().join("pt.db")).unwrap();
        db.ensure_schema().unwrap();

        let project_id = db.insert_project(&cool_project()).unwrap();
        assert_eq!(project_id, 1);

        let first = db.insert_task(&analysis_task(project_id)).unwrap();
        assert_eq!(first, 1);
        let second = db
            .insert_task(&NewTask {
                project_id,
                name: "Development".to_string(),
                description: Some("Develop features".to_string()),
                status: "pending".to_string(),
                start_date: day(2020, 2, 1),
                end_date: day(2020, 3, 1),
            })
            .unwrap();
        assert_eq!(second, 2);

        assert_eq!(db.list_tasks().unwrap().len(), 2);

        db.update_task(
            first,
            &TaskUpdate {
                name: "Design".to_string(),
                description: Some("UI/UX Design".to_string()),
                status: "completed".to_string(),
                start_date: day(2020, 1, 15),
                end_date: day(2020, 1, 20),
            },
        )
        .unwrap();
        db.delete_task(second).unwrap();

        let tasks = db.list_tasks().unwrap();
        assert_eq!(
            tasks,
            vec![Task {
                id: 1,
                project_id: 1,
                name: "Design".to_string(),
                description: Some("UI/UX Design".to_string()),
                status: "completed".to_string(),
                start_date: day(2020, 1, 15),
                end_date: day(2020, 1, 20),
            }]
        );

        db.close().unwrap();
    }
}
