use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A task row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// New project input
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// New task input
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Task update input: the five mutable fields. `id` and `project_id`
/// are never touched by an update.
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
