use std::path::Path;

use chrono::NaiveDate;

use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::models::{NewProject, NewTask, TaskUpdate};

/// Handle the init command
pub fn handle_init(db_path: &Path) -> Result<()> {
    let db = Database::open(db_path)?;
    db.ensure_schema()?;
    db.close()?;

    println!("Initialized database at {}", db_path.display());
    Ok(())
}

/// Handle the add-project command
pub fn handle_add_project(
    db_path: &Path,
    name: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let db = open_db(db_path)?;

    let id = db.insert_project(&NewProject {
        name: name.to_string(),
        start_date: start,
        end_date: end,
    })?;

    println!("Created project #{id}: {name}");
    Ok(())
}

/// Handle the projects command
pub fn handle_projects(db_path: &Path, json: bool) -> Result<()> {
    let db = open_db(db_path)?;
    let projects = db.list_projects()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    for project in &projects {
        println!(
            "  [#{:>3}] {} ({} .. {})",
            project.id,
            project.name,
            fmt_date(project.start_date),
            fmt_date(project.end_date)
        );
    }
    Ok(())
}

/// Handle the add command
pub fn handle_add(
    db_path: &Path,
    project_id: i64,
    name: &str,
    desc: Option<&str>,
    status: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<()> {
    let db = open_db(db_path)?;

    let id = db.insert_task(&NewTask {
        project_id,
        name: name.to_string(),
        description: desc.map(str::to_string),
        status: status.to_string(),
        start_date: start,
        end_date: end,
    })?;

    println!("Created task #{id}: {name}");
    Ok(())
}

/// Handle the list command
pub fn handle_list(db_path: &Path, json: bool) -> Result<()> {
    let db = open_db(db_path)?;
    let tasks = db.list_tasks()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    for task in &tasks {
        println!(
            "  [#{:>3}] {} [{}] (project #{}, {} .. {})",
            task.id, task.name, task.status, task.project_id, task.start_date, task.end_date
        );
    }
    Ok(())
}

/// Handle the show command
pub fn handle_show(db_path: &Path, id: i64) -> Result<()> {
    let db = open_db(db_path)?;
    let task = db.get_task(id)?.ok_or(TrackerError::TaskNotFound(id))?;

    println!("[#{id}] {name}", name = task.name);
    println!("Project:     #{}", task.project_id);
    println!("Status:      {}", task.status);
    println!("Start:       {}", task.start_date);
    println!("End:         {}", task.end_date);
    match &task.description {
        Some(desc) => println!("Description: {desc}"),
        None => println!("Description: (none)"),
    }

    Ok(())
}

/// Handle the edit command
#[allow(clippy::too_many_arguments)]
pub fn handle_edit(
    db_path: &Path,
    id: i64,
    name: Option<&str>,
    desc: Option<&str>,
    no_desc: bool,
    status: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let db = open_db(db_path)?;
    let current = db.get_task(id)?.ok_or(TrackerError::TaskNotFound(id))?;

    let description = if no_desc {
        None
    } else {
        desc.map(str::to_string).or(current.description)
    };

    let update = TaskUpdate {
        name: name.map_or(current.name, str::to_string),
        description,
        status: status.map_or(current.status, str::to_string),
        start_date: start.unwrap_or(current.start_date),
        end_date: end.unwrap_or(current.end_date),
    };
    db.update_task(id, &update)?;

    println!("Updated task #{id}: {}", update.name);
    Ok(())
}

/// Handle the remove command
pub fn handle_remove(db_path: &Path, id: i64) -> Result<()> {
    let db = open_db(db_path)?;

    let affected = db.delete_task(id)?;
    if affected == 0 {
        println!("No task #{id} to remove.");
    } else {
        println!("Removed task #{id}");
    }

    Ok(())
}

// Helper function
fn open_db(db_path: &Path) -> Result<Database> {
    let db = Database::open(db_path)?;
    db.ensure_schema()?;
    Ok(db)
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}
