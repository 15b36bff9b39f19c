use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pt")]
#[command(about = "Project and task tracker backed by SQLite")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Path to the database file
    #[arg(short, long, global = true, default_value = "pt.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and its schema
    Init,

    /// Add a new project
    AddProject {
        /// Project name
        name: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// List projects
    Projects {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new task to a project
    Add {
        /// Project id the task belongs to
        project_id: i64,
        /// Task name
        name: String,
        /// Start date (YYYY-MM-DD)
        start: NaiveDate,
        /// End date (YYYY-MM-DD)
        end: NaiveDate,
        /// Optional description
        #[arg(long)]
        desc: Option<String>,
        /// Task status
        #[arg(long, default_value = "pending")]
        status: String,
    },

    /// List all tasks
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show task details
    Show {
        /// Task ID
        id: i64,
    },

    /// Edit an existing task
    Edit {
        /// Task ID
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        desc: Option<String>,
        /// Clear description
        #[arg(long)]
        no_desc: bool,
        /// New status
        #[arg(long)]
        status: Option<String>,
        /// New start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// New end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// Remove a task
    Remove {
        /// Task ID
        id: i64,
    },
}
