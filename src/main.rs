use clap::Parser;
use std::process;

use pt::cli::{Cli, Commands};
use pt::cli_handlers;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let db = cli.db;

    let result = match cli.command {
        Commands::Init => cli_handlers::handle_init(&db),
        Commands::AddProject { name, start, end } => {
            cli_handlers::handle_add_project(&db, &name, start, end)
        }
        Commands::Projects { json } => cli_handlers::handle_projects(&db, json),
        Commands::Add {
            project_id,
            name,
            start,
            end,
            desc,
            status,
        } => cli_handlers::handle_add(&db, project_id, &name, desc.as_deref(), &status, start, end),
        Commands::List { json } => cli_handlers::handle_list(&db, json),
        Commands::Show { id } => cli_handlers::handle_show(&db, id),
        Commands::Edit {
            id,
            name,
            desc,
            no_desc,
            status,
            start,
            end,
        } => cli_handlers::handle_edit(
            &db,
            id,
            name.as_deref(),
            desc.as_deref(),
            no_desc,
            status.as_deref(),
            start,
            end,
        ),
        Commands::Remove { id } => cli_handlers::handle_remove(&db, id),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
