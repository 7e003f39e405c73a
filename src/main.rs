#[macro_use] extern crate prettytable;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod fields;
mod importance;
mod interface;
mod model;
mod store;

use cli::{Command::*, CommandLineArgs};
use model::TaskKind;
use store::TaskStore;

fn find_default_store_file() -> anyhow::Result<PathBuf> {
    let base_dirs = ProjectDirs::from("com", "gozque", "urgent")
        .ok_or(anyhow!("Failed to find a data directory."))?;
    let root_dir = base_dirs.data_dir();
    if !root_dir.exists() {
        std::fs::create_dir_all(root_dir)
            .with_context(|| format!("Failed to create {}.", root_dir.display()))?;
    }
    let mut path = PathBuf::from(root_dir);
    path.push("tasks.sqlite");
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Get the command-line arguments.
    let CommandLineArgs { action, store_file } = CommandLineArgs::from_args();

    // Unpack the store file.
    let store_file = match store_file {
        Some(path) => path,
        None => find_default_store_file()?,
    };

    let mut store = TaskStore::open(&store_file)
        .with_context(|| format!("Failed to open task store {}.", store_file.display()))?;

    // Perform the action.
    match action {
        Add {
            description,
            value,
            due_date_importance,
            past_due_importance_decrease_rate,
            due_date,
            time_per_week,
            absolute_date,
            extra,
            hobby,
        } => {
            let kind = if hobby { TaskKind::Hobby } else { TaskKind::Deadline };
            let mut raw = BTreeMap::new();
            raw.insert("kind".to_string(), kind.as_str().to_string());
            raw.insert("description".to_string(), description);
            raw.insert("value".to_string(), value);
            raw.insert("due_date_importance".to_string(), due_date_importance);
            let optional = vec![
                ("past_due_importance_decrease_rate", past_due_importance_decrease_rate),
                ("due_date", due_date),
                ("time_per_week", time_per_week),
                ("absolute_date", absolute_date),
                ("extra", extra),
            ];
            for (name, field) in optional {
                if let Some(field) = field {
                    raw.insert(name.to_string(), field);
                }
            }
            interface::add_task(&store, raw)
        }
        List { rank } => interface::list(&store, rank),
        Next => interface::next(&store),
        Rm { ids } => interface::remove_tasks(&mut store, ids),
        Fields => interface::fields(&store),
    }?;

    store.close().context("Failed to close task store.")?;
    Ok(())
}
