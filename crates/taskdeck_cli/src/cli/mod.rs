use clap::{Parser, Subcommand};
use taskdeck_core::error::AppError;
use taskdeck_core::model::Priority;
use taskdeck_core::view::Filter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskdeck add "Buy milk" --priority high --due 2026-09-01
    Add {
        name: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
    },
    /// List tasks
    ///
    /// Example: taskdeck list --filter active --search milk
    List {
        #[arg(long, value_name = "all|active|completed")]
        filter: Option<String>,
        #[arg(long, value_name = "TERM")]
        search: Option<String>,
    },
    /// Toggle a task's completion state
    ///
    /// Example: taskdeck done 1
    Done {
        id: i64,
    },
    /// Rename a task, or change its priority or due date
    ///
    /// Example: taskdeck edit 1 "Buy organic milk"
    /// Example: taskdeck edit 1 --priority low --due 2026-10-01
    Edit {
        id: i64,
        new_name: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// Remove the task's due date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },
    /// Delete a task
    ///
    /// Example: taskdeck delete 1
    Delete {
        id: i64,
    },
    /// Show aggregate statistics
    Stats,
    /// Delete every completed task
    Cleanup,
    /// Re-fetch the task list from the server
    Reload,
    /// Set the active filter and show the visible tasks
    ///
    /// Example: filter active
    Filter {
        filter: String,
    },
    /// Set the search term (no argument clears it) and show the
    /// visible tasks
    Search {
        term: Option<String>,
    },
    /// Replace the draft text of the open edit
    ///
    /// Example: draft "Buy oat milk"
    Draft {
        text: Vec<String>,
    },
    /// Save the open edit
    Save,
    /// Discard the open edit
    Cancel,
}

pub fn parse_priority(raw: &str) -> Result<Priority, AppError> {
    Priority::parse(raw)
        .ok_or_else(|| AppError::invalid_input("priority must be low, medium or high"))
}

pub fn parse_filter(raw: &str) -> Result<Filter, AppError> {
    Filter::parse(raw)
        .ok_or_else(|| AppError::invalid_input("filter must be all, active or completed"))
}
