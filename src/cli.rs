use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use domain::task::TaskStatus;
use service::config::Config;

#[derive(Parser)]
#[command(name = "taskdeck", author, version)]
#[command(about = "Command line client for the taskdeck task manager")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,

        /// Password confirmation, defaults to the password itself
        #[arg(long)]
        confirm: Option<String>,

        /// Accept the terms of service
        #[arg(long)]
        accept_terms: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is active and whether onboarding is outstanding
    Status,
    /// Mark onboarding as complete
    Onboard,
    /// Manage tasks
    #[command(subcommand)]
    Tasks(TaskCommand),
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// List tasks with completed and pending counts
    List {
        /// Only show tasks whose title or description contains this text
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Create a task
    Add(TaskFields),
    /// Replace the fields of an existing task
    Edit {
        id: String,

        #[command(flatten)]
        fields: TaskFields,
    },
    /// Change only the status of a task
    Status { id: String, status: TaskStatus },
    /// Delete a task
    Delete { id: String },
}

#[derive(Args)]
pub struct TaskFields {
    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Due date as an RFC 3339 timestamp, e.g. 2025-03-01T09:30:00Z
    #[arg(long)]
    pub due: Option<DateTime<Utc>>,

    #[arg(long, default_value_t = TaskStatus::Pending)]
    pub status: TaskStatus,
}
