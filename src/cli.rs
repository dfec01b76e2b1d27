use clap::{Parser, Subcommand};
use uuid::Uuid;

const LONG_ABOUT: &str = r#"
tasksync - client-side task manager synchronized with a remote store

Tasks and subtasks live in a remote table store; every command signs its
requests with the session from the environment and refreshes the local
view after each write.

Environment:
  TASKSYNC_STORE_URL       base URL of the table store
  TASKSYNC_STORE_API_KEY   project API key for the store
  TASKSYNC_SUGGEST_URL     URL of the subtask-suggestion endpoint
  TASKSYNC_USER_ID         authenticated user id (UUID)
  TASKSYNC_ACCESS_TOKEN    bearer token for store and suggestion calls
"#;

#[derive(Parser, Clone)]
#[command(name = "tasksync")]
#[command(about = "Task manager synchronized with a remote store, with AI subtask suggestions")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output (-q)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output results and logs in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Manage subtasks of a task
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommands,
    },

    /// Generate AI subtask suggestions for a task
    ///
    /// Fetches candidate subtask titles from the suggestion service.
    /// Without --accept/--accept-all the candidates are only printed;
    /// accepted titles are persisted as subtasks of the task.
    Suggest {
        /// Task id to generate suggestions for
        task: Uuid,

        /// Accept this suggested title as a persisted subtask (repeatable)
        #[arg(long = "accept", value_name = "TITLE")]
        accept: Vec<String>,

        /// Accept every returned suggestion
        #[arg(long)]
        accept_all: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    /// List all tasks, newest first
    List,

    /// Create a task with status pending
    Add {
        /// Task title
        title: String,

        /// Priority: low, medium, high
        #[arg(long, default_value = "medium")]
        priority: String,
    },

    /// Update a task's status: pending, in-progress, done
    Status {
        /// Task id
        id: Uuid,

        /// New status
        status: String,
    },

    /// Delete a task and its subtasks
    Delete {
        /// Task id
        id: Uuid,
    },
}

#[derive(Subcommand, Clone)]
pub enum SubtaskCommands {
    /// List the subtasks of a task, oldest first
    List {
        /// Owning task id
        task: Uuid,
    },

    /// Add a subtask under a task
    Add {
        /// Owning task id
        task: Uuid,

        /// Subtask title
        title: String,
    },

    /// Flip a subtask's completed flag
    Toggle {
        /// Subtask id
        id: Uuid,
    },

    /// Delete a subtask
    Delete {
        /// Subtask id
        id: Uuid,
    },
}
