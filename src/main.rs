use std::sync::Arc;

use clap::Parser;
use tasksync::auth::SessionHandle;
use tasksync::cli::{Cli, Commands, SubtaskCommands, TaskCommands};
use tasksync::config::{session_from_env, EngineConfig};
use tasksync::engine::SyncEngine;
use tasksync::error::{EngineError, Result};
use tasksync::logging::{init_logging, LoggingConfig};
use tasksync::model::{Priority, Status, Subtask, Task};
use tasksync::store::HttpStore;
use tasksync::suggest::HttpSuggestionClient;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(LoggingConfig::from_args(cli.quiet, cli.verbose, cli.json));

    let json = cli.json;
    if let Err(e) = run(cli).await {
        if json {
            match serde_json::to_string(&e.to_error_response()) {
                Ok(payload) => eprintln!("{}", payload),
                Err(_) => eprintln!("{{\"error\":\"{}\"}}", e),
            }
        } else {
            eprintln!("[ERROR] {}", e);
        }
        std::process::exit(1);
    }
}

fn build_engine(config: &EngineConfig) -> Result<SyncEngine> {
    let session = session_from_env()?.ok_or_else(|| {
        EngineError::Validation(
            "not signed in: set TASKSYNC_USER_ID and TASKSYNC_ACCESS_TOKEN".to_string(),
        )
    })?;

    let store = Arc::new(HttpStore::new(config.store_config())?);
    let suggest = Arc::new(HttpSuggestionClient::new(config.suggest_url.clone())?);
    Ok(SyncEngine::new(store, suggest, SessionHandle::signed_in(session)))
}

async fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::from_env()?;
    let engine = build_engine(&config)?;

    match cli.command {
        Commands::Task { command } => run_task(&engine, command, cli.json).await,
        Commands::Subtask { command } => run_subtask(&engine, command, cli.json).await,
        Commands::Suggest {
            task,
            accept,
            accept_all,
        } => run_suggest(&engine, task, accept, accept_all, cli.json).await,
    }
}

async fn run_task(engine: &SyncEngine, command: TaskCommands, json: bool) -> Result<()> {
    match command {
        TaskCommands::List => {
            let tasks = engine.tasks().list().await?;
            print_tasks(&tasks, json)?;
        },
        TaskCommands::Add { title, priority } => {
            let priority = Priority::parse(&priority)?;
            let task = engine.tasks().create(&title, priority).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                println!("Created task {} ({})", task.id, task.title);
            }
        },
        TaskCommands::Status { id, status } => {
            let status = Status::parse(&status)?;
            engine.tasks().update_status(id, status).await?;
            if !json {
                println!("Task {} is now {}", id, status.as_str());
            }
        },
        TaskCommands::Delete { id } => {
            engine.delete_task(id).await?;
            if !json {
                println!("Deleted task {}", id);
            }
        },
    }
    Ok(())
}

async fn run_subtask(engine: &SyncEngine, command: SubtaskCommands, json: bool) -> Result<()> {
    match command {
        SubtaskCommands::List { task } => {
            engine.subtasks().list_all().await?;
            let subtasks = engine.subtasks().for_task(task);
            print_subtasks(&subtasks, json)?;
        },
        SubtaskCommands::Add { task, title } => {
            let subtask = engine.subtasks().create(task, &title).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&subtask)?);
            } else {
                println!("Created subtask {} ({})", subtask.id, subtask.title);
            }
        },
        SubtaskCommands::Toggle { id } => {
            engine.subtasks().list_all().await?;
            let current = engine
                .subtasks()
                .get(id)
                .ok_or_else(|| EngineError::Validation(format!("unknown subtask id {}", id)))?;
            engine.subtasks().toggle(id, current.completed).await?;
            if !json {
                let state = if current.completed { "open" } else { "completed" };
                println!("Subtask {} is now {}", id, state);
            }
        },
        SubtaskCommands::Delete { id } => {
            engine.subtasks().delete(id).await?;
            if !json {
                println!("Deleted subtask {}", id);
            }
        },
    }
    Ok(())
}

async fn run_suggest(
    engine: &SyncEngine,
    task: uuid::Uuid,
    accept: Vec<String>,
    accept_all: bool,
    json: bool,
) -> Result<()> {
    engine.tasks().list().await?;
    let titles = engine.generate_suggestions(task).await?;

    let to_accept: Vec<String> = if accept_all { titles.clone() } else { accept };
    let mut accepted = Vec::new();
    for title in &to_accept {
        let subtask = engine.accept_suggestion(task, title).await?;
        accepted.push(subtask);
    }
    let remaining = engine.suggestions().suggestions(task);

    if json {
        let payload = serde_json::json!({
            "suggested": titles,
            "accepted": accepted,
            "remaining": remaining,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        if titles.is_empty() {
            println!("No suggestions returned.");
            return Ok(());
        }
        for subtask in &accepted {
            println!("Accepted: {} -> subtask {}", subtask.title, subtask.id);
        }
        if remaining.is_empty() {
            println!("No suggestions remaining.");
        } else {
            println!("Suggestions:");
            for title in &remaining {
                println!("  - {}", title);
            }
        }
    }
    Ok(())
}

fn print_tasks(tasks: &[Task], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for task in tasks {
        println!(
            "[{}] [{}] {}  {}",
            task.priority.as_str(),
            task.status.as_str(),
            task.id,
            task.title
        );
    }
    Ok(())
}

fn print_subtasks(subtasks: &[Subtask], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(subtasks)?);
        return Ok(());
    }
    if subtasks.is_empty() {
        println!("No subtasks.");
        return Ok(());
    }
    for subtask in subtasks {
        let mark = if subtask.completed { "x" } else { " " };
        println!("[{}] {}  {}", mark, subtask.id, subtask.title);
    }
    Ok(())
}
