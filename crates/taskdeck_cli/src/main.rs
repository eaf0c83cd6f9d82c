use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tabled::{Table, Tabled};
use taskdeck_cli::cli::{Cli, Command, parse_filter, parse_priority};
use taskdeck_core::config;
use taskdeck_core::error::AppError;
use taskdeck_core::model::{Task, TaskDraft, TaskUpdate, normalize_due_date};
use taskdeck_core::remote::{self, HttpTaskService};
use taskdeck_core::session::TaskSession;
use taskdeck_core::view::TaskStats;
use time::OffsetDateTime;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Due")]
    due: String,
}

fn status_label(task: &Task, now: OffsetDateTime) -> String {
    if task.done {
        "completed".to_string()
    } else if task.overdue_at(now) {
        "active (overdue)".to_string()
    } else {
        "active".to_string()
    }
}

fn print_tasks(tasks: &[&Task], json: bool) {
    if json {
        println!("{}", serde_json::to_string(tasks).unwrap_or_default());
        return;
    }

    if tasks.is_empty() {
        println!("No tasks match.");
        return;
    }

    let now = OffsetDateTime::now_utc();
    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|task| TaskRow {
            id: task.id,
            name: task.name.clone(),
            status: status_label(task, now),
            priority: task.priority.label(),
            due: task.due_date.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    println!("{}", Table::new(rows));
}

fn print_task(verb: &str, task: &Task, json: bool) {
    if json {
        println!("{}", serde_json::to_string(task).unwrap_or_default());
    } else {
        println!("{} task: {} ({})", verb, task.name, task.id);
    }
}

fn print_stats(stats: &TaskStats, json: bool) {
    if json {
        let payload = serde_json::json!({
            "total": stats.total,
            "completed": stats.completed,
            "active": stats.active,
            "overdue": stats.overdue,
            "by_priority": {
                "low": stats.by_priority.low,
                "medium": stats.by_priority.medium,
                "high": stats.by_priority.high,
            },
        });
        println!("{payload}");
        return;
    }

    println!("Total: {}", stats.total);
    println!("Completed: {}", stats.completed);
    println!("Active: {}", stats.active);
    println!("Overdue: {}", stats.overdue);
    println!(
        "By priority: low {}, medium {}, high {}",
        stats.by_priority.low, stats.by_priority.medium, stats.by_priority.high
    );
}

fn build_draft(
    name: Option<String>,
    priority: Option<String>,
    due: Option<String>,
) -> Result<TaskDraft, AppError> {
    let name = match name {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(AppError::invalid_input("name is required")),
    };

    let priority = priority.as_deref().map(parse_priority).transpose()?;
    let due_date = due.as_deref().map(normalize_due_date).transpose()?;

    Ok(TaskDraft {
        name,
        priority,
        due_date,
    })
}

fn run_command(cli: Cli, session: &mut TaskSession<HttpTaskService>) -> Result<(), AppError> {
    match cli.command {
        Command::Add {
            name,
            priority,
            due,
        } => {
            let draft = build_draft(name, priority, due)?;
            let task = session.add_task(draft)?;
            print_task("Added", &task, cli.json);
        }
        Command::List { filter, search } => {
            if let Some(raw) = filter.as_deref() {
                session.set_filter(parse_filter(raw)?);
            }
            if let Some(term) = search {
                session.set_search(term);
            }
            print_tasks(&session.visible_tasks(), cli.json);
        }
        Command::Done { id } => {
            let task = session.complete_task(id)?;
            let verb = if task.done { "Completed" } else { "Reopened" };
            print_task(verb, &task, cli.json);
        }
        Command::Edit {
            id,
            new_name,
            priority,
            due,
            clear_due,
        } => {
            let has_flags = priority.is_some() || due.is_some() || clear_due;
            if has_flags {
                let mut update = TaskUpdate::default();
                if let Some(name) = new_name {
                    if name.trim().is_empty() {
                        return Err(AppError::invalid_input("name cannot be empty"));
                    }
                    update.name = Some(name.trim().to_string());
                }
                update.priority = priority.as_deref().map(parse_priority).transpose()?;
                if clear_due {
                    update.due_date = Some(None);
                } else if let Some(raw) = due.as_deref() {
                    update.due_date = Some(Some(normalize_due_date(raw)?));
                }

                let task = session.update_task(id, &update)?;
                print_task("Updated", &task, cli.json);
            } else if let Some(name) = new_name {
                session.start_editing(id)?;
                session.set_draft(name)?;
                match session.save_edit()? {
                    Some(task) => print_task("Updated", &task, cli.json),
                    None => println!("Nothing to save."),
                }
            } else {
                let edit = session.start_editing(id)?;
                println!(
                    "Editing task {} (draft: \"{}\"). Use draft/save/cancel.",
                    edit.task_id, edit.draft
                );
            }
        }
        Command::Delete { id } => {
            session.delete_task(id)?;
            if cli.json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted task {id}");
            }
        }
        Command::Stats => {
            print_stats(&session.stats(), cli.json);
        }
        Command::Cleanup => {
            let deleted = session.clear_completed()?;
            if cli.json {
                println!("{}", serde_json::json!({ "deleted_count": deleted }));
            } else {
                println!("Deleted {deleted} completed tasks");
            }
        }
        Command::Reload => {
            session.load()?;
            println!("Loaded {} tasks", session.tasks().len());
        }
        Command::Filter { filter } => {
            session.set_filter(parse_filter(&filter)?);
            println!("Filter: {}", session.filter().label());
            print_tasks(&session.visible_tasks(), cli.json);
        }
        Command::Search { term } => {
            session.set_search(term.unwrap_or_default());
            if session.search().is_empty() {
                println!("Search cleared");
            } else {
                println!("Search: {}", session.search());
            }
            print_tasks(&session.visible_tasks(), cli.json);
        }
        Command::Draft { text } => {
            let text = text.join(" ");
            session.set_draft(text.clone())?;
            println!("Draft: \"{text}\"");
        }
        Command::Save => match session.save_edit()? {
            Some(task) => print_task("Updated", &task, cli.json),
            None => println!("Nothing to save."),
        },
        Command::Cancel => {
            if session.editing().is_some() {
                session.cancel_edit();
                println!("Edit cancelled.");
            } else {
                println!("No edit in progress.");
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive(session: &mut TaskSession<HttpTaskService>) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskdeck".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, session) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();

    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: {err}");
    }

    let service = match remote::service_from_config(&loaded.config) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    };
    let mut session = TaskSession::new(service);

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = session.load() {
            eprintln!("ERROR: {err}");
        }
        if let Err(err) = run_interactive(&mut session) {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            err.print().ok();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = session.load() {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }

    if let Err(err) = run_command(cli, &mut session) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
