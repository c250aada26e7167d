use colored::*;
use domain::board::TaskBoard;
use domain::error::{DomainErrorKind, InternalErrorKind};
use domain::task::{Task, TaskStatus};

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "→".blue(), message);
}

pub fn print_error(err: &anyhow::Error) {
    if let Some(domain_err) = err.downcast_ref::<domain::Error>() {
        if let DomainErrorKind::Internal(InternalErrorKind::Validation(errors)) =
            &domain_err.error_kind
        {
            eprintln!("{} {}", "✗".red(), "Please fix the following:".bold());
            for (field, message) in errors.iter() {
                eprintln!("   {}: {}", field.to_string().yellow(), message);
            }
            return;
        }
    }

    eprintln!("{} {}", "✗".red(), err);
}

fn status_label(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Pending => "PENDING".yellow(),
        TaskStatus::InProgress => "IN_PROGRESS".blue(),
        TaskStatus::Completed => "COMPLETED".green(),
    }
}

pub fn print_task(task: &Task) {
    let due = task
        .due_date
        .map(|d| format!(" (due {})", d.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();

    println!(
        "[{}] {} {}{}",
        status_label(task.status).bold(),
        task.id.dimmed(),
        task.title,
        due.dimmed()
    );

    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        println!("      {}", description.dimmed());
    }
}

pub fn print_board(board: &TaskBoard, search: Option<&str>) {
    println!("{}", "=== TASK LIST ===".bright_white().bold());
    println!(
        "Completed Tasks: {} / {}    Pending Tasks: {} / {}\n",
        board.completed().to_string().green(),
        board.total(),
        board.pending().to_string().yellow(),
        board.total()
    );

    let tasks = board.search(search.unwrap_or_default());
    if tasks.is_empty() {
        println!("{}", "No tasks found.".dimmed());
        return;
    }

    for task in tasks {
        print_task(task);
    }
}
