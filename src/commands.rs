use std::sync::Arc;

use anyhow::{bail, Result};
use domain::account::{self, SessionState};
use domain::board::TaskBoard;
use domain::todo;
use domain::validation::{LoginForm, SignupForm, TaskForm};
use log::debug;
use service::config::Config;
use session_auth::http::ClientBuilder;
use session_auth::session::{Manager, RefreshSource};
use session_auth::store::FileStore;

use crate::cli::{Command, TaskCommand, TaskFields};
use crate::output::{print_board, print_info, print_success, print_task};

/// Session manager backed by the configured session file.
pub fn build_manager(config: &Config) -> Result<Manager> {
    let client = ClientBuilder::new()
        .with_timeout(config.request_timeout())
        .build()?;

    let session_file = config.session_file();
    debug!("Using session file {}", session_file.display());
    let store = Arc::new(FileStore::new(session_file));

    let refresh_source = if config.refresh_with_stored_token {
        RefreshSource::Stored
    } else {
        RefreshSource::Explicit
    };

    Ok(Manager::new(client, &config.api_url, store)?.with_refresh_source(refresh_source))
}

pub async fn run(command: Command, manager: &Manager) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            account::login(manager, &LoginForm { email, password }).await?;
            print_success("Logged in");
        }
        Command::Signup {
            name,
            email,
            password,
            confirm,
            accept_terms,
        } => {
            let form = SignupForm {
                name,
                email,
                confirm: confirm.unwrap_or_else(|| password.clone()),
                password,
                terms: accept_terms,
            };
            account::signup(manager, &form).await?;
            print_success("Account created, you are logged in");
        }
        Command::Logout => {
            account::logout(manager).await?;
            print_success("Logged out");
        }
        Command::Status => status(manager).await?,
        Command::Onboard => {
            require_session(manager).await?;
            account::complete_onboarding(manager).await?;
            print_success("Onboarding complete");
        }
        Command::Tasks(command) => {
            require_session(manager).await?;
            run_task_command(command, manager).await?;
        }
    }

    Ok(())
}

async fn status(manager: &Manager) -> Result<()> {
    if account::restore_session(manager).await? == SessionState::Anonymous {
        print_info("Not logged in");
        return Ok(());
    }

    let Some(first_login) = account::session_onboarding(manager).await? else {
        print_info("Session expired, please log in again");
        return Ok(());
    };

    print_success("Logged in");
    if first_login {
        print_info("Onboarding not completed yet, run `taskdeck onboard` to get started");
    }
    Ok(())
}

/// Fail unless a session is stored or can be restored from the refresh token.
async fn require_session(manager: &Manager) -> Result<()> {
    match account::restore_session(manager).await? {
        SessionState::Anonymous => bail!("Not logged in. Run `taskdeck login` first."),
        SessionState::Restored => debug!("Session restored from refresh token"),
        SessionState::Active => {}
    }
    Ok(())
}

fn task_form(fields: TaskFields) -> TaskForm {
    TaskForm {
        title: fields.title,
        description: fields.description,
        due_date: fields.due,
        status: fields.status,
    }
}

async fn run_task_command(command: TaskCommand, manager: &Manager) -> Result<()> {
    match command {
        TaskCommand::List { search } => {
            let board = TaskBoard::new(todo::list_tasks(manager).await?);
            print_board(&board, search.as_deref());
        }
        TaskCommand::Add(fields) => {
            let payload = task_form(fields).into_payload()?;
            let task = todo::create_task(manager, &payload).await?;
            print_success("Task created");
            print_task(&task);
        }
        TaskCommand::Edit { id, fields } => {
            let payload = task_form(fields).into_payload()?;
            let task = todo::update_task(manager, &id, &payload).await?;
            print_success("Task updated");
            print_task(&task);
        }
        TaskCommand::Status { id, status } => {
            todo::update_status(manager, &id, status).await?;
            print_success(&format!("Task {} is now {}", id, status));
        }
        TaskCommand::Delete { id } => {
            todo::delete_task(manager, &id).await?;
            print_success(&format!("Task {} deleted", id));
        }
    }

    Ok(())
}
