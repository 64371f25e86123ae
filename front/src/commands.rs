use std::sync::Arc;

use chrono::Utc;
use eyre::{bail, WrapErr};
use todoman::{
    auth::{Credentials, SessionContext},
    board::{Board, Update, View},
    config::Config,
    countdown::SystemClock,
    session::Persistence,
    ui::{self, prompt, task_input::TaskForm, Palette},
    ApiClient, BoardError,
};
use todoman_api::v1::{TaskPatch, TaskStatus};

use crate::Command;

pub struct Options {
    pub assume_yes: bool,
}

pub async fn run(config: Config, options: Options, command: Command) -> eyre::Result<()> {
    let client = ApiClient::new(&config.api_url);
    let mut ctx = SessionContext::restore(config.session_store(), client)?;
    let palette = Palette::detect();

    match command {
        Command::Login {
            email,
            password,
            no_remember,
        } => {
            let credentials = credentials(email, password)?;
            let persistence = Persistence::from_remember_me(!no_remember);

            let session = ctx.login(&credentials, persistence).await?;
            println!("Login successful. Signed in as {}.", session.user.name);
        }
        Command::Register {
            name,
            email,
            password,
            no_remember,
        } => {
            let credentials = credentials(email, password)?;
            let persistence = Persistence::from_remember_me(!no_remember);

            let session = ctx.register(&name, &credentials, persistence).await?;
            println!("Account created. Signed in as {}.", session.user.name);
        }
        Command::Google {
            credential,
            no_remember,
        } => {
            let persistence = Persistence::from_remember_me(!no_remember);
            let client_id = config.google_client_id.as_deref();

            let session = ctx.login_federated(client_id, credential, persistence).await?;
            println!("Google sign in successful. Signed in as {}.", session.user.name);
        }
        Command::Logout => {
            ctx.logout()?;
            println!("Signed out.");
        }
        Command::Whoami => match ctx.session() {
            Some(session) => println!("{} <{}>", session.user.name, session.user.email),
            None => println!("Not signed in."),
        },
        command => {
            let api = ctx.require()?;
            let mut board = Board::new();
            board.refresh(api).await?;

            tasks(&mut board, api, command, &options, palette).await?;
        }
    }

    Ok(())
}

fn credentials(email: Option<String>, password: Option<String>) -> eyre::Result<Credentials> {
    let email = match email {
        Some(email) => email,
        None => prompt::ask("Email:")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt::ask_hidden("Password:")?,
    };

    Ok(Credentials::new(email, password))
}

async fn tasks(
    board: &mut Board,
    api: &ApiClient,
    command: Command,
    options: &Options,
    palette: Palette,
) -> eyre::Result<()> {
    match command {
        Command::List { archived, json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(board.tasks())?);
                return Ok(());
            }

            board.set_view(if archived { View::Archived } else { View::Active });
            print!("{}", ui::render(board, Utc::now(), palette));
        }
        Command::Show { id } => {
            let task = board.get(&id).ok_or(BoardError::UnknownTask(id))?;
            print!("{}", ui::task::detail(task, Utc::now(), palette));
        }
        Command::Add {
            title,
            description,
            priority,
            due,
            at,
        } => {
            let form = TaskForm {
                title,
                description,
                date: due,
                time: at,
                priority,
            };

            let task = board.create(api, form.new_task()).await?;
            println!("Created [{}] {}", task.id, task.title);
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
            due,
            at,
            clear_deadline,
        } => {
            let task = board.get(&id).ok_or_else(|| BoardError::UnknownTask(id.clone()))?;
            let mut form = TaskForm::from_task(task);

            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(priority) = priority {
                form.priority = priority;
            }
            if clear_deadline {
                form.date = None;
                form.time = None;
            }
            if let Some(due) = due {
                form.date = Some(due);
                form.time = at;
            } else if let Some(at) = at {
                if form.date.is_none() {
                    bail!("--at needs a deadline date, pass --due as well");
                }
                form.time = Some(at);
            }

            if let Update::Applied(task) = board.update(api, &id, form.patch()).await? {
                println!("Updated [{}] {}", task.id, task.title);
            }
        }
        Command::Status { id, status } => {
            set_status(board, api, &id, status, options).await?;
        }
        Command::Archive { id } => {
            set_status(board, api, &id, TaskStatus::Finished, options).await?;
        }
        Command::Restore { id } => {
            let task = board.restore(api, &id).await?;
            println!("Restored [{}] {}\n", task.id, task.title);
            print!("{}", ui::render(board, Utc::now(), palette));
        }
        Command::Delete { id } => {
            let task = board.request_delete(&id)?;
            let question = format!("Delete \"{}\"? This cannot be undone.", task.title);

            if prompt::confirm(&question, options.assume_yes)? {
                let task = board.confirm_delete(api).await?;
                println!("Deleted [{}] {}", task.id, task.title);
            } else {
                board.cancel_delete();
                println!("Kept.");
            }
        }
        Command::Stats => {
            let stats = board.stats(Utc::now());
            print!("{}", ui::render_stats(&stats, palette));
        }
        Command::Watch => {
            ui::watch::run(board.tasks(), Arc::new(SystemClock), palette)
                .await
                .wrap_err("watch screen failed")?;
        }
        Command::Login { .. }
        | Command::Register { .. }
        | Command::Google { .. }
        | Command::Logout
        | Command::Whoami => bail!("not a task command"),
    }

    Ok(())
}

async fn set_status(
    board: &mut Board,
    api: &ApiClient,
    id: &str,
    status: TaskStatus,
    options: &Options,
) -> eyre::Result<()> {
    let patch = TaskPatch::default().status(status);

    match board.update(api, id, patch).await? {
        Update::Applied(task) => println!("[{}] {} is now {}", task.id, task.title, task.status),
        Update::AwaitingConfirmation => {
            let title = match board.archive_candidate() {
                Some(task) => task.title.clone(),
                None => bail!("no task awaiting archive"),
            };

            let question = format!("Mark \"{}\" as finished and archive it?", title);
            if prompt::confirm(&question, options.assume_yes)? {
                let task = board.confirm_archive(api).await?;
                println!("Archived [{}] {}", task.id, task.title);
            } else {
                board.cancel_archive();
                println!("Left unchanged.");
            }
        }
    }

    Ok(())
}
