mod commands;

use std::{io, path::PathBuf};

use chrono::{NaiveDate, NaiveTime};
use clap::{ArgAction, Parser, Subcommand};
use todoman::{
    config::{Config, DEFAULT_API_URL},
    ui::task_input::{parse_date, parse_time},
    AuthError,
};
use todoman_api::v1::{TaskPriority, TaskStatus};
use tracing::Level;

#[derive(Parser)]
#[command(name = "todoman", version, about = "Personal task tracker")]
struct Cli {
    /// Base URL of the todo API
    #[arg(long, env = "TODOMAN_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// OAuth client id used for Google sign-in
    #[arg(long, env = "TODOMAN_GOOGLE_CLIENT_ID", global = true)]
    google_client_id: Option<String>,

    /// Directory for remembered sessions
    #[arg(long, env = "TODOMAN_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    /// More log output, repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password
    Login {
        email: Option<String>,
        #[arg(long, env = "TODOMAN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Forget the session when the desktop session ends
        #[arg(long)]
        no_remember: bool,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        email: Option<String>,
        #[arg(long, env = "TODOMAN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long)]
        no_remember: bool,
    },
    /// Sign in with a Google ID token
    Google {
        #[arg(long, env = "TODOMAN_GOOGLE_CREDENTIAL", hide_env_values = true)]
        credential: Option<String>,
        #[arg(long)]
        no_remember: bool,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List tasks grouped by priority
    List {
        /// Show finished tasks instead
        #[arg(long)]
        archived: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show one task in full
    Show { id: String },
    /// Create a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value_t = TaskPriority::Medium)]
        priority: TaskPriority,
        /// Deadline date, YYYY-MM-DD in local time
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
        /// Deadline time, HH:MM in local time (default 23:59)
        #[arg(long, value_parser = parse_time, requires = "due")]
        at: Option<NaiveTime>,
    },
    /// Change fields of a task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<TaskPriority>,
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
        #[arg(long, value_parser = parse_time)]
        at: Option<NaiveTime>,
        /// Remove the deadline
        #[arg(long, conflicts_with_all = ["due", "at"])]
        clear_deadline: bool,
    },
    /// Set the status of a task; finishing asks for confirmation
    Status { id: String, status: TaskStatus },
    /// Finish a task and move it to the archive
    Archive { id: String },
    /// Move an archived task back to the active list
    Restore { id: String },
    /// Delete a task for good
    Delete { id: String },
    /// Task counts
    Stats,
    /// Live countdowns for the active tasks
    Watch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = Config::new(cli.api_url, cli.google_client_id, cli.data_dir);
    let options = commands::Options { assume_yes: cli.yes };

    match commands::run(config, options, cli.command).await {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<AuthError>() {
            // sign-in messages are meant for the user as they are
            Some(auth) => {
                eprintln!("{}", auth);
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}
