use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use edu_core::AssistantKind;

mod attachment;
mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "edu")]
#[command(about = "Edu Simplify CLI - lecture summaries, quizzes and study assistants", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write daily-rolling logs into this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend answers
    Health,
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Summarize a YouTube lecture and make it the current lecture
    Summarize {
        /// YouTube video URL
        url: String,
    },
    /// Generate multiple-choice questions for the current lecture
    Mcq,
    /// Download the PDF export of the current lecture
    Pdf {
        #[arg(short, long, default_value = "lecture.pdf")]
        output: PathBuf,
    },
    /// Ask about the current lecture
    Chat {
        message: String,
    },
    /// Ask the homework solver
    Solve {
        #[arg(default_value = "")]
        message: String,
        /// Image of the problem (png, jpeg, gif or webp)
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Resend a failed message
    Retry {
        kind: AssistantKind,
        message_id: String,
    },
    /// Manage stored conversations
    History {
        kind: AssistantKind,
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List conversations, most recent first
    List,
    /// Print the messages of the active conversation
    Show,
    /// Start a new conversation
    New,
    /// Switch to a conversation
    Select { id: String },
    /// Delete a conversation
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.log_dir.as_deref());

    let app = commands::App::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Health => commands::auth::health(&app).await?,
        Commands::Register {
            name,
            email,
            password,
            role,
            department,
        } => commands::auth::register(&app, name, email, password, role, department).await?,
        Commands::Login { email, password } => commands::auth::login(&app, &email, &password).await?,
        Commands::Logout => commands::auth::logout(&app),
        Commands::Whoami => commands::auth::whoami(&app).await,
        Commands::Summarize { url } => commands::study::summarize(&app, &url).await?,
        Commands::Mcq => commands::study::mcq(&app).await?,
        Commands::Pdf { output } => commands::study::pdf(&app, &output).await?,
        Commands::Chat { message } => commands::chat::send(&app, AssistantKind::Chat, &message, None).await?,
        Commands::Solve { message, image } => {
            commands::chat::send(&app, AssistantKind::Solver, &message, image.as_deref()).await?
        }
        Commands::Retry { kind, message_id } => commands::chat::retry(&app, kind, &message_id).await?,
        Commands::History { kind, action } => commands::history::run(&app, kind, action).await?,
    }

    Ok(())
}
