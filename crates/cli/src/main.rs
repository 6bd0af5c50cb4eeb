//! Tallybook CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! tallybook migrate
//!
//! # Create an account without going through the API
//! tallybook user create -e owner@example.com -n "Awa" -p "long enough"
//!
//! # Fill the last 30 days with demo figures for an account
//! tallybook seed -e owner@example.com --days 30
//!
//! # Send today's reminders once, outside the server schedule
//! tallybook remind
//! ```
//!
//! # Environment Variables
//!
//! - `TALLYBOOK_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `PUSH_GATEWAY_URL`, `PUSH_GATEWAY_KEY` - used by `remind`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tallybook")]
#[command(author, version, about = "Tallybook CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Insert demo metrics for an existing account
    Seed {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Number of days to fill, ending today
        #[arg(short, long, default_value_t = 21)]
        days: u32,
    },
    /// Run one reminder sweep for today
    Remind,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (min 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
            } => {
                commands::users::create_user(&email, &name, &password).await?;
            }
        },
        Commands::Seed { email, days } => commands::seed::demo_metrics(&email, days).await?,
        Commands::Remind => commands::remind::run().await?,
    }
    Ok(())
}
