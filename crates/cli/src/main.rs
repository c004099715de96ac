//! Pawgo CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pawgo-cli migrate
//!
//! # Create an admin account (password from -p or PAWGO_ADMIN_PASSWORD)
//! pawgo-cli admin create -e admin@pawgo.pet -n "Admin Name"
//!
//! # Load FAQs from a YAML file, skipping questions already present
//! pawgo-cli seed faqs data/faqs.yaml
//! ```
//!
//! All commands read `PAWGO_DATABASE_URL` (or `DATABASE_URL`), loading a
//! `.env` file when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pawgo-cli")]
#[command(author, version, about = "Pawgo CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Password (falls back to `PAWGO_ADMIN_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert FAQs from a YAML file
    Faqs {
        /// Path to the YAML file
        file: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_admin(&email, &name, password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Faqs { file } => commands::seed::faqs(&file).await?,
        },
    }
    Ok(())
}
