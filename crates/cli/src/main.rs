//! Cafe CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations and create the session table
//! cafe-cli migrate
//!
//! # Create the first admin account (password from CAFE_OWNER_PASSWORD)
//! cafe-cli owner create -u priya -e priya@cafe.example -n "Priya Nair" -r admin
//!
//! # Load the starter menu into an empty database
//! cafe-cli seed menu
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cafe-cli")]
#[command(author, version, about = "Cafe CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage owner (staff) accounts
    Owner {
        #[command(subcommand)]
        action: OwnerAction,
    },
    /// Seed the database with starter data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum OwnerAction {
    /// Create a new owner account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Role (`staff`, `manager`, `admin`)
        #[arg(short, long, default_value = "staff")]
        role: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the starter menu if the menu is empty
    Menu,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Owner { action } => match action {
            OwnerAction::Create {
                username,
                email,
                name,
                phone,
                role,
            } => {
                commands::owner::create(&commands::owner::CreateOwner {
                    username: &username,
                    email: &email,
                    full_name: &name,
                    phone: phone.as_deref(),
                    role: &role,
                })
                .await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Menu => {
                commands::seed::menu().await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
