//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Args, Parser, Subcommand};
use validator::Validate;

/// Userbase - user registration and session login
#[derive(Parser, Debug)]
#[command(name = "userbase")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage user accounts
    Users(UsersArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to [default: SERVER_HOST or 0.0.0.0]
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on [default: SERVER_PORT or 3000]
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the users command
#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

/// Account actions
#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// Create an account (e.g. seed an administrator)
    Create(CreateUserArgs),
}

/// Arguments for `users create`
#[derive(Args, Validate)]
pub struct CreateUserArgs {
    #[arg(long)]
    #[validate(email(message = "Invalid email address."))]
    pub email: String,

    #[arg(long)]
    #[validate(length(min = 3, max = 25, message = "Username must be 3 to 25 characters."))]
    pub username: String,

    /// Prefer the environment variable over the flag to keep it out of shell history
    #[arg(long, env = "USERBASE_PASSWORD", hide_env_values = true)]
    #[validate(length(min = 6, max = 25, message = "Password must be 6 to 25 characters."))]
    pub password: String,
}

impl std::fmt::Debug for CreateUserArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserArgs")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users_create() {
        let cli = Cli::try_parse_from([
            "userbase",
            "users",
            "create",
            "--email",
            "admin@example.com",
            "--username",
            "admin",
            "--password",
            "changeme",
        ])
        .unwrap();

        match cli.command {
            Commands::Users(UsersArgs {
                action: UsersAction::Create(args),
            }) => {
                assert_eq!(args.username, "admin");
                assert!(args.validate().is_ok());
                assert!(!format!("{:?}", args).contains("changeme"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["userbase", "-v", "serve", "--port", "8080"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.host, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
