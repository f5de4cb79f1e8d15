//! Users command - Account administration.

use std::sync::Arc;

use validator::Validate;

use crate::cli::args::{CreateUserArgs, UsersAction, UsersArgs};
use crate::config::Config;
use crate::domain::NewUser;
use crate::errors::{AppError, AppResult, FormErrors};
use crate::infra::{Database, UserStore};
use crate::services::{AccountManager, AccountService};

/// Execute the users command
pub async fn execute(args: UsersArgs, config: Config) -> AppResult<()> {
    match args.action {
        UsersAction::Create(create) => create_user(create, config).await,
    }
}

async fn create_user(args: CreateUserArgs, config: Config) -> AppResult<()> {
    if let Err(e) = args.validate() {
        return Err(AppError::Validation(FormErrors::from_validation(&e)));
    }

    let db = Database::connect(&config).await?;
    let accounts = AccountManager::new(Arc::new(UserStore::new(db.get_connection())));

    let new_user = NewUser::new(&args.email, &args.username, &args.password);
    match accounts.register(new_user).await {
        Ok(user) => {
            println!("Created user {} ({}) with id {}", user.username, user.email, user.id);
            Ok(())
        }
        Err(AppError::Validation(errors)) => {
            for (field, messages) in errors.iter() {
                for message in messages {
                    eprintln!("{}: {}", field, message);
                }
            }
            Err(AppError::Validation(errors))
        }
        Err(e) => Err(e),
    }
}
