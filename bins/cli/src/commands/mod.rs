mod auth;
mod code;
mod config;
mod history;
mod info;
mod repos;
mod search;

pub use auth::{AuthCommandInput, PasswordSource, run_auth};
pub use code::{CodeAction, run_code};
pub use config::{ConfigAction, run_config};
pub use history::{HistoryAction, run_history};
pub use info::run_info;
pub use repos::{AddRepositoryArgs, ReposAction, run_repos};
pub use search::{SearchCommandInput, run_search};
