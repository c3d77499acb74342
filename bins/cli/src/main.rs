//! CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod runtime;
mod telemetry;

use clap::{Args, Parser, Subcommand};
use commands::{
    AuthCommandInput, CodeAction, ConfigAction, HistoryAction, PasswordSource, ReposAction,
    SearchCommandInput, run_auth, run_code, run_config, run_history, run_info, run_repos,
    run_search,
};
use error::CliError;
use format::{CliOutput, OutputArgs, OutputMode, format_error_output};
use runtime::ClientRuntime;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "codescope",
    version,
    about = "Client for the codescope semantic code search service",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Config file path (JSON or TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Partial config JSON applied on top of the config file.
    #[arg(long, global = true)]
    overrides_json: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show version details.
    Info,
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage repositories registered with the service.
    Repos {
        #[command(subcommand)]
        action: ReposAction,
    },
    /// Search code.
    Search {
        /// Search query text (at least 3 characters after trimming).
        #[arg(long)]
        query: String,
        /// Restrict the search to one repository.
        #[arg(long)]
        repo_id: Option<String>,
        /// Export results as Markdown; the name defaults to `search-results`.
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        export: Option<String>,
    },
    /// Show, explain, or export code snippets.
    Code {
        #[command(subcommand)]
        action: CodeAction,
    },
    /// Search history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Sign in or create an account.
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Debug, Subcommand)]
enum AuthAction {
    /// Sign in with email and password.
    Login(AuthArgs),
    /// Create an account.
    Signup(AuthArgs),
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[arg(long)]
    email: String,
    /// Account password; prefer `CODESCOPE_PASSWORD` or `--password-stdin`.
    #[arg(long, env = "CODESCOPE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Read the password from the first line of stdin.
    #[arg(long, conflicts_with = "password")]
    password_stdin: bool,
    /// Print the issued ID token.
    #[arg(long)]
    show_token: bool,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    let output = match run(&cli, mode) {
        Ok(output) => output,
        Err(CliError::Envelope(error)) => format_error_output(mode, &error),
        Err(error) => return exit_with_error(&error),
    };
    match write_output(&output) {
        Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    match &cli.command {
        Commands::Info | Commands::Config { .. } => run_local(cli, mode),
        command => {
            let client = ClientRuntime::load(
                cli.config.as_deref(),
                cli.overrides_json.as_deref(),
                mode.no_progress,
            )?;
            telemetry::init_tracing(&client.config, mode.no_progress);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async {
                let watcher = spawn_interrupt_watcher(&client);
                let result = run_remote(command, mode, &client).await;
                watcher.abort();
                result
            })
        },
    }
}

fn run_local(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    match &cli.command {
        Commands::Config { action } => run_config(
            mode,
            action,
            cli.config.as_deref(),
            cli.overrides_json.as_deref(),
        ),
        _ => run_info(mode),
    }
}

async fn run_remote(
    command: &Commands,
    mode: OutputMode,
    client: &ClientRuntime,
) -> Result<CliOutput, CliError> {
    match command {
        Commands::Repos { action } => run_repos(mode, client, action).await,
        Commands::Search {
            query,
            repo_id,
            export,
        } => {
            run_search(
                mode,
                client,
                SearchCommandInput {
                    query,
                    repo_id: repo_id.as_deref(),
                    export: export.as_deref(),
                },
            )
            .await
        },
        Commands::Code { action } => run_code(mode, client, action).await,
        Commands::History { action } => run_history(mode, client, action).await,
        Commands::Auth { action } => {
            let (args, sign_up) = match action {
                AuthAction::Login(args) => (args, false),
                AuthAction::Signup(args) => (args, true),
            };
            run_auth(
                mode,
                client,
                AuthCommandInput {
                    email: &args.email,
                    password: if args.password_stdin {
                        PasswordSource::Stdin
                    } else {
                        args.password
                            .as_deref()
                            .map_or(PasswordSource::Missing, PasswordSource::Value)
                    },
                    sign_up,
                    show_token: args.show_token,
                },
            )
            .await
        },
        Commands::Info | Commands::Config { .. } => {
            Err(CliError::InvalidInput("command does not use the service".to_owned()))
        },
    }
}

/// Cancel the request context on Ctrl-C.
fn spawn_interrupt_watcher(client: &ClientRuntime) -> tokio::task::JoinHandle<()> {
    let token = client.ctx.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn version_flag_is_supported() {
        let result = Cli::command().try_get_matches_from(["codescope", "--version"]);
        let is_version = matches!(
            result,
            Err(error) if error.kind() == clap::error::ErrorKind::DisplayVersion
        );

        assert!(is_version, "expected clap to render version");
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_export_flag_uses_default_name() -> Result<(), clap::Error> {
        let cli = parse(&["codescope", "search", "--query", "print", "--export"])?;
        let Commands::Search { export, .. } = cli.command else {
            return Err(clap::Error::new(clap::error::ErrorKind::InvalidSubcommand));
        };
        assert_eq!(export.as_deref(), Some(""));

        let cli = parse(&["codescope", "search", "--query", "print", "--export", "mine"])?;
        let Commands::Search { export, .. } = cli.command else {
            return Err(clap::Error::new(clap::error::ErrorKind::InvalidSubcommand));
        };
        assert_eq!(export.as_deref(), Some("mine"));
        Ok(())
    }

    #[test]
    fn repository_kind_defaults_to_connect() -> Result<(), clap::Error> {
        let cli = parse(&["codescope", "repos", "add", "--name", "demo", "--path", "/src"])?;
        let Commands::Repos {
            action: ReposAction::Add(args),
        } = cli.command
        else {
            return Err(clap::Error::new(clap::error::ErrorKind::InvalidSubcommand));
        };
        assert_eq!(args.kind, "connect");
        Ok(())
    }

    #[test]
    fn password_flag_and_stdin_are_exclusive() -> Result<(), clap::Error> {
        let cli = parse(&["codescope", "auth", "login", "--email", "a@b.c", "--password-stdin"])?;
        let Commands::Auth {
            action: AuthAction::Login(args),
        } = cli.command
        else {
            return Err(clap::Error::new(clap::error::ErrorKind::InvalidSubcommand));
        };
        assert!(args.password_stdin);

        let both = parse(&[
            "codescope", "auth", "login", "--email", "a@b.c", "--password", "pw", "--password-stdin",
        ]);
        assert!(both.is_err());
        Ok(())
    }

    #[test]
    fn global_flags_follow_the_subcommand() -> Result<(), clap::Error> {
        let cli = parse(&["codescope", "history", "list", "--agent", "--config", "c.toml"])?;
        let mode = OutputMode::from_args(&cli.output);
        assert!(mode.is_ndjson());
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        Ok(())
    }
}
