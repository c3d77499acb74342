//! Repository command handlers.

use super::history::format_acknowledgement;
use crate::error::CliError;
use crate::format::{
    CliOutput, OutputMode, format_ndjson_summary, json_document, log_info, ndjson_line,
};
use crate::runtime::ClientRuntime;
use clap::{Args, Subcommand};
use codescope_app::{
    AddRepositoryInput, add_repository, delete_repository, index_repository, list_repositories,
    load_file_content, load_repository,
};
use codescope_domain::{RepositoryId, RepositorySummary};
use codescope_ports::FileContentRequest;
use codescope_shared::ErrorEnvelope;
use serde_json::json;
use std::io::Write;

#[derive(Debug, Args)]
pub struct AddRepositoryArgs {
    /// Display name.
    #[arg(long)]
    pub name: String,
    /// Local path or remote URL.
    #[arg(long)]
    pub path: String,
    /// Registration type: `connect` or `upload`.
    #[arg(long, default_value = "connect")]
    pub kind: String,
}

#[derive(Debug, Subcommand)]
pub enum ReposAction {
    /// List registered repositories.
    List,
    /// Register a repository.
    Add(AddRepositoryArgs),
    /// Show one repository with its file list.
    Show {
        /// Repository id.
        id: String,
    },
    /// Start indexing and wait for it to finish.
    Index {
        /// Repository id.
        id: String,
    },
    /// Delete a repository.
    Delete {
        /// Repository id.
        id: String,
    },
    /// Print one file from a repository.
    File {
        /// Repository id.
        id: String,
        /// File path inside the repository.
        #[arg(long)]
        path: String,
    },
}

/// Run a repos subcommand.
pub async fn run_repos(
    mode: OutputMode,
    runtime: &ClientRuntime,
    action: &ReposAction,
) -> Result<CliOutput, CliError> {
    let deps = runtime.code_search_deps()?;
    let ctx = &runtime.ctx;
    let mut stderr = String::new();

    let stdout = match action {
        ReposAction::List => {
            let repositories = list_repositories(ctx, &deps).await?;
            if mode.is_ndjson() {
                let mut out = String::new();
                for repository in &repositories {
                    out.push_str(&ndjson_line("repository", repository)?);
                }
                out.push_str(&format_ndjson_summary(
                    "ok",
                    "repositories",
                    Some(json!({ "count": repositories.len() })),
                ));
                out
            } else if mode.is_json() {
                json_document(&json!({ "status": "ok", "repositories": repositories }))?
            } else {
                format_repository_list(&repositories)
            }
        },
        ReposAction::Add(args) => {
            let repository = add_repository(
                ctx,
                &deps,
                AddRepositoryInput {
                    name: args.name.as_str().into(),
                    path: args.path.as_str().into(),
                    kind: args.kind.as_str().into(),
                },
            )
            .await?;
            log_info(&mut stderr, "repository added", mode.no_progress);
            format_repository(mode, &repository)?
        },
        ReposAction::Show { id } => {
            let repository = load_repository(ctx, &deps, parse_id(id)?).await?;
            format_repository(mode, &repository)?
        },
        ReposAction::Index { id } => {
            let input = runtime.index_input(parse_id(id)?);
            let show_progress = !mode.no_progress;
            let output = index_repository(ctx, &deps, input, move |percent| {
                if show_progress {
                    let _ = writeln!(std::io::stderr(), "indexing: {percent}%");
                }
            })
            .await?;
            if let Some(message) = output.accepted.message.as_deref() {
                log_info(&mut stderr, message, mode.no_progress);
            }
            format_repository(mode, &output.repository)?
        },
        ReposAction::Delete { id } => {
            let ack = delete_repository(ctx, &deps, parse_id(id)?).await?;
            format_acknowledgement(mode, "repository", &ack)?
        },
        ReposAction::File { id, path } => {
            let request = FileContentRequest {
                repository_id: parse_id(id)?,
                path: path.as_str().into(),
            };
            let content = load_file_content(ctx, &deps, request).await?;
            if mode.is_ndjson() {
                format_ndjson_summary("ok", "file", Some(json!({ "path": path, "content": content })))
            } else if mode.is_json() {
                json_document(&json!({ "status": "ok", "path": path, "content": content }))?
            } else {
                let mut out = content;
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out
            }
        },
    };

    Ok(CliOutput::ok(stdout, stderr))
}

fn parse_id(input: &str) -> Result<RepositoryId, ErrorEnvelope> {
    RepositoryId::parse(input).map_err(ErrorEnvelope::from)
}

fn format_repository(mode: OutputMode, repository: &RepositorySummary) -> Result<String, CliError> {
    if mode.is_ndjson() {
        return Ok(format_ndjson_summary(
            "ok",
            "repository",
            Some(json!({ "repository": repository })),
        ));
    }
    if mode.is_json() {
        return json_document(&json!({ "status": "ok", "repository": repository }));
    }

    let mut out = String::from("status: ok\n");
    out.push_str(&format!("id: {}\nname: {}\n", repository.id, repository.name));
    out.push_str(&format!("index: {}\n", repository.index_label()));
    if let Some(status) = repository.status.as_deref() {
        out.push_str(&format!("state: {status}\n"));
    }
    if let Some(path) = repository.path.as_deref() {
        out.push_str(&format!("path: {path}\n"));
    }
    if let Some(count) = repository.file_count {
        out.push_str(&format!("files: {count}\n"));
    }
    if let Some(description) = repository.description.as_deref() {
        out.push_str(&format!("description: {description}\n"));
    }
    if let Some(files) = repository.file_list.as_deref() {
        for file in files {
            out.push_str("  ");
            out.push_str(file);
            out.push('\n');
        }
    }
    Ok(out)
}

fn format_repository_list(repositories: &[RepositorySummary]) -> String {
    let mut out = format!("status: ok\nrepositories: {}\n", repositories.len());
    for repository in repositories {
        out.push_str(&format!(
            "{}  {}  [{}]\n",
            repository.id,
            repository.name,
            repository.index_label(),
        ));
    }
    out
}
