//! Repository use cases: list, add, inspect, index, delete, and read files.

use crate::client::{CodeSearchDeps, cancelled, field, log_outcome};
use codescope_domain::{
    Acknowledgement, DEFAULT_PROGRESS_STEP, IndexingAccepted, IndexingProgress, NewRepository,
    ProgressTick, RepositoryId, RepositoryKind, RepositorySummary,
};
use codescope_ports::{FileContentRequest, LogFields};
use codescope_shared::{ErrorCode, RequestContext, Result, ResultExt};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Shown when the repository list cannot be loaded.
pub const LIST_FAILED_MESSAGE: &str = "Failed to load repositories";
/// Shown when a repository cannot be added.
pub const ADD_FAILED_MESSAGE: &str = "Failed to add repository";
/// Shown when repository details cannot be loaded.
pub const DETAIL_FAILED_MESSAGE: &str = "Failed to fetch repository details";
/// Shown when indexing cannot be started.
pub const INDEX_FAILED_MESSAGE: &str = "Failed to start indexing";
/// Shown when a repository cannot be deleted.
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete repository";
/// Placeholder text returned in place of file content that failed to load.
pub const FILE_CONTENT_ERROR_PLACEHOLDER: &str = "// Error loading file content";

/// Default delay between progress ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Input payload for adding a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRepositoryInput {
    /// Display name.
    pub name: Box<str>,
    /// Local path or remote URL.
    pub path: Box<str>,
    /// `connect` or `upload`.
    pub kind: Box<str>,
}

/// Input payload for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRepositoryInput {
    /// Repository to index.
    pub repository_id: RepositoryId,
    /// Delay between progress ticks.
    pub tick_interval: Duration,
    /// Percent added per tick.
    pub step: u8,
}

impl IndexRepositoryInput {
    /// Input with the default ticker settings.
    #[must_use]
    pub const fn new(repository_id: RepositoryId) -> Self {
        Self {
            repository_id,
            tick_interval: DEFAULT_TICK_INTERVAL,
            step: DEFAULT_PROGRESS_STEP,
        }
    }
}

/// Output of a completed indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRepositoryOutput {
    /// Service acknowledgement of the start request.
    pub accepted: IndexingAccepted,
    /// Repository as refetched after the progress animation.
    pub repository: RepositorySummary,
}

/// List registered repositories.
#[tracing::instrument(name = "list_repositories", skip_all)]
pub async fn list_repositories(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
) -> Result<Vec<RepositorySummary>> {
    let result = deps
        .api
        .list_repositories(ctx)
        .await
        .user_facing(ErrorCode::new("repository", "list_failed"), LIST_FAILED_MESSAGE);
    let mut fields = LogFields::new();
    if let Ok(repositories) = &result {
        fields.insert("count".into(), repositories.len().into());
    }
    log_outcome(deps.logger.as_ref(), "repositories.list", &result, fields);
    result
}

/// Register a repository. Name, path, and kind are validated first.
#[tracing::instrument(name = "add_repository", skip_all, fields(name = %input.name))]
pub async fn add_repository(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    input: AddRepositoryInput,
) -> Result<RepositorySummary> {
    let kind = RepositoryKind::parse(&input.kind)?;
    let request = NewRepository::new(&input.name, &input.path, kind)?;
    let fields = LogFields::from([
        field("name", request.name()),
        field("kind", kind.as_str()),
    ]);

    let result = deps
        .api
        .create_repository(ctx, request)
        .await
        .user_facing(ErrorCode::new("repository", "create_failed"), ADD_FAILED_MESSAGE);
    log_outcome(deps.logger.as_ref(), "repositories.add", &result, fields);
    result
}

/// Fetch one repository's details.
#[tracing::instrument(name = "load_repository", skip_all, fields(repository_id = %id))]
pub async fn load_repository(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    id: RepositoryId,
) -> Result<RepositorySummary> {
    deps.api
        .get_repository(ctx, id)
        .await
        .user_facing(ErrorCode::new("repository", "load_failed"), DETAIL_FAILED_MESSAGE)
}

/// Start indexing, animate progress, then refetch the repository.
///
/// The service reports no progress, so `on_progress` receives synthetic
/// percentages (`step`, `2 * step`, ... up to 100), one per `tick_interval`.
/// Cancelling `ctx` stops the animation.
#[tracing::instrument(
    name = "index_repository",
    skip_all,
    fields(repository_id = %input.repository_id)
)]
pub async fn index_repository<F>(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    input: IndexRepositoryInput,
    mut on_progress: F,
) -> Result<IndexRepositoryOutput>
where
    F: FnMut(u8) + Send,
{
    let fields = LogFields::from([field("repositoryId", input.repository_id.to_string())]);

    let result: Result<IndexRepositoryOutput> = async {
        let accepted = deps
            .api
            .start_indexing(ctx, input.repository_id.clone())
            .await
            .user_facing(ErrorCode::new("repository", "index_failed"), INDEX_FAILED_MESSAGE)?;

        run_progress(ctx, input.tick_interval, input.step, &mut on_progress).await?;

        let repository = deps
            .api
            .get_repository(ctx, input.repository_id.clone())
            .await
            .user_facing(ErrorCode::new("repository", "load_failed"), DETAIL_FAILED_MESSAGE)?;
        Ok(IndexRepositoryOutput {
            accepted,
            repository,
        })
    }
    .await;

    log_outcome(deps.logger.as_ref(), "repositories.index", &result, fields);
    result
}

async fn run_progress<F>(
    ctx: &RequestContext,
    interval: Duration,
    step: u8,
    on_progress: &mut F,
) -> Result<()>
where
    F: FnMut(u8) + Send,
{
    let period = interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut progress = IndexingProgress::new(step);

    loop {
        tokio::select! {
            biased;
            () = ctx.cancelled() => return Err(cancelled("index_repository.progress")),
            _ = ticker.tick() => {},
        }
        match progress.tick() {
            ProgressTick::Advanced { percent } => {
                tracing::debug!(percent, "indexing progress");
                on_progress(percent);
            },
            ProgressTick::Complete => return Ok(()),
        }
    }
}

/// Delete a repository.
#[tracing::instrument(name = "delete_repository", skip_all, fields(repository_id = %id))]
pub async fn delete_repository(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    id: RepositoryId,
) -> Result<Acknowledgement> {
    let fields = LogFields::from([field("repositoryId", id.to_string())]);
    let result = deps
        .api
        .delete_repository(ctx, id)
        .await
        .user_facing(ErrorCode::new("repository", "delete_failed"), DELETE_FAILED_MESSAGE);
    log_outcome(deps.logger.as_ref(), "repositories.delete", &result, fields);
    result
}

/// Load a file's text. Any failure other than cancellation yields
/// [`FILE_CONTENT_ERROR_PLACEHOLDER`] instead of an error.
#[tracing::instrument(
    name = "load_file_content",
    skip_all,
    fields(repository_id = %request.repository_id, path = %request.path)
)]
pub async fn load_file_content(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    request: FileContentRequest,
) -> Result<String> {
    let path = request.path.clone();
    match deps.api.get_file_content(ctx, request).await {
        Ok(text) => Ok(text),
        Err(error) if error.is_cancelled() => Err(error),
        Err(error) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.warn(
                    "repositories.file.failed",
                    &error.message,
                    Some(LogFields::from([
                        field("path", &*path),
                        field("code", error.code.to_string()),
                    ])),
                );
            }
            Ok(FILE_CONTENT_ERROR_PLACEHOLDER.to_owned())
        },
    }
}
