//! Builds adapters and use-case deps from the effective config.

use codescope_adapters::{
    FirebaseIdentity, FirebaseIdentityConfig, HttpCodeSearchApi, HttpCodeSearchApiConfig,
    JsonLogger, LocalFileDelivery, StderrLogSink,
};
use codescope_app::{AuthDeps, CodeSearchDeps, ExportDeps, IndexRepositoryInput};
use codescope_config::{
    ClientEnv, ENV_IDENTITY_API_KEY, LogLevelSetting, ValidatedClientConfig,
    load_client_config_from_path,
};
use codescope_domain::{DEFAULT_PROGRESS_STEP, RepositoryId};
use codescope_ports::{LogFields, LogLevel, LoggerPort};
use codescope_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result, SecretString};
use std::path::Path;
use std::sync::Arc;

/// Shown when sign-in is attempted without an identity API key.
pub const MISSING_API_KEY_MESSAGE: &str = "Sign-in requires CODESCOPE_IDENTITY_API_KEY";

/// Everything a command needs to talk to the services.
pub struct ClientRuntime {
    pub config: ValidatedClientConfig,
    pub ctx: RequestContext,
    identity_api_key: Option<SecretString>,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl ClientRuntime {
    /// Load config from the process env, an optional file, and overrides.
    pub fn load(
        config_path: Option<&Path>,
        overrides_json: Option<&str>,
        no_progress: bool,
    ) -> Result<Self> {
        let env = ClientEnv::from_std_env().map_err(ErrorEnvelope::from)?;
        let config = load_client_config_from_path(config_path, overrides_json, &env)?;
        let ctx = RequestContext::new_request();
        let logger = (!no_progress).then(|| build_logger(&config, &ctx));

        Ok(Self {
            config,
            ctx,
            identity_api_key: env.identity_api_key,
            logger,
        })
    }

    pub fn code_search_deps(&self) -> Result<CodeSearchDeps> {
        let api = HttpCodeSearchApi::new(&HttpCodeSearchApiConfig::from_client_config(
            &self.config,
        ))?;
        let deps = CodeSearchDeps::new(Arc::new(api));
        Ok(match &self.logger {
            Some(logger) => deps.with_logger(Arc::clone(logger)),
            None => deps,
        })
    }

    pub fn export_deps(&self) -> ExportDeps {
        ExportDeps {
            delivery: Arc::new(LocalFileDelivery::new(&self.config.export.output_dir)),
            logger: self.logger.clone(),
        }
    }

    pub fn auth_deps(&self) -> Result<AuthDeps> {
        let api_key = self
            .identity_api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ErrorEnvelope::expected(
                    ErrorCode::new("config", "missing_identity_api_key"),
                    MISSING_API_KEY_MESSAGE,
                )
                .with_metadata("env", ENV_IDENTITY_API_KEY)
            })?;
        let identity = FirebaseIdentity::new(&FirebaseIdentityConfig::from_client_config(
            &self.config,
            api_key,
        ))?;
        Ok(AuthDeps {
            identity: Arc::new(identity),
            logger: self.logger.clone(),
        })
    }

    /// Indexing input using the configured tick interval and step.
    pub fn index_input(&self, repository_id: RepositoryId) -> IndexRepositoryInput {
        let limits = self.config.limits();
        IndexRepositoryInput {
            repository_id,
            tick_interval: limits.indexing_tick_interval_ms.as_millis(),
            step: u8::try_from(limits.indexing_step.get()).unwrap_or(DEFAULT_PROGRESS_STEP),
        }
    }
}

fn build_logger(config: &ValidatedClientConfig, ctx: &RequestContext) -> Arc<dyn LoggerPort> {
    let base_fields = LogFields::from([(
        "correlationId".into(),
        ctx.correlation_id().as_str().into(),
    )]);
    Arc::new(
        JsonLogger::new(Arc::new(StderrLogSink))
            .with_min_level(log_level(config.log.level))
            .with_format(config.log.format)
            .with_base_fields(base_fields),
    )
}

const fn log_level(setting: LogLevelSetting) -> LogLevel {
    match setting {
        LogLevelSetting::Debug => LogLevel::Debug,
        LogLevelSetting::Info => LogLevel::Info,
        LogLevelSetting::Warn => LogLevel::Warn,
        LogLevelSetting::Error => LogLevel::Error,
    }
}
