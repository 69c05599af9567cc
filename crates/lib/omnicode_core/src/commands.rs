//! User-initiated commands: account actions, the three code operations,
//! usage reconciliation and the dashboard.
//!
//! Every command is scoped to one invocation; failures come back as a
//! [`CommandError`] for the host to show and never leave shared state
//! half-updated.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, RemoteOperations};
use crate::auth::{
    AuthError, CognitoClient, IdentityProvider, SignUpOutcome, jwt::decode_subject,
    validate_credentials,
};
use crate::comment::wrap_in_comment;
use crate::config::OmnicodeConfig;
use crate::dashboard::{
    DashboardClient, DashboardError, PresignError, PresignedUrl, Presigner,
};
use crate::models::usage::{DashboardSummary, FeatureKind, UsageRecord};
use crate::session::{FileSessionStore, SessionError, SessionStore};
use crate::trigger::{DEFAULT_QUIET_INTERVAL, EditorHost, SuggestionTrigger};
use crate::usage::{FileUsageStore, UsageError, UsageRecorder};

/// Command-level errors, one variant per kind of user-facing outcome.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Bad input; nothing was sent anywhere.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("You must be logged in to use this command.")]
    NotLoggedIn,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AccessDenied(String),
}

impl From<AuthError> for CommandError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::ValidationError(msg) => CommandError::Validation(msg),
            AuthError::ConfigError(msg) => CommandError::Validation(msg),
            other => CommandError::Unavailable(other.to_string()),
        }
    }
}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        CommandError::Unavailable(e.to_string())
    }
}

impl From<SessionError> for CommandError {
    fn from(e: SessionError) -> Self {
        CommandError::Unavailable(e.to_string())
    }
}

impl From<UsageError> for CommandError {
    fn from(e: UsageError) -> Self {
        match e {
            UsageError::NotFound { .. } => CommandError::NotFound(e.to_string()),
            other => CommandError::Unavailable(other.to_string()),
        }
    }
}

impl From<PresignError> for CommandError {
    fn from(e: PresignError) -> Self {
        CommandError::Validation(e.to_string())
    }
}

impl From<DashboardError> for CommandError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::AccessDenied(_) => CommandError::AccessDenied(e.to_string()),
            DashboardError::Presign(inner) => inner.into(),
            other => CommandError::Unavailable(other.to_string()),
        }
    }
}

/// Where the per-user dashboard object lives.
#[derive(Debug, Clone)]
pub struct DashboardSource {
    pub presigner: Presigner,
    /// Object key template; `{user_id}` is substituted.
    pub object_key: String,
    pub ttl_secs: u64,
    pub client: DashboardClient,
}

/// The command surface over its collaborators.
#[derive(Clone)]
pub struct Assistant {
    identity: Arc<dyn IdentityProvider>,
    remote: Arc<dyn RemoteOperations>,
    session: Arc<dyn SessionStore>,
    usage: Option<UsageRecorder>,
    dashboard: Option<DashboardSource>,
    quiet_interval: Duration,
}

impl Assistant {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        remote: Arc<dyn RemoteOperations>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            identity,
            remote,
            session,
            usage: None,
            dashboard: None,
            quiet_interval: DEFAULT_QUIET_INTERVAL,
        }
    }

    pub fn with_quiet_interval(mut self, quiet: Duration) -> Self {
        self.quiet_interval = quiet;
        self
    }

    pub fn with_usage(mut self, usage: UsageRecorder) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_dashboard(mut self, dashboard: DashboardSource) -> Self {
        self.dashboard = Some(dashboard);
        self
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &OmnicodeConfig, http: reqwest::Client) -> Self {
        let identity = CognitoClient::new(
            http.clone(),
            config.cognito_endpoint.clone(),
            config.cognito_client_id.clone(),
        );
        let remote = ApiClient::new(http.clone(), config.endpoints.clone());
        let session = FileSessionStore::in_dir(&config.data_dir);
        let usage = UsageRecorder::new(Arc::new(FileUsageStore::in_dir(&config.data_dir)));

        Self::new(Arc::new(identity), Arc::new(remote), Arc::new(session))
            .with_usage(usage)
            .with_quiet_interval(config.quiet_interval)
            .with_dashboard(DashboardSource {
                presigner: config.presigner(),
                object_key: config.object_key.clone(),
                ttl_secs: config.dashboard_ttl_secs,
                client: DashboardClient::new(http),
            })
    }

    /// Validate the credentials, then create the account.
    pub async fn register(&self, email: &str, password: &str) -> Result<SignUpOutcome, CommandError> {
        validate_credentials(email, password)?;
        let outcome = self.identity.register(email, password).await?;
        info!(user_sub = %outcome.user_sub, "registered");
        Ok(outcome)
    }

    pub async fn confirm(&self, email: &str, code: &str) -> Result<(), CommandError> {
        self.identity.confirm(email, code.trim()).await?;
        Ok(())
    }

    /// Validate the credentials, log in and persist the bundle. Returns the
    /// signed-in user id.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, CommandError> {
        validate_credentials(email, password)?;
        let tokens = self.identity.login(email, password).await?;
        let user_id = decode_subject(&tokens.access_token)?;
        self.session.save(&tokens)?;
        info!(%user_id, "logged in");
        Ok(user_id)
    }

    /// Drop the stored session. Returns whether anything was stored; an
    /// unreadable session counts and is removed too.
    pub fn logout(&self) -> Result<bool, CommandError> {
        let had_session = match self.session.load() {
            Ok(tokens) => tokens.is_some(),
            Err(e) => {
                warn!(error = %e, "discarding unreadable session");
                true
            }
        };
        self.session.clear()?;
        Ok(had_session)
    }

    pub fn whoami(&self) -> Option<String> {
        self.session.current_user_id()
    }

    fn require_user(&self) -> Result<String, CommandError> {
        self.session
            .current_user_id()
            .ok_or(CommandError::NotLoggedIn)
    }

    /// One-shot completion for `text`.
    pub async fn complete(&self, language: &str, text: &str) -> Result<String, CommandError> {
        let user_id = self.require_user()?;
        let suggestion = self
            .remote
            .request_completion(&user_id, language, text)
            .await?;
        self.record(&user_id, FeatureKind::CodeCompletion, language, None)
            .await;
        Ok(suggestion)
    }

    /// Refactored replacement for `text`.
    pub async fn refactor(&self, language: &str, text: &str) -> Result<String, CommandError> {
        let user_id = self.require_user()?;
        let refactored = self.remote.request_refactor(&user_id, language, text).await?;
        self.record(
            &user_id,
            FeatureKind::RefactorCode,
            language,
            Some(refactored.len() as u64),
        )
        .await;
        Ok(refactored)
    }

    /// Documentation for `text`, already framed in `language`'s comment syntax.
    pub async fn document(&self, language: &str, text: &str) -> Result<String, CommandError> {
        let user_id = self.require_user()?;
        let doc = self
            .remote
            .request_doc_comment(&user_id, language, text)
            .await?;
        let wrapped = wrap_in_comment(&doc, language);
        self.record(
            &user_id,
            FeatureKind::DocString,
            language,
            Some(wrapped.len() as u64),
        )
        .await;
        Ok(wrapped)
    }

    /// Debounced completion trigger for `editor`, sharing this assistant's
    /// session and usage log. Must be called within a Tokio runtime.
    pub fn suggestion_trigger(&self, editor: Arc<dyn EditorHost>) -> SuggestionTrigger {
        let trigger = SuggestionTrigger::new(
            self.remote.clone(),
            editor,
            self.session.clone(),
            self.quiet_interval,
        );
        match &self.usage {
            Some(usage) => trigger.with_usage(usage.clone()),
            None => trigger,
        }
    }

    /// Settle the signed-in user's latest completion record.
    pub async fn reconcile(&self, accepted: bool, bytes: u64) -> Result<UsageRecord, CommandError> {
        let user_id = self.require_user()?;
        let usage = self
            .usage
            .as_ref()
            .ok_or_else(|| CommandError::Unavailable("usage tracking is not configured".into()))?;
        Ok(usage.reconcile(&user_id, accepted, bytes).await?)
    }

    /// Summary built from the locally recorded usage.
    pub async fn local_summary(&self, now: DateTime<Utc>) -> Result<DashboardSummary, CommandError> {
        let user_id = self.require_user()?;
        let usage = self
            .usage
            .as_ref()
            .ok_or_else(|| CommandError::Unavailable("usage tracking is not configured".into()))?;
        Ok(usage.summary(&user_id, now).await?)
    }

    /// Presigned URL for the signed-in user's dashboard object.
    pub fn dashboard_url(&self, now: DateTime<Utc>) -> Result<PresignedUrl, CommandError> {
        let user_id = self.require_user()?;
        let source = self.dashboard_source()?;
        let key = source.object_key.replace("{user_id}", &user_id);
        Ok(source.presigner.presign_get(&key, source.ttl_secs, now)?)
    }

    /// Fetch the signed-in user's dashboard summary.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardSummary, CommandError> {
        let url = self.dashboard_url(now)?;
        let source = self.dashboard_source()?;
        Ok(source.client.fetch(&url, now).await?)
    }

    fn dashboard_source(&self) -> Result<&DashboardSource, CommandError> {
        self.dashboard
            .as_ref()
            .ok_or_else(|| CommandError::Unavailable("dashboard is not configured".into()))
    }

    /// Usage recording never fails the command it belongs to.
    async fn record(&self, user_id: &str, feature: FeatureKind, language: &str, bytes: Option<u64>) {
        let Some(usage) = &self.usage else {
            return;
        };
        if let Err(e) = usage
            .record(user_id, feature, language, bytes, Utc::now())
            .await
        {
            warn!(error = %e, %feature, "failed to record usage");
        }
    }
}
