//! High-level facade over the request pipeline

use cozeflow_client::{
    ClientError, Executor, HttpTransport, NormalizedResult, RetryOptions, Transport, WorkflowCall,
    extract_mode, normalize,
};
use cozeflow_config::Config;
use std::sync::Arc;
use tracing::{info, warn};

/// Client for the configured generate and mode-check workflows.
///
/// Construction resolves the bearer token and builds the shared HTTP
/// transport once; each call then runs the full pipeline: build request,
/// execute with retry, normalize the envelope.
pub struct WorkflowClient {
    config: Config,
    bearer_token: String,
    executor: Executor,
}

impl WorkflowClient {
    /// Build a client over the production HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` when required config fields
    /// are missing, the token environment variable is unset, or the HTTP
    /// client cannot be constructed.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        config
            .validate()
            .map_err(|e| ClientError::Misconfiguration(e.to_string()))?;
        let bearer_token = config
            .resolve_auth_token()
            .map_err(|e| ClientError::Misconfiguration(e.to_string()))?;
        let transport = Arc::new(HttpTransport::new()?);
        Ok(Self::with_transport(config, bearer_token, transport))
    }

    /// Build a client over an injected transport.
    ///
    /// Tests and embedders use this to substitute a fake transport; no
    /// validation is applied, the caller owns the config's completeness.
    #[must_use]
    pub fn with_transport(
        config: Config,
        bearer_token: String,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let executor = Executor::new(transport, config.backoff.clone());
        Self {
            config,
            bearer_token,
            executor,
        }
    }

    /// Retry budget derived from configuration.
    #[must_use]
    pub fn retry_options(&self) -> RetryOptions {
        RetryOptions::from_config(&self.config.api)
    }

    /// Run the generate workflow with the configured retry budget.
    ///
    /// # Errors
    ///
    /// Returns the final `ClientError` from the pipeline: a classified
    /// transport failure after retries, or a normalization failure.
    pub async fn generate(&self, input: &str) -> Result<NormalizedResult, ClientError> {
        let options = self.retry_options();
        self.generate_with_options(input, &options).await
    }

    /// Run the generate workflow with an explicit retry budget.
    ///
    /// # Errors
    ///
    /// See [`WorkflowClient::generate`].
    pub async fn generate_with_options(
        &self,
        input: &str,
        options: &RetryOptions,
    ) -> Result<NormalizedResult, ClientError> {
        let request = WorkflowCall::generate(&self.config.api, input)
            .into_transport_request(&self.config.api, &self.bearer_token)?;
        let envelope = self.executor.execute(&request, options).await?;
        let result = normalize(&envelope)?;
        info!(url = %result.url, "generation complete");
        Ok(result)
    }

    /// Query the mode-check workflow, degrading to mode 1 on any failure.
    ///
    /// The mode check is best-effort: transport failures, API errors, and
    /// unusable payloads all yield the default mode rather than an error.
    pub async fn check_mode(&self) -> i64 {
        match self.try_check_mode().await {
            Ok(mode) => mode,
            Err(error) => {
                warn!(%error, "mode check failed, using default mode");
                1
            }
        }
    }

    async fn try_check_mode(&self) -> Result<i64, ClientError> {
        let request = WorkflowCall::mode_check(&self.config.api)?
            .into_transport_request(&self.config.api, &self.bearer_token)?;
        let envelope = self.executor.execute(&request, &self.retry_options()).await?;
        Ok(extract_mode(&envelope))
    }
}

impl std::fmt::Debug for WorkflowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowClient")
            .field("base_url", &self.config.api.base_url)
            .field("workflow_id", &self.config.api.workflow_id)
            .field("bearer_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
