//! Workflow call construction
//!
//! Builds the wire body `{ workflow_id, parameters, app_id, is_async }` from
//! static configuration plus the caller-supplied input. Calls are always
//! synchronous; `is_async` is serialized as a literal `false`.

use crate::error::ClientError;
use crate::transport::TransportRequest;
use cozeflow_config::ApiConfig;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// An intent to invoke one remote workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowCall {
    /// Opaque identifier selecting which remote workflow runs
    pub workflow_id: String,
    /// Parameter name to value mapping (may be empty)
    pub parameters: Map<String, Value>,
    /// Application id sent with every call
    pub app_id: String,
    /// Always false; this system only issues synchronous calls
    pub is_async: bool,
}

impl WorkflowCall {
    /// Build the generate call carrying the user's prompt as `input`.
    #[must_use]
    pub fn generate(api: &ApiConfig, input: &str) -> Self {
        let mut parameters = Map::new();
        parameters.insert("input".to_string(), Value::String(input.to_string()));
        Self {
            workflow_id: api.workflow_id.clone(),
            parameters,
            app_id: api.app_id.clone(),
            is_async: false,
        }
    }

    /// Build the mode-check call with empty parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` when no mode-check workflow
    /// is configured.
    pub fn mode_check(api: &ApiConfig) -> Result<Self, ClientError> {
        let workflow_id = api.mode_check_workflow_id.clone().ok_or_else(|| {
            ClientError::Misconfiguration(
                "api.mode_check_workflow_id is not configured".to_string(),
            )
        })?;
        Ok(Self {
            workflow_id,
            parameters: Map::new(),
            app_id: api.app_id.clone(),
            is_async: false,
        })
    }

    /// Attach endpoint, credential, and timeout to form the transport request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unknown` if the body cannot be serialized,
    /// which would indicate a bug in this type rather than bad input.
    pub fn into_transport_request(
        self,
        api: &ApiConfig,
        bearer_token: &str,
    ) -> Result<TransportRequest, ClientError> {
        let body = serde_json::to_value(&self)
            .map_err(|e| ClientError::Unknown(format!("Failed to encode request body: {}", e)))?;
        Ok(TransportRequest {
            url: api.base_url.clone(),
            bearer_token: bearer_token.to_string(),
            body,
            timeout: Duration::from_millis(api.timeout_ms),
        })
    }
}
