//! cozeflow - resilient client for Coze workflow runs
//!
//! Submits a text prompt to a remote workflow (image + caption generation)
//! and normalizes the loosely-specified response into a result URL and
//! caption. The request pipeline retries transient failures with
//! error-classified linear backoff; authentication failures and unusable
//! payloads surface immediately.
//!
//! The library surface is [`WorkflowClient`]; the `cozeflow` binary is a
//! thin CLI over it.

pub mod cli;
mod client;
pub mod logging;

pub use client::WorkflowClient;

// Stable re-exports so embedders need only this crate
pub use cozeflow_client::{
    ClientError, ErrorKind, NormalizedResult, RetryOptions, Transport, normalize,
};
pub use cozeflow_config::{Config, ConfigError};
