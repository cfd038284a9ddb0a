//! Core request pipeline for Coze workflow runs
//!
//! This crate implements the three layers the pipeline is built from:
//! a transport seam ([`Transport`]) the orchestrator posts through, the
//! retry-driving [`Executor`] that classifies failures and backs off between
//! attempts, and the [`normalize`] step that extracts a result URL and
//! caption from a loosely-specified response envelope.
//!
//! The transport is injected, so tests substitute a scripted fake instead of
//! re-deriving the whole pipeline against the network.

mod classify;
mod error;
mod executor;
mod normalize;
mod redact;
mod request;
mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use classify::{ErrorKind, backoff_delay, classify};
pub use error::ClientError;
pub use executor::{Executor, RetryOptions};
pub use normalize::{
    CAPTION_CANDIDATES, DEFAULT_CAPTION, NormalizedResult, URL_CANDIDATES, extract_mode, normalize,
};
pub use request::WorkflowCall;
pub use transport::{
    HttpTransport, Transport, TransportFailure, TransportRequest, TransportResponse,
};
