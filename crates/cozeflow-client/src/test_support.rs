//! Scripted transport for exercising the pipeline without a network
//!
//! Tests substitute this for [`HttpTransport`](crate::HttpTransport) and
//! script the outcome of each attempt, keeping the retry loop itself under
//! test instead of re-deriving it in every harness.

use crate::transport::{Transport, TransportFailure, TransportRequest, TransportResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type ScriptedOutcome = Result<TransportResponse, TransportFailure>;

struct Inner {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    repeat: Option<ScriptedOutcome>,
    calls: AtomicUsize,
}

/// Transport whose responses are scripted up front.
///
/// Outcomes are served in order; [`ScriptedTransport::repeating`] serves the
/// same outcome forever. Exhausting a finite script panics, which surfaces
/// miscounted attempts directly in the failing test.
#[derive(Clone)]
pub struct ScriptedTransport {
    inner: Arc<Inner>,
}

impl ScriptedTransport {
    /// Serve the given outcomes in order.
    #[must_use]
    pub fn new(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(outcomes.into()),
                repeat: None,
                calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Serve the same outcome on every attempt.
    #[must_use]
    pub fn repeating(outcome: ScriptedOutcome) -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(VecDeque::new()),
                repeat: Some(outcome),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Shareable handle for injecting into an executor.
    #[must_use]
    pub fn handle(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }

    /// Number of `post` invocations so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(
        &self,
        _request: &TransportRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        let call_index = self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .inner
            .script
            .lock()
            .expect("script lock poisoned")
            .pop_front();
        match next.or_else(|| self.inner.repeat.clone()) {
            Some(outcome) => outcome,
            None => panic!("scripted transport exhausted after {} calls", call_index),
        }
    }
}
