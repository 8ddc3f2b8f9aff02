//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::chain::ChainState;
use crate::error::{GatewayError, RegistryError};
use crate::service::QueryService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read-only query facade over committed state.
    pub query_service: Arc<QueryService>,
    /// State-machine host for the write path.
    pub chain: Arc<ChainState>,
    /// Tripped when a fatal registry error is observed.
    pub halt: HaltSignal,
}

impl AppState {
    /// Builds the state around `chain` with a fresh halt signal.
    #[must_use]
    pub fn new(chain: Arc<ChainState>) -> Self {
        Self {
            query_service: Arc::new(QueryService::new(Arc::clone(&chain))),
            chain,
            halt: HaltSignal::new(),
        }
    }

    /// Converts a registry error into its HTTP form, halting the node first
    /// if the error is fatal.
    #[must_use]
    pub fn escalate(&self, err: RegistryError) -> GatewayError {
        if err.is_fatal() {
            tracing::error!(error = %err, kind = ?err.kind(), "fatal registry error, halting");
            self.halt.trigger(err.to_string());
        }
        GatewayError::from(err)
    }

    /// Rejects write requests once the node has halted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] carrying the halt reason.
    pub fn ensure_running(&self) -> Result<(), GatewayError> {
        match self.halt.reason() {
            Some(reason) => Err(GatewayError::Internal(format!("node halted: {reason}"))),
            None => Ok(()),
        }
    }
}

/// One-shot halt flag shared between handlers and the server loop.
///
/// The first reason recorded wins; later triggers are ignored.
#[derive(Debug, Clone)]
pub struct HaltSignal {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl HaltSignal {
    /// Creates an untripped signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Trips the signal with `reason` unless it is already tripped.
    pub fn trigger(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
    }

    /// Whether the signal has been tripped.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// The reason recorded by the first trigger, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Resolves once the signal is tripped.
    pub async fn halted(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(Option::is_some).await;
    }
}

impl Default for HaltSignal {
    fn default() -> Self {
        Self::new()
    }
}
