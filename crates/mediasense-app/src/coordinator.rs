use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mediasense_ai::InferenceService;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::RequestState;

/// Drives one service and publishes the state of its latest request.
///
/// Overlapping submits are neither queued nor cancelled: each runs to
/// completion and whichever finishes last owns the visible state. There is no
/// timeout, so a backend call that never returns leaves `is_loading` set.
///
/// Cloning is cheap and every clone shares the same state.
pub struct Coordinator<S: InferenceService> {
    service: Arc<S>,
    state: Arc<watch::Sender<RequestState<S::Output>>>,
    next_request: Arc<AtomicU64>,
}

impl<S: InferenceService> Clone for Coordinator<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
            next_request: Arc::clone(&self.next_request),
        }
    }
}

impl<S: InferenceService> std::fmt::Debug for Coordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Coordinator")
            .field("modality", &S::MODALITY)
            .field("phase", &state.phase())
            .finish()
    }
}

impl<S: InferenceService> Coordinator<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (state, _) = watch::channel(RequestState::default());
        Self {
            service,
            state: Arc::new(state),
            next_request: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Run one request to completion and settle its outcome into the state.
    pub async fn submit(&self, input: S::Input) {
        let request = self.next_request.fetch_add(1, Ordering::Relaxed);
        self.state.send_modify(RequestState::begin);
        debug!(modality = S::MODALITY, request, "request submitted");

        let outcome = self.service.invoke(input).await;

        match outcome {
            Ok(result) => {
                info!(modality = S::MODALITY, request, "request succeeded");
                self.state.send_modify(|s| s.succeed(result));
            }
            Err(e) => {
                warn!(
                    modality = S::MODALITY,
                    request,
                    kind = e.kind(),
                    error = %e,
                    "request failed"
                );
                let message = e.to_string();
                self.state.send_modify(|s| s.fail(message));
            }
        }
    }

    /// Fire-and-forget `submit` on the current tokio runtime.
    pub fn spawn_submit(&self, input: S::Input) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.submit(input).await })
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<RequestState<S::Output>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> RequestState<S::Output> {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn result(&self) -> Option<S::Output> {
        self.state.borrow().result.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().error_message.clone()
    }

    /// Back to idle. An in-flight request still settles when it finishes.
    pub fn reset(&self) {
        self.state.send_replace(RequestState::default());
    }
}
