use std::ops::Deref;
use std::sync::Arc;

use mediasense_ai::InferenceService;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::coordinator::Coordinator;

/// Coordinator for text input that also holds the user's editable draft.
pub struct TextCoordinator<S: InferenceService<Input = String>> {
    inner: Coordinator<S>,
    draft: Arc<watch::Sender<String>>,
}

impl<S: InferenceService<Input = String>> Clone for TextCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            draft: Arc::clone(&self.draft),
        }
    }
}

impl<S: InferenceService<Input = String>> std::fmt::Debug for TextCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCoordinator")
            .field("inner", &self.inner)
            .field("draft_len", &self.draft.borrow().len())
            .finish()
    }
}

impl<S: InferenceService<Input = String>> Deref for TextCoordinator<S> {
    type Target = Coordinator<S>;

    fn deref(&self) -> &Coordinator<S> {
        &self.inner
    }
}

impl<S: InferenceService<Input = String>> TextCoordinator<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (draft, _) = watch::channel(String::new());
        Self {
            inner: Coordinator::new(service),
            draft: Arc::new(draft),
        }
    }

    pub fn set_text_input(&self, text: impl Into<String>) {
        self.draft.send_replace(text.into());
    }

    pub fn text_input(&self) -> String {
        self.draft.borrow().clone()
    }

    /// Submit whatever the draft holds right now.
    pub async fn submit_draft(&self) {
        let text = self.text_input();
        self.inner.submit(text).await;
    }

    /// Fire-and-forget [`submit_draft`](Self::submit_draft). The draft is
    /// captured before returning, so later edits do not affect this request.
    pub fn spawn_submit_draft(&self) -> JoinHandle<()> {
        self.inner.spawn_submit(self.text_input())
    }
}
