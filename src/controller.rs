use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::alert::{Alert, AlertSink};
use crate::completion::CompletionService;
use crate::config::SystemPrompts;
use crate::conversation::{ConversationStore, Role};
use crate::error::SendError;

/// What happens to a send while another reply is still pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InFlightPolicy {
    /// Every send goes out. Replies are appended in the order they resolve,
    /// so the last one to resolve ends up last.
    #[default]
    Unguarded,
    /// Only one request at a time; a second send is rejected with
    /// [`SendError::Busy`] and the input buffer is left alone.
    SingleSlot,
}

/// Drives the exchange between the input buffer, the completion service and
/// the conversation store.
pub struct ChatController {
    store: Arc<ConversationStore>,
    service: Arc<dyn CompletionService>,
    prompts: SystemPrompts,
    alerts: Arc<dyn AlertSink>,
    input: watch::Sender<String>,
    policy: InFlightPolicy,
    in_flight: AtomicBool,
}

/// Releases the single slot when the request finishes or is dropped.
struct SlotGuard<'a>(&'a AtomicBool);

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ChatController {
    pub fn new(
        store: Arc<ConversationStore>,
        service: Arc<dyn CompletionService>,
        prompts: SystemPrompts,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let (input, _) = watch::channel(String::new());
        Self {
            store,
            service,
            prompts,
            alerts,
            input,
            policy: InFlightPolicy::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_policy(mut self, policy: InFlightPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.input.send_replace(text.into());
    }

    pub fn input(&self) -> String {
        self.input.borrow().clone()
    }

    pub fn subscribe_input(&self) -> watch::Receiver<String> {
        self.input.subscribe()
    }

    /// Requests the tutor's introduction, once per store.
    ///
    /// The store is marked initialized as soon as the request is issued, so
    /// a failed introduction is never retried. A bootstrap rejected under
    /// [`InFlightPolicy::SingleSlot`] issues nothing and leaves the store
    /// uninitialized. Returns `Ok(false)` when the store was already
    /// initialized.
    pub async fn bootstrap(&self) -> Result<bool, SendError> {
        if self.store.is_initialized() {
            return Ok(false);
        }
        let _slot = self.claim_slot()?;
        if !self.store.mark_initialized() {
            return Ok(false);
        }
        info!("Requesting tutor introduction");

        self.exchange(&self.prompts.introduction).await?;
        Ok(true)
    }

    /// Sends whatever is in the input buffer.
    pub async fn submit(&self) -> Result<String, SendError> {
        let text = self.input();
        self.send(text).await
    }

    /// Like [`submit`](Self::submit), but reads the input buffer right away
    /// and returns an owned request that can be spawned. The buffer can be
    /// refilled before the request runs.
    pub fn submit_detached(
        self: &Arc<Self>,
    ) -> impl Future<Output = Result<String, SendError>> + Send + 'static {
        let text = self.input();
        let controller = Arc::clone(self);
        async move { controller.send(text).await }
    }

    pub fn policy(&self) -> InFlightPolicy {
        self.policy
    }

    /// Submits `text` as if it had been typed into the input buffer.
    ///
    /// The user message is appended and the buffer cleared before the reply
    /// arrives. On failure the typed text is gone from the buffer.
    pub async fn send(&self, text: impl Into<String>) -> Result<String, SendError> {
        let text = text.into();
        let text = text.trim();
        if text.is_empty() {
            self.alerts.alert(Alert::EmptyInput);
            return Err(SendError::EmptyInput);
        }

        let _slot = self.claim_slot()?;
        if self.store.is_initialized() {
            self.store.append_message(Role::User, text);
        }
        self.input.send_replace(String::new());

        self.exchange(text).await
    }

    async fn exchange(&self, prompt: &str) -> Result<String, SendError> {
        match self.service.complete(prompt, &self.prompts.conversation).await {
            Ok(reply) => {
                self.store.append_message(Role::Assistant, reply.clone());
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "Completion failed, conversation left unchanged");
                self.alerts.alert(Alert::from(&e));
                Err(e.into())
            }
        }
    }

    fn claim_slot(&self) -> Result<Option<SlotGuard<'_>>, SendError> {
        match self.policy {
            InFlightPolicy::Unguarded => Ok(None),
            InFlightPolicy::SingleSlot => {
                if self.in_flight.swap(true, Ordering::AcqRel) {
                    self.alerts.alert(Alert::Busy);
                    Err(SendError::Busy)
                } else {
                    Ok(Some(SlotGuard(&self.in_flight)))
                }
            }
        }
    }
}
