use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::backend::BackendClient;
use crate::constants::{
    ERROR_PREFIX, NOTIFICATION_DURATION, NO_ANSWER_TEXT, SAVE_FAILED_DURATION, SAVE_FAILED_TEXT,
    SAVE_OK_TEXT,
};
use crate::error::{ChatError, Result};
use crate::input::{InputBuffer, InputEvent};
use crate::render::{Notification, RenderEvent, RenderPort};
use crate::{Choice, Message, Role};

/// Candidate answers offered for one user message.
///
/// Only the first selection counts; later selections on the same group are ignored.
#[derive(Debug)]
pub struct CandidateGroup {
    id: u64,
    question: String,
    choices: Vec<Choice>,
    settled: AtomicBool,
}

impl CandidateGroup {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The user message these candidates answer.
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }
}

struct SessionInner {
    backend: BackendClient,
    renderer: Arc<dyn RenderPort>,
    busy: AtomicBool,
    last_question: Mutex<Option<String>>,
    next_id: AtomicU64,
}

// Clears the busy flag when the submit attempt ends, whichever way it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one chat conversation: submits messages, offers candidate answers and
/// reports the user's pick back to the backend.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

impl ChatSession {
    pub fn new(backend: BackendClient, renderer: Arc<dyn RenderPort>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                backend,
                renderer,
                busy: AtomicBool::new(false),
                last_question: Mutex::new(None),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// True while a message submission is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// Text of the most recently rendered user message.
    pub fn last_question(&self) -> Option<String> {
        self.inner
            .last_question
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Routes a send-button click or keypress. The input box is only cleared
    /// when the submission is accepted.
    pub async fn handle_input(
        &self,
        event: InputEvent,
        input: &mut InputBuffer,
    ) -> Option<Arc<CandidateGroup>> {
        if !event.is_submit() || input.is_blank() {
            return None;
        }
        let guard = self.try_begin()?;
        let text = input.take();
        self.run_submit(guard, text).await
    }

    /// Submits `text` to the backend.
    ///
    /// Blank text, or a call made while another submission is in flight, is
    /// ignored without rendering anything. Returns the offered candidate group
    /// when the backend answered with at least one choice.
    pub async fn submit(&self, text: &str) -> Option<Arc<CandidateGroup>> {
        if text.trim().is_empty() {
            return None;
        }
        let guard = self.try_begin()?;
        self.run_submit(guard, text.to_string()).await
    }

    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        match self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Some(BusyGuard(&self.inner.busy)),
            Err(_) => {
                debug!("Submission ignored, previous message still in flight");
                None
            }
        }
    }

    async fn run_submit(&self, _guard: BusyGuard<'_>, text: String) -> Option<Arc<CandidateGroup>> {
        self.add_message(Message::user(text.clone()));

        match self.inner.backend.send_message(&text).await {
            Ok(choices) if !choices.is_empty() => Some(self.render_choices(choices)),
            Ok(_) => {
                info!("Backend returned no candidate answers");
                self.add_message(Message::bot(NO_ANSWER_TEXT));
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to send message");
                self.add_message(Message::bot(format!("{}: {}", ERROR_PREFIX, e)));
                None
            }
        }
    }

    fn add_message(&self, message: Message) {
        if message.role == Role::User {
            *self
                .inner
                .last_question
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(message.text.clone());
        }
        self.inner.renderer.render(RenderEvent::MessageAdded(message));
    }

    /// Offers `choices` as a candidate group answering the last user message.
    pub fn render_choices(&self, choices: Vec<Choice>) -> Arc<CandidateGroup> {
        let group = Arc::new(CandidateGroup {
            id: self.next_id(),
            question: self.last_question().unwrap_or_default(),
            choices,
            settled: AtomicBool::new(false),
        });
        debug!(group = group.id, count = group.choices.len(), "Offering candidate answers");

        self.inner.renderer.render(RenderEvent::ChoicesOffered {
            group: group.id,
            question: group.question.clone(),
            choices: group.choices.clone(),
        });
        group
    }

    /// Picks candidate `index` from `group`.
    ///
    /// The group collapses into a single bot message and the pick is reported
    /// in the background; the returned handle resolves once the report has
    /// finished. Returns `Ok(None)` when the group was already settled.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn select_choice(
        &self,
        group: &CandidateGroup,
        index: usize,
    ) -> Result<Option<JoinHandle<()>>> {
        let choice = group
            .choices
            .get(index)
            .cloned()
            .ok_or(ChatError::NoSuchChoice {
                index,
                len: group.choices.len(),
            })?;

        if group.settled.swap(true, Ordering::AcqRel) {
            debug!(group = group.id, index, "Group already settled, selection ignored");
            return Ok(None);
        }

        info!(group = group.id, model = %choice.model, "Candidate selected");
        self.inner.renderer.render(RenderEvent::ChoiceFinalized {
            group: group.id,
            message: Message::bot(choice.text.clone()).with_model(choice.model.clone()),
        });

        let session = self.clone();
        let question = group.question.clone();
        Ok(Some(tokio::spawn(async move {
            session
                .report_choice(&question, &choice.text, &choice.model)
                .await;
        })))
    }

    /// Sends the selection to the backend and notifies the user of the outcome.
    /// Returns whether the backend accepted it.
    #[instrument(skip(self, selected_answer))]
    pub async fn report_choice(&self, question: &str, selected_answer: &str, model: &str) -> bool {
        match self
            .inner
            .backend
            .save_choice(question, selected_answer, model)
            .await
        {
            Ok(()) => {
                self.notify(SAVE_OK_TEXT, NOTIFICATION_DURATION);
                true
            }
            Err(e) => {
                debug!(error = %e, "Choice not saved");
                self.notify(SAVE_FAILED_TEXT, SAVE_FAILED_DURATION);
                false
            }
        }
    }

    /// Shows a notice that dismisses itself after `duration`.
    /// Must be called from within a Tokio runtime.
    pub fn notify(&self, text: &str, duration: Duration) -> u64 {
        let id = self.next_id();
        self.inner
            .renderer
            .render(RenderEvent::NotificationShown(Notification {
                id,
                text: text.to_string(),
                duration,
            }));

        let renderer = self.inner.renderer.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            renderer.render(RenderEvent::NotificationDismissed { id });
        });
        id
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }
}
