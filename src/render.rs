use std::time::Duration;

use crate::{Choice, Message};

/// A transient notice that dismisses itself after `duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub text: String,
    pub duration: Duration,
}

/// What the chat session asks the presentation layer to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    MessageAdded(Message),
    /// A group of candidate answers waiting for a single selection.
    ChoicesOffered {
        group: u64,
        question: String,
        choices: Vec<Choice>,
    },
    /// The candidate group was replaced by the selected answer.
    ChoiceFinalized { group: u64, message: Message },
    NotificationShown(Notification),
    NotificationDismissed { id: u64 },
}

/// Presentation adapter driven by [`crate::ChatSession`].
pub trait RenderPort: Send + Sync {
    fn render(&self, event: RenderEvent);
}
