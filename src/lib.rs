pub mod backend;
pub mod constants;
pub mod cookies;
pub mod error;
pub mod input;
pub mod render;
pub mod session;

use serde::{Deserialize, Serialize};

pub use backend::BackendClient;
pub use cookies::{get_cookie, CookieSource};
pub use error::ChatError;
pub use input::{InputBuffer, InputEvent, Key};
pub use render::{Notification, RenderEvent, RenderPort};
pub use session::{CandidateGroup, ChatSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// A rendered line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub role: Role,
    pub model: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::User,
            model: None,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Bot,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// One candidate answer returned by the backend, tagged with the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.text, "Hello");
        assert_eq!(msg.role, Role::User);
        assert!(msg.model.is_none());
    }

    #[test]
    fn test_bot_message_with_model() {
        let msg = Message::bot("Hi there!").with_model("Llama-3-70B-Instruct");
        assert_eq!(msg.role, Role::Bot);
        assert_eq!(msg.model.as_deref(), Some("Llama-3-70B-Instruct"));
    }

    #[test]
    fn test_choice_deserialize() {
        let choice: Choice =
            serde_json::from_str(r#"{"text": "A", "model": "m1"}"#).unwrap();
        assert_eq!(
            choice,
            Choice {
                text: "A".to_string(),
                model: "m1".to_string()
            }
        );
    }
}
