use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::constants::{CSRF_COOKIE, CSRF_HEADER, SAVE_CHOICE_PATH, SEND_MESSAGE_PATH};
use crate::cookies::CookieSource;
use crate::error::{ChatError, Result};
use crate::Choice;

// Body of POST /send-message
#[derive(Serialize)]
struct SendMessageRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct SendMessageResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

// Body of POST /save-choice
#[derive(Serialize, Debug)]
struct SaveChoiceRequest<'a> {
    question: &'a str,
    selected_answer: &'a str,
    model: &'a str,
}

/// HTTP client for the two chat backend endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    cookies: CookieSource,
}

impl BackendClient {
    pub fn new(base_url: &str, cookies: CookieSource) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cookies,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts a user message and returns the candidate answers.
    ///
    /// The response status is not checked: whatever the backend sends back is
    /// parsed as JSON, and a body without `choices` yields an empty list.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn send_message(&self, message: &str) -> Result<Vec<Choice>> {
        let url = format!("{}{}", self.base_url, SEND_MESSAGE_PATH);

        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest { message })
            .send()
            .await
            .map_err(|source| ChatError::Transport {
                url: url.clone(),
                source,
            })?;

        debug!(status = %response.status(), "Received /send-message response");

        let body = response
            .json::<SendMessageResponse>()
            .await
            .map_err(|source| ChatError::Decode { url, source })?;

        let choices = body.choices.unwrap_or_default();
        debug!(count = choices.len(), "Parsed candidate answers");
        Ok(choices)
    }

    /// Reports which answer the user picked for `question`.
    ///
    /// The CSRF token is looked up from the cookie source on every call.
    #[instrument(skip(self, selected_answer), fields(base_url = %self.base_url))]
    pub async fn save_choice(&self, question: &str, selected_answer: &str, model: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, SAVE_CHOICE_PATH);

        let mut request = self.client.post(&url).json(&SaveChoiceRequest {
            question,
            selected_answer,
            model,
        });
        match self.cookies.get(CSRF_COOKIE) {
            Ok(Some(token)) => request = request.header(CSRF_HEADER, token),
            Ok(None) => debug!("No {} cookie available, sending without {}", CSRF_COOKIE, CSRF_HEADER),
            Err(e) => {
                error!(error = %e, "Failed to read {} cookie", CSRF_COOKIE);
                return Err(e);
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                error!(error = %source, %url, "Failed to send /save-choice");
                return Err(ChatError::Transport { url, source });
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Backend rejected /save-choice");
            return Err(ChatError::SaveRejected { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = BackendClient::new("http://localhost:5002/", CookieSource::None);
        assert_eq!(client.base_url(), "http://localhost:5002");
    }

    #[test]
    fn test_response_without_choices() {
        let body: SendMessageResponse = serde_json::from_str("{}").unwrap();
        assert!(body.choices.is_none());
        let body: SendMessageResponse = serde_json::from_str(r#"{"choices": null}"#).unwrap();
        assert!(body.choices.is_none());
    }

    #[test]
    fn test_save_choice_request_shape() {
        let body = serde_json::to_value(SaveChoiceRequest {
            question: "q",
            selected_answer: "a",
            model: "m",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"question": "q", "selected_answer": "a", "model": "m"})
        );
    }
}
