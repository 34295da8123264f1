// Endpoint paths, user-facing strings and environment-derived defaults.

use std::env;
use std::time::Duration;

lazy_static::lazy_static! {
    // Backend base URL, overridable with ARENA_CHAT_URL or --url.
    pub static ref BACKEND_URL: String = env::var("ARENA_CHAT_URL").unwrap_or_else(|_| "http://127.0.0.1:5002".to_string());
    // Raw cookie string in `document.cookie` form, e.g. "csrftoken=abc; session=xyz".
    pub static ref COOKIE_STRING: Option<String> = env::var("ARENA_CHAT_COOKIE").ok();
}

pub const SEND_MESSAGE_PATH: &str = "/send-message";
pub const SAVE_CHOICE_PATH: &str = "/save-choice";

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

pub const NO_ANSWER_TEXT: &str = "🤖 Не удалось получить ответ";
pub const ERROR_PREFIX: &str = "⚠️ Ошибка";
pub const SAVE_OK_TEXT: &str = "✅ Выбор успешно сохранен";
pub const SAVE_FAILED_TEXT: &str = "❌ Ошибка сохранения";

pub const NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);
pub const SAVE_FAILED_DURATION: Duration = Duration::from_millis(5000);
