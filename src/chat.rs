// Line-based terminal front end for a chat session.

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use arena_chat::{CandidateGroup, ChatSession, RenderEvent, RenderPort, Role};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Prints render events as plain text lines.
pub struct TerminalRenderer<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> RenderPort for TerminalRenderer<W> {
    fn render(&self, event: RenderEvent) {
        let Some(text) = format_event(&event) else {
            debug!(?event, "Nothing to print");
            return;
        };
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

pub fn format_event(event: &RenderEvent) -> Option<String> {
    match event {
        RenderEvent::MessageAdded(msg) => {
            let prefix = match msg.role {
                Role::User => "you>",
                Role::Bot => "bot>",
            };
            Some(match &msg.model {
                Some(model) => format!("{} {} [{}]", prefix, msg.text, model),
                None => format!("{} {}", prefix, msg.text),
            })
        }
        RenderEvent::ChoicesOffered { choices, .. } => {
            let mut lines = vec!["Pick the best answer (type its number):".to_string()];
            for (i, choice) in choices.iter().enumerate() {
                lines.push(format!("  {}) [{}]", i + 1, choice.model));
                lines.extend(choice.text.lines().map(|line| format!("     {}", line)));
            }
            Some(lines.join("\n"))
        }
        RenderEvent::ChoiceFinalized { message, .. } => Some(format!(
            "bot> {} [{}]",
            message.text,
            message.model.as_deref().unwrap_or("unknown")
        )),
        RenderEvent::NotificationShown(notification) => Some(format!("   {}", notification.text)),
        RenderEvent::NotificationDismissed { .. } => None,
    }
}

/// Runs an interactive session over `lines` until EOF or `/quit`.
///
/// While a candidate group is open, a line holding one of its numbers selects
/// that candidate; anything else is sent as a new message.
pub async fn run_chat<R>(session: &ChatSession, reader: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    info!("Starting interactive chat session...");
    let mut lines = reader.lines();
    let mut open_group: Option<Arc<CandidateGroup>> = None;
    let mut reports: Vec<JoinHandle<()>> = Vec::new();

    // A read error ends the session but pending reports still get to finish.
    let mut read_error = None;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                read_error = Some(e);
                break;
            }
        };
        let line = line.trim_end_matches('\r');
        if line.trim() == "/quit" {
            break;
        }

        if let Some(index) = open_group.as_ref().and_then(|group| pick_index(group, line)) {
            if let Some(group) = open_group.take() {
                match session.select_choice(&group, index) {
                    Ok(Some(handle)) => reports.push(handle),
                    Ok(None) => {}
                    Err(e) => warn!("Failed to select candidate: {}", e),
                }
            }
            continue;
        }

        if let Some(group) = session.submit(line).await {
            open_group = Some(group);
        }
    }

    if !reports.is_empty() {
        debug!(pending = reports.len(), "Waiting for choice reports");
        for result in futures::future::join_all(reports).await {
            if let Err(e) = result {
                warn!("Choice report task failed: {:?}", e);
            }
        }
    }

    if let Some(e) = read_error {
        return Err(e).context("Failed to read chat input");
    }
    info!("Chat session finished.");
    Ok(())
}

// 1-based candidate number typed by the user, if it names a candidate of `group`.
fn pick_index(group: &CandidateGroup, line: &str) -> Option<usize> {
    let n: usize = line.trim().parse().ok()?;
    (1..=group.choices().len()).contains(&n).then(|| n - 1)
}
