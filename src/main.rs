use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arena_chat::{constants, BackendClient, ChatSession, CookieSource};
use clap::Parser;
use tracing::info;

mod chat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Where to reach the backend and which cookies to send along.
#[derive(clap::Args, Debug)]
struct Connection {
    #[arg(long, default_value_t = constants::BACKEND_URL.clone(), help = "Base URL of the chat backend.")]
    url: String,
    #[arg(long, conflicts_with = "cookie_file", help = "Cookie string, e.g. \"csrftoken=abc; session=xyz\".")]
    cookie: Option<String>,
    #[arg(long, help = "File holding the cookie string; re-read for every request.")]
    cookie_file: Option<PathBuf>,
}

impl Connection {
    fn cookie_source(&self) -> CookieSource {
        if let Some(path) = &self.cookie_file {
            CookieSource::File(path.clone())
        } else if let Some(cookie) = self.cookie.clone().or_else(|| constants::COOKIE_STRING.clone()) {
            CookieSource::Inline(cookie)
        } else {
            CookieSource::None
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Chat interactively and vote for the best answer.
    Chat {
        #[command(flatten)]
        connection: Connection,
    },
    /// Send one message and print the candidate answers.
    Ask {
        message: String,
        #[arg(long, help = "Select candidate N (1-based) and report it to the backend.")]
        pick: Option<usize>,
        #[command(flatten)]
        connection: Connection,
    },
    /// Print the value of a cookie from the configured cookie source.
    Cookie {
        name: String,
        #[command(flatten)]
        connection: Connection,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they stay out of the transcript.
    // Reads log level from RUST_LOG (e.g. RUST_LOG=arena_chat=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("arena-chat starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Chat { connection } => {
            let session = new_session(&connection);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            chat::run_chat(&session, stdin)
                .await
                .context("Chat session failed")?;
        }
        Commands::Ask {
            message,
            pick,
            connection,
        } => {
            let session = new_session(&connection);
            let Some(group) = session.submit(&message).await else {
                if pick.is_some() {
                    bail!("No candidate answers to pick from");
                }
                return Ok(());
            };
            if let Some(n) = pick {
                let index = n.checked_sub(1).context("Candidates are numbered from 1")?;
                if let Some(handle) = session
                    .select_choice(&group, index)
                    .context("Failed to select candidate")?
                {
                    handle.await.context("Choice report task failed")?;
                }
            }
        }
        Commands::Cookie { name, connection } => {
            match connection
                .cookie_source()
                .get(&name)
                .context("Failed to read cookies")?
            {
                Some(value) => println!("{}", value),
                None => bail!("Cookie {} not found", name),
            }
        }
    }

    Ok(())
}

fn new_session(connection: &Connection) -> ChatSession {
    info!("Using chat backend at {}", connection.url);
    let backend = BackendClient::new(&connection.url, connection.cookie_source());
    ChatSession::new(backend, Arc::new(chat::TerminalRenderer::stdout()))
}
