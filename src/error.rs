use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend rejected the choice with status {status}: {body}")]
    SaveRejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to read cookie file: {path}")]
    CookieFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cookie {name} is not valid UTF-8 once decoded")]
    CookieEncoding {
        name: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("no candidate #{index} in a group of {len}")]
    NoSuchChoice { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ChatError>;
