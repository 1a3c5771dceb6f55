//! Fetch the raw question blob from wherever it lives
//!
//! The bank treats the result as opaque text. Any failure here is a
//! `QuestError::Source` and sends the caller to the embedded set.

use reqwest::Client;
use std::path::PathBuf;

use crate::core::error::{QuestError, Result};

/// Where the question records come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    File(PathBuf),
    Url(String),
    Inline(String),
}

impl QuestionSource {
    /// Interpret a CLI argument: http(s) URLs are fetched, anything else is a path
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            QuestionSource::Url(arg.to_string())
        } else {
            QuestionSource::File(PathBuf::from(arg))
        }
    }

    pub async fn fetch(&self) -> Result<String> {
        match self {
            QuestionSource::Inline(text) => Ok(text.clone()),
            QuestionSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| QuestError::Source(format!("{}: {}", path.display(), e))),
            QuestionSource::Url(url) => fetch_url(url).await,
        }
    }
}

async fn fetch_url(url: &str) -> Result<String> {
    let response = Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| QuestError::Source(e.to_string()))?;

    if !response.status().is_success() {
        return Err(QuestError::Source(format!("HTTP error! status: {}", response.status())));
    }

    response
        .text()
        .await
        .map_err(|e| QuestError::Source(e.to_string()))
}
