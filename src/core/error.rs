use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuestError {
    #[error("Question bank is empty")]
    EmptyQuestionBank,

    #[error("Action '{action}' is not valid in state {state}")]
    IllegalTransition { action: &'static str, state: String },

    #[error("Answer kind {got} does not fit a {expected} question")]
    AnswerMismatch { expected: String, got: &'static str },

    #[error("Answer incomplete: {0}")]
    Incomplete(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Question source error: {0}")]
    Source(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, QuestError>;
