use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("cannot reach the portal: {0}")]
    Network(String),

    #[error("not signed in or session expired; run `lmsquiz login`")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("this attempt is already closed")]
    AttemptClosed,

    #[error("{0}")]
    Rejected(String),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("invalid response from portal: {0}")]
    InvalidResponse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("document viewer failed: {0}")]
    Viewer(String),

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Rejections raised by the answer buffer when a response does not fit its question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("question {0} expects a selected option")]
    ExpectedOption(u64),
    #[error("question {0} expects a text answer")]
    ExpectedText(u64),
    #[error("option {option} does not belong to question {question}")]
    ForeignOption { question: u64, option: u64 },
}

/// How a failure is presented to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Inline message, the learner may try again.
    Retry,
    /// Session is gone; point at the login command.
    Login,
    /// Field-level message; nothing was sent or the portal refused the input.
    Validation,
    /// Explicit empty state.
    NotFound,
    /// Terminal for the current screen; recovery is going back to the list.
    BackToList,
    /// Local fault (config, disk).
    Fatal,
}

impl Error {
    pub fn disposition(&self) -> Disposition {
        match self {
            Error::Network(_) | Error::Status(_) | Error::InvalidResponse(_) => Disposition::Retry,
            Error::Unauthorized => Disposition::Login,
            Error::Rejected(_) | Error::Answer(_) => Disposition::Validation,
            Error::NotFound(_) => Disposition::NotFound,
            Error::AttemptClosed => Disposition::BackToList,
            Error::Config(_)
            | Error::Viewer(_)
            | Error::Url(_)
            | Error::Yaml(_)
            | Error::Io(_) => Disposition::Fatal,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            Error::Status(status.as_u16())
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidResponse(e.to_string())
    }
}
