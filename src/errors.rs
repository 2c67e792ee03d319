use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("transport error: {message}")]
    Transport { message: String, transient: bool },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("shape error at {path}: {message}")]
    Shape { path: String, message: String },
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("request cancelled")]
    Cancelled,
}

impl CoachError {
    pub fn transport(message: impl Into<String>, transient: bool) -> Self {
        Self::Transport { message: message.into(), transient }
    }

    pub fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape { path: path.into(), message: message.into() }
    }

    /// Only transport failures flagged transient are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { transient: true, .. })
    }

    /// Message shown to the person who submitted the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => {
                "Couldn't reach the coaching service. Please try again.".to_string()
            }
            Self::Parse(_) => {
                "The coach replied with something we couldn't read. Please resubmit.".to_string()
            }
            Self::Shape { .. } => {
                "The coach's plan was malformed. Please resubmit.".to_string()
            }
            Self::InvalidSelection(msg) => format!("Please check your choices: {msg}"),
            Self::Config(msg) => format!("The app is not configured correctly: {msg}"),
            Self::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

impl From<reqwest::Error> for CoachError {
    fn from(e: reqwest::Error) -> Self {
        let transient = e.is_timeout()
            || e.is_connect()
            || e.status().map(|s| s.is_server_error() || s.as_u16() == 429).unwrap_or(false);
        Self::transport(e.to_string(), transient)
    }
}

pub type CoachResult<T> = std::result::Result<T, CoachError>;
