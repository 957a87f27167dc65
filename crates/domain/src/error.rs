use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("unrecognized pitch step {0:?}")]
    UnknownStep(String),
    #[error("invalid time signature: {0}")]
    InvalidTimeSignature(String),
    #[error("score has no parts")]
    EmptyScore,
    #[error("score has no measures")]
    NoMeasures,
    #[error("no measures in range [{start}:{}]", range_end(.end))]
    EmptyExcerpt { start: usize, end: Option<usize> },
}

impl DomainError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }
}

fn range_end(end: &Option<usize>) -> String {
    end.map(|e| e.to_string()).unwrap_or_default()
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
