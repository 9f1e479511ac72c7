/// Convenience result type used across xvs.
pub type XvsResult<T> = Result<T, XvsError>;

/// Top-level error type for expression building, graph construction and log writing.
#[derive(thiserror::Error, Debug)]
pub enum XvsError {
    /// Parameters or clip formats rejected before any node is built.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed postfix expression text.
    #[error("expression error: {0}")]
    Expression(String),

    /// Failure while evaluating an expression with the reference evaluator.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Timecode or statistics file I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl XvsError {
    /// Build a [`XvsError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`XvsError::Expression`] value.
    pub fn expression(msg: impl Into<String>) -> Self {
        Self::Expression(msg.into())
    }

    /// Build a [`XvsError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`XvsError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for XvsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
