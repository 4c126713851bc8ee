/// Result alias that carries the custom [`SonifyError`] type.
pub type Result<T> = std::result::Result<T, SonifyError>;

/// Common error type for the core crate.
///
/// Every variant is terminal for the `sonify()` call that produced it; the
/// engine never retries internally.
#[derive(Debug, thiserror::Error)]
pub enum SonifyError {
    /// Invalid engine settings, reported before any synthesis work starts.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The image handed to the engine cannot be traversed.
    #[error("data error: {0}")]
    Data(String),
    /// A recognised option whose behaviour is not implemented.
    #[error("not implemented: {0}")]
    Unsupported(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON configuration.
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of [`SonifyError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`SonifyError::Configuration`].
    Configuration,
    /// See [`SonifyError::Data`].
    Data,
    /// See [`SonifyError::Unsupported`].
    Unsupported,
    /// See [`SonifyError::Io`].
    Io,
    /// See [`SonifyError::Json`].
    Json,
}

impl SonifyError {
    /// Creates a configuration error from the provided message.
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a data error from the provided message.
    pub fn data<T: Into<String>>(msg: T) -> Self {
        Self::Data(msg.into())
    }

    /// Creates an error for a recognised but unimplemented option.
    pub fn unsupported<T: Into<String>>(msg: T) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Data(_) => ErrorKind::Data,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            SonifyError::configuration("bad rate").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(SonifyError::data("empty").kind(), ErrorKind::Data);
        assert_eq!(
            SonifyError::unsupported("circle").kind(),
            ErrorKind::Unsupported
        );

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(SonifyError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn messages_carry_context() {
        let err = SonifyError::data("number of channels (2) is not supported");
        assert!(format!("{err}").contains("channels (2)"));
    }
}
