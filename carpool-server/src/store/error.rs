//! Coordinate store error types.

/// Errors from the on-disk session store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Session id contains characters outside `[A-Za-z0-9_-]` or has a bad length
    #[error("invalid session id: {0:?}")]
    InvalidSession(String),

    /// Reading or writing the session file failed
    #[error("store I/O error: {message}")]
    Io { message: String },

    /// Session file or stored value could not be (de)serialized
    #[error("store data error for key {key:?}: {message}")]
    Data { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::InvalidSession("../etc".into());
        assert_eq!(err.to_string(), "invalid session id: \"../etc\"");

        let err = StoreError::Data {
            key: "startCoordinates".into(),
            message: "expected struct".into(),
        };
        assert_eq!(
            err.to_string(),
            "store data error for key \"startCoordinates\": expected struct"
        );
    }
}
