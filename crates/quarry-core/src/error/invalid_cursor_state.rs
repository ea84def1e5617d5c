use super::Error;

/// Error when serialized paging state cannot be decoded.
#[derive(Debug)]
pub(super) struct InvalidCursorState {
    message: Box<str>,
}

impl std::error::Error for InvalidCursorState {}

impl core::fmt::Display for InvalidCursorState {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid cursor state: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid cursor state error.
    ///
    /// Returned when a blob or token handed to the decoder is truncated,
    /// carries an unknown format version, or holds malformed values.
    pub fn invalid_cursor_state(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidCursorState(InvalidCursorState {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid cursor state error.
    pub fn is_invalid_cursor_state(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidCursorState(_))
    }
}
