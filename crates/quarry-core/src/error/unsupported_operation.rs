use super::Error;

/// Error when an operation does not apply to the request's pagination mode.
///
/// Single-shot requests never open a cursor, so cursor accessors and state
/// encoding are rejected on them.
#[derive(Debug)]
pub(super) struct UnsupportedOperation {
    message: Box<str>,
}

impl std::error::Error for UnsupportedOperation {}

impl core::fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported operation: {}", self.message)
    }
}

impl Error {
    /// Creates an unsupported operation error.
    pub fn unsupported_operation(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedOperation(
            UnsupportedOperation {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an unsupported operation error.
    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedOperation(_))
    }
}
