use super::Error;

/// Error when a query request cannot be built.
///
/// This occurs when:
/// - The index target resolves to no index names
/// - No plan serializer was supplied
/// - The page size is negative
/// - Resume data was supplied for a request that is not in cursor mode
///
/// These errors are raised by the builder, never in the middle of paging.
#[derive(Debug)]
pub(super) struct InvalidRequest {
    message: Box<str>,
}

impl std::error::Error for InvalidRequest {}

impl core::fmt::Display for InvalidRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid request: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidRequest(InvalidRequest {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid request error.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidRequest(_))
    }
}
