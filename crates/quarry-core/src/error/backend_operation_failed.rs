use super::Error;

/// Error when a call into the search backend fails.
///
/// This wraps transport failures raised by a [`SearchBackend`] implementation:
/// - The first-page or single-shot search call
/// - A cursor continuation call
/// - Releasing a server-side cursor
///
/// These errors are handed back to the caller unmodified. Nothing in the
/// request handle retries them.
///
/// [`SearchBackend`]: crate::SearchBackend
#[derive(Debug)]
pub(super) struct BackendOperationFailed {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for BackendOperationFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for BackendOperationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("backend operation failed: ")?;
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from a backend call failure.
    ///
    /// Backend implementations use this to convert client-library errors
    /// (HTTP clients, SDK errors, timeouts) into quarry errors.
    pub fn backend_operation_failed(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::BackendOperationFailed(
            BackendOperationFailed {
                inner: Box::new(err),
            },
        ))
    }

    /// Returns `true` if this error is a backend call failure.
    pub fn is_backend_operation_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::BackendOperationFailed(_))
    }
}
