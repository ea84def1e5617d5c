use super::Error;

#[derive(Debug)]
pub(super) struct PlanSerializationFailed {
    cause: Error,
}

impl std::error::Error for PlanSerializationFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

impl core::fmt::Display for PlanSerializationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "plan serialization failed: {}", self.cause)
    }
}

impl Error {
    /// Wraps a failure raised by the plan serializer.
    ///
    /// No backend call is issued for a request whose plan failed to
    /// serialize.
    pub fn plan_serialization_failed(cause: Error) -> Error {
        Error::from(super::ErrorKind::PlanSerializationFailed(
            PlanSerializationFailed { cause },
        ))
    }

    /// Returns `true` if this error is a plan serialization failure.
    pub fn is_plan_serialization_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::PlanSerializationFailed(_))
    }
}
