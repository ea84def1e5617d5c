use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// Produces the serialized query plan that rides along with every request.
///
/// The bytes are opaque to quarry: they come from an external plan compiler
/// and are attached to the request body verbatim. The serializer is invoked
/// once per physical backend call. Implementations that need to cache the
/// bytes across pages do so themselves.
pub trait PlanSerializer: Send + Sync {
    fn serialize_plan(&self) -> Result<Vec<u8>>;
}

impl<F> PlanSerializer for F
where
    F: Fn() -> Result<Vec<u8>> + Send + Sync,
{
    fn serialize_plan(&self) -> Result<Vec<u8>> {
        self()
    }
}

/// Serialized plan bytes attached to an outbound request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanAttachment {
    #[serde(with = "hex::serde")]
    bytes: Vec<u8>,
}

impl PlanAttachment {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Invokes `serializer` and wraps its output.
    ///
    /// A serializer failure is wrapped as a plan serialization error.
    pub fn produce(serializer: &dyn PlanSerializer) -> Result<Self> {
        serializer
            .serialize_plan()
            .map(Self::new)
            .map_err(Error::plan_serialization_failed)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl core::fmt::Debug for PlanAttachment {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("PlanAttachment")
            .field("len", &self.bytes.len())
            .finish()
    }
}
