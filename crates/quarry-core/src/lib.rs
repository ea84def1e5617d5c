pub mod driver;
pub use driver::SearchBackend;

mod error;
pub use error::{Error, IntoError};

mod index;
pub use index::{IndexResolver, IndexTarget};

mod plan;
pub use plan::{PlanAttachment, PlanSerializer};

pub mod request;
pub use request::RequestDescriptor;

mod sort_value;
pub use sort_value::SortValue;

/// A Result type alias that uses Quarry's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
