mod codec;

mod config;
pub use config::Config;

pub mod cursor;
pub use cursor::{CursorToken, PageContinuation};

mod page;
pub use page::ResponsePage;

pub mod request;
pub use request::{Builder, ProtocolState, QueryRequest};

pub use quarry_core::{
    driver::{self, Hit, SearchBackend, SearchRequest, SearchResponse},
    err, Error, IndexResolver, IndexTarget, PlanAttachment, PlanSerializer, RequestDescriptor,
    Result, SortValue,
};
