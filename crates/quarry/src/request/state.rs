/// Where a request stands in the paging protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    /// No page fetched yet.
    Fresh,

    /// Cursor mode with more pages expected.
    Paging,

    /// The last page came back empty; the cursor is still held.
    ExhaustedPendingCleanup,

    /// The cursor was released or dropped, or never existed. Further fetches
    /// return empty pages.
    ExhaustedClean,
}

impl ProtocolState {
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::ExhaustedPendingCleanup | Self::ExhaustedClean)
    }
}
