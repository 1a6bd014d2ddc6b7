/// Bulk input parsing and processing-mode selection.

/// Batches larger than this are submitted as asynchronous jobs.
pub const ASYNC_THRESHOLD: usize = 1000;

/// How a bulk request is sent to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Block until every result is available.
    Sync,
    /// Submit a job and return its descriptor; results arrive out-of-band.
    Async,
}

impl ProcessingMode {
    /// Pick the mode for `count` addresses.
    ///
    /// Async when explicitly requested, or implied once `count` exceeds
    /// [`ASYNC_THRESHOLD`].
    #[must_use]
    pub fn resolve(requested_async: bool, count: usize) -> Self {
        if requested_async || count > ASYNC_THRESHOLD {
            Self::Async
        } else {
            Self::Sync
        }
    }

    #[must_use]
    pub fn is_async(self) -> bool {
        self == Self::Async
    }
}

/// Split file content into addresses: one per line, trimmed, blanks dropped.
///
/// No syntactic validation happens here; that is the service's job.
#[must_use]
pub fn parse_addresses(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
