use serde_json::Value;
use thiserror::Error;

/// Errors a single range request can report.
///
/// The collector treats every variant the same way (abort the
/// pagination loop, keep what was accumulated). The variants exist
/// so logs and the error state carry a useful description.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("invalid range {from}..={to}")]
    InvalidRange { from: usize, to: usize },
}

/// RowSource is the abstraction layer between:
/// - The paginated collector
/// - A concrete backend serving rows (hosted API, fixture, test script)
///
/// Each implementation must:
/// - Serve an inclusive index range of a named collection
/// - Apply the field projection when the backend supports it
/// - Report failures instead of returning partial pages
///
/// THREAD SAFETY:
/// - Must be Send + Sync
/// - Source instances are shared behind `Arc`
///
#[async_trait::async_trait]
pub trait RowSource: Send + Sync {

    /// Short identifier used in logs (e.g. "postgrest", "memory").
    fn name(&self) -> &'static str;

    /// Fetches rows `from..=to` of `collection`.
    ///
    /// CONTRACT:
    /// - `from <= to`
    /// - Returns at most `to - from + 1` rows, in backend order
    /// - Fewer rows than requested means the collection is exhausted
    ///
    async fn fetch_range(
        &self,
        collection: &str,
        columns: &str,
        from: usize,
        to: usize,
    ) -> Result<Vec<Value>, SourceError>;
}
