/// Collector module
///
/// This module groups all logic responsible for:
/// - Reading whole collections through a `RowSource`
/// - Walking successive non-overlapping row ranges
/// - Reporting page-level failures next to the rows collected
///
/// The collector layer sits between:
/// - Row sources (PostgREST, in-memory fixtures)
/// - The ranking pipeline, which only sees the resulting rows
///
/// Design notes:
/// - Backend-specific logic MUST NOT live here
/// - No retries: a failed page ends the read
pub mod pager;

pub use pager::{DEFAULT_PAGE_SIZE, PagedRows, fetch_all_rows};
