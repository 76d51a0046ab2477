use std::sync::atomic::Ordering;

use log::{debug, error};
use serde_json::Value;

use crate::metrics::METRICS;
use crate::source::adapter::RowSource;

/// Page size used when the caller has no better estimate.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// A range request that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub from: usize,
    pub to: usize,
    pub message: String,
}

/// Everything one exhaustive read produced.
///
/// `rows` holds the pages fetched before the read stopped, in request
/// order. A non-empty `failures` means the read was cut short and the
/// rows are only a prefix of the collection.
#[derive(Debug, Clone, Default)]
pub struct PagedRows {
    pub rows: Vec<Value>,
    pub pages: usize,
    pub failures: Vec<PageFailure>,
}

impl PagedRows {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Nothing was read and the backend reported an error.
    pub fn is_total_failure(&self) -> bool {
        self.rows.is_empty() && self.is_partial()
    }
}

/// Reads every row of `collection`, one range at a time.
///
/// Ranges are `[from, from + page_size - 1]` with `from` starting at 0.
/// The loop ends when a page comes back empty or shorter than
/// `page_size`. A failing range aborts the loop; whatever was read
/// before it is returned together with the failure.
///
/// A `page_size` of 0 is treated as 1.
pub async fn fetch_all_rows(
    source: &dyn RowSource,
    collection: &str,
    columns: &str,
    page_size: usize,
) -> PagedRows {
    let page_size = page_size.max(1);
    let mut out = PagedRows::default();
    let mut from = 0;

    loop {
        let to = from + page_size - 1;

        let page = match source.fetch_range(collection, columns, from, to).await {
            Ok(page) => page,
            Err(e) => {
                error!(
                    "Error fetching {collection} [{from}..={to}] from {}: {e}",
                    source.name()
                );
                METRICS.page_failures.fetch_add(1, Ordering::Relaxed);
                out.failures.push(PageFailure {
                    from,
                    to,
                    message: e.to_string(),
                });
                break;
            }
        };

        let len = page.len();
        debug!("{collection} [{from}..={to}] -> {len} rows");

        if len == 0 {
            break;
        }

        METRICS.pages_fetched.fetch_add(1, Ordering::Relaxed);
        METRICS.rows_fetched.fetch_add(len, Ordering::Relaxed);
        out.pages += 1;
        out.rows.extend(page);

        if len < page_size {
            break;
        }
        from += page_size;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::adapter::SourceError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays a fixed list of page outcomes and records every range asked for.
    struct ScriptedSource {
        pages: Mutex<Vec<Result<Vec<Value>, SourceError>>>,
        requests: Mutex<Vec<(usize, usize)>>,
    }

    impl ScriptedSource {
        fn new(mut pages: Vec<Result<Vec<Value>, SourceError>>) -> Self {
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(usize, usize)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl RowSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_range(
            &self,
            _collection: &str,
            _columns: &str,
            from: usize,
            to: usize,
        ) -> Result<Vec<Value>, SourceError> {
            self.requests.lock().unwrap().push((from, to));
            self.pages
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| panic!("unexpected request {from}..={to}"))
        }
    }

    fn rows(range: std::ops::Range<i64>) -> Vec<Value> {
        range.map(|i| json!({ "id": i })).collect()
    }

    #[tokio::test]
    async fn short_page_ends_the_read() {
        let src = ScriptedSource::new(vec![Ok(rows(0..3)), Ok(rows(3..6)), Ok(rows(6..7))]);

        let out = fetch_all_rows(&src, "figures", "id", 3).await;

        assert_eq!(out.rows, rows(0..7));
        assert_eq!(out.pages, 3);
        assert!(!out.is_partial());
        assert_eq!(src.requests(), vec![(0, 2), (3, 5), (6, 8)]);
    }

    #[tokio::test]
    async fn empty_page_ends_the_read() {
        let src = ScriptedSource::new(vec![Ok(rows(0..2)), Ok(rows(2..4)), Ok(Vec::new())]);

        let out = fetch_all_rows(&src, "figures", "id", 2).await;

        assert_eq!(out.rows, rows(0..4));
        assert_eq!(out.pages, 2);
        assert_eq!(src.requests(), vec![(0, 1), (2, 3), (4, 5)]);
    }

    #[tokio::test]
    async fn empty_collection_is_not_a_failure() {
        let src = ScriptedSource::new(vec![Ok(Vec::new())]);

        let out = fetch_all_rows(&src, "figures", "id", DEFAULT_PAGE_SIZE).await;

        assert!(out.rows.is_empty());
        assert!(!out.is_total_failure());
        assert_eq!(src.requests(), vec![(0, 999)]);
    }

    #[tokio::test]
    async fn failing_page_keeps_earlier_rows() {
        let src = ScriptedSource::new(vec![
            Ok(rows(0..2)),
            Err(SourceError::Malformed("connection reset".into())),
            Ok(rows(4..5)),
        ]);

        let out = fetch_all_rows(&src, "fingerprint_votes", "figure_id, direction", 2).await;

        assert_eq!(out.rows, rows(0..2));
        assert!(out.is_partial());
        assert!(!out.is_total_failure());
        assert_eq!(
            out.failures,
            vec![PageFailure {
                from: 2,
                to: 3,
                message: "malformed response: connection reset".into(),
            }]
        );
        // no retry, no third page
        assert_eq!(src.requests(), vec![(0, 1), (2, 3)]);
    }

    #[tokio::test]
    async fn failing_first_page_is_a_total_failure() {
        let src = ScriptedSource::new(vec![Err(SourceError::Status {
            status: 401,
            body: "invalid api key".into(),
        })]);

        let out = fetch_all_rows(&src, "figures", "id", 10).await;

        assert!(out.is_total_failure());
        assert_eq!(out.failures[0].message, "backend returned 401: invalid api key");
    }
}
