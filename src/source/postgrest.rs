use log::debug;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use super::adapter::{RowSource, SourceError};

/// PostgREST row source
///
/// Talks to a hosted PostgREST endpoint (Supabase style):
///   GET {base}/rest/v1/{collection}?select=..&offset=..&limit=..
///
/// The anon key is sent both as `apikey` and as a bearer token,
/// which is what the hosted gateway expects for public reads.
///
/// DESIGN:
/// - Pure request translation
/// - No retries (the collector decides what a failure means)
/// - No timeout beyond the client defaults
pub struct PostgrestSource {
    client: Client,
    base: Url,
    key: String,
}

impl PostgrestSource {
    pub fn new(base_url: &str, key: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base_url.trim_end_matches('/'))?;
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base,
            key: key.to_string(),
        })
    }

    /// Builds the request URL for one inclusive row range.
    fn range_url(
        &self,
        collection: &str,
        columns: &str,
        from: usize,
        to: usize,
    ) -> Result<Url, SourceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Malformed(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(["rest", "v1", collection]);

        url.query_pairs_mut()
            .append_pair("select", &compact_projection(columns))
            .append_pair("offset", &from.to_string())
            .append_pair("limit", &(to - from + 1).to_string());

        Ok(url)
    }
}

/// Maps a response status and body to rows or an error.
///
/// - non-2xx -> `Status` carrying the body
/// - 2xx with anything but a JSON array -> `Malformed`
fn classify_response(status: StatusCode, body: &str) -> Result<Vec<Value>, SourceError> {
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(other) => Err(SourceError::Malformed(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(SourceError::Malformed(e.to_string())),
    }
}

/// Strips whitespace from a comma-separated projection.
///
/// "id, name, category" -> "id,name,category"
fn compact_projection(columns: &str) -> String {
    columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait::async_trait]
impl RowSource for PostgrestSource {

    fn name(&self) -> &'static str {
        "postgrest"
    }

    async fn fetch_range(
        &self,
        collection: &str,
        columns: &str,
        from: usize,
        to: usize,
    ) -> Result<Vec<Value>, SourceError> {
        if from > to {
            return Err(SourceError::InvalidRange { from, to });
        }

        let url = self.range_url(collection, columns, from, to)?;
        debug!("GET {url}");

        let resp = self
            .client
            .get(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        classify_response(status, &body)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::install_crypto_provider;

    #[test]
    fn projection_whitespace_is_removed() {
        assert_eq!(compact_projection("id, name , category,country"), "id,name,category,country");
        assert_eq!(compact_projection("figure_id,direction,"), "figure_id,direction");
    }

    #[test]
    fn range_url_encodes_offset_and_limit() {
        install_crypto_provider();
        let src = PostgrestSource::new("https://demo.supabase.co/", "anon").unwrap();
        let url = src.range_url("figures", "id, name", 1000, 1999).unwrap();

        assert_eq!(url.path(), "/rest/v1/figures");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("select".into(), "id,name".into()),
                ("offset".into(), "1000".into()),
                ("limit".into(), "1000".into()),
            ]
        );
    }

    #[test]
    fn range_url_keeps_the_base_path() {
        install_crypto_provider();
        for base in ["https://h.example/proxy", "https://h.example/proxy/"] {
            let src = PostgrestSource::new(base, "anon").unwrap();
            let url = src.range_url("figures", "id", 0, 9).unwrap();
            assert_eq!(url.path(), "/proxy/rest/v1/figures", "base {base}");
        }
    }

    #[test]
    fn error_statuses_carry_the_body() {
        let err = classify_response(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid API key"}"#)
            .unwrap_err();
        match err {
            SourceError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, r#"{"message":"Invalid API key"}"#);
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn non_array_bodies_are_malformed() {
        let err = classify_response(StatusCode::OK, r#"{"rows": []}"#).unwrap_err();
        assert!(matches!(&err, SourceError::Malformed(m) if m == "expected a JSON array, got object"));

        let err = classify_response(StatusCode::OK, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn array_bodies_become_rows() {
        let rows = classify_response(StatusCode::PARTIAL_CONTENT, r#"[{"id":1},{"id":2}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(classify_response(StatusCode::OK, "[]").unwrap().is_empty());
    }

    #[tokio::test]
    async fn inverted_range_is_rejected_before_any_request() {
        install_crypto_provider();
        let src = PostgrestSource::new("https://demo.supabase.co", "anon").unwrap();
        let err = src.fetch_range("figures", "id", 10, 5).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidRange { from: 10, to: 5 }));
    }
}
