use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;

use super::adapter::{RowSource, SourceError};

/// In-memory row source
///
/// Serves collections held in process. Used for:
/// - Demo mode (`backend.kind = "memory"` with a fixture file)
/// - Tests that need a backend without network I/O
///
/// A collection can be told to fail every range starting at or
/// beyond a given offset, which simulates a backend that drops
/// out halfway through a paginated read.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    collections: HashMap<String, Vec<Value>>,
    failures: HashMap<String, usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `{ "<collection>": [rows...] }` from a JSON file.
    pub fn from_fixture(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let Value::Object(map) = serde_json::from_str(data)? else {
            bail!("fixture must be a JSON object keyed by collection name");
        };

        let mut source = Self::new();
        for (name, rows) in map {
            let Value::Array(rows) = rows else {
                bail!("fixture collection '{name}' must be an array");
            };
            source.collections.insert(name, rows);
        }
        Ok(source)
    }

    #[cfg(test)]
    pub fn with_collection(mut self, name: &str, rows: Vec<Value>) -> Self {
        self.collections.insert(name.to_string(), rows);
        self
    }

    #[cfg(test)]
    /// Makes every range of `name` starting at `from` or later fail.
    pub fn failing_from(mut self, name: &str, from: usize) -> Self {
        self.failures.insert(name.to_string(), from);
        self
    }
}

#[async_trait::async_trait]
impl RowSource for MemorySource {

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_range(
        &self,
        collection: &str,
        _columns: &str,
        from: usize,
        to: usize,
    ) -> Result<Vec<Value>, SourceError> {
        if from > to {
            return Err(SourceError::InvalidRange { from, to });
        }

        if self.failures.get(collection).is_some_and(|&at| from >= at) {
            return Err(SourceError::Status {
                status: 503,
                body: format!("{collection} unavailable at offset {from}"),
            });
        }

        let rows = self
            .collections
            .get(collection)
            .ok_or_else(|| SourceError::UnknownCollection(collection.to_string()))?;

        if from >= rows.len() {
            return Ok(Vec::new());
        }
        let end = rows.len().min(to + 1);
        Ok(rows[from..end].to_vec())
    }
}
