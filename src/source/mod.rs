//! Row source registry and factory
//!
//! This module provides:
//! - The `RowSource` trait consumed by the collector
//! - The hosted PostgREST backend and the in-memory fixture backend
//! - A factory resolving the configured backend
//!
//! The rest of the application must interact exclusively through
//! the `RowSource` trait.

pub mod adapter;
pub mod memory;
pub mod postgrest;

use std::sync::Arc;

use anyhow::Context;

use crate::config::{BackendConfig, BackendKind};
use adapter::RowSource;

/// Builds the row source described by the backend configuration.
///
/// The configuration is expected to be validated already; missing
/// fields are still reported as errors rather than panics.
pub fn get_source(cfg: &BackendConfig) -> anyhow::Result<Arc<dyn RowSource>> {
    match cfg.kind {
        BackendKind::Postgrest => {
            let url = cfg.url.as_deref().context("backend.url missing")?;
            let key = cfg.key.as_deref().context("backend.key missing")?;
            Ok(Arc::new(postgrest::PostgrestSource::new(url, key)?))
        }
        BackendKind::Memory => {
            let path = cfg.fixture.as_deref().context("backend.fixture missing")?;
            Ok(Arc::new(memory::MemorySource::from_fixture(path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::config::Config;
    use crate::source::memory::MemorySource;

    #[tokio::test]
    async fn memory_backend_loads_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.json");
        let config = dir.path().join("config.json");

        fs::write(
            &fixture,
            json!({
                "figures": [
                    {"id": 1, "name": "A", "category": "Politicians", "country": "France"},
                    {"id": 2, "name": "B", "category": "Executives"},
                ],
                "fingerprint_votes": [],
            })
            .to_string(),
        )
        .unwrap();
        fs::write(
            &config,
            json!({
                "backend": {"kind": "memory", "fixture": fixture.to_str().unwrap()},
                "debug": {"log": true},
            })
            .to_string(),
        )
        .unwrap();

        let cfg = Config::load(&config).unwrap();
        assert_eq!(cfg.backend.kind, BackendKind::Memory);
        assert!(cfg.debug_log());

        let source = get_source(&cfg.backend).unwrap();
        assert_eq!(source.name(), "memory");

        let figures = &cfg.collections.figures;
        let rows = source.fetch_range(&figures.name, &figures.columns, 0, 9).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], "B");
    }

    #[test]
    fn missing_files_are_reported_with_their_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");

        let err = MemorySource::from_fixture(&missing).err().unwrap();
        assert!(format!("{err:#}").contains("nope.json"));

        let err = Config::load(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));

        let cfg = BackendConfig {
            kind: BackendKind::Memory,
            url: None,
            key: None,
            fixture: Some(missing.to_string_lossy().into_owned()),
        };
        assert!(get_source(&cfg).is_err());
    }

    #[test]
    fn malformed_fixtures_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.json");
        fs::write(&fixture, r#"{"figures": {"id": 1}}"#).unwrap();

        let err = MemorySource::from_fixture(&fixture).err().unwrap();
        assert!(format!("{err:#}").contains("must be an array"));
    }
}
