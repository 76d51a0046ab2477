use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::collector::DEFAULT_PAGE_SIZE;

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// This is the top-level configuration structure loaded from
// `config.json`.
//
// It defines:
// - Which backend serves the rows (hosted API or local fixture)
// - Which collections hold figures and vote events
// - Optional debug configuration
//
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Row backend settings
    pub backend: BackendConfig,

    /// Collection names, projections and page sizes
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Optional debug configuration
    pub debug: Option<DebugConfig>,
}

impl Config {
    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Config = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks semantic constraints serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.backend.kind {
            BackendKind::Postgrest => {
                if self.backend.url.as_deref().is_none_or(str::is_empty) {
                    bail!("backend.url is required for the postgrest backend");
                }
                if self.backend.key.as_deref().is_none_or(str::is_empty) {
                    bail!("backend.key is required for the postgrest backend");
                }
            }
            BackendKind::Memory => {
                if self.backend.fixture.as_deref().is_none_or(str::is_empty) {
                    bail!("backend.fixture is required for the memory backend");
                }
            }
        }

        for (label, c) in [
            ("figures", &self.collections.figures),
            ("votes", &self.collections.votes),
        ] {
            if c.name.trim().is_empty() {
                bail!("collections.{label}.name must not be empty");
            }
            if c.columns.trim().is_empty() {
                bail!("collections.{label}.columns must not be empty");
            }
            if c.page_size == 0 {
                bail!("collections.{label}.page_size must be positive");
            }
        }

        Ok(())
    }

    pub fn debug_log(&self) -> bool {
        self.debug
            .as_ref()
            .is_some_and(|d| d.log.unwrap_or(false))
    }
}

// ------------------------------------------------------------
// Backend configuration
// ------------------------------------------------------------
//
// Notes:
// - `key` is the public anon key of the hosted project. It is
//   still a credential and must never be committed.
// - `fixture` is only read by the memory backend (demo mode).
//
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Postgrest,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,

    /// Project base URL, e.g. https://<ref>.supabase.co
    pub url: Option<String>,

    /// Anon API key
    pub key: Option<String>,

    /// JSON file holding `{ "<collection>": [rows...] }`
    pub fixture: Option<String>,
}

// ------------------------------------------------------------
// Collections
// ------------------------------------------------------------
//
// Page sizes reflect the expected practical volume
// (~10k figures, ~50k votes). They are not enforced limits.
//
#[derive(Debug, Deserialize, Clone)]
pub struct CollectionsConfig {
    #[serde(default = "default_figures")]
    pub figures: CollectionConfig,

    #[serde(default = "default_votes")]
    pub votes: CollectionConfig,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            figures: default_figures(),
            votes: default_votes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    pub name: String,

    /// Comma-separated field projection
    pub columns: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_figures() -> CollectionConfig {
    CollectionConfig {
        name: "figures".into(),
        columns: "id, name, category, country".into(),
        page_size: DEFAULT_PAGE_SIZE,
    }
}

fn default_votes() -> CollectionConfig {
    CollectionConfig {
        name: "fingerprint_votes".into(),
        columns: "figure_id, direction".into(),
        page_size: 5000,
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

// ------------------------------------------------------------
// Debug configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Switches the default log level to `debug`
    pub log: Option<bool>,
}
