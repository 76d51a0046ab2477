use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    collector::{PagedRows, fetch_all_rows},
    config::{CollectionConfig, CollectionsConfig},
    metrics::METRICS,
    ranking::{
        CategoryFilter, CountryIndex, RankMode, RankedFigure, RankedView, Selection, build_tallies,
        merge, rank_view,
    },
    schema::{Figure, VoteEvent, decode_rows},
    source::adapter::RowSource,
};

/// Which collections a load reads, and how.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub figures: CollectionConfig,
    pub votes: CollectionConfig,
}

impl From<&CollectionsConfig> for LoadPlan {
    fn from(c: &CollectionsConfig) -> Self {
        Self {
            figures: c.figures.clone(),
            votes: c.votes.clone(),
        }
    }
}

/// A load that produced nothing usable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {collection}: {message}")]
    Collection { collection: String, message: String },
}

/// Everything one load produced, ready for repeated ranking.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub figures: Vec<RankedFigure>,
    pub countries: CountryIndex,
    pub loaded_at: DateTime<Utc>,

    /// Page failures that cut a collection short. The snapshot is
    /// still shown; these are only reported to the log and callers.
    pub degraded: Vec<String>,

    /// Rows dropped at the ingestion boundary
    pub quarantined: usize,
}

#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready(Snapshot),
    Failed(String),
}

/// Which parts of the widget a selection change invalidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redraw {
    pub category_bar: bool,
    pub country_bar: bool,
    pub rank_bar: bool,
    pub table: bool,
}

// ------------------------------------------------------------
// Leaderboard session
// ------------------------------------------------------------
//
// One widget instance. Owns the loaded data and the selection;
// every mutation goes through `&mut self`, so a session can never
// run two loads at once. A load whose future is dropped halfway
// leaves the state at `Loading` and the next `load` replaces it.
//
#[derive(Debug, Default)]
pub struct Leaderboard {
    state: LoadState,
    selection: Selection,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match &self.state {
            LoadState::Ready(s) => Some(s),
            _ => None,
        }
    }

    /// Reads both collections and rebuilds the snapshot.
    ///
    /// Figures are read before votes. The selection goes back to its
    /// defaults. On failure the state carries the error description.
    pub async fn load(&mut self, source: &dyn RowSource, plan: &LoadPlan) -> &LoadState {
        if matches!(self.state, LoadState::Loading) {
            warn!("previous load never completed, starting over");
        }
        self.state = LoadState::Loading;

        self.state = match load_snapshot(source, plan).await {
            Ok(snapshot) => {
                info!(
                    "leaderboard loaded: {} figures, {} countries",
                    snapshot.figures.len(),
                    snapshot.countries.entries().len() - 1
                );
                METRICS.loads_completed.fetch_add(1, Ordering::Relaxed);
                LoadState::Ready(snapshot)
            }
            Err(e) => {
                warn!("leaderboard load failed: {e}");
                METRICS.loads_failed.fetch_add(1, Ordering::Relaxed);
                LoadState::Failed(e.to_string())
            }
        };
        self.selection = Selection::default();

        &self.state
    }

    /// Ranked rows for the current selection, if data is loaded.
    pub fn view(&self) -> Option<RankedView<'_>> {
        self.snapshot()
            .map(|s| rank_view(&s.figures, &self.selection))
    }

    /// Switches category and clears the country text.
    pub fn set_category(&mut self, category: CategoryFilter) -> Redraw {
        self.selection.category = category;
        self.selection.country.clear();
        Redraw {
            category_bar: true,
            country_bar: true,
            table: true,
            ..Redraw::default()
        }
    }

    /// Sets the country text, from the dropdown or the search box.
    pub fn set_country(&mut self, country: impl Into<String>) -> Redraw {
        self.selection.country = country.into();
        Redraw {
            table: true,
            ..Redraw::default()
        }
    }

    pub fn set_rank_mode(&mut self, mode: RankMode) -> Redraw {
        self.selection.rank_mode = mode;
        Redraw {
            rank_bar: true,
            table: true,
            ..Redraw::default()
        }
    }
}

/// Reads one collection; only a read that got nothing at all fails.
async fn read_collection(
    source: &dyn RowSource,
    collection: &CollectionConfig,
    degraded: &mut Vec<String>,
) -> Result<PagedRows, LoadError> {
    let paged = fetch_all_rows(source, &collection.name, &collection.columns, collection.page_size).await;

    debug!("{}: {} rows in {} pages", collection.name, paged.rows.len(), paged.pages);

    if paged.is_total_failure() {
        let message = paged
            .failures
            .first()
            .map(|f| f.message.clone())
            .unwrap_or_default();
        return Err(LoadError::Collection {
            collection: collection.name.clone(),
            message,
        });
    }

    for f in &paged.failures {
        degraded.push(format!("{} [{}..={}]: {}", collection.name, f.from, f.to, f.message));
    }

    Ok(paged)
}

async fn load_snapshot(source: &dyn RowSource, plan: &LoadPlan) -> Result<Snapshot, LoadError> {
    let mut degraded = Vec::new();

    let figure_rows = read_collection(source, &plan.figures, &mut degraded).await?;
    let vote_rows = read_collection(source, &plan.votes, &mut degraded).await?;

    if !degraded.is_empty() {
        warn!("continuing with partial data: {}", degraded.join("; "));
    }

    let figures = decode_rows::<Figure>(figure_rows.rows, "figure");
    let votes = decode_rows::<VoteEvent>(vote_rows.rows, "vote");

    let tallies = build_tallies(&votes.records);
    let ranked = merge(figures.records, &tallies);
    let countries = CountryIndex::build(&ranked);

    Ok(Snapshot {
        figures: ranked,
        countries,
        loaded_at: Utc::now(),
        degraded,
        quarantined: figures.quarantined + votes.quarantined,
    })
}
