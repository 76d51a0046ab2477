use std::fmt;
use std::str::FromStr;

use crate::schema::Category;

use super::tally::RankedFigure;

/// Sentinel meaning "no country restriction".
pub const COUNTRY_ALL: &str = "All";

/// Above this many rows the table carries a result-count note.
pub const RESULT_NOTE_THRESHOLD: usize = 1000;

/// Category selection: everything, or one concrete category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Pill order: All, then the categories.
    pub fn choices() -> impl Iterator<Item = CategoryFilter> {
        std::iter::once(CategoryFilter::All).chain(Category::ALL.into_iter().map(CategoryFilter::Only))
    }

    pub fn admits(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(c) => c.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

/// Which count the view is ranked by (always descending).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankMode {
    #[default]
    Percent,
    Resonate,
    Reject,
}

impl RankMode {
    pub const ALL: [RankMode; 3] = [RankMode::Percent, RankMode::Resonate, RankMode::Reject];

    pub fn key(self) -> &'static str {
        match self {
            RankMode::Percent => "percent",
            RankMode::Resonate => "resonate",
            RankMode::Reject => "reject",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankMode::Percent => "% Resonance",
            RankMode::Resonate => "Total Resonance",
            RankMode::Reject => "Total Rejection",
        }
    }

    fn sort_key(self, f: &RankedFigure) -> u64 {
        match self {
            RankMode::Percent => u64::from(f.percent),
            RankMode::Resonate => f.tally.resonate,
            RankMode::Reject => f.tally.reject,
        }
    }
}

impl FromStr for RankMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankMode::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown rank mode '{s}' (percent, resonate, reject)"))
    }
}

/// Current user selection. Defaults: All, no country, percent.
///
/// `country` is shared by the exact-match dropdown and the free-text
/// search; both write the same field and both filter by substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub category: CategoryFilter,
    pub country: String,
    pub rank_mode: RankMode,
}

impl Selection {
    /// Country text that actually filters, if any.
    ///
    /// Only applies under Politicians; empty text and the `All`
    /// sentinel mean no restriction.
    pub fn country_filter(&self) -> Option<&str> {
        let applies = self.category == CategoryFilter::Only(Category::Politicians);
        let c = self.country.as_str();
        (applies && !c.is_empty() && c != COUNTRY_ALL).then_some(c)
    }
}

/// Filtered, sorted rows for one selection.
#[derive(Debug, Clone)]
pub struct RankedView<'a> {
    pub rows: Vec<&'a RankedFigure>,
}

impl RankedView<'_> {
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn needs_result_note(&self) -> bool {
        self.total() > RESULT_NOTE_THRESHOLD
    }
}

/// Applies category and country filters, then sorts descending by the
/// selected rank mode. Equal keys are ordered by figure id ascending.
pub fn rank_view<'a>(figures: &'a [RankedFigure], selection: &Selection) -> RankedView<'a> {
    let needle = selection.country_filter().map(str::to_lowercase);

    let mut rows: Vec<&RankedFigure> = figures
        .iter()
        .filter(|f| selection.category.admits(f.figure.category))
        .filter(|f| match &needle {
            None => true,
            Some(needle) => f
                .figure
                .country
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(needle.as_str())),
        })
        .collect();

    let mode = selection.rank_mode;
    rows.sort_by(|a, b| {
        mode.sort_key(b)
            .cmp(&mode.sort_key(a))
            .then_with(|| a.figure.id.cmp(&b.figure.id))
    });

    RankedView { rows }
}
