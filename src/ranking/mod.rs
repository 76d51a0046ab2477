//! Aggregation and ranking pipeline
//!
//! Turns a loaded snapshot into what the table shows:
//! - `tally`: vote counts per figure, merged into `RankedFigure`s
//! - `CountryIndex`: country choices for the Politicians selector
//! - `view`: selection state and the filtered, sorted view
//!
//! Everything here is synchronous and free of I/O. Tallies, merge and
//! the country index run once per load; `rank_view` runs on every
//! selection change.

pub mod tally;
pub mod view;

pub use tally::{RankedFigure, build_tallies, merge};
pub use view::{CategoryFilter, COUNTRY_ALL, RankMode, RankedView, Selection, rank_view};

use std::collections::BTreeSet;

use crate::schema::Category;

/// Distinct countries of Politicians, sorted, with `All` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryIndex(Vec<String>);

impl CountryIndex {
    pub fn build(figures: &[RankedFigure]) -> Self {
        let distinct: BTreeSet<&str> = figures
            .iter()
            .filter(|f| f.figure.category == Category::Politicians)
            .filter_map(|f| f.figure.country.as_deref())
            .filter(|c| !c.is_empty())
            .collect();

        let mut countries: Vec<&str> = distinct.into_iter().collect();
        // case-insensitive first, byte order between case variants
        countries.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));

        let mut entries = Vec::with_capacity(countries.len() + 1);
        entries.push(COUNTRY_ALL.to_string());
        entries.extend(countries.into_iter().map(str::to_string));
        Self(entries)
    }

    /// `All` followed by the countries.
    pub fn entries(&self) -> &[String] {
        &self.0
    }
}

impl Default for CountryIndex {
    fn default() -> Self {
        Self(vec![COUNTRY_ALL.to_string()])
    }
}
