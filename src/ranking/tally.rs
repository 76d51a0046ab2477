use std::collections::HashMap;
use std::sync::atomic::Ordering;

use crate::metrics::METRICS;
use crate::schema::{Direction, Figure, FigureId, VoteEvent};

/// Per-figure vote counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub resonate: u64,
    pub reject: u64,
    pub ambivalent: u64,
}

impl Tally {
    /// Counts one vote. Returns false for an unrecognized direction.
    pub fn record(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Resonate => self.resonate += 1,
            Direction::Reject => self.reject += 1,
            Direction::Ambivalent => self.ambivalent += 1,
            Direction::Unrecognized => return false,
        }
        true
    }

    /// Share of resonate among decisive votes, rounded half up.
    /// Ambivalent votes are not decisive. No decisive votes gives 0.
    pub fn percent(&self) -> u8 {
        let decisive = self.resonate + self.reject;
        if decisive == 0 {
            return 0;
        }
        // round(100 * r / d) == floor((200 * r + d) / (2 * d))
        ((200 * self.resonate + decisive) / (2 * decisive)) as u8
    }
}

/// Folds every vote into a tally keyed by figure id.
///
/// A figure id gets an all-zero tally the first time it is seen,
/// even when that vote's direction is not counted.
pub fn build_tallies(votes: &[VoteEvent]) -> HashMap<FigureId, Tally> {
    let mut tallies: HashMap<FigureId, Tally> = HashMap::new();
    let mut ignored = 0;

    for vote in votes {
        let tally = tallies.entry(vote.figure_id.clone()).or_default();
        if !tally.record(vote.direction) {
            ignored += 1;
        }
    }

    if ignored > 0 {
        METRICS.votes_ignored.fetch_add(ignored, Ordering::Relaxed);
    }

    tallies
}

/// A figure combined with its tally and derived percent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedFigure {
    pub figure: Figure,
    pub tally: Tally,

    /// 0..=100
    pub percent: u8,
}

/// Attaches a tally to every figure. Figures without votes get zeros.
/// Output order follows `figures`.
pub fn merge(figures: Vec<Figure>, tallies: &HashMap<FigureId, Tally>) -> Vec<RankedFigure> {
    figures
        .into_iter()
        .map(|figure| {
            let tally = tallies.get(&figure.id).copied().unwrap_or_default();
            RankedFigure {
                percent: tally.percent(),
                figure,
                tally,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Category;

    fn vote(id: i64, direction: Direction) -> VoteEvent {
        VoteEvent {
            figure_id: FigureId::Int(id),
            direction,
        }
    }

    fn figure(id: i64, category: Category, country: Option<&str>) -> Figure {
        Figure {
            id: FigureId::Int(id),
            name: format!("F{id}"),
            category,
            country: country.map(str::to_string),
        }
    }

    #[test]
    fn percent_rounds_half_up() {
        let t = |resonate, reject| Tally { resonate, reject, ambivalent: 0 }.percent();
        assert_eq!(t(2, 1), 67);
        assert_eq!(t(1, 2), 33);
        assert_eq!(t(1, 7), 13); // 12.5
        assert_eq!(t(23, 17), 58); // exactly 57.5, no float error
        assert_eq!(t(1, 1), 50);
        assert_eq!(t(5, 0), 100);
        assert_eq!(t(0, 5), 0);
        assert_eq!(t(0, 0), 0);
    }

    #[test]
    fn percent_stays_in_bounds() {
        for resonate in 0..40 {
            for reject in 0..40 {
                let p = Tally { resonate, reject, ambivalent: 3 }.percent();
                assert!(p <= 100);
                if resonate + reject == 0 {
                    assert_eq!(p, 0);
                }
            }
        }
    }

    #[test]
    fn ambivalent_votes_do_not_move_percent() {
        let mut votes = vec![
            vote(1, Direction::Resonate),
            vote(1, Direction::Resonate),
            vote(1, Direction::Reject),
        ];
        let before = build_tallies(&votes)[&FigureId::Int(1)].percent();

        votes.extend((0..25).map(|_| vote(1, Direction::Ambivalent)));
        let after = build_tallies(&votes)[&FigureId::Int(1)];

        assert_eq!(after.ambivalent, 25);
        assert_eq!(after.percent(), before);
    }

    #[test]
    fn unrecognized_votes_still_register_the_figure() {
        let tallies = build_tallies(&[vote(9, Direction::Unrecognized)]);
        assert_eq!(tallies[&FigureId::Int(9)], Tally::default());
    }

    #[test]
    fn merge_matches_the_worked_example() {
        let figures = vec![
            figure(1, Category::Politicians, Some("France")),
            figure(2, Category::Executives, None),
        ];
        let votes = vec![
            vote(1, Direction::Resonate),
            vote(1, Direction::Resonate),
            vote(1, Direction::Reject),
            vote(2, Direction::Reject),
        ];

        let merged = merge(figures, &build_tallies(&votes));

        assert_eq!(merged[0].tally, Tally { resonate: 2, reject: 1, ambivalent: 0 });
        assert_eq!(merged[0].percent, 67);
        assert_eq!(merged[1].tally, Tally { resonate: 0, reject: 1, ambivalent: 0 });
        assert_eq!(merged[1].percent, 0);
    }

    #[test]
    fn figures_without_votes_get_zero_tallies() {
        let merged = merge(vec![figure(3, Category::Fictional, None)], &HashMap::new());
        assert_eq!(merged[0].tally, Tally::default());
        assert_eq!(merged[0].percent, 0);
    }
}
