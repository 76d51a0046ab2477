//! Text presentation of the leaderboard widget.
//!
//! Mirrors the page layout: category pills, the country selector
//! (Politicians only), rank-mode pills, then the table area. The table
//! area shows the loading or error state when there is no data.

use std::fmt::Write;

use crate::{
    ranking::{CategoryFilter, CountryIndex, RankMode, RankedView, Selection, COUNTRY_ALL},
    schema::Category,
    session::{Leaderboard, LoadState, Redraw},
};

pub const LOADING: &str = "Loading leaderboard…";

const HEADERS: [&str; 6] = ["#", "Name", "Resonate", "Reject", "Ambivalent", "% Resonance"];

fn pill(label: &str, active: bool) -> String {
    if active {
        format!("[{label}]")
    } else {
        format!(" {label} ")
    }
}

pub fn render_category_bar(selection: &Selection) -> String {
    CategoryFilter::choices()
        .map(|c| pill(&c.to_string(), c == selection.category))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `None` unless Politicians is selected.
pub fn render_country_bar(selection: &Selection, countries: &CountryIndex) -> Option<String> {
    if selection.category != CategoryFilter::Only(Category::Politicians) {
        return None;
    }

    let current = if selection.country.is_empty() {
        COUNTRY_ALL
    } else {
        selection.country.as_str()
    };
    let options = countries
        .entries()
        .iter()
        .map(|c| pill(c, c == current))
        .collect::<Vec<_>>()
        .join(" ");

    let mut bar = format!("Country: {options}");
    // free text that is not one of the dropdown entries
    if !countries.entries().iter().any(|c| c == current) {
        let _ = write!(bar, "  Search: {current}");
    }
    Some(bar)
}

pub fn render_rank_bar(selection: &Selection) -> String {
    RankMode::ALL
        .into_iter()
        .map(|m| pill(m.label(), m == selection.rank_mode))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_table(view: &RankedView<'_>) -> String {
    let rows: Vec<[String; 6]> = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, f)| {
            [
                (i + 1).to_string(),
                f.figure.name.clone(),
                f.tally.resonate.to_string(),
                f.tally.reject.to_string(),
                f.tally.ambivalent.to_string(),
                format!("{}%", f.percent),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |cells: &[&str]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        out.push_str(padded.join(" | ").trim_end());
        out.push('\n');
    };

    line(&HEADERS);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        line(&cells);
    }

    if view.needs_result_note() {
        let _ = writeln!(out, "Showing {} results (scroll for more)", view.total());
    }
    out
}

/// Table area: data, or whatever stands in for it.
pub fn render_table_area(board: &Leaderboard) -> String {
    match board.state() {
        LoadState::Idle => String::new(),
        LoadState::Loading => format!("{LOADING}\n"),
        LoadState::Failed(message) => format!("Error loading leaderboard.\n{message}\n"),
        LoadState::Ready(_) => board.view().map(|v| render_table(&v)).unwrap_or_default(),
    }
}

/// Renders the parts named by `redraw`. Control bars need data.
pub fn render(board: &Leaderboard, redraw: Redraw) -> String {
    let selection = board.selection();
    let mut out = String::new();

    if let Some(snapshot) = board.snapshot() {
        if redraw.category_bar {
            out.push_str(&render_category_bar(selection));
            out.push('\n');
        }
        if redraw.country_bar {
            if let Some(bar) = render_country_bar(selection, &snapshot.countries) {
                out.push_str(&bar);
                out.push('\n');
            }
        }
        if redraw.rank_bar {
            out.push_str(&render_rank_bar(selection));
            out.push('\n');
        }
    }

    if redraw.table {
        out.push_str(&render_table_area(board));
    }
    out
}

/// Everything, as after a fresh load.
pub fn render_all(board: &Leaderboard) -> String {
    render(
        board,
        Redraw {
            category_bar: true,
            country_bar: true,
            rank_bar: true,
            table: true,
        },
    )
}
