//! FILENAME: core/pivot-engine/src/followup.rs
//! Followups run on a finished report rather than on the data.
//!
//! A leaderboard ranks the top-level groups of a report by one of its
//! rendered columns. It reads the `verbatim` rows, so it sees exactly what
//! the report printed, including dictionary labels and formatting.

use serde::{Deserialize, Serialize};

use crate::format::NOT_AVAILABLE;
use crate::styled::{Align, Emphasis, Line, Styled};

/// Parses a rendered number back: "$150k" → 150000, "($25k)" → -25000,
/// "12.5%" → 0.125, "1,234" → 1234. "N/A" and free text give `None`.
pub fn parse_display_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text == NOT_AVAILABLE {
        return None;
    }

    let (negative, body) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        },
    };

    let body = body.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-');
    let (body, scale) = if let Some(b) = body.strip_suffix('%') {
        (b, 0.01)
    } else if let Some(b) = body.strip_suffix(|c: char| c.eq_ignore_ascii_case(&'k')) {
        (b, 1_000.0)
    } else if let Some(b) = body.strip_suffix(|c: char| c.eq_ignore_ascii_case(&'m')) {
        (b, 1_000_000.0)
    } else {
        (body, 1.0)
    };

    let digits: String = body.chars().filter(|c| *c != ',').collect();
    let value = digits.parse::<f64>().ok()? * scale;
    Some(if negative { -value } else { value })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeaderboardSpec {
    pub title: String,
    /// Data column to rank by, 0-based after the label column.
    /// `None` ranks by the last column (the total when totals are on).
    pub column: Option<usize>,
    /// Keep only the first `top` entries.
    pub top: Option<usize>,
    pub ascending: bool,
}

impl Default for LeaderboardSpec {
    fn default() -> Self {
        LeaderboardSpec {
            title: "Leaderboard".to_string(),
            column: None,
            top: None,
            ascending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based; ties share a rank.
    pub rank: usize,
    pub label: String,
    pub value: f64,
    /// The cell text as the report printed it.
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub title: String,
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Ranks `verbatim` rows. Rows whose ranked cell is missing or not a
    /// number are left out.
    pub fn from_verbatim(verbatim: &[Vec<Styled>], spec: &LeaderboardSpec) -> Self {
        let mut rows: Vec<(String, f64, String)> = verbatim
            .iter()
            .filter_map(|row| {
                let (label, data) = row.split_first()?;
                let cell = match spec.column {
                    Some(i) => data.get(i)?,
                    None => data.last()?,
                };
                let value = parse_display_number(&cell.text)?;
                Some((label.text.trim().to_string(), value, cell.text.trim().to_string()))
            })
            .collect();

        rows.sort_by(|a, b| {
            let order = a.1.total_cmp(&b.1);
            if spec.ascending {
                order
            } else {
                order.reverse()
            }
        });

        let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(rows.len());
        for (i, (label, value, display)) in rows.into_iter().enumerate() {
            let rank = match entries.last() {
                Some(prev) if prev.value == value => prev.rank,
                _ => i + 1,
            };
            entries.push(LeaderboardEntry {
                rank,
                label,
                value,
                display,
            });
        }
        if let Some(top) = spec.top {
            entries.truncate(top);
        }

        log::debug!("leaderboard '{}': {} entries", spec.title, entries.len());
        Leaderboard {
            title: spec.title.clone(),
            entries,
        }
    }

    pub fn lines(&self) -> Vec<Line> {
        let label_width = self
            .entries
            .iter()
            .map(|e| e.label.chars().count())
            .max()
            .unwrap_or(0);
        let value_width = self
            .entries
            .iter()
            .map(|e| e.display.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = vec![Line::new(vec![Styled::bold(self.title.as_str())])];
        for entry in &self.entries {
            let emphasis = if entry.rank == 1 { Emphasis::Bold } else { Emphasis::Plain };
            lines.push(Line::new(vec![
                Styled::new(format!("{}.", entry.rank), emphasis).fit(4, Align::Right),
                Styled::new(entry.label.as_str(), emphasis).fit(label_width + 2, Align::Center),
                Styled::new(entry.display.as_str(), emphasis).fit(value_width, Align::Right),
            ]));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Styled> {
        cells.iter().map(|c| Styled::plain(*c)).collect()
    }

    #[test]
    fn test_parse_display_number() {
        assert_eq!(parse_display_number("$150k"), Some(150_000.0));
        assert_eq!(parse_display_number("($25k)"), Some(-25_000.0));
        assert_eq!(parse_display_number("  12.5% "), Some(0.125));
        assert_eq!(parse_display_number("1,234"), Some(1234.0));
        assert_eq!(parse_display_number("-3"), Some(-3.0));
        assert_eq!(parse_display_number("N/A"), None);
        assert_eq!(parse_display_number("Jan"), None);
    }

    #[test]
    fn test_ranks_by_total_descending() {
        let verbatim = vec![
            row(&["ANZ   ", " $120k", " $10k", " $130k"]),
            row(&["ASEAN ", "   $0k", " $30k", "  $30k"]),
            row(&["Japan ", "  $80k", " N/A ", " $130k"]),
        ];
        let board = Leaderboard::from_verbatim(&verbatim, &LeaderboardSpec::default());

        let ranks: Vec<(usize, &str)> = board.entries.iter().map(|e| (e.rank, e.label.as_str())).collect();
        assert_eq!(ranks, vec![(1, "ANZ"), (1, "Japan"), (3, "ASEAN")]);
        assert_eq!(board.entries[2].display, "$30k");
    }

    #[test]
    fn test_column_top_and_missing_cells() {
        let verbatim = vec![
            row(&["ANZ", "$120k", "$10k"]),
            row(&["ASEAN", "$0k", "$30k"]),
            row(&["Japan", "$80k", "N/A"]),
        ];
        let spec = LeaderboardSpec {
            column: Some(1),
            top: Some(1),
            ascending: true,
            ..LeaderboardSpec::default()
        };
        let board = Leaderboard::from_verbatim(&verbatim, &spec);
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].label, "ANZ");
        assert_eq!(board.entries[0].value, 10_000.0);
    }

    #[test]
    fn test_lines() {
        let verbatim = vec![row(&["ANZ", "$130k"]), row(&["ASEAN", "$30k"])];
        let board = Leaderboard::from_verbatim(&verbatim, &LeaderboardSpec::default());
        let lines = board.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text(), "Leaderboard");
        assert_eq!(lines[1].cells[0].emphasis, Emphasis::Bold);
        assert_eq!(lines[1].width(), lines[2].width());
    }
}
