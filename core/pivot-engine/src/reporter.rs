//! FILENAME: core/pivot-engine/src/reporter.rs
//! Reporter - renders a built tree as fixed-width styled lines.
//!
//! Row nodes are walked depth-first; columns are resolved per row through
//! the layout's column paths and `Modeler::find`. Each top-level row group
//! is followed by the custom rows, and a TOTAL row closes the report.
//!
//! Every data cell is padded or truncated to exactly its layout width, so
//! header and data columns always line up.

use engine::CellValue;
use serde::{Deserialize, Serialize};

use crate::definition::{CustomSpec, StatsSpec, Transform};
use crate::dictionary::Dictionary;
use crate::error::{PivotError, PivotResult};
use crate::format::{Formatter, NOT_AVAILABLE};
use crate::layout::{line_label, stat_suffixes, Layout, LayoutOptions, TOTAL_LABEL};
use crate::modeler::{Modeler, NodeId, PathSegment, Tree};
use crate::styled::{Align, Emphasis, Line, Styled};
use crate::table::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportOptions {
    /// Prints the (dimmed) headers before every top-level row group.
    pub repeat_headers: bool,
    /// Renders custom rows flagged verbose.
    pub verbose: bool,
    pub layout: LayoutOptions,
}

/// Output of one report run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedReport {
    pub title: String,
    pub lines: Vec<Line>,
    /// Lines of every top-level row group as trimmed display strings.
    pub summary: Vec<Vec<String>>,
    /// The same lines, padded and still styled.
    pub verbatim: Vec<Vec<Styled>>,
    pub layout: Layout,
}

impl RenderedReport {
    /// The report as plain text, one string per line.
    pub fn text_lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::text).collect()
    }
}

pub struct Reporter<'a> {
    modeler: &'a Modeler<'a>,
    dictionary: &'a Dictionary,
    formatter: Formatter,
    options: ReportOptions,
}

impl<'a> Reporter<'a> {
    pub fn new(
        modeler: &'a Modeler<'a>,
        dictionary: &'a Dictionary,
        formatter: Formatter,
        options: ReportOptions,
    ) -> Self {
        let formatter = match modeler.tree() {
            Some(tree) => formatter.fit_dates(tree),
            None => formatter,
        };
        Reporter {
            modeler,
            dictionary,
            formatter,
            options,
        }
    }

    pub fn render(&self, title: &str) -> PivotResult<RenderedReport> {
        let tree = self.modeler.tree().ok_or(PivotError::NotBuilt)?;
        let layout = Layout::rebuild(self.modeler, self.dictionary, &self.formatter, &self.options.layout)?;

        let mut lines = vec![Line::new(vec![Styled::bold(title)])];
        let mut summary = Vec::new();
        let mut verbatim = Vec::new();

        if !self.options.repeat_headers {
            lines.extend(self.header_lines(&layout, Emphasis::Bold));
        }

        let spec_count = self.modeler.stats().len();
        let suffixes = stat_suffixes(self.modeler, self.dictionary);
        for &top in &tree.root().rows {
            if self.options.repeat_headers {
                lines.push(Line::blank());
                lines.extend(self.header_lines(&layout, Emphasis::Grey));
            }

            let group_start = lines.len();
            let mut path = Vec::new();
            self.render_rows(tree, top, &layout, &suffixes, &mut path, &mut lines);
            for line in lines.iter().skip(group_start).take(spec_count) {
                summary.push(line.cells.iter().map(|c| c.text.trim().to_string()).collect());
                verbatim.push(line.cells.clone());
            }

            if let Some(segment) = tree.node(top).and_then(|n| n.segment.clone()) {
                self.render_custom(&[segment], &layout, &mut lines);
            }
        }

        if layout.totals {
            for (spec, suffix) in self.modeler.stats().iter().zip(&suffixes) {
                let label = line_label(TOTAL_LABEL, suffix);
                let mut cells = vec![Styled::bold(label).fit(layout.first_col_width, Align::Left)];
                cells.extend(self.stat_cells(spec, &[], &layout, Emphasis::Bold));
                lines.push(Line::new(cells));
            }
        }

        log::debug!("report '{}' rendered: {} lines", title, lines.len());

        Ok(RenderedReport {
            title: title.to_string(),
            lines,
            summary,
            verbatim,
            layout,
        })
    }

    fn header_lines(&self, layout: &Layout, emphasis: Emphasis) -> Vec<Line> {
        let deepest = layout.headers.len().saturating_sub(1);
        layout
            .headers
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let first = if i == deepest { layout.row_header.as_str() } else { "" };
                let mut cells = vec![Styled::new(first, emphasis).fit(layout.first_col_width, Align::Left)];
                cells.extend(
                    row.iter()
                        .map(|cell| Styled::new(cell.text.as_str(), emphasis).fit(cell.length, Align::Center)),
                );
                Line::new(cells)
            })
            .collect()
    }

    /// One line per stats spec for `id`, then its row children.
    fn render_rows(
        &self,
        tree: &Tree,
        id: NodeId,
        layout: &Layout,
        suffixes: &[String],
        path: &mut Vec<PathSegment>,
        lines: &mut Vec<Line>,
    ) {
        let Some(node) = tree.node(id) else {
            return;
        };
        let Some(segment) = node.segment.as_ref() else {
            return;
        };
        path.push(segment.clone());

        let label = self.formatter.label(segment, self.dictionary);
        let indent = " ".repeat(layout.indent * node.level);
        let emphasis = if node.level == 0 { Emphasis::Bold } else { Emphasis::Plain };
        for (spec, suffix) in self.modeler.stats().iter().zip(suffixes) {
            let text = format!("{}{}", indent, line_label(&label, suffix));
            let mut cells = vec![Styled::new(text, emphasis).fit(layout.first_col_width, Align::Left)];
            cells.extend(self.stat_cells(spec, path, layout, Emphasis::Plain));
            lines.push(Line::new(cells));
        }

        for &child in &node.rows {
            self.render_rows(tree, child, layout, suffixes, path, lines);
        }
        path.pop();
    }

    /// Data cells of one stats line: every column path, then the total.
    fn stat_cells(
        &self,
        spec: &StatsSpec,
        row_path: &[PathSegment],
        layout: &Layout,
        emphasis: Emphasis,
    ) -> Vec<Styled> {
        let kind = self.modeler.kind_of(&spec.key);
        let stat = spec.resolve(kind);
        let mut col_paths: Vec<&[PathSegment]> = layout.col_paths.iter().map(Vec::as_slice).collect();
        if layout.totals {
            col_paths.push(&[]);
        }

        col_paths
            .into_iter()
            .zip(&layout.cells)
            .map(|(col_path, cell)| {
                let value = self
                    .modeler
                    .find_stats(&spec.key, row_path, col_path)
                    .and_then(|stats| stats.get(stat));
                let text = self.formatter.stat(kind, stat, value);
                let emphasis = match (spec.thresholds, value.and_then(CellValue::as_number)) {
                    (Some(thresholds), Some(n)) => Emphasis::Traffic(thresholds.light(n)),
                    _ => emphasis,
                };
                Styled::new(text, emphasis).fit(cell.length, Align::Right)
            })
            .collect()
    }

    /// Custom rows after the top-level group at `row_path`.
    fn render_custom(&self, row_path: &[PathSegment], layout: &Layout, lines: &mut Vec<Line>) {
        let columns: Vec<Vec<&Record>> = layout
            .col_paths
            .iter()
            .map(|col_path| self.modeler.find_records(row_path, col_path).unwrap_or_default())
            .collect();
        let total: Option<Vec<&Record>> = if layout.totals {
            Some(self.modeler.find_records(row_path, &[]).unwrap_or_default())
        } else {
            None
        };

        for spec in self.modeler.custom() {
            if spec.verbose && !self.options.verbose {
                continue;
            }
            if spec.break_line_before {
                lines.push(Line::blank());
            }
            let label = format!("{}{}", " ".repeat(layout.indent), self.dictionary.get(&spec.key));
            let mut cells = vec![Styled::plain(label).fit(layout.first_col_width, Align::Left)];
            let values = self.custom_values(spec, &columns, total.as_deref());
            cells.extend(
                layout
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| values.get(i).cloned().unwrap_or_default().fit(cell.length, Align::Right)),
            );
            lines.push(Line::new(cells));
        }
    }

    /// Cells of a custom row: one per data column, then the total if any.
    fn custom_values(
        &self,
        spec: &CustomSpec,
        columns: &[Vec<&Record>],
        total: Option<&[&Record]>,
    ) -> Vec<Styled> {
        match &spec.transform {
            Transform::RowSeries(f) => f(columns, total),
            Transform::Records(f) => columns
                .iter()
                .map(Vec::as_slice)
                .chain(total)
                .map(|records| Styled::plain(self.formatter.value(spec.kind, &f(records))))
                .collect(),
            Transform::Identity | Transform::MapValue(_) => {
                log::warn!("custom row '{}' has no record calculation", spec.key);
                let count = columns.len() + usize::from(total.is_some());
                vec![Styled::plain(NOT_AVAILABLE); count]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::definition::GroupingSpec;
    use crate::styled::Traffic;
    use crate::table::{Table, TableOptions};
    use crate::types::StatKind;

    fn table() -> Table {
        let row = |practice: &str, stage: &str, amount: &str| {
            vec![CellValue::text(practice), CellValue::text(stage), CellValue::text(amount)]
        };
        Table::from_rows(
            vec!["Practice", "Stage", "Amount"],
            vec![
                row("ANZ", "Won", "USD 120,000"),
                row("ASEAN", "Lost", "USD 30,000"),
                row("ANZ", "Lost", "USD 10,000"),
            ],
            TableOptions::default(),
        )
        .unwrap()
    }

    fn build(table: &Table) -> Modeler<'_> {
        let mut modeler = Modeler::new(table, Analyzer::default());
        modeler
            .build(
                vec![GroupingSpec::new("Practice")],
                vec![GroupingSpec::new("Stage")],
                vec![StatsSpec::new("Amount")],
                vec![
                    CustomSpec::new(
                        "Deals",
                        Transform::records(|records| CellValue::Number(records.len() as f64)),
                    ),
                    CustomSpec::new("Hidden", Transform::records(|_| CellValue::Number(0.0))).verbose(),
                ],
            )
            .unwrap();
        modeler
    }

    #[test]
    fn test_cells_match_layout_widths() {
        let table = table();
        let modeler = build(&table);
        let dict = Dictionary::new();
        let report = Reporter::new(&modeler, &dict, Formatter::default(), ReportOptions::default())
            .render("Bookings")
            .unwrap();

        let width = report.layout.line_width();
        for line in report.lines.iter().skip(1).filter(|l| !l.is_blank()) {
            assert_eq!(line.cells.len(), report.layout.cells.len() + 1);
            assert_eq!(line.width(), width);
            for (cell, layout_cell) in line.cells.iter().skip(1).zip(&report.layout.cells) {
                assert_eq!(cell.width(), layout_cell.length);
            }
        }
    }

    #[test]
    fn test_summary_and_custom_rows() {
        let table = table();
        let modeler = build(&table);
        let dict = Dictionary::new();
        let report = Reporter::new(&modeler, &dict, Formatter::default(), ReportOptions::default())
            .render("Bookings")
            .unwrap();

        assert_eq!(
            report.summary,
            vec![
                vec!["ANZ", "$120k", "$10k", "$130k"],
                vec!["ASEAN", "$0k", "$30k", "$30k"],
            ]
        );
        assert_eq!(report.verbatim.len(), 2);

        let text = report.text_lines();
        assert!(text.iter().any(|l| l.trim_start().starts_with("Deals")));
        assert!(!text.iter().any(|l| l.contains("Hidden")));
        assert!(text.last().unwrap().starts_with("TOTAL"));
        assert!(text.last().unwrap().trim_end().ends_with("$160k"));
    }

    #[test]
    fn test_verbose_and_repeated_headers() {
        let table = table();
        let modeler = build(&table);
        let dict = Dictionary::new();
        let options = ReportOptions {
            repeat_headers: true,
            verbose: true,
            ..ReportOptions::default()
        };
        let report = Reporter::new(&modeler, &dict, Formatter::default(), options)
            .render("Bookings")
            .unwrap();

        let grey_headers = report
            .lines
            .iter()
            .filter(|l| l.cells.iter().any(|c| c.text.trim() == "TOTAL" && c.emphasis == Emphasis::Grey))
            .count();
        assert_eq!(grey_headers, 2);
        assert!(report.text_lines().iter().any(|l| l.contains("Hidden")));
    }

    #[test]
    fn test_thresholds_color_cells() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        modeler
            .build(
                vec![GroupingSpec::new("Practice")],
                vec![],
                vec![StatsSpec::new("Amount").with_thresholds(50_000.0, 100_000.0)],
                vec![],
            )
            .unwrap();
        let dict = Dictionary::new();
        let report = Reporter::new(&modeler, &dict, Formatter::default(), ReportOptions::default())
            .render("Bookings")
            .unwrap();

        assert_eq!(report.verbatim[0][1].emphasis, Emphasis::Traffic(Traffic::Green));
        assert_eq!(report.verbatim[1][1].emphasis, Emphasis::Traffic(Traffic::Red));
    }

    #[test]
    fn test_stats_on_one_column_are_labeled_apart() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        modeler
            .build(
                vec![GroupingSpec::new("Practice")],
                vec![],
                vec![StatsSpec::new("Amount"), StatsSpec::new("Amount").with_stat(StatKind::Count)],
                vec![],
            )
            .unwrap();
        let dict = Dictionary::stat_names();
        let report = Reporter::new(&modeler, &dict, Formatter::default(), ReportOptions::default())
            .render("Bookings")
            .unwrap();

        let labels: Vec<&str> = report.summary.iter().map(|row| row[0].as_str()).collect();
        assert_eq!(
            labels,
            vec!["ANZ Amount Total", "ANZ Amount Count", "ASEAN Amount Total", "ASEAN Amount Count"]
        );
        assert_eq!(report.summary[1][1], "2");

        let text = report.text_lines();
        assert!(text.iter().any(|l| l.starts_with("TOTAL Amount Count")));
        assert!(report.layout.first_col_width > "ASEAN Amount Total".len());
        let width = report.layout.line_width();
        assert!(report.lines.iter().skip(1).all(|l| l.is_blank() || l.width() == width));
    }

    #[test]
    fn test_render_requires_build() {
        let table = table();
        let modeler = Modeler::new(&table, Analyzer::default());
        let dict = Dictionary::new();
        let result = Reporter::new(&modeler, &dict, Formatter::default(), ReportOptions::default())
            .render("Bookings");
        assert_eq!(result.unwrap_err(), PivotError::NotBuilt);
    }
}
