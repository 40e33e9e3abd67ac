//! FILENAME: core/pivot-engine/src/layout.rs
//! Layout Engine - fixed column widths for a built tree.
//!
//! Each column level gets one width. A parent header is repeated once per
//! ancestor combination and must span its children exactly, so widths are
//! computed bottom-up, widened top-down where a parent label does not fit,
//! and recomputed bottom-up. The deepest level's widths (plus the TOTAL
//! tail) are the widths of every data cell.

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{PivotError, PivotResult};
use crate::format::Formatter;
use crate::modeler::{Axis, Modeler, NodeId, PathSegment, Tree, ROOT};

pub const TOTAL_LABEL: &str = "TOTAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Space kept free around the widest content of a cell.
    pub padding: usize,
    /// Indentation per row nesting level.
    pub indent: usize,
    pub min_cell_width: usize,
    /// Adds the TOTAL column and row.
    pub totals: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            padding: 1,
            indent: 2,
            min_cell_width: 10,
            totals: true,
        }
    }
}

/// One header cell and the width it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub text: String,
    pub length: usize,
}

impl HeaderCell {
    pub fn new(text: impl Into<String>, length: usize) -> Self {
        HeaderCell {
            text: text.into(),
            length,
        }
    }
}

/// Sizing of one column nesting level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelLayout {
    pub key: String,
    /// Distinct display labels of this level, in order.
    pub labels: Vec<String>,
    /// Children per parent.
    pub count: usize,
    /// Width of one cell of this level.
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub first_col_width: usize,
    /// Text of the first header cell.
    pub row_header: String,
    pub levels: Vec<LevelLayout>,
    /// One row of header cells per column level, TOTAL tail included.
    pub headers: Vec<Vec<HeaderCell>>,
    /// Data cell widths: deepest level, then TOTAL.
    pub cells: Vec<HeaderCell>,
    #[serde(skip)]
    pub col_paths: Vec<Vec<PathSegment>>,
    pub totals: bool,
    pub indent: usize,
}

impl Layout {
    /// Computes the layout of `modeler`'s tree.
    pub fn rebuild(
        modeler: &Modeler,
        dictionary: &Dictionary,
        formatter: &Formatter,
        options: &LayoutOptions,
    ) -> PivotResult<Self> {
        let tree = modeler.tree().ok_or(PivotError::NotBuilt)?;
        let formatter = &formatter.fit_dates(tree);
        let padding = options.padding;
        let data_width = data_width(modeler, tree, formatter);

        // labels and fan-out per column level
        let mut levels: Vec<LevelLayout> = Vec::with_capacity(modeler.cols().len());
        let mut level_cells: Vec<Vec<String>> = vec![Vec::new(); modeler.cols().len()];
        collect_header_labels(tree, ROOT, 0, dictionary, formatter, &mut level_cells);
        let mut node = Some(ROOT);
        for (i, spec) in modeler.cols().iter().enumerate() {
            let count = node.and_then(|id| tree.node(id)).map_or(0, |n| n.cols.len());
            node = node.and_then(|id| tree.node(id)).and_then(|n| n.cols.first().copied());
            let mut labels: Vec<String> = Vec::new();
            for label in &level_cells[i] {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
            levels.push(LevelLayout {
                key: spec.key.clone(),
                labels,
                count,
                length: 0,
            });
        }

        // bottom-up
        for i in (0..levels.len()).rev() {
            let own = max_width(&levels[i].labels) + padding;
            levels[i].length = if i + 1 == levels.len() {
                own.max(data_width + padding).max(options.min_cell_width)
            } else {
                own.max(levels[i + 1].length * levels[i + 1].count)
            };
        }
        // top-down widening, then bottom-up so parents span their children exactly
        for i in 1..levels.len() {
            let count = levels[i].count.max(1);
            let needed = (levels[i - 1].length + count - 1) / count;
            if levels[i].length < needed {
                levels[i].length = needed;
            }
        }
        for i in (0..levels.len().saturating_sub(1)).rev() {
            levels[i].length = levels[i + 1].length * levels[i + 1].count.max(1);
        }

        let total_width = (TOTAL_LABEL.len() + padding)
            .max(data_width + padding)
            .max(options.min_cell_width);

        // header rows
        let mut headers: Vec<Vec<HeaderCell>> = level_cells
            .iter()
            .zip(&levels)
            .map(|(cells, level)| {
                cells
                    .iter()
                    .map(|text| HeaderCell::new(text.clone(), level.length))
                    .collect()
            })
            .collect();
        if options.totals {
            if headers.is_empty() {
                headers.push(Vec::new());
            }
            let deepest = headers.len() - 1;
            for (i, row) in headers.iter_mut().enumerate() {
                let text = if i == deepest { TOTAL_LABEL } else { "" };
                row.push(HeaderCell::new(text, total_width));
            }
        }

        let mut cells: Vec<HeaderCell> = match (levels.last(), level_cells.last()) {
            (Some(level), Some(labels)) => labels
                .iter()
                .map(|text| HeaderCell::new(text.clone(), level.length))
                .collect(),
            _ => Vec::new(),
        };
        if options.totals {
            cells.push(HeaderCell::new(TOTAL_LABEL, total_width));
        }

        let row_header = modeler
            .rows()
            .first()
            .map(|spec| dictionary.get(&spec.key).to_string())
            .unwrap_or_default();
        let first_col_width = first_col_width(modeler, tree, dictionary, formatter, options, &row_header);

        let layout = Layout {
            first_col_width,
            row_header,
            levels,
            headers,
            cells,
            col_paths: modeler.expand(ROOT, Axis::Cols),
            totals: options.totals,
            indent: options.indent,
        };
        log::debug!(
            "layout rebuilt: first column {}, {} data cells, line width {}",
            layout.first_col_width,
            layout.cells.len(),
            layout.line_width()
        );
        Ok(layout)
    }

    /// Width of a full report line.
    pub fn line_width(&self) -> usize {
        self.first_col_width + self.cells.iter().map(|c| c.length).sum::<usize>()
    }
}

/// Per stats spec, the text appended to its line labels. A single spec adds
/// nothing; several specs add their column name, and specs sharing a column
/// also add the statistic's display name.
pub(crate) fn stat_suffixes(modeler: &Modeler, dictionary: &Dictionary) -> Vec<String> {
    let specs = modeler.stats();
    if specs.len() < 2 {
        return vec![String::new(); specs.len()];
    }
    specs
        .iter()
        .map(|spec| {
            let column = dictionary.get(&spec.key);
            let shared = specs.iter().filter(|other| other.key == spec.key).count() > 1;
            if shared {
                let stat = spec.resolve(modeler.kind_of(&spec.key));
                format!("{} {}", column, dictionary.get(stat.name()))
            } else {
                column.to_string()
            }
        })
        .collect()
}

/// Label of one stats line.
pub(crate) fn line_label(label: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        label.to_string()
    } else {
        format!("{} {}", label, suffix)
    }
}

fn max_width(labels: &[String]) -> usize {
    labels.iter().map(|l| l.chars().count()).max().unwrap_or(0)
}

/// Header labels per column level in left-to-right order, one per node.
fn collect_header_labels(
    tree: &Tree,
    id: NodeId,
    level: usize,
    dictionary: &Dictionary,
    formatter: &Formatter,
    out: &mut Vec<Vec<String>>,
) {
    let Some(node) = tree.node(id) else {
        return;
    };
    for &child in &node.cols {
        if let Some(segment) = tree.node(child).and_then(|c| c.segment.as_ref()) {
            if let Some(cells) = out.get_mut(level) {
                cells.push(formatter.label(segment, dictionary));
            }
        }
        collect_header_labels(tree, child, level + 1, dictionary, formatter, out);
    }
}

/// Widest formatted stat over every node and stats spec.
fn data_width(modeler: &Modeler, tree: &Tree, formatter: &Formatter) -> usize {
    let mut width = 0;
    for spec in modeler.stats() {
        let kind = modeler.kind_of(&spec.key);
        let stat = spec.resolve(kind);
        for node in tree.nodes() {
            let value = node.stats.get(&spec.key).and_then(|s| s.get(stat));
            width = width.max(formatter.stat(kind, stat, value).chars().count());
        }
    }
    width
}

fn first_col_width(
    modeler: &Modeler,
    tree: &Tree,
    dictionary: &Dictionary,
    formatter: &Formatter,
    options: &LayoutOptions,
    row_header: &str,
) -> usize {
    let suffix = stat_suffixes(modeler, dictionary)
        .iter()
        .map(|s| line_label("", s).chars().count())
        .max()
        .unwrap_or(0);

    let mut width = TOTAL_LABEL.len() + suffix;
    width = width.max(row_header.chars().count());
    for node in tree.nodes() {
        // row labels are taken from the rows under the root
        if node.axis != Some(Axis::Rows) || !under_root_rows(tree, node.parent) {
            continue;
        }
        if let Some(segment) = &node.segment {
            let label = formatter.label(segment, dictionary);
            width = width.max(options.indent * node.level + label.chars().count() + suffix);
        }
    }
    for spec in modeler.custom() {
        width = width.max(options.indent + dictionary.get(&spec.key).chars().count());
    }
    width + options.padding
}

/// True if the chain of row parents leads straight to the root.
fn under_root_rows(tree: &Tree, mut parent: Option<NodeId>) -> bool {
    while let Some(id) = parent {
        if id == ROOT {
            return true;
        }
        match tree.node(id) {
            Some(node) if node.axis == Some(Axis::Rows) => parent = node.parent,
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::definition::{GroupingSpec, StatsSpec};
    use crate::table::{Table, TableOptions};
    use engine::CellValue;

    fn table() -> Table {
        let row = |region: &str, stage: &str, amount: f64| {
            vec![CellValue::text(region), CellValue::text(stage), CellValue::Number(amount)]
        };
        Table::from_rows(
            vec!["Region", "Stage", "Amount"],
            vec![
                row("Asia Pacific and Japan", "Won", 1.0),
                row("EMEA", "Lost", 2.0),
                row("EMEA", "Won", 3.0),
            ],
            TableOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_parents_span_children() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        modeler
            .build(
                vec![],
                vec![GroupingSpec::new("Region"), GroupingSpec::new("Stage")],
                vec![StatsSpec::new("Amount")],
                vec![],
            )
            .unwrap();
        let layout = Layout::rebuild(
            &modeler,
            &Dictionary::new(),
            &Formatter::default(),
            &LayoutOptions::default(),
        )
        .unwrap();

        let (parent, child) = (&layout.levels[0], &layout.levels[1]);
        assert_eq!(parent.count, 2);
        assert_eq!(child.count, 2);
        assert_eq!(parent.length, child.length * child.count);
        assert!(parent.length >= "Asia Pacific and Japan".len() + 1);
        assert!(child.length >= LayoutOptions::default().min_cell_width);

        // 2 regions x 2 stages, then TOTAL
        assert_eq!(layout.cells.len(), 5);
        assert_eq!(layout.cells[4].text, TOTAL_LABEL);
        assert_eq!(layout.headers.len(), 2);
        assert_eq!(layout.headers[0].len(), 3);
        assert_eq!(layout.headers[1].len(), 5);
        assert_eq!(layout.col_paths.len(), 4);

        let header_width: usize = layout.headers[0].iter().map(|c| c.length).sum();
        let cell_width: usize = layout.cells.iter().map(|c| c.length).sum();
        assert_eq!(header_width, cell_width);
    }

    #[test]
    fn test_first_column_fits_labels() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        modeler
            .build(
                vec![GroupingSpec::new("Region"), GroupingSpec::new("Stage")],
                vec![],
                vec![StatsSpec::new("Amount")],
                vec![],
            )
            .unwrap();
        let options = LayoutOptions::default();
        let layout =
            Layout::rebuild(&modeler, &Dictionary::new(), &Formatter::default(), &options).unwrap();

        assert!(layout.first_col_width > "Asia Pacific and Japan".len());
        assert_eq!(layout.row_header, "Region");
        // no column specs: only the TOTAL cell
        assert_eq!(layout.cells.len(), 1);
        assert!(layout.levels.is_empty());
    }

    #[test]
    fn test_requires_built_tree() {
        let table = table();
        let modeler = Modeler::new(&table, Analyzer::default());
        let result = Layout::rebuild(
            &modeler,
            &Dictionary::new(),
            &Formatter::default(),
            &LayoutOptions::default(),
        );
        assert_eq!(result.unwrap_err(), PivotError::NotBuilt);
    }
}
