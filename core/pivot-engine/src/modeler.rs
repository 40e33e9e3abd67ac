//! FILENAME: core/pivot-engine/src/modeler.rs
//! Modeler - builds the aggregation tree of a report.
//!
//! Algorithm:
//! 1. Construct: expand the column specs first. Every column-axis node,
//!    the root included, receives the full row fan-out below it.
//! 2. Allocate: top-down, each node keeps the records of its parent that
//!    satisfy its own predicate (value match or rollup membership).
//! 3. Calculate: every node computes stats for every stats header.
//!
//! Nodes live in an arena and refer to each other by `NodeId`. A node is
//! always pushed after its parent, so arena order is a pre-order walk.
//!
//! Distinct values are taken over the whole table, so the tree is the full
//! Cartesian product of the axis values and a combination without records
//! still exists (with zero counts).

use std::time::Instant;

use engine::CellValue;
use rustc_hash::FxHashMap;

use crate::analyzer::{Analyzer, Stats};
use crate::definition::{coerce_value, CustomSpec, GroupingSpec, StatsSpec, Transform};
use crate::error::{PivotError, PivotResult};
use crate::table::{Record, RecordId, Table};
use crate::types::SemanticType;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// The root node is always the first node of the arena.
pub const ROOT: NodeId = 0;

/// Key that `find` resolves to a node's records instead of its stats.
pub const RECORDS_KEY: &str = "records";

// ============================================================================
// TREE STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Rows,
    Cols,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Rows => "rows",
            Axis::Cols => "cols",
        }
    }
}

/// The value a node groups on.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValue {
    /// A natural value of the grouping column.
    Value(CellValue),
    /// A synthetic rollup group, by label.
    Rollup(String),
}

/// One step of a path through the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub key: String,
    pub value: AxisValue,
}

impl PathSegment {
    pub fn value(key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        PathSegment {
            key: key.into(),
            value: AxisValue::Value(value.into()),
        }
    }

    pub fn rollup(key: impl Into<String>, label: impl Into<String>) -> Self {
        PathSegment {
            key: key.into(),
            value: AxisValue::Rollup(label.into()),
        }
    }
}

/// A node of the aggregation tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Grouping key and value. `None` for the root.
    pub segment: Option<PathSegment>,

    /// Axis this node belongs to. `None` for the root.
    pub axis: Option<Axis>,

    /// Depth along its own axis (0 for the first grouping level).
    pub level: usize,

    pub parent: Option<NodeId>,

    /// Row-axis children.
    pub rows: Vec<NodeId>,

    /// Column-axis children.
    pub cols: Vec<NodeId>,

    /// Records matching every predicate from the root to this node.
    pub records: Vec<RecordId>,

    /// Stats per stats header column.
    pub stats: FxHashMap<String, Stats>,
}

impl Node {
    fn root() -> Self {
        Node {
            segment: None,
            axis: None,
            level: 0,
            parent: None,
            rows: Vec::new(),
            cols: Vec::new(),
            records: Vec::new(),
            stats: FxHashMap::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn children(&self, axis: Axis) -> &[NodeId] {
        match axis {
            Axis::Rows => &self.rows,
            Axis::Cols => &self.cols,
        }
    }
}

/// The built aggregation tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    stats_headers: Vec<String>,
}

impl Tree {
    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Columns every node carries stats for.
    pub fn stats_headers(&self) -> &[String] {
        &self.stats_headers
    }

    /// Child of `parent` on `axis` matching `segment`.
    pub fn child(&self, parent: NodeId, axis: Axis, segment: &PathSegment) -> Option<NodeId> {
        self.nodes.get(parent)?.children(axis).iter().copied().find(|&id| {
            self.nodes[id].segment.as_ref() == Some(segment)
        })
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// Result of `Modeler::find`.
#[derive(Debug, Clone, PartialEq)]
pub enum Found<'a> {
    Stats(&'a Stats),
    Records(Vec<&'a Record>),
}

// ============================================================================
// MODELER
// ============================================================================

/// Builds and queries the aggregation tree of one report run.
#[derive(Debug)]
pub struct Modeler<'t> {
    table: &'t Table,
    analyzer: Analyzer,
    rows: Vec<GroupingSpec>,
    cols: Vec<GroupingSpec>,
    stats: Vec<StatsSpec>,
    custom: Vec<CustomSpec>,
    tree: Option<Tree>,
}

impl<'t> Modeler<'t> {
    pub fn new(table: &'t Table, analyzer: Analyzer) -> Self {
        Modeler {
            table,
            analyzer,
            rows: Vec::new(),
            cols: Vec::new(),
            stats: Vec::new(),
            custom: Vec::new(),
            tree: None,
        }
    }

    pub fn table(&self) -> &'t Table {
        self.table
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn rows(&self) -> &[GroupingSpec] {
        &self.rows
    }

    pub fn cols(&self) -> &[GroupingSpec] {
        &self.cols
    }

    pub fn stats(&self) -> &[StatsSpec] {
        &self.stats
    }

    pub fn custom(&self) -> &[CustomSpec] {
        &self.custom
    }

    /// The tree of the last successful `build`.
    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    /// Assigns the row axis. Fails on keys the table does not have.
    pub fn set_rows(&mut self, specs: Vec<GroupingSpec>) -> PivotResult<()> {
        self.rows = self.validate_grouping("rows", specs)?;
        self.tree = None;
        Ok(())
    }

    /// Assigns the column axis. Fails on keys the table does not have.
    pub fn set_cols(&mut self, specs: Vec<GroupingSpec>) -> PivotResult<()> {
        self.cols = self.validate_grouping("cols", specs)?;
        self.tree = None;
        Ok(())
    }

    /// Assigns the stats lines. Fails on keys the table does not have.
    pub fn set_stats(&mut self, specs: Vec<StatsSpec>) -> PivotResult<()> {
        for spec in &specs {
            self.validate_key("stats", &spec.key)?;
        }
        self.stats = specs;
        self.tree = None;
        Ok(())
    }

    /// Assigns the custom rows. Their keys are labels and are not validated.
    pub fn set_custom(&mut self, specs: Vec<CustomSpec>) {
        for spec in &specs {
            let shadowed = self.cols.iter().any(|s| s.key == spec.key)
                || self.rows.iter().any(|s| s.key == spec.key)
                || self.stats.iter().any(|s| s.key == spec.key);
            if shadowed {
                log::warn!(
                    "custom row '{}' shares its key with a grouping or stats spec; transformer('{}') resolves to the spec",
                    spec.key,
                    spec.key
                );
            }
        }
        self.custom = specs;
    }

    fn validate_key(&self, axis: &'static str, key: &str) -> PivotResult<()> {
        if self.table.has_key(key) {
            Ok(())
        } else {
            Err(PivotError::InvalidConfiguration {
                axis,
                key: key.to_string(),
            })
        }
    }

    fn validate_grouping(
        &self,
        axis: &'static str,
        specs: Vec<GroupingSpec>,
    ) -> PivotResult<Vec<GroupingSpec>> {
        specs
            .into_iter()
            .map(|mut spec| {
                self.validate_key(axis, &spec.key)?;
                // transformed values no longer look like the column's data
                let kind = self.table.key_type(&spec.key);
                let identity = spec.transform.is_identity();
                let key = spec.key.clone();
                let coerce = |value: &CellValue| {
                    if identity {
                        self.table.coerce(&key, value)
                    } else {
                        coerce_value(value, kind)
                    }
                };
                if let Some(rollup) = spec.rollup.as_mut() {
                    for value in rollup.values.iter_mut() {
                        *value = coerce(value);
                    }
                }
                for value in spec.sort_by.iter_mut() {
                    *value = coerce(value);
                }
                Ok(spec)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Build
    // ------------------------------------------------------------------

    /// Assigns all specs and builds the tree.
    pub fn build(
        &mut self,
        rows: Vec<GroupingSpec>,
        cols: Vec<GroupingSpec>,
        stats: Vec<StatsSpec>,
        custom: Vec<CustomSpec>,
    ) -> PivotResult<&Tree> {
        self.set_rows(rows)?;
        self.set_cols(cols)?;
        self.set_stats(stats)?;
        self.set_custom(custom);
        self.rebuild()
    }

    /// Builds the tree from the specs currently assigned.
    pub fn rebuild(&mut self) -> PivotResult<&Tree> {
        let started = Instant::now();

        let mut tree = self.construct();
        let constructed = tree.len();
        self.allocate(&mut tree);
        self.calculate(&mut tree);

        log::debug!(
            "aggregation tree built: {} nodes, {} stats headers, {} records in {:?}",
            constructed,
            tree.stats_headers.len(),
            self.table.len(),
            started.elapsed()
        );

        let tree: &Tree = self.tree.insert(tree);
        Ok(tree)
    }

    /// Phase 1: node skeleton.
    fn construct(&self) -> Tree {
        let col_values: Vec<Vec<AxisValue>> = self.cols.iter().map(|s| self.axis_values(s)).collect();
        let row_values: Vec<Vec<AxisValue>> = self.rows.iter().map(|s| self.axis_values(s)).collect();

        let mut tree = Tree {
            nodes: vec![Node::root()],
            stats_headers: self.stats_headers(),
        };
        self.expand_cols(&mut tree, ROOT, 0, &col_values, &row_values);
        tree
    }

    fn expand_cols(
        &self,
        tree: &mut Tree,
        parent: NodeId,
        level: usize,
        col_values: &[Vec<AxisValue>],
        row_values: &[Vec<AxisValue>],
    ) {
        Self::expand_rows(&self.rows, tree, parent, 0, row_values);
        let Some(spec) = self.cols.get(level) else {
            return;
        };
        for value in &col_values[level] {
            let id = tree.push(Self::child_node(spec, value, Axis::Cols, level, parent));
            tree.nodes[parent].cols.push(id);
            self.expand_cols(tree, id, level + 1, col_values, row_values);
        }
    }

    fn expand_rows(
        specs: &[GroupingSpec],
        tree: &mut Tree,
        parent: NodeId,
        level: usize,
        row_values: &[Vec<AxisValue>],
    ) {
        let Some(spec) = specs.get(level) else {
            return;
        };
        for value in &row_values[level] {
            let id = tree.push(Self::child_node(spec, value, Axis::Rows, level, parent));
            tree.nodes[parent].rows.push(id);
            Self::expand_rows(specs, tree, id, level + 1, row_values);
        }
    }

    fn child_node(
        spec: &GroupingSpec,
        value: &AxisValue,
        axis: Axis,
        level: usize,
        parent: NodeId,
    ) -> Node {
        Node {
            segment: Some(PathSegment {
                key: spec.key.clone(),
                value: value.clone(),
            }),
            axis: Some(axis),
            level,
            parent: Some(parent),
            ..Node::root()
        }
    }

    /// Ordered values of one axis level: natural values, `sort_by` ranking,
    /// rollup label at the tail unless `sort_by` lists it.
    fn axis_values(&self, spec: &GroupingSpec) -> Vec<AxisValue> {
        let mut values: Vec<AxisValue> = self
            .table
            .key_distinct_values(&spec.key, &spec.transform)
            .into_iter()
            .map(AxisValue::Value)
            .collect();
        if let Some(rollup) = &spec.rollup {
            values.push(AxisValue::Rollup(rollup.key.clone()));
        }
        if !spec.sort_by.is_empty() {
            // stable: unlisted values keep their relative order
            values.sort_by_key(|value| sort_rank(&spec.sort_by, value));
        }
        values
    }

    /// Columns every node computes stats for: numeric and date columns, every
    /// column not used for grouping, and every stats spec key.
    fn stats_headers(&self) -> Vec<String> {
        let grouped = |key: &str| {
            self.rows.iter().any(|s| s.key == key) || self.cols.iter().any(|s| s.key == key)
        };
        self.table
            .headers()
            .iter()
            .filter(|key| {
                let kind = self.table.key_type(key);
                kind.is_numeric()
                    || kind == SemanticType::Date
                    || !grouped(key)
                    || self.stats.iter().any(|s| &s.key == *key)
            })
            .cloned()
            .collect()
    }

    /// Phase 2: record allocation, parents before children.
    fn allocate(&self, tree: &mut Tree) {
        tree.nodes[ROOT].records = (0..self.table.len()).collect();
        for id in 1..tree.nodes.len() {
            let records = {
                let node = &tree.nodes[id];
                let parent = node.parent.unwrap_or(ROOT);
                match self.spec_of(node) {
                    Some(spec) => tree.nodes[parent]
                        .records
                        .iter()
                        .copied()
                        .filter(|&rid| self.matches(spec, node, rid))
                        .collect(),
                    None => Vec::new(),
                }
            };
            tree.nodes[id].records = records;
        }
    }

    fn spec_of(&self, node: &Node) -> Option<&GroupingSpec> {
        match node.axis? {
            Axis::Rows => self.rows.get(node.level),
            Axis::Cols => self.cols.get(node.level),
        }
    }

    /// True if record `rid` satisfies the predicate of `node`.
    fn matches(&self, spec: &GroupingSpec, node: &Node, rid: RecordId) -> bool {
        let (Some(record), Some(segment)) = (self.table.record(rid), node.segment.as_ref()) else {
            return false;
        };
        let value = match record.get(&spec.key) {
            Some(value) => spec.transform.apply(value),
            None => return false,
        };
        let key = value.key();
        match &segment.value {
            AxisValue::Value(expected) => expected.key() == key,
            AxisValue::Rollup(_) => spec
                .rollup
                .as_ref()
                .map_or(false, |rollup| rollup.values.iter().any(|v| v.key() == key)),
        }
    }

    /// Phase 3: stats, children before parents.
    fn calculate(&self, tree: &mut Tree) {
        let headers = tree.stats_headers.clone();
        for id in (0..tree.nodes.len()).rev() {
            let mut stats = FxHashMap::default();
            for header in &headers {
                let transform = self
                    .stats
                    .iter()
                    .find(|s| &s.key == header)
                    .map(|s| &s.transform);
                let values: Vec<CellValue> = tree.nodes[id]
                    .records
                    .iter()
                    .filter_map(|&rid| self.table.record(rid))
                    .filter_map(|record| record.get(header))
                    .map(|value| match transform {
                        Some(t) => t.apply(value),
                        None => value.clone(),
                    })
                    .collect();
                stats.insert(header.clone(), self.analyzer.analyze(self.kind_of(header), &values));
            }
            tree.nodes[id].stats = stats;
        }
    }

    /// Analysis type of a column, honoring a stats spec override.
    pub fn kind_of(&self, key: &str) -> SemanticType {
        self.stats
            .iter()
            .find(|s| s.key == key)
            .and_then(|s| s.kind)
            .unwrap_or_else(|| self.table.key_type(key))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Transform of a key, searching cols, rows, stats and custom specs in
    /// that order. The first match wins.
    pub fn transformer(&self, key: &str) -> Option<&Transform> {
        self.cols
            .iter()
            .find(|s| s.key == key)
            .map(|s| &s.transform)
            .or_else(|| self.rows.iter().find(|s| s.key == key).map(|s| &s.transform))
            .or_else(|| self.stats.iter().find(|s| s.key == key).map(|s| &s.transform))
            .or_else(|| self.custom.iter().find(|s| s.key == key).map(|s| &s.transform))
    }

    /// Node reached by descending `col_path` then `row_path` from the root.
    pub fn find_node(&self, row_path: &[PathSegment], col_path: &[PathSegment]) -> Option<NodeId> {
        let tree = self.tree.as_ref()?;
        let mut node = ROOT;
        for segment in col_path {
            node = tree.child(node, Axis::Cols, segment)?;
        }
        for segment in row_path {
            node = tree.child(node, Axis::Rows, segment)?;
        }
        Some(node)
    }

    /// Stats of column `key` (or the records, for `"records"`) at a path.
    /// Any path segment without a matching node yields `None`.
    pub fn find(&self, key: &str, row_path: &[PathSegment], col_path: &[PathSegment]) -> Option<Found<'_>> {
        if key == RECORDS_KEY {
            self.find_records(row_path, col_path).map(Found::Records)
        } else {
            self.find_stats(key, row_path, col_path).map(Found::Stats)
        }
    }

    pub fn find_stats(&self, key: &str, row_path: &[PathSegment], col_path: &[PathSegment]) -> Option<&Stats> {
        let id = self.find_node(row_path, col_path)?;
        self.tree.as_ref()?.node(id)?.stats.get(key)
    }

    pub fn find_records(&self, row_path: &[PathSegment], col_path: &[PathSegment]) -> Option<Vec<&'t Record>> {
        let id = self.find_node(row_path, col_path)?;
        let node = self.tree.as_ref()?.node(id)?;
        Some(self.records_of(node))
    }

    /// The records of a node, in table order.
    pub fn records_of(&self, node: &Node) -> Vec<&'t Record> {
        node.records
            .iter()
            .filter_map(|&rid| self.table.record(rid))
            .collect()
    }

    /// Path of every leaf below `node` along `axis`, `node` excluded.
    /// Empty when `node` has no children on that axis.
    pub fn expand(&self, node: NodeId, axis: Axis) -> Vec<Vec<PathSegment>> {
        let mut paths = Vec::new();
        if let Some(tree) = self.tree.as_ref() {
            let mut prefix = Vec::new();
            for &child in tree.node(node).map(|n| n.children(axis)).unwrap_or(&[]) {
                collect_leaf_paths(tree, child, axis, &mut prefix, &mut paths);
            }
        }
        paths
    }
}

fn collect_leaf_paths(
    tree: &Tree,
    id: NodeId,
    axis: Axis,
    prefix: &mut Vec<PathSegment>,
    paths: &mut Vec<Vec<PathSegment>>,
) {
    let node = &tree.nodes[id];
    if let Some(segment) = &node.segment {
        prefix.push(segment.clone());
    }
    let children = node.children(axis);
    if children.is_empty() {
        paths.push(prefix.clone());
    } else {
        for &child in children {
            collect_leaf_paths(tree, child, axis, prefix, paths);
        }
    }
    if node.segment.is_some() {
        prefix.pop();
    }
}

fn sort_rank(sort_by: &[CellValue], value: &AxisValue) -> usize {
    let position = match value {
        AxisValue::Value(v) => {
            let key = v.key();
            sort_by.iter().position(|s| s.key() == key)
        }
        AxisValue::Rollup(label) => sort_by.iter().position(|s| s.as_text() == Some(label.as_str())),
    };
    position.unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Rollup;
    use crate::table::TableOptions;
    use crate::types::StatKind;

    fn table() -> Table {
        Table::from_rows(
            vec!["Practice", "Stage", "Amount"],
            vec![
                vec![CellValue::text("ANZ"), CellValue::text("Won"), CellValue::Number(100.0)],
                vec![CellValue::text("ASEAN"), CellValue::text("Lost"), CellValue::Number(50.0)],
                vec![CellValue::text("ANZ"), CellValue::text("Lost"), CellValue::Number(20.0)],
                vec![CellValue::text("JAPAN"), CellValue::text("Won"), CellValue::Number(5.0)],
            ],
            TableOptions::default(),
        )
        .unwrap()
    }

    fn practice_rollup() -> GroupingSpec {
        GroupingSpec::new("Practice").with_rollup(Rollup::new("APAC", ["ANZ", "ASEAN"]))
    }

    fn labels(axis_paths: Vec<Vec<PathSegment>>) -> Vec<String> {
        axis_paths
            .into_iter()
            .map(|path| match &path[0].value {
                AxisValue::Value(v) => v.display_value(),
                AxisValue::Rollup(label) => label.clone(),
            })
            .collect()
    }

    #[test]
    fn test_fail_fast_on_unknown_key() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        let err = modeler.set_rows(vec![GroupingSpec::new("NotAColumn")]).unwrap_err();
        assert_eq!(
            err,
            PivotError::InvalidConfiguration {
                axis: "rows",
                key: "NotAColumn".to_string()
            }
        );
        assert!(modeler.tree().is_none());
        assert!(modeler.set_stats(vec![StatsSpec::new("Nope")]).is_err());
    }

    #[test]
    fn test_rollup_sums_members() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        modeler
            .build(vec![practice_rollup()], vec![], vec![StatsSpec::new("Amount")], vec![])
            .unwrap();

        let sum = |segment: PathSegment| {
            modeler
                .find_stats("Amount", &[segment], &[])
                .and_then(|s| s.number(StatKind::Sum))
        };
        assert_eq!(sum(PathSegment::value("Practice", "ANZ")), Some(120.0));
        assert_eq!(sum(PathSegment::value("Practice", "ASEAN")), Some(50.0));
        assert_eq!(sum(PathSegment::rollup("Practice", "APAC")), Some(170.0));
        assert_eq!(
            modeler.find_stats("Amount", &[], &[]).and_then(|s| s.number(StatKind::Sum)),
            Some(175.0)
        );
    }

    #[test]
    fn test_rollup_members_use_export_spelling() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        let spec = GroupingSpec::new("Practice")
            .with_rollup(Rollup::new("APAC", ["AUSTRALIA/NZ", " SE ASIA"]))
            .with_sort_by(["SE ASIA"]);
        modeler.build(vec![spec], vec![], vec![StatsSpec::new("Amount")], vec![]).unwrap();

        let apac = modeler
            .find_stats("Amount", &[PathSegment::rollup("Practice", "APAC")], &[])
            .and_then(|s| s.number(StatKind::Sum));
        assert_eq!(apac, Some(170.0));
        assert_eq!(labels(modeler.expand(ROOT, Axis::Rows))[0], "ASEAN");
    }

    #[test]
    fn test_rollup_appended_at_tail() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        modeler.build(vec![practice_rollup()], vec![], vec![], vec![]).unwrap();
        let order = labels(modeler.expand(ROOT, Axis::Rows));
        assert_eq!(order, vec!["ANZ", "ASEAN", "JAPAN", "APAC"]);
    }

    #[test]
    fn test_sort_by_ranks_listed_values_first() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        let spec = practice_rollup().with_sort_by(["JAPAN"]);
        modeler.build(vec![spec], vec![], vec![], vec![]).unwrap();
        let order = labels(modeler.expand(ROOT, Axis::Rows));
        assert_eq!(order, vec!["JAPAN", "ANZ", "ASEAN", "APAC"]);

        let spec = practice_rollup().with_sort_by(["APAC", "ASEAN"]);
        modeler.build(vec![spec], vec![], vec![], vec![]).unwrap();
        let order = labels(modeler.expand(ROOT, Axis::Rows));
        assert_eq!(order, vec!["APAC", "ASEAN", "ANZ", "JAPAN"]);
    }

    #[test]
    fn test_find_descends_cols_then_rows() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        modeler
            .build(
                vec![GroupingSpec::new("Practice")],
                vec![GroupingSpec::new("Stage")],
                vec![StatsSpec::new("Amount")],
                vec![],
            )
            .unwrap();

        let row = [PathSegment::value("Practice", "ANZ")];
        let col = [PathSegment::value("Stage", "Lost")];
        let stats = modeler.find_stats("Amount", &row, &col).unwrap();
        assert_eq!(stats.number(StatKind::Sum), Some(20.0));

        match modeler.find(RECORDS_KEY, &row, &col) {
            Some(Found::Records(records)) => assert_eq!(records.len(), 1),
            other => panic!("expected records, got {:?}", other),
        }

        // empty combination still exists
        let empty = modeler
            .find_stats("Amount", &[PathSegment::value("Practice", "JAPAN")], &col)
            .unwrap();
        assert_eq!(empty.number(StatKind::Count), Some(0.0));
    }

    #[test]
    fn test_broken_path_is_none() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        assert!(modeler.find("Amount", &[], &[]).is_none());

        modeler
            .build(vec![GroupingSpec::new("Practice")], vec![], vec![], vec![])
            .unwrap();
        let missing = [PathSegment::value("Practice", "KOREA")];
        assert!(modeler.find("Amount", &missing, &[]).is_none());
        assert!(modeler.find("NoSuchStat", &[], &[]).is_none());
        let wrong_axis = [PathSegment::value("Practice", "ANZ")];
        assert!(modeler.find("Amount", &[], &wrong_axis).is_none());
    }

    #[test]
    fn test_stats_headers_skip_grouped_strings() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        let tree = modeler
            .build(vec![GroupingSpec::new("Practice")], vec![], vec![], vec![])
            .unwrap();
        assert_eq!(tree.stats_headers(), &["Stage".to_string(), "Amount".to_string()]);
    }

    #[test]
    fn test_transformer_order() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        let upper = Transform::builtin("upper").unwrap();
        modeler
            .build(
                vec![GroupingSpec::new("Practice")],
                vec![GroupingSpec::new("Stage").with_transform(upper)],
                vec![],
                vec![CustomSpec::new("Stage", Transform::records(|_| CellValue::Empty))],
            )
            .unwrap();

        assert!(matches!(modeler.transformer("Stage"), Some(Transform::MapValue(_))));
        assert!(matches!(modeler.transformer("Practice"), Some(Transform::Identity)));
        assert!(modeler.transformer("Win rate").is_none());
    }

    #[test]
    fn test_expand_columns() {
        let table = table();
        let mut modeler = Modeler::new(&table, Analyzer::default());
        modeler
            .build(
                vec![],
                vec![GroupingSpec::new("Stage"), GroupingSpec::new("Practice")],
                vec![],
                vec![],
            )
            .unwrap();
        let paths = modeler.expand(ROOT, Axis::Cols);
        assert_eq!(paths.len(), 2 * 3);
        assert!(paths.iter().all(|p| p.len() == 2));
        assert_eq!(paths[0][0], PathSegment::value("Stage", "Won"));
        assert_eq!(paths[0][1], PathSegment::value("Practice", "ANZ"));
        assert!(modeler.expand(ROOT, Axis::Rows).is_empty());
    }
}
