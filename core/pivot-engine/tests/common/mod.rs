//! Shared sales fixture for the integration tests.

#![allow(dead_code)]

use engine::CellValue;
use pivot_engine::{
    Analyzer, GroupingSpec, Modeler, Rollup, StatsSpec, Table, TableOptions, Transform,
};

pub const HEADERS: [&str; 6] = ["Practice", "Owner", "Stage", "Month", "Amount", "Target"];

/// A small opportunity export: practice, owner, stage, month key,
/// "USD" amount and a plain numeric target.
pub struct SalesFixture {
    pub table: Table,
}

impl SalesFixture {
    pub fn rows() -> Vec<Vec<CellValue>> {
        let row = |practice: &str, owner: &str, stage: &str, month: &str, amount: &str, target: f64| {
            vec![
                CellValue::text(practice),
                CellValue::text(owner),
                CellValue::text(stage),
                CellValue::text(month),
                CellValue::text(amount),
                CellValue::Number(target),
            ]
        };
        vec![
            row("ANZ", "kim", "Won", "2018-01", "USD 100,000", 80_000.0),
            row("ASEAN", "lee", "Won", "2018-01", "USD 50,000", 60_000.0),
            row("ANZ", "kim", "Lost", "2018-02", "USD 20,000", 80_000.0),
            row("ANZ", "ray", "Won", "2018-02", "USD 40,000", 30_000.0),
            row("JAPAN", "sato", "Won", "2018-03", "USD 75,000", 50_000.0),
            row("ASEAN", "lee", "Pipeline", "2018-03", "-", 10_000.0),
            row(" AUSTRALIA/NZ ", "ray", "Won", "2018-03", "USD 10,000", 0.0),
        ]
    }

    pub fn new() -> Self {
        let table = Table::from_rows(HEADERS, Self::rows(), TableOptions::default())
            .expect("fixture table");
        SalesFixture { table }
    }

    pub fn modeler(&self) -> Modeler<'_> {
        Modeler::new(&self.table, Analyzer::default())
    }

    /// Practice rows with an APAC rollup of ANZ and ASEAN.
    pub fn practice_rows() -> Vec<GroupingSpec> {
        vec![GroupingSpec::new("Practice").with_rollup(Rollup::new("APAC", ["ANZ", "ASEAN"]))]
    }

    pub fn month_cols() -> Vec<GroupingSpec> {
        vec![GroupingSpec::new("Month")]
    }

    pub fn quarter_cols() -> Vec<GroupingSpec> {
        let quarter = Transform::builtin("quarter").expect("quarter");
        vec![GroupingSpec::new("Month").with_transform(quarter)]
    }

    pub fn amount_stats() -> Vec<StatsSpec> {
        vec![StatsSpec::new("Amount")]
    }
}
