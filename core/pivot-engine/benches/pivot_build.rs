use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use engine::CellValue;
use pivot_engine::{
    Analyzer, Dictionary, Formatter, GroupingSpec, Modeler, ReportOptions, Reporter, Rollup,
    StatsSpec, Table, TableOptions, Transform,
};

const PRACTICES: [&str; 6] = ["ANZ", "ASEAN", "JAPAN", "GCR", "INDIA", "KOREA"];
const STAGES: [&str; 4] = ["Won", "Lost", "Pipeline", "Qualified"];

fn sales_table(rows: usize) -> Table {
    let data: Vec<Vec<CellValue>> = (0..rows)
        .map(|i| {
            vec![
                CellValue::text(PRACTICES[i % PRACTICES.len()]),
                CellValue::text(STAGES[(i / 7) % STAGES.len()]),
                CellValue::text(format!("2018-{:02}", i % 12 + 1)),
                CellValue::text(format!("USD {},000", (i * 37) % 500)),
            ]
        })
        .collect();
    Table::from_rows(["Practice", "Stage", "Month", "Amount"], data, TableOptions::default())
        .unwrap()
}

fn specs() -> (Vec<GroupingSpec>, Vec<GroupingSpec>, Vec<StatsSpec>) {
    (
        vec![
            GroupingSpec::new("Practice").with_rollup(Rollup::new("APAC", ["ANZ", "ASEAN", "JAPAN"])),
            GroupingSpec::new("Stage"),
        ],
        vec![GroupingSpec::new("Month").with_transform(Transform::builtin("quarter").unwrap())],
        vec![StatsSpec::new("Amount")],
    )
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("pivot_build");
    for rows in [1_000usize, 10_000, 50_000] {
        let table = sales_table(rows);
        group.bench_with_input(BenchmarkId::new("tree", rows), &table, |b, table| {
            b.iter(|| {
                let (r, c, s) = specs();
                let mut modeler = Modeler::new(table, Analyzer::default());
                let tree = modeler.build(r, c, s, Vec::new()).unwrap();
                black_box(tree.len());
            })
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let table = sales_table(10_000);
    let (r, cols, s) = specs();
    let mut modeler = Modeler::new(&table, Analyzer::default());
    modeler.build(r, cols, s, Vec::new()).unwrap();
    let dictionary = Dictionary::new();

    c.bench_function("pivot_render_10k", |b| {
        b.iter(|| {
            let report = Reporter::new(&modeler, &dictionary, Formatter::default(), ReportOptions::default())
                .render("Bench")
                .unwrap();
            black_box(report.lines.len());
        })
    });
}

criterion_group!(benches, bench_build, bench_render);
criterion_main!(benches);
