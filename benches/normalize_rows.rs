use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use ingest::normalize::{NormalizeOptions, NormalizePlan, normalize_table};

fn generate_ledger(rows: usize) -> Vec<Vec<String>> {
    let mut table = Vec::with_capacity(rows + 1);
    table.push(
        ["Txn_Date", " Amount ", "Description", "Account  ID", "Memo"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
    );
    for i in 0..rows {
        let day = (i % 28) + 1;
        let mut row = vec![
            format!(" 2024-01-{day:02} "),
            format!("{}.{:02}", i % 500, i % 100),
            format!("purchase\t#{i}\n"),
            format!("ACC-{}", i % 37),
        ];
        if i % 5 != 0 {
            row.push("  spaced   out  memo ".to_string());
        }
        table.push(row);
    }
    table
}

fn bench_normalize(c: &mut Criterion) {
    let table = generate_ledger(20_000);
    let options = NormalizeOptions::parse(
        Some("txn date=date,account id=account"),
        Some("date,amount,account,description,memo,missing"),
        false,
    )
    .expect("options");

    c.bench_function("normalize_table_20k", |b| {
        b.iter(|| normalize_table(&table, &options).expect("normalize"))
    });

    let plan = NormalizePlan::build(&table[0], &options).expect("plan");
    c.bench_function("project_rows_20k", |b| {
        b.iter_batched(
            || table[1..].to_vec(),
            |rows| rows.iter().map(|row| plan.project(row)).count(),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
