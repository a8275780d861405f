use std::fmt::Write as _;
use std::time::Duration;

use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion,
};
use serde::{Deserialize, Serialize};
use serde_qstree::{parse, parse_cookies, parse_with_options, stringify, ParseOptions};

#[derive(Clone, Serialize, Deserialize)]
struct Filter {
    field: String,
    op: String,
    value: String,
}

#[derive(Clone, Serialize, Deserialize)]
struct Search {
    q: String,
    page: u32,
    per_page: u32,
    sort: Option<String>,
    tags: Vec<String>,
    filters: Vec<Filter>,
}

fn make_flat_query(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        if i > 0 {
            out.push('&');
        }
        let _ = write!(out, "key{i}=value+{i}%21");
    }
    out
}

fn make_nested_query(rows: usize) -> String {
    let mut out = String::new();
    for i in 0..rows {
        let _ = write!(
            out,
            "&rows[][id]={i}&rows[][name]=row%20{i}&rows[][meta][tags][]=t{i}&rows[][active]=true"
        );
    }
    out
}

fn make_search(filters: usize) -> Search {
    Search {
        q: "rust query strings".to_string(),
        page: 3,
        per_page: 50,
        sort: Some("-updated".to_string()),
        tags: (0..8).map(|i| format!("tag{i}")).collect(),
        filters: (0..filters)
            .map(|i| Filter {
                field: format!("field_{i}"),
                op: if i % 2 == 0 { "eq" } else { "gt" }.to_string(),
                value: format!("v {i} & more"),
            })
            .collect(),
    }
}

fn make_cookie_header(count: usize) -> String {
    (0..count)
        .map(|i| format!(" c{i} = v%20{i}"))
        .collect::<Vec<_>>()
        .join(";")
}

fn bench_parse(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, input: &str) {
    group.throughput(criterion::Throughput::Bytes(input.len() as u64));
    group.bench_function(BenchmarkId::new("strings", name), |b| {
        b.iter(|| black_box(parse(black_box(input))));
    });

    let typed = ParseOptions::typed();
    group.bench_function(BenchmarkId::new("typed", name), |b| {
        b.iter(|| black_box(parse_with_options(black_box(input), &typed)));
    });
}

fn bench_stringify(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, input: &str) {
    let value = parse(input);
    group.throughput(criterion::Throughput::Bytes(input.len() as u64));
    group.bench_function(BenchmarkId::new("value", name), |b| {
        b.iter(|| black_box(stringify(black_box(&value))));
    });
}

fn criterion_config() -> Criterion {
    if std::env::var("QSTREE_BENCH_MINIMAL").is_ok() {
        Criterion::default()
            .warm_up_time(Duration::from_secs(0))
            .measurement_time(Duration::from_millis(10))
            .sample_size(10)
            .nresamples(1)
    } else {
        Criterion::default()
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let flat = make_flat_query(500);
    let nested = make_nested_query(200);
    let search = make_search(40);
    let search_text = serde_qstree::to_string(&search).unwrap();
    let cookies = make_cookie_header(64);

    let mut group = c.benchmark_group("parse");
    bench_parse(&mut group, "flat_500", &flat);
    bench_parse(&mut group, "nested_rows_200", &nested);
    group.finish();

    let mut group = c.benchmark_group("stringify");
    bench_stringify(&mut group, "flat_500", &flat);
    bench_stringify(&mut group, "nested_rows_200", &nested);
    group.finish();

    let mut group = c.benchmark_group("serde");
    group.bench_function("to_string/search", |b| {
        b.iter(|| black_box(serde_qstree::to_string(black_box(&search)).unwrap()));
    });
    group.bench_function("from_str/search", |b| {
        b.iter(|| {
            let value: Search = serde_qstree::from_str(black_box(&search_text)).unwrap();
            black_box(value);
        });
    });
    group.finish();

    let mut group = c.benchmark_group("cookies");
    group.throughput(criterion::Throughput::Bytes(cookies.len() as u64));
    group.bench_function("header_64", |b| {
        b.iter(|| black_box(parse_cookies(black_box(cookies.as_str()))));
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = criterion_benchmark
}
criterion_main!(benches);
