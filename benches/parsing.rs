use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::Deserialize;
use std::collections::HashMap;
use strto::{enumeration, record, TypeDesc, TypeParser};

#[derive(Deserialize, Clone)]
#[allow(dead_code)]
struct NetworkAddress {
    host: String,
    port: u16,
}

record!(NetworkAddress {
    host: String,
    port: u16 = 5432,
});

#[derive(Deserialize, Clone)]
#[allow(dead_code)]
enum LogLevel {
    Debug,
    Info,
    Warning,
}

enumeration!(LogLevel { Debug, Info, Warning });

#[derive(Deserialize, Clone)]
#[allow(dead_code)]
struct AppConfig {
    debug: bool,
    log_level: LogLevel,
    network: Option<NetworkAddress>,
    allowed_hosts: Vec<String>,
}

record!(AppConfig {
    debug: bool = false,
    log_level: LogLevel,
    network: Option<NetworkAddress>,
    allowed_hosts: Vec<String> = Vec::<String>::new(),
});

fn benchmark_scalars(c: &mut Criterion) {
    let parser = TypeParser::new();
    let mut group = c.benchmark_group("scalars");

    group.bench_function("integer", |b| {
        b.iter(|| parser.parse::<i64>(black_box("123456")))
    });
    group.bench_function("integer_expression", |b| {
        b.iter(|| parser.parse::<i64>(black_box("2^20 - 1")))
    });
    group.bench_function("float", |b| b.iter(|| parser.parse::<f64>(black_box("3.25"))));
    group.bench_function("bool", |b| b.iter(|| parser.parse::<bool>(black_box("yes"))));
    group.bench_function("date", |b| {
        b.iter(|| parser.parse::<chrono::NaiveDate>(black_box("2024-02-29")))
    });

    group.finish();
}

fn benchmark_sequences(c: &mut Criterion) {
    let parser = TypeParser::new();
    let mut group = c.benchmark_group("sequences");

    for size in [10, 100, 1000].iter() {
        let delimited = (0..*size).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let json = format!("[{}]", delimited);

        group.bench_with_input(BenchmarkId::new("delimited", size), &delimited, |b, text| {
            b.iter(|| parser.parse::<Vec<i64>>(black_box(text)))
        });
        group.bench_with_input(BenchmarkId::new("json", size), &json, |b, text| {
            b.iter(|| parser.parse::<Vec<i64>>(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_mapping(c: &mut Criterion) {
    let parser = TypeParser::new();
    let text = serde_json::to_string(
        &(0..100)
            .map(|i| (format!("key{}", i), vec![i, i + 1]))
            .collect::<HashMap<_, _>>(),
    )
    .unwrap();

    c.bench_function("mapping_of_lists", |b| {
        b.iter(|| parser.parse::<HashMap<String, Vec<u32>>>(black_box(&text)))
    });
}

fn benchmark_records(c: &mut Criterion) {
    let parser = TypeParser::new();
    let mut group = c.benchmark_group("records");

    let kv = "debug=true log_level=WARNING network.host=db network.port=5433 \
              allowed_hosts=example.com,localhost";
    let json = r#"{"debug": true, "log_level": "WARNING",
                   "network": {"host": "db", "port": 5433},
                   "allowed_hosts": ["example.com", "localhost"]}"#;

    group.bench_function("key_values", |b| {
        b.iter(|| parser.parse::<AppConfig>(black_box(kv)))
    });
    group.bench_function("json", |b| {
        b.iter(|| parser.parse::<AppConfig>(black_box(json)))
    });

    group.finish();
}

fn benchmark_unions(c: &mut Criterion) {
    let parser = TypeParser::new();
    let ty = TypeDesc::parse_expr("int | float | bool | str");
    let mut group = c.benchmark_group("unions");

    group.bench_function("first_member", |b| {
        b.iter(|| parser.parse_value(black_box("42"), &ty))
    });
    group.bench_function("last_member", |b| {
        b.iter(|| parser.parse_value(black_box("plain text"), &ty))
    });

    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let parser = TypeParser::new();
    let json = r#"{"host": "db", "port": 5433}"#;
    let mut group = c.benchmark_group("comparison");

    group.bench_function("strto_record", |b| {
        b.iter(|| parser.parse::<NetworkAddress>(black_box(json)))
    });
    group.bench_function("serde_json_struct", |b| {
        b.iter(|| serde_json::from_str::<NetworkAddress>(black_box(json)))
    });

    group.finish();
}

fn benchmark_construction(c: &mut Criterion) {
    c.bench_function("type_parser_new", |b| b.iter(TypeParser::new));
}

criterion_group!(
    benches,
    benchmark_scalars,
    benchmark_sequences,
    benchmark_mapping,
    benchmark_records,
    benchmark_unions,
    benchmark_comparison_with_json,
    benchmark_construction
);
criterion_main!(benches);
