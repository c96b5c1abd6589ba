use chrono::{NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use textconv::{enumeration, enums, Culture, ParseOptions, Primitive};

enumeration! {
    pub struct Permissions: u32 {
        const READ = 1;
        const WRITE = 2;
        const DELETE = 4;
        const ADMIN = 8;
    }
}

fn benchmark_parse_integer(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_i32");

    for culture in ["", "de-DE", "fr-FR"] {
        let options = ParseOptions::new().with_culture(culture);
        let text = 1_234_567i32.format_with(Some("N0"), options.culture).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(culture), &text, |b, text| {
            b.iter(|| i32::try_parse(black_box(text.as_str()), &options))
        });
    }
    group.finish();
}

fn benchmark_parse_float(c: &mut Criterion) {
    let options = ParseOptions::default();

    c.bench_function("parse_f64", |b| {
        b.iter(|| f64::try_parse(black_box("-12345.6789e-3"), &options))
    });
}

fn benchmark_format_float(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_f64");
    let culture = Culture::invariant();

    for spec in ["G", "R", "N2", "E3", "#,##0.00;(#,##0.00)"] {
        group.bench_with_input(BenchmarkId::from_parameter(spec), spec, |b, spec| {
            b.iter(|| black_box(-1234.5678f64).format_with(Some(spec), culture))
        });
    }
    group.finish();
}

fn benchmark_parse_date(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_date_time");
    let options = ParseOptions::default();

    for (stage, text) in [
        ("custom", "20241231235959"),
        ("round_trip", "2024-12-31T23:59:59.0000000"),
        ("free_form", "Dec 31, 2024 11:59 PM"),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(stage), text, |b, text| {
            b.iter(|| NaiveDateTime::try_parse(black_box(text), &options))
        });
    }
    group.finish();
}

fn benchmark_format_date(c: &mut Criterion) {
    let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let culture = Culture::resolve(Some("de-DE"));

    c.bench_function("format_long_date", |b| {
        b.iter(|| black_box(date).format_with(Some("D"), culture))
    });
}

fn benchmark_enums(c: &mut Criterion) {
    let options = ParseOptions::default();
    let value = Permissions::READ | Permissions::WRITE | Permissions::ADMIN;

    c.bench_function("parse_flags", |b| {
        b.iter(|| enums::try_parse::<Permissions>(black_box("read, write, admin"), &options))
    });
    c.bench_function("format_flags", |b| {
        b.iter(|| enums::format(black_box(value), None))
    });
}

criterion_group!(
    benches,
    benchmark_parse_integer,
    benchmark_parse_float,
    benchmark_format_float,
    benchmark_parse_date,
    benchmark_format_date,
    benchmark_enums
);
criterion_main!(benches);
