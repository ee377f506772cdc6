//! Performance benchmarks for field derivation and overlay composition
//!
//! Run with: `cargo bench`

use certificate_batch::fields::{classify_mission, format_date_or, DerivedFields, MissionName};
use certificate_batch::overlay::{compose, Layout};
use certificate_batch::source::{AssetOutcome, CellValue};
use certificate_batch::PipelineVariant;
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, RgbImage};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

fn found(name: &str) -> AssetOutcome {
    AssetOutcome::Found {
        path: PathBuf::from(name),
        image: Arc::new(DynamicImage::ImageRgb8(RgbImage::new(64, 48))),
    }
}

/// In-memory record with `charts` rounds located out of four
fn fields_with_charts(charts: u8) -> DerivedFields {
    let rounds = (1..=4)
        .map(|round| {
            let outcome = if round <= charts {
                found(&format!("42_courbe{}.png", round))
            } else {
                AssetOutcome::NotFound {
                    stem: PathBuf::from(format!("42_courbe{}", round)),
                }
            };
            (round, outcome)
        })
        .collect::<BTreeMap<_, _>>();

    DerivedFields {
        identifier: "42".to_string(),
        last_name: "Dupont".to_string(),
        first_name: "Jean".to_string(),
        instructor: "ARESIA".to_string(),
        aircraft: "M-2000C".to_string(),
        map: "Caucasus".to_string(),
        mission_type: "AIR - GROUND".to_string(),
        mission_name: MissionName::Suippes,
        date: "28/05/2025".to_string(),
        photo: found("42.jpg"),
        charts: rounds,
        anomalies: Vec::new(),
    }
}

/// Benchmark date normalization across the accepted input shapes
fn bench_format_date(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let inputs = [
        ("iso_utc", CellValue::Text("2025-05-28T14:14:21.712Z".to_string())),
        ("plain_date", CellValue::Text("2025-05-28".to_string())),
        ("unparseable", CellValue::Text("next tuesday".to_string())),
        (
            "native",
            CellValue::DateTime(
                NaiveDate::from_ymd_opt(2025, 5, 28)
                    .unwrap()
                    .and_hms_opt(14, 14, 21)
                    .unwrap(),
            ),
        ),
    ];

    let mut group = c.benchmark_group("format_date");
    for (name, value) in &inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), value, |b, value| {
            b.iter(|| format_date_or(black_box(value), today));
        });
    }
    group.finish();
}

fn bench_classify_mission(c: &mut Criterion) {
    let inputs = ["AIR - GROUND", "air-air", " Air  -  Ground mission ", "SEAD"];

    c.bench_function("classify_mission", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(classify_mission(black_box(input)));
            }
        });
    });
}

/// Benchmark overlay composition for each chart count
fn bench_compose(c: &mut Criterion) {
    let layout = Layout::default();

    let mut group = c.benchmark_group("compose");
    for charts in 0..=4u8 {
        let fields = fields_with_charts(charts);
        group.bench_with_input(BenchmarkId::new("charts", charts), &fields, |b, fields| {
            b.iter(|| compose(black_box(fields), &layout, PipelineVariant::MultiChart));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_format_date,
    bench_classify_mission,
    bench_compose
);
criterion_main!(benches);
