//! Throughput of the line policies and of a full directory run.
//!
//! Run with: cargo bench --bench transform_benchmark

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use spotter_sd_rs::transform::{numeric, rollover, smart_mooring, spectral};
use spotter_sd_rs::{ConcatOptions, OutputFormat, concatenate_directory};
use std::hint::black_box;
use tempfile::tempdir;

const N_LINES: usize = 50_000;
const N_FILES: usize = 20;

fn displacement_body(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            if i % 1000 == 999 {
                "millis,GPS_Epoch_Time(s),outx(mm),outy(mm),outz(mm)".to_string()
            } else {
                format!("{},{},{},{},{}\r", i * 400, 1_600_000_000 + i / 2, i % 97, i % 89, i % 83)
            }
        })
        .collect()
}

fn debug_spectral_body(n: usize) -> Vec<String> {
    let mut body = vec!["FFT,0,0,0,0".to_string()];
    body.extend((0..n).map(|i| format!("SPECA,0,0,0,{},1.0,2.0,3.0", i % 16)));
    body
}

fn smart_mooring_body(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("{},12,RBRDT,{},{}", 1_600_000_000 + (i * 7919) % n, i, i % 5))
        .collect()
}

fn numeric_filter_benchmark(c: &mut Criterion) {
    c.bench_function("numeric_filter_50k", |b| {
        b.iter_batched(
            || displacement_body(N_LINES),
            |body| black_box(numeric::filter_numeric(body)),
            BatchSize::LargeInput,
        );
    });
}

fn spectral_benchmark(c: &mut Criterion) {
    let body = debug_spectral_body(N_LINES);
    c.bench_function("spectral_reduce_debug_50k", |b| {
        b.iter(|| black_box(spectral::reduce_ensembles("header", &body)));
    });
}

fn rollover_benchmark(c: &mut Criterion) {
    let samples: Vec<(f64, f64)> = (0..1000)
        .map(|i| (1000.0 * i as f64, 1_600_000_000.0 + i as f64))
        .collect();
    let map = rollover::MillisToEpoch::fit(&samples).unwrap();
    c.bench_function("rollover_map_50k", |b| {
        b.iter_batched(
            || {
                (0..N_LINES)
                    .map(|i| format!("{},{}.5", i * 250, i % 30))
                    .collect::<Vec<String>>()
            },
            |lines: Vec<String>| black_box(rollover::map_millis_lines(lines, &map)),
            BatchSize::LargeInput,
        );
    });
}

fn smart_mooring_benchmark(c: &mut Criterion) {
    c.bench_function("smart_mooring_sort_50k", |b| {
        b.iter_batched(
            || smart_mooring_body(N_LINES),
            |body| black_box(smart_mooring::validate_and_sort(body)),
            BatchSize::LargeInput,
        );
    });
}

fn directory_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let header = "millis,GPS_Epoch_Time(s),outx(mm),outy(mm),outz(mm)";
    for seq in 0..N_FILES {
        let mut text = format!("{header}\n");
        for line in displacement_body(N_LINES / N_FILES) {
            text.push_str(&line);
            text.push('\n');
        }
        std::fs::write(dir.path().join(format!("{seq:04}_FLT.CSV")), text).unwrap();
    }

    for format in [OutputFormat::Text, OutputFormat::Gzip] {
        let options = ConcatOptions::new(dir.path())
            .with_output_dir(dir.path().join(format!("{format:?}")))
            .with_output_format(format)
            .with_progress(false);
        c.bench_function(&format!("concatenate_directory_{format:?}"), |b| {
            b.iter(|| black_box(concatenate_directory(&options).unwrap()));
        });
    }
}

criterion_group!(
    benches,
    numeric_filter_benchmark,
    spectral_benchmark,
    rollover_benchmark,
    smart_mooring_benchmark,
    directory_benchmark
);
criterion_main!(benches);
