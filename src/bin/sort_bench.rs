use csvdelta::key::KeyComparator;
use csvdelta::sort::{ExternalSorter, SortOptions};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[derive(Debug)]
struct BenchResult {
    batch_size: usize,
    runs: usize,
    merges: usize,
    timings: Vec<Duration>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let (source, key) = match (args.next(), args.next()) {
        (Some(path), Some(key)) => (PathBuf::from(path), key),
        _ => {
            eprintln!(
                "Usage: cargo run --bin sort_bench -- <file.csv> <key_column> [runs] [batch,batch,...]"
            );
            std::process::exit(2);
        }
    };

    let runs: usize = args.next().and_then(|v| v.parse().ok()).unwrap_or(3);
    let batch_sizes: Vec<usize> = args
        .next()
        .map(|v| v.split(',').filter_map(|b| b.trim().parse().ok()).collect())
        .unwrap_or_else(|| vec![1_000, 10_000, 100_000]);

    let comparator = KeyComparator::by_names(&[key.as_str()])?;
    let scratch = TempDir::new()?;

    println!(
        "Benchmarking sort of {}\nRuns: {} (batch sizes={:?})",
        source.display(),
        runs,
        batch_sizes
    );

    // Largest batch first: its output is the reference for the others.
    let mut sizes = batch_sizes;
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    let reference = scratch.path().join("reference.csv");
    let sorter = ExternalSorter::new(SortOptions {
        batch_size: sizes.first().copied().unwrap_or(100_000),
        has_headers: true,
    })?;
    sorter.sort(&source, &reference, &comparator)?;

    let mut results = Vec::with_capacity(sizes.len());
    for batch_size in sizes {
        let sorter = ExternalSorter::new(SortOptions {
            batch_size,
            has_headers: true,
        })?;
        let dest = scratch.path().join(format!("sorted.{}.csv", batch_size));
        let mut result = BenchResult {
            batch_size,
            runs: 0,
            merges: 0,
            timings: Vec::with_capacity(runs),
        };

        for i in 0..runs {
            let start = Instant::now();
            let stats = sorter.sort(&source, &dest, &comparator)?;
            let elapsed = start.elapsed();

            assert_parity(&reference, &dest)?;
            result.runs = stats.runs;
            result.merges = stats.merges;
            result.timings.push(elapsed);

            println!(
                "batch {:>8} run {:>2}: {:>10.3} ms",
                batch_size,
                i + 1,
                elapsed.as_secs_f64() * 1000.0
            );
        }
        results.push(result);
    }

    println!("\nSummary");
    for result in &results {
        println!(
            "  batch {:>8}: avg {:>10.3} ms | {} runs, {} merges",
            result.batch_size,
            average_ms(&result.timings),
            result.runs,
            result.merges
        );
    }

    Ok(())
}

fn average_ms(values: &[Duration]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_ms: f64 = values.iter().map(|d| d.as_secs_f64() * 1000.0).sum();
    sum_ms / values.len() as f64
}

fn assert_parity(reference: &Path, candidate: &Path) -> Result<(), String> {
    let expected = fs::read(reference).map_err(|e| e.to_string())?;
    let actual = fs::read(candidate).map_err(|e| e.to_string())?;
    if expected != actual {
        return Err(format!(
            "Output mismatch: {} differs from {}",
            candidate.display(),
            reference.display()
        ));
    }
    Ok(())
}
