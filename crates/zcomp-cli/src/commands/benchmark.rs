//! Benchmark command for compression performance testing.
//!
//! Pages are compressed and decompressed in parallel through one backend, so
//! worker threads compete for its work buffers the way concurrent I/O on a
//! device would.

use crate::output::{throughput, OutputFormat};
use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use zcomp_core::config::{load_config, ZcompConfig};
use zcomp_core::{registry, Backend, BackendBuilder, PAGE_SIZE};

/// Generated page contents.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Pattern {
    /// All-zero pages.
    Zero,
    /// Pseudo-random pages.
    Random,
    /// Repeated English text.
    Text,
    /// Rotation of the other patterns.
    Mixed,
}

/// Arguments for benchmark command.
#[derive(Args)]
pub struct BenchmarkArgs {
    /// Algorithm to benchmark (defaults to the configured one).
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Work buffers in the backend pool (defaults to the configured count).
    #[arg(short, long)]
    pub buffers: Option<NonZeroUsize>,

    /// Worker threads.
    #[arg(short, long, default_value = "4")]
    pub threads: usize,

    /// Number of pages to compress.
    #[arg(short, long, default_value = "10000")]
    pub pages: usize,

    /// Data pattern.
    #[arg(long, value_enum, default_value = "mixed")]
    pub pattern: Pattern,

    /// Configuration file (defaults to /etc/zcomp.conf when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Serializable results for JSON output.
#[derive(Debug, Serialize)]
struct BenchmarkReport {
    algorithm: &'static str,
    buffers: usize,
    threads: usize,
    pages: usize,
    compress_gbps: f64,
    decompress_gbps: f64,
    ratio: f64,
    contended: u64,
}

/// Run compression benchmarks.
pub fn benchmark(args: &BenchmarkArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ZcompConfig::load(path)?,
        None => load_config()?,
    };
    if let Some(algorithm) = &args.algorithm {
        config.algorithm.clone_from(algorithm);
    }
    if let Some(buffers) = args.buffers {
        config.buffers = buffers.get();
    }

    let backend = BackendBuilder::from_config(&config)?.build()?;
    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .context("failed to start worker threads")?;

    let pages = generate_test_pages(args.pages, args.pattern);
    let total_bytes = pages.len() * PAGE_SIZE;
    info!(
        algorithm = backend.name(),
        buffers = config.buffers,
        threads = workers.current_num_threads(),
        pages = pages.len(),
        "starting benchmark"
    );

    let start = Instant::now();
    let compressed = workers.install(|| {
        pages
            .par_iter()
            .map(|page| compress_page(&backend, page))
            .collect::<anyhow::Result<Vec<_>>>()
    })?;
    let compress_secs = start.elapsed().as_secs_f64();

    let start = Instant::now();
    workers.install(|| {
        pages
            .par_iter()
            .zip(compressed.par_iter())
            .enumerate()
            .try_for_each(|(i, (page, data))| verify_page(&backend, i, page, data))
    })?;
    let decompress_secs = start.elapsed().as_secs_f64();

    let compressed_bytes: usize = compressed.iter().map(Vec::len).sum();
    let report = BenchmarkReport {
        algorithm: backend.name(),
        buffers: config.buffers,
        threads: workers.current_num_threads(),
        pages: pages.len(),
        compress_gbps: throughput(total_bytes, compress_secs),
        decompress_gbps: throughput(total_bytes, decompress_secs),
        ratio: backend.stats().ratio(),
        contended: backend.contended(),
    };
    debug!(
        compressed_bytes,
        bytes_in = report.pages * PAGE_SIZE,
        "benchmark complete"
    );
    registry::destroy(backend);

    match format {
        OutputFormat::Table => {
            println!("zcomp Compression Benchmark");
            println!("===========================");
            println!("Pages: {}  Threads: {}  Buffers: {}", report.pages, report.threads, report.buffers);
            println!();
            println!(
                "{:<10} {:>12} {:>14} {:>8} {:>10}",
                "Algorithm", "Compress", "Decompress", "Ratio", "Contended"
            );
            println!("{}", "-".repeat(58));
            println!(
                "{:<10} {:>7.2} GB/s {:>9.2} GB/s {:>7.2}x {:>10}",
                report.algorithm,
                report.compress_gbps,
                report.decompress_gbps,
                report.ratio,
                report.contended
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Raw => println!(
            "{} {:.3} {:.3} {:.3} {}",
            report.algorithm,
            report.compress_gbps,
            report.decompress_gbps,
            report.ratio,
            report.contended
        ),
    }

    Ok(())
}

fn compress_page(backend: &Backend, page: &[u8; PAGE_SIZE]) -> anyhow::Result<Vec<u8>> {
    let mut lease = backend.lease();
    let len = backend.compress_to_staging(page, &mut lease)?;
    Ok(lease.staging()[..len].to_vec())
}

fn verify_page(backend: &Backend, index: usize, page: &[u8; PAGE_SIZE], data: &[u8]) -> anyhow::Result<()> {
    let mut output = [0u8; PAGE_SIZE];
    let len = backend
        .decompress(data, &mut output)
        .with_context(|| format!("page {index} failed to decompress"))?;
    if len != PAGE_SIZE || output != *page {
        bail!("page {index} did not round-trip ({len} bytes restored)");
    }
    Ok(())
}

fn generate_test_pages(count: usize, pattern: Pattern) -> Vec<[u8; PAGE_SIZE]> {
    let mut pages = Vec::with_capacity(count);
    let mut rng_state = 12345u64;

    for i in 0..count {
        let mut page = [0u8; PAGE_SIZE];
        let kind = match pattern {
            Pattern::Mixed => match i % 3 {
                0 => Pattern::Zero,
                1 => Pattern::Random,
                _ => Pattern::Text,
            },
            other => other,
        };

        match kind {
            Pattern::Zero | Pattern::Mixed => {}
            Pattern::Random => {
                for byte in &mut page {
                    rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
                    *byte = (rng_state >> 33) as u8;
                }
            }
            Pattern::Text => {
                let text = b"The quick brown fox jumps over the lazy dog. ";
                for (j, byte) in page.iter_mut().enumerate() {
                    *byte = text[j % text.len()];
                }
            }
        }

        pages.push(page);
    }

    pages
}
