//! RatHash CLI
//!
//! Hash files or stdin with the parallel RatHash engine.
//!
//! # Commands
//!
//! - `sum` - Hash files (or stdin) and print their digests
//! - `benchmark` - Measure throughput for a given worker count

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rathash::input::{hash_path, parse_key, STDIN};
use rathash::report::{Digest, Format};
use rathash::{Config, Hasher};

#[derive(Parser)]
#[command(name = "rathash")]
#[command(author = "Cyberia")]
#[command(version)]
#[command(about = "Parallel keyed extendable-output hashing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash files and print their digests
    Sum {
        /// Files to hash ("-" or none for stdin)
        files: Vec<PathBuf>,

        /// Output length in bytes
        #[arg(short, long, default_value = "32")]
        length: usize,

        /// Hex-encoded 24-byte key (default: all-zero key)
        #[arg(short, long)]
        key: Option<String>,

        /// Number of worker threads (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Hex)]
        format: Format,
    },

    /// Run performance benchmark
    Benchmark {
        /// Input size in MiB
        #[arg(short, long, default_value = "256")]
        size_mib: usize,

        /// Number of hashes to compute
        #[arg(short, long, default_value = "5")]
        iterations: u32,

        /// Number of worker threads (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sum {
            files,
            length,
            key,
            threads,
            format,
        } => cmd_sum(files, length, key.as_deref(), threads, format),
        Commands::Benchmark {
            size_mib,
            iterations,
            threads,
        } => cmd_benchmark(size_mib, iterations, threads),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn pool_config(threads: Option<usize>) -> Config {
    threads.map_or_else(Config::default, Config::with_workers)
}

fn cmd_sum(
    files: Vec<PathBuf>,
    length: usize,
    key: Option<&str>,
    threads: Option<usize>,
    format: Format,
) -> anyhow::Result<()> {
    let key = match key {
        Some(hex_key) => parse_key(hex_key)?,
        None => Vec::new(),
    };
    let sources = if files.is_empty() {
        vec![PathBuf::from(STDIN)]
    } else {
        files
    };

    let config = pool_config(threads);
    log::info!("hashing {} input(s) with {} workers", sources.len(), config.workers);

    let mut hasher = Hasher::with_config(length, config)?;
    for (i, path) in sources.iter().enumerate() {
        if i > 0 {
            hasher.reset()?;
        }
        let bytes = hash_path(&mut hasher, path)
            .with_context(|| format!("failed to hash {}", path.display()))?;
        let output = hasher.finalize(&key)?;

        let digest = Digest::new(path.display().to_string(), bytes, !key.is_empty(), &output);
        println!("{}", digest.render(format)?);
    }

    Ok(())
}

fn cmd_benchmark(size_mib: usize, iterations: u32, threads: Option<usize>) -> anyhow::Result<()> {
    let config = pool_config(threads);
    let input = vec![0xA5u8; size_mib * 1024 * 1024];

    println!(
        "Running benchmark: {} x {} MiB with {} workers...",
        iterations, size_mib, config.workers
    );

    let mut hasher = Hasher::with_config(32, config)?;
    let start = Instant::now();

    for _ in 0..iterations {
        hasher.reset()?;
        hasher.write(&input);
        let _ = hasher.finalize(&[])?;
    }

    let elapsed = start.elapsed();
    let total_mib = size_mib as f64 * f64::from(iterations);
    let throughput = total_mib / elapsed.as_secs_f64();

    println!("\nResults:");
    println!("  Total input:  {} MiB", total_mib);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Throughput:   {:.2} MiB/s", throughput);

    println!("\nAlgorithm parameters:");
    println!("  Block size: {} KiB", rathash::BLOCK_SIZE / 1024);
    println!("  Key size:   {} bytes", rathash::KEY_SIZE);
    println!("  Rounds:     {}", rathash::algorithm::ROUNDS);
    println!("  Version:    {}", rathash::algorithm::VERSION);
    println!("  Queue:      {} blocks", config.queue_depth);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_defaults_to_core_config() {
        assert_eq!(pool_config(None), Config::default());
        assert_eq!(pool_config(Some(3)), Config::with_workers(3));
        assert_eq!(pool_config(Some(0)).workers, 1);
    }
}
