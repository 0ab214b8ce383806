use std::fs;
use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

use cachesim::cache::Cache;
use cachesim::config::CacheConfig;
use cachesim::metrics::{self, LiveMetrics};
use cachesim::report;
use cachesim::trace;

/// Trace-driven set-associative cache simulator.
///
/// Replays a file of byte addresses through a configurable cache and
/// reports hit/miss statistics. Run `viz` in another terminal with
/// `--live` enabled to watch the cache fill in real time.
#[derive(Debug, Parser)]
#[command(name = "cachesim", version)]
struct Args {
    /// Trace file: one byte address per line (decimal or 0x hex)
    trace: PathBuf,

    /// Total cache capacity in bytes
    #[arg(long, default_value_t = 1024)]
    capacity: u64,

    /// Cache block size in bytes
    #[arg(long, default_value_t = 64)]
    block_size: u64,

    /// Ways per set (1 = direct mapped)
    #[arg(long, default_value_t = 1)]
    associativity: u64,

    /// JSON config file overriding the geometry flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final cache contents after the trace
    #[arg(long)]
    dump_contents: bool,

    /// Write live metrics snapshots for the viz binary
    #[arg(long)]
    live: bool,
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));
    let args = Args::parse();

    // The core only ever returns errors; exiting is a driver decision.
    if let Err(err) = run(&args) {
        eprintln!("cachesim: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => CacheConfig::new(args.capacity, args.block_size, args.associativity),
    };

    let mut cache = Cache::new(config)?;
    print!("{}", report::format_config(&cache));

    let addresses = trace::load_trace(&args.trace)?;
    let trace_name = args.trace.display().to_string();

    let mut last_address = 0;
    let mut last_outcome = String::new();

    for &addr in &addresses {
        let outcome = cache.record_access(addr);
        last_address = addr;
        last_outcome = outcome.to_string();
        if args.live {
            let mut snapshot = LiveMetrics::from_cache(&cache);
            snapshot.status = "running".to_string();
            snapshot.trace_name = trace_name.clone();
            snapshot.addresses_total = addresses.len() as u64;
            snapshot.last_address = last_address;
            snapshot.last_outcome = last_outcome.clone();
            metrics::write_metrics(&snapshot);
        }
    }

    if args.live {
        let mut snapshot = LiveMetrics::from_cache(&cache);
        snapshot.status = "complete".to_string();
        snapshot.trace_name = trace_name;
        snapshot.addresses_total = addresses.len() as u64;
        snapshot.last_address = last_address;
        snapshot.last_outcome = last_outcome;
        metrics::write_metrics(&snapshot);
    }

    if args.dump_contents {
        print!("{}", report::format_contents(&cache));
    }
    print!("{}", report::format_statistics(&cache));

    Ok(())
}
