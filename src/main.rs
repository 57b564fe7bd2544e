use clap::Parser;
use log::{debug, info, LevelFilter};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod config;
mod monitor;
mod shelf;
mod signals;
mod sync;
mod worker;

use config::RunConfig;
use monitor::Monitor;
use shelf::Shelf;
use sync::ShutdownFlag;
use worker::WorkerPool;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "shelf-sort")]
#[command(about = "Concurrent randomized shelf sorter")]
#[command(version)]
struct Args {
    /// Number of slots on the shelf (at least 2)
    #[arg(value_name = "SIZE")]
    shelf_size: usize,

    /// Number of sorting workers (at least 1)
    #[arg(value_name = "WORKERS")]
    workers: usize,

    /// Base seed for reproducible runs (default: drawn from OS entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between automatic snapshot dumps
    #[arg(long, default_value_t = 1000)]
    dump_interval_ms: u64,

    /// Stop the run after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();

    let config = RunConfig::default()
        .with_shelf_size(args.shelf_size)
        .with_workers(args.workers)
        .with_seed_option(args.seed)
        .with_dump_interval(Duration::from_millis(args.dump_interval_ms))
        .with_timeout_option(args.timeout.map(Duration::from_secs));

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Wire up the shelf, the signal handlers, the workers, and the monitor,
/// then run until shutdown.
fn run(config: RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let base_seed = config.base_seed.unwrap_or_else(rand::random);
    info!(
        "shelf size {}, {} workers, base seed {}",
        config.shelf_size, config.num_workers, base_seed
    );

    let shutdown = ShutdownFlag::new();
    let (events, event_rx) = monitor::control_channel();
    // Handlers are live before the pid is announced; a signal sent as soon
    // as the pid appears is only queued, never lost.
    signals::install(events)?;

    println!("{}", std::process::id());

    let mut fill_rng = ChaCha8Rng::seed_from_u64(base_seed);
    let shelf = Arc::new(Shelf::with_random_values(config.shelf_size, &mut fill_rng));
    println!("{}", shelf::format_values(&shelf.snapshot()));

    let pool = WorkerPool::spawn(&shelf, &shutdown, base_seed, config.num_workers)?;

    let monitor_seed = base_seed.wrapping_add(1 + config.num_workers as u64);
    let monitor = Monitor::new(
        Arc::clone(&shelf),
        shutdown.clone(),
        event_rx,
        ChaCha8Rng::seed_from_u64(monitor_seed),
        config.dump_interval,
    )
    .with_run_timeout(config.run_timeout);
    let monitor_handle = thread::Builder::new()
        .name("monitor".to_string())
        .spawn(move || monitor.run())
        .map_err(|e| format!("failed to spawn monitor: {}", e))?;

    // The monitor owns shutdown sequencing: join it first, then the workers.
    let monitor_report = monitor_handle
        .join()
        .map_err(|_| "monitor thread panicked")?;
    let worker_reports = pool.join()?;

    for report in &worker_reports {
        debug!(
            "worker {}: {} iterations, {} swaps",
            report.worker, report.iterations, report.swaps
        );
    }
    let total_swaps: u64 = worker_reports.iter().map(|r| r.swaps).sum();
    info!(
        "run complete: {} dumps, {} reshuffles, {} swaps",
        monitor_report.dumps, monitor_report.reshuffles, total_swaps
    );

    println!("{}", shelf::format_values(&shelf.snapshot()));
    Ok(())
}
