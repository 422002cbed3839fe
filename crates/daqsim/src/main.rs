//! DAQ Simulator CLI
//!
//! Walks an operational schedule in scaled real time, emitting synthetic
//! Super Time Frames, optionally persisting them and printing the emitted
//! events.

use clap::Parser;
use daqsim_core::{LocalRunRegistry, MessageSink, RunRegistry, TransportError};
use daqsim_engine::{DaqConfig, DaqRunner};
use daqsim_monitor::{HttpRunRegistry, MonitorConfig};
use daqsim_schedule::Schedule;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "daqsim")]
#[command(about = "Schedule-driven DAQ simulator")]
#[command(version)]
struct Cli {
    /// Path to the schedule (YAML)
    #[arg(short, long)]
    schedule: PathBuf,

    /// Destination folder for STF files; omit to not write data
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// Stop at this simulated time (e.g. "90s", "5m"); default: end of schedule
    #[arg(short, long)]
    until: Option<humantime::Duration>,

    /// Scheduler clock period in seconds
    #[arg(short, long, default_value = "1.0")]
    clock: f64,

    /// Real-time factor: wall-clock seconds per simulated second
    #[arg(short, long, default_value = "1.0")]
    factor: f64,

    /// Low limit on the STF interarrival time, seconds
    #[arg(short = 'L', long, default_value = "1.0")]
    low: f64,

    /// High limit on the STF interarrival time, seconds
    #[arg(short = 'H', long, default_value = "2.0")]
    high: f64,

    /// Seed for the interarrival draw (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Test mode: generate run ids locally instead of asking the monitor
    #[arg(short, long)]
    test: bool,

    /// Run-monitor base URL (required unless --test)
    #[arg(short = 'M', long, required_unless_present = "test")]
    monitor_url: Option<String>,

    /// Run-monitor API token
    #[arg(long)]
    api_token: Option<String>,

    /// Accept invalid TLS certificates from the monitor
    #[arg(long)]
    insecure: bool,

    /// Print emitted events to stdout
    #[arg(short, long)]
    print_events: bool,
}

/// Sink that prints each event to stdout.
struct StdoutSink;

impl MessageSink for StdoutSink {
    fn send(&self, topic: &str, body: &[u8], _: &[(&str, &str)]) -> Result<(), TransportError> {
        println!("[{}] {}", topic, String::from_utf8_lossy(body));
        Ok(())
    }
}

// Current-thread runtime: same-instant wake-ups of the tracker and the
// generator then resolve in a stable order per run.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let schedule = Schedule::from_yaml_file(&cli.schedule)?;

    let mut config = DaqConfig::new(schedule)
        .with_clock_tick(cli.clock)
        .with_factor(cli.factor)
        .with_interarrival(cli.low, cli.high);
    if let Some(dest) = cli.dest {
        config = config.with_destination(dest);
    }
    if let Some(until) = cli.until {
        config = config.with_until(until.as_secs_f64());
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let registry: Arc<dyn RunRegistry> = if cli.test {
        Arc::new(match cli.seed {
            Some(seed) => LocalRunRegistry::seeded(seed),
            None => LocalRunRegistry::new(),
        })
    } else {
        let url = cli
            .monitor_url
            .ok_or("--monitor-url is required unless --test is set")?;
        let mut monitor = MonitorConfig::new(url).with_insecure(cli.insecure);
        if let Some(token) = cli.api_token {
            monitor = monitor.with_api_token(token);
        }
        Arc::new(HttpRunRegistry::new(monitor)?)
    };

    let sink: Option<Arc<dyn MessageSink>> = if cli.print_events {
        Some(Arc::new(StdoutSink))
    } else {
        None
    };

    let runner = DaqRunner::new(config, registry, sink)?;
    let summary = runner
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    println!("---");
    println!(
        "Run {} complete ({:?}): {} STFs generated, {:.1}s simulated, dataset {}",
        summary.run_id, summary.outcome, summary.stf_count, summary.sim_time, summary.dataset
    );

    Ok(())
}
