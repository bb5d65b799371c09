#![deny(warnings)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use ringfifo_core::config::{resolve_soak_config, StdEnv, ENV_CAPACITY, ENV_OPS, ENV_SEED};
use ringfifo_core::soak::{self, SoakReport};
use ringfifo_core::{BufferError, RingBuffer};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ringfifo")]
#[command(about = "Fixed-capacity FIFO ring buffer: walkthrough and randomized soak test")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through the buffer's basic contracts step by step.
    Demo,
    /// Check the buffer against a reference queue with random operations.
    Soak {
        /// Buffer capacity [env: RINGFIFO_CAPACITY]
        #[arg(long)]
        capacity: Option<usize>,

        /// Number of random operations [env: RINGFIFO_OPS]
        #[arg(long)]
        ops: Option<u64>,

        /// RNG seed; the same seed replays the same run [env: RINGFIFO_SEED]
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    match args.command {
        Command::Demo => run_demo()?,
        Command::Soak {
            capacity,
            ops,
            seed,
            json,
        } => {
            let cfg = resolve_soak_config(capacity, ops, seed, &StdEnv).with_context(|| {
                format!("invalid soak settings (check {ENV_CAPACITY}, {ENV_OPS}, {ENV_SEED})")
            })?;
            tracing::info!(
                capacity = cfg.capacity.get(),
                ops = cfg.ops.get(),
                seed = cfg.seed,
                "config loaded"
            );
            let report = soak::run(&cfg).context("soak run failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run_demo() -> anyhow::Result<()> {
    println!("-- overflow is rejected, not overwritten");
    let mut rb = RingBuffer::new(3)?;
    rb.put_all([1, 2, 3])?;
    match rb.put(4) {
        Err(e @ BufferError::CapacityExceeded { .. }) => println!("put(4): {e}"),
        other => anyhow::bail!("expected a full buffer, got {other:?}"),
    }
    println!("get() = {}", rb.get()?);
    rb.put(4)?;
    println!("contents = {rb:?}");

    println!("-- indexed write on a buffer built from a sequence");
    let mut rb = RingBuffer::from_sequence([10, 5, 38])?;
    println!("at(2) = {}", rb.at(2)?);
    rb.set_at(2, 100)?;
    println!("after set_at(2, 100): at(2) = {}", rb.at(2)?);

    println!("-- bulk transfer");
    let mut rb = RingBuffer::new(100)?;
    rb.put_all(0u8..50)?;
    let mut dst = [0u8; 15];
    let moved = rb.get_into(&mut dst);
    println!("moved {moved} into a 15-slot array, {} left", rb.len());

    println!("-- search");
    let mut rb = RingBuffer::new(10)?;
    rb.put_all([10, 20, 0, 15, 20])?;
    for probe in [20, 15, 10, 18, 31] {
        println!("contains({probe}) = {}, find = {}", rb.contains(&probe), rb.find(&probe));
    }
    rb.remove(&20);
    println!("after remove(20): {rb:?}");

    println!("-- partial bulk put");
    let mut rb = RingBuffer::new(2)?;
    if let Err(e) = rb.put_all([1, 2, 3]) {
        println!("put_all([1, 2, 3]): {e}; contents = {rb:?}");
    }

    Ok(())
}

fn print_report(report: &SoakReport) {
    println!(
        "soak: capacity={} ops={} seed={} peak_len={} final_len={}",
        report.config.capacity.get(),
        report.config.ops.get(),
        report.config.seed,
        report.peak_len,
        report.final_len
    );
    for (name, stats) in &report.ops {
        println!(
            "  {name:<10} attempted={:<8} rejected={}",
            stats.attempted, stats.rejected
        );
    }
    println!("ok: buffer matched the reference queue at every step");
}
