mod buffer;
mod error;
mod gate;
mod lift;
mod logging;
mod producer;
mod sim;
mod types;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SimError;
use crate::logging::SimLog;
use crate::sim::{SimConfig, SyncPrimitive};
use crate::types::Floor;

const DEFAULT_LIFTS: usize = 3;
const DEFAULT_INPUT: &str = "sim_input.txt";
const DEFAULT_OUTPUT: &str = "sim_out.txt";
const BENCH_CAPACITY: usize = 4;
const BENCH_REQUESTS: usize = 1000;
const BENCH_TOP_FLOOR: Floor = 50;

struct CliOptions {
    positionals: Vec<String>,
    sync: SyncPrimitive,
    input: PathBuf,
    output: PathBuf,
}

fn print_usage(program: &str) {
    println!("Liftsim CLI");
    println!("Usage:");
    println!("  {program} <capacity> <delay_ms> [lifts] [options]");
    println!("  {program} bench [capacity] [delay_ms] [lifts] [requests] [options]");
    println!("  {program} --help");
    println!();
    println!("Arguments:");
    println!("  capacity   request buffer capacity (positive integer)");
    println!("  delay_ms   simulated travel time per request in milliseconds (non-negative)");
    println!("  lifts      number of lift workers (default {DEFAULT_LIFTS})");
    println!("Options:");
    println!("  --sync condvar|semaphore  wait/wake primitive guarding the buffer (default condvar)");
    println!("  --input PATH              request file (default {DEFAULT_INPUT})");
    println!("  --output PATH             simulation log file (default {DEFAULT_OUTPUT})");
    println!();
    println!("Bench defaults: capacity={BENCH_CAPACITY} delay_ms=0 lifts={DEFAULT_LIFTS} requests={BENCH_REQUESTS}");
}

fn exit_with_usage(program: &str, message: &str) -> ! {
    eprintln!("{message}");
    print_usage(program);
    std::process::exit(2);
}

fn exit_with_error(err: SimError) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}

fn parse_positive(program: &str, name: &str, value: &str) -> usize {
    match value.parse::<usize>() {
        Ok(parsed) if parsed >= 1 => parsed,
        _ => exit_with_usage(program, &format!("invalid {name} value: {value}")),
    }
}

fn parse_delay_ms(program: &str, value: &str) -> u64 {
    value
        .parse::<u64>()
        .unwrap_or_else(|_| exit_with_usage(program, &format!("invalid delay_ms value: {value}")))
}

fn parse_options(program: &str, args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        positionals: Vec::new(),
        sync: SyncPrimitive::Condvar,
        input: PathBuf::from(DEFAULT_INPUT),
        output: PathBuf::from(DEFAULT_OUTPUT),
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--sync" => {
                let value = iter
                    .next()
                    .unwrap_or_else(|| exit_with_usage(program, "--sync needs a value"));
                options.sync = match value.as_str() {
                    "condvar" => SyncPrimitive::Condvar,
                    "semaphore" => SyncPrimitive::Semaphore,
                    other => {
                        exit_with_usage(program, &format!("unknown sync primitive: {other}"))
                    }
                };
            }
            "--input" => {
                let value = iter
                    .next()
                    .unwrap_or_else(|| exit_with_usage(program, "--input needs a value"));
                options.input = PathBuf::from(value);
            }
            "--output" => {
                let value = iter
                    .next()
                    .unwrap_or_else(|| exit_with_usage(program, "--output needs a value"));
                options.output = PathBuf::from(value);
            }
            other if other.starts_with("--") => {
                exit_with_usage(program, &format!("unknown option: {other}"));
            }
            other => options.positionals.push(other.to_string()),
        }
    }
    options
}

fn run_simulation_command(program: &str, args: &[String]) {
    let options = parse_options(program, args);
    if options.positionals.len() < 2 || options.positionals.len() > 3 {
        exit_with_usage(program, "expected <capacity> <delay_ms> [lifts]");
    }
    let capacity = parse_positive(program, "capacity", &options.positionals[0]);
    let delay_ms = parse_delay_ms(program, &options.positionals[1]);
    let lifts = options
        .positionals
        .get(2)
        .map(|value| parse_positive(program, "lifts", value))
        .unwrap_or(DEFAULT_LIFTS);

    let config = SimConfig {
        capacity,
        lifts,
        delay: Duration::from_millis(delay_ms),
        sync: options.sync,
    };

    let source = match File::open(&options.input) {
        Ok(file) => BufReader::new(file),
        Err(err) => exit_with_error(SimError::OpenSource {
            path: options.input,
            source: err,
        }),
    };
    let log = match SimLog::create(&options.output) {
        Ok(log) => Arc::new(log),
        Err(err) => exit_with_error(SimError::CreateLog {
            path: options.output,
            source: err,
        }),
    };

    let report = sim::simulate(&config, source, Arc::clone(&log));

    println!("SIMULATION SUMMARY");
    println!(
        "capacity={} lifts={} delay_ms={delay_ms}",
        config.capacity, config.lifts
    );
    println!("requests_produced={}", report.requests_produced);
    println!("requests_served={}", report.requests_served);
    println!("total_distance={}", report.total_distance);
    for stats in &report.per_lift {
        println!(
            "lift-{}: served={} distance={} final_position={}",
            stats.id, stats.requests_served, stats.total_distance, stats.position
        );
    }

    if let Err(err) = log.finish() {
        // Strictly after the drain: the results above already stand.
        eprintln!("{}", SimError::FlushLog(err));
    }
}

fn run_bench_command(program: &str, args: &[String]) {
    let options = parse_options(program, args);
    if options.positionals.len() > 4 {
        exit_with_usage(program, "bench: too many arguments");
    }
    let capacity = options
        .positionals
        .first()
        .map(|value| parse_positive(program, "capacity", value))
        .unwrap_or(BENCH_CAPACITY);
    let delay_ms = options
        .positionals
        .get(1)
        .map(|value| parse_delay_ms(program, value))
        .unwrap_or(0);
    let lifts = options
        .positionals
        .get(2)
        .map(|value| parse_positive(program, "lifts", value))
        .unwrap_or(DEFAULT_LIFTS);
    let requests = options
        .positionals
        .get(3)
        .map(|value| parse_positive(program, "requests", value))
        .unwrap_or(BENCH_REQUESTS);

    let config = SimConfig {
        capacity,
        lifts,
        delay: Duration::from_millis(delay_ms),
        sync: options.sync,
    };
    sim::run_bench(&config, requests, BENCH_TOP_FLOOR);
}

fn main() {
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "liftsim".to_string());
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--help") | Some("-h") | Some("help") => print_usage(&program),
        Some("bench") => run_bench_command(&program, &args[1..]),
        Some(_) => run_simulation_command(&program, &args),
        None => exit_with_usage(&program, "missing required arguments"),
    }
}
