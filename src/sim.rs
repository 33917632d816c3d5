//! Coordinator: owns the buffer and the producer/lift thread lifecycle.

use std::io::{BufRead, Cursor};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::buffer::RequestBuffer;
use crate::gate::{CondvarGate, Gate, SemaphoreGate};
use crate::lift;
use crate::log_dev;
use crate::logging::SimLog;
use crate::producer;
use crate::types::{Floor, LiftStats};

/// Which wait/wake primitive guards the shared buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPrimitive {
    /// Mutex + condition variables.
    Condvar,
    /// Counting semaphores.
    Semaphore,
}

/// Runtime parameters for one simulation.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Buffer capacity, at least 1.
    pub capacity: usize,
    /// Number of lift workers, at least 1.
    pub lifts: usize,
    /// Simulated travel time per serviced request.
    pub delay: Duration,
    pub sync: SyncPrimitive,
}

/// Totals across all lifts plus the per-lift breakdown, computed once after
/// every thread has been joined.
#[derive(Clone, Debug)]
pub struct AggregateReport {
    pub requests_produced: usize,
    pub requests_served: u64,
    pub total_distance: u64,
    pub per_lift: Vec<LiftStats>,
}

/// Run one complete simulation against the given request source.
///
/// Spawns the producer and `config.lifts` lift threads, waits for all of
/// them, and tears the buffer down. Single-shot: a new run needs a new call.
pub fn simulate(
    config: &SimConfig,
    source: impl BufRead + Send + 'static,
    log: Arc<SimLog>,
) -> AggregateReport {
    match config.sync {
        SyncPrimitive::Condvar => simulate_with::<CondvarGate>(config, source, log),
        SyncPrimitive::Semaphore => simulate_with::<SemaphoreGate>(config, source, log),
    }
}

fn simulate_with<G: Gate + 'static>(
    config: &SimConfig,
    source: impl BufRead + Send + 'static,
    log: Arc<SimLog>,
) -> AggregateReport {
    assert!(config.lifts >= 1, "at least one lift is required");
    let buffer = Arc::new(RequestBuffer::<G>::new(config.capacity));

    let producer_thread = {
        let buffer = Arc::clone(&buffer);
        let log = Arc::clone(&log);
        thread::Builder::new()
            .name("producer".to_string())
            .spawn(move || producer::run(&buffer, source, &log))
            .expect("failed to spawn producer thread")
    };

    let mut lifts = Vec::with_capacity(config.lifts);
    for id in 0..config.lifts {
        let buffer = Arc::clone(&buffer);
        let log = Arc::clone(&log);
        let delay = config.delay;
        let handle = thread::Builder::new()
            .name(format!("lift-{id}"))
            .spawn(move || lift::run(id, &buffer, &log, delay))
            .expect("failed to spawn lift thread");
        lifts.push(handle);
    }

    let requests_produced = producer_thread.join().expect("producer thread panicked");
    let mut per_lift = Vec::with_capacity(config.lifts);
    for handle in lifts {
        per_lift.push(handle.join().expect("lift thread panicked"));
    }

    // The forwarded close marker is the only thing left in the buffer.
    let leftover = buffer.pop();
    debug_assert!(leftover.is_close_marker(), "request left behind after drain");
    debug_assert_eq!(buffer.len(), 0, "buffer not empty after drain");
    log_dev!("[SIM] drained, {requests_produced} requests produced");

    let requests_served = per_lift.iter().map(|stats| stats.requests_served).sum();
    let total_distance = per_lift.iter().map(|stats| stats.total_distance).sum();
    AggregateReport {
        requests_produced,
        requests_served,
        total_distance,
        per_lift,
    }
}

/// Aggregated metrics from a single bench run.
struct BenchResult {
    capacity: usize,
    lifts: usize,
    requests: usize,
    elapsed_ms: f64,
    throughput: f64,
    cpu_user_s: Option<f64>,
    cpu_sys_s: Option<f64>,
    total_distance: u64,
    conserved: bool,
}

/// Best-effort CPU user/system time snapshot (seconds) on Unix platforms.
#[cfg(unix)]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    let seconds =
        |tv: libc::timeval| tv.tv_sec as f64 + (tv.tv_usec as f64 / 1_000_000.0);
    Some((seconds(usage.ru_utime), seconds(usage.ru_stime)))
}

/// Stub on non-Unix platforms.
#[cfg(not(unix))]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    None
}

/// Render a synthetic request source of `requests` random floor pairs.
fn synthetic_source(requests: usize, top_floor: Floor) -> Cursor<String> {
    let mut rng = rand::thread_rng();
    let mut input = String::new();
    for _ in 0..requests {
        let src = rng.gen_range(1..=top_floor);
        let dst = rng.gen_range(1..=top_floor);
        input.push_str(&format!("{src} {dst}\n"));
    }
    Cursor::new(input)
}

fn bench_once(config: &SimConfig, requests: usize, top_floor: Floor) -> BenchResult {
    let source = synthetic_source(requests, top_floor);
    let log = Arc::new(SimLog::disabled());

    let cpu_start = cpu_times_seconds();
    let start = Instant::now();
    let report = simulate(config, source, log);
    let elapsed_ms = start.elapsed().as_millis() as f64;

    let throughput = if elapsed_ms > 0.0 {
        report.requests_served as f64 / (elapsed_ms / 1000.0)
    } else {
        0.0
    };
    let (cpu_user_s, cpu_sys_s) = match (cpu_start, cpu_times_seconds()) {
        (Some((user_start, sys_start)), Some((user_end, sys_end))) => {
            (Some(user_end - user_start), Some(sys_end - sys_start))
        }
        _ => (None, None),
    };

    BenchResult {
        capacity: config.capacity,
        lifts: config.lifts,
        requests,
        elapsed_ms,
        throughput,
        cpu_user_s,
        cpu_sys_s,
        total_distance: report.total_distance,
        conserved: report.requests_served as usize == report.requests_produced,
    }
}

/// Run one synthetic benchmark and print a CSV row.
pub fn run_bench(config: &SimConfig, requests: usize, top_floor: Floor) {
    let result = bench_once(config, requests, top_floor);

    println!(
        "capacity,lifts,requests,elapsed_ms,throughput_req_per_s,cpu_user_s,cpu_sys_s,total_distance,conserved"
    );
    let cpu_user = result
        .cpu_user_s
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "NA".to_string());
    let cpu_sys = result
        .cpu_sys_s
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "NA".to_string());
    println!(
        "{},{},{},{:.2},{:.2},{},{},{},{}",
        result.capacity,
        result.lifts,
        result.requests,
        result.elapsed_ms,
        result.throughput,
        cpu_user,
        cpu_sys,
        result.total_distance,
        result.conserved
    );
    if !result.conserved {
        eprintln!("# violation,requests_lost_or_duplicated");
    }
}
