//! Simulation log sink and dev-build diagnostics.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Floor, LiftStats, Request};

/// Append-only sink for simulation records, shared by the producer and every
/// lift. The mutex keeps concurrent blocks from interleaving. Write failures
/// are reported per record and never abort the simulation.
pub struct SimLog {
    out: Mutex<Box<dyn Write + Send>>,
}

impl SimLog {
    /// Log into the given file, truncating previous content.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }

    /// Log into any writer.
    pub fn from_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Discard all records; used by the bench runner.
    pub fn disabled() -> Self {
        Self::from_writer(io::sink())
    }

    /// One block per produced request, in production order.
    pub fn record_request(&self, req: &Request, number: usize) {
        let block = format!(
            "New lift request from floor {} to floor {}\n\
             Request no: {number}\n\
             --------------------------\n",
            req.src, req.dst
        );
        self.append(&block);
    }

    /// One block per serviced request. `previous` is the lift's position
    /// before the move and `moved` the distance for this request alone;
    /// `stats` already reflects the completed move.
    pub fn record_service(&self, stats: &LiftStats, req: &Request, previous: Floor, moved: u64) {
        let mut block = String::new();
        let _ = writeln!(block, "Lift-{} operation", stats.id);
        let _ = writeln!(block, "Previous position: floor {previous}");
        let _ = writeln!(block, "Request: floor {} to floor {}", req.src, req.dst);
        let _ = writeln!(block, "Detail operations:");
        if previous != req.src {
            let _ = writeln!(block, "\tGo from floor {previous} to floor {}", req.src);
        }
        let _ = writeln!(block, "\tGo from floor {} to floor {}", req.src, req.dst);
        let _ = writeln!(block, "\tMovement for this request: {moved}");
        let _ = writeln!(block, "\tRequests served: {}", stats.requests_served);
        let _ = writeln!(block, "\tTotal movement: {}", stats.total_distance);
        let _ = writeln!(block, "Current position: floor {}", stats.position);
        block.push_str("--------------------------\n");
        self.append(&block);
    }

    fn append(&self, block: &str) {
        let mut out = self.out.lock().expect("sim log mutex poisoned");
        if let Err(err) = out.write_all(block.as_bytes()) {
            eprintln!("sim log write failed: {err}");
        }
    }

    /// Flush buffered records. Errors here happen strictly after the drain,
    /// so the caller reports them without touching computed results.
    pub fn finish(&self) -> io::Result<()> {
        self.out.lock().expect("sim log mutex poisoned").flush()
    }
}

pub fn dev_log(message: &str) {
    if !cfg!(debug_assertions) {
        return;
    }

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let current = thread::current();
    let thread_name = current.name().unwrap_or("unnamed");
    println!("[{ts}ms][{thread_name}] {message}");
}

#[macro_export]
macro_rules! log_dev {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            $crate::logging::dev_log(&format!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// In-memory writer that keeps the bytes inspectable after the log is
    /// done with them.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("buf mutex poisoned").clone())
                .expect("log output is not utf-8")
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buf mutex poisoned").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn request_record_has_number_and_floors() {
        let buf = SharedBuf::default();
        let log = SimLog::from_writer(buf.clone());
        log.record_request(&Request::new(2, 5), 1);
        let out = buf.contents();
        assert!(out.contains("New lift request from floor 2 to floor 5"));
        assert!(out.contains("Request no: 1"));
    }

    #[test]
    fn service_record_skips_pickup_leg_when_already_there() {
        let buf = SharedBuf::default();
        let log = SimLog::from_writer(buf.clone());
        let mut stats = LiftStats::new(0);
        stats.position = 3;
        let req = Request::new(3, 7);
        let previous = stats.position;
        let moved = stats.serve(&req);
        log.record_service(&stats, &req, previous, moved);
        let out = buf.contents();
        assert!(out.contains("Request: floor 3 to floor 7"));
        // No separate pickup leg: the lift is already at the source floor.
        assert!(!out.contains("Go from floor 3 to floor 3"));
        assert!(out.contains("Movement for this request: 4"));
        assert!(out.contains("Current position: floor 7"));
    }

    #[test]
    fn concurrent_blocks_do_not_interleave() {
        let buf = SharedBuf::default();
        let log = Arc::new(SimLog::from_writer(buf.clone()));
        let writers = 4usize;
        let per_writer = 50i32;

        let mut handles = Vec::new();
        for id in 0..writers {
            let log = Arc::clone(&log);
            handles.push(std::thread::spawn(move || {
                let mut stats = LiftStats::new(id);
                for floor in 1..=per_writer {
                    let req = Request::new(floor, floor + 1);
                    let previous = stats.position;
                    let moved = stats.serve(&req);
                    log.record_service(&stats, &req, previous, moved);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("writer thread panicked");
        }

        let out = buf.contents();
        // Every block opens with a lift header and closes with a separator;
        // equal counts mean no block was torn by another writer.
        let blocks = writers * per_writer as usize;
        let headers = out.matches("Lift-").count();
        let separators = out.matches("--------------------------\n").count();
        assert_eq!(headers, blocks);
        assert_eq!(separators, blocks);
    }
}
