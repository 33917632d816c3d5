//! Producer side: parses transport requests and feeds the shared buffer.

use std::io::BufRead;

use crate::buffer::RequestBuffer;
use crate::gate::Gate;
use crate::log_dev;
use crate::logging::SimLog;
use crate::types::{Floor, Request};

/// Read requests line by line and push each valid one into the buffer.
///
/// A malformed line or an out-of-domain floor is a recoverable per-record
/// error: it is reported and dropped, and never reaches the buffer. Closes
/// the buffer exactly once after the source ends and returns the number of
/// requests enqueued.
pub fn run<G: Gate>(buffer: &RequestBuffer<G>, source: impl BufRead, log: &SimLog) -> usize {
    let mut enqueued = 0usize;
    for line in source.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("request source read failed, stopping early: {err}");
                break;
            }
        };
        let Some(req) = parse_request(&line) else {
            eprintln!("ignoring invalid lift request: {line:?}");
            continue;
        };
        if buffer.push(req).is_err() {
            eprintln!("request buffer closed for writes, dropping remaining input");
            break;
        }
        enqueued += 1;
        log.record_request(&req, enqueued);
        log_dev!("[PRODUCER] queued request {} -> {} (no {enqueued})", req.src, req.dst);
    }
    buffer.close();
    log_dev!("[PRODUCER] source exhausted after {enqueued} requests");
    enqueued
}

/// Parse "src dst" from a line; tokens past the first two are ignored.
/// Both floors must be at least 1.
fn parse_request(line: &str) -> Option<Request> {
    let mut fields = line.split_whitespace();
    let src: Floor = fields.next()?.parse().ok()?;
    let dst: Floor = fields.next()?.parse().ok()?;
    if src < 1 || dst < 1 {
        return None;
    }
    Some(Request::new(src, dst))
}
