//! Lift workers: drain the shared buffer and accumulate private stats.

use std::thread;
use std::time::Duration;

use crate::buffer::RequestBuffer;
use crate::gate::Gate;
use crate::log_dev;
use crate::logging::SimLog;
use crate::types::{LiftId, LiftStats};

/// Service requests until the close marker arrives, then forward it and
/// return this lift's private counters.
///
/// The simulated travel delay runs outside the buffer's critical section.
pub fn run<G: Gate>(
    id: LiftId,
    buffer: &RequestBuffer<G>,
    log: &SimLog,
    delay: Duration,
) -> LiftStats {
    let mut stats = LiftStats::new(id);
    loop {
        let req = buffer.pop();
        if req.is_close_marker() {
            // Put the marker back so the next blocked lift wakes and exits.
            buffer.forward_close();
            break;
        }
        let previous = stats.position;
        let moved = stats.serve(&req);
        log.record_service(&stats, &req, previous, moved);
        log_dev!("[LIFT-{id}] served {} -> {} ({moved} floors)", req.src, req.dst);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    log_dev!("[LIFT-{id}] done after {} requests", stats.requests_served);
    stats
}
