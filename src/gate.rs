//! Blocking wait/wake primitives behind a single counting-gate interface.

use std::sync::{Condvar, Mutex};

use std_semaphore::Semaphore;

/// A counting permit gate with wake-one semantics.
///
/// `acquire` blocks while no permit is available; `release` adds one permit
/// back and wakes at most one blocked waiter. The request buffer runs the
/// same FIFO logic over either implementation, so the primitive is a
/// construction-time choice rather than a separate code path.
pub trait Gate: Send + Sync {
    /// Create a gate holding `permits` permits.
    fn with_permits(permits: usize) -> Self;

    /// Take one permit, blocking until one is available.
    fn acquire(&self);

    /// Return one permit and wake one waiter, if any.
    fn release(&self);
}

/// Mutex + condition variable gate, the in-process thread primitive.
pub struct CondvarGate {
    permits: Mutex<usize>,
    nonzero: Condvar,
}

impl Gate for CondvarGate {
    fn with_permits(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            nonzero: Condvar::new(),
        }
    }

    fn acquire(&self) {
        let mut permits = self.permits.lock().expect("gate mutex poisoned");
        while *permits == 0 {
            // Wait releases the lock and re-acquires it before returning.
            permits = self.nonzero.wait(permits).expect("condvar wait failed");
        }
        *permits -= 1;
    }

    fn release(&self) {
        let mut permits = self.permits.lock().expect("gate mutex poisoned");
        *permits += 1;
        self.nonzero.notify_one();
    }
}

/// Counting-semaphore gate, the primitive the cross-process flavour of this
/// design relies on.
pub struct SemaphoreGate {
    sem: Semaphore,
}

impl Gate for SemaphoreGate {
    fn with_permits(permits: usize) -> Self {
        Self {
            sem: Semaphore::new(permits as isize),
        }
    }

    fn acquire(&self) {
        self.sem.acquire();
    }

    fn release(&self) {
        self.sem.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn acquire_blocks_until_release<G: Gate + 'static>() {
        let gate = Arc::new(G::with_permits(0));
        let (ready_tx, ready_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let gate_clone = Arc::clone(&gate);
        let handle = thread::spawn(move || {
            ready_tx.send(()).expect("send ready");
            gate_clone.acquire();
            done_tx.send(()).expect("send done");
        });

        ready_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("ready");
        // No permit yet, so the waiter must still be blocked.
        assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());

        gate.release();
        done_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("waiter never woke after release");
        handle.join().expect("waiter thread panicked");
    }

    fn initial_permits_are_consumable<G: Gate>() {
        let gate = G::with_permits(3);
        // Three acquires must not block; the fourth would.
        gate.acquire();
        gate.acquire();
        gate.acquire();
        gate.release();
        gate.acquire();
    }

    #[test]
    fn condvar_gate_blocks_until_release() {
        acquire_blocks_until_release::<CondvarGate>();
    }

    #[test]
    fn semaphore_gate_blocks_until_release() {
        acquire_blocks_until_release::<SemaphoreGate>();
    }

    #[test]
    fn condvar_gate_honours_initial_permits() {
        initial_permits_are_consumable::<CondvarGate>();
    }

    #[test]
    fn semaphore_gate_honours_initial_permits() {
        initial_permits_are_consumable::<SemaphoreGate>();
    }
}
