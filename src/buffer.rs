//! Fixed-capacity blocking FIFO buffer shared by the producer and all lifts.

use std::sync::Mutex;

use crate::gate::Gate;
use crate::types::Request;

/// Circular bounded buffer of requests with a forwarded close marker.
///
/// Writers block while the buffer is full and readers block while it is
/// empty; both waits go through a pair of counting gates so the same logic
/// runs on condition variables or semaphores. Shutdown is in-band: the
/// producer enqueues one close marker, and every lift that pops it puts it
/// back before exiting, which chains the wake-one signal through all
/// remaining lifts without anyone knowing how many there are.
pub struct RequestBuffer<G: Gate> {
    ring: Mutex<Ring>,
    /// Free slots; `push` takes one permit, `pop` returns it.
    free: G,
    /// Occupied slots; `pop` takes one permit, `push` returns it.
    filled: G,
}

struct Ring {
    slots: Box<[Option<Request>]>,
    head: usize,
    count: usize,
    closed: bool,
}

impl Ring {
    fn insert(&mut self, req: Request) {
        let tail = (self.head + self.count) % self.slots.len();
        debug_assert!(self.slots[tail].is_none(), "overwrote an unread slot");
        self.slots[tail] = Some(req);
        self.count += 1;
    }

    fn remove(&mut self) -> Request {
        let req = self.slots[self.head].take().expect("read an unwritten slot");
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        req
    }
}

impl<G: Gate> RequestBuffer<G> {
    /// Create a buffer with room for `capacity` in-flight requests.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "buffer capacity must be at least 1");
        Self {
            ring: Mutex::new(Ring {
                slots: vec![None; capacity].into_boxed_slice(),
                head: 0,
                count: 0,
                closed: false,
            }),
            free: G::with_permits(capacity),
            filled: G::with_permits(0),
        }
    }

    /// Blocking FIFO insert; wakes one blocked reader.
    ///
    /// Returns the request back if the buffer was already closed for writes.
    /// The producer is the only writer and the only closer, so in a normal
    /// run nothing pushes after close.
    pub fn push(&self, req: Request) -> Result<(), Request> {
        if self.ring.lock().expect("request buffer mutex poisoned").closed {
            return Err(req);
        }
        self.free.acquire();
        let mut ring = self.ring.lock().expect("request buffer mutex poisoned");
        ring.insert(req);
        drop(ring);
        self.filled.release();
        Ok(())
    }

    /// Blocking FIFO removal; wakes one blocked writer.
    ///
    /// Never fails: end of production arrives in-band as the close marker,
    /// which the caller must forward with [`forward_close`] before exiting so
    /// the next blocked reader wakes too.
    ///
    /// [`forward_close`]: RequestBuffer::forward_close
    pub fn pop(&self) -> Request {
        self.filled.acquire();
        let mut ring = self.ring.lock().expect("request buffer mutex poisoned");
        let req = ring.remove();
        drop(ring);
        self.free.release();
        req
    }

    /// Stop accepting requests and enqueue the single close marker.
    ///
    /// Called exactly once, by the producer, after its source is exhausted.
    /// Blocks like any push while the buffer is full. One marker reaches any
    /// number of lifts because each lift forwards it before exiting.
    pub fn close(&self) {
        {
            let mut ring = self.ring.lock().expect("request buffer mutex poisoned");
            debug_assert!(!ring.closed, "buffer closed twice");
            ring.closed = true;
        }
        self.free.acquire();
        let mut ring = self.ring.lock().expect("request buffer mutex poisoned");
        ring.insert(Request::close_marker());
        drop(ring);
        self.filled.release();
    }

    /// Put the close marker back after popping it.
    ///
    /// Cannot block: the pop that removed the marker freed exactly one slot,
    /// and after `close` no writer other than departing lifts exists to take
    /// that slot first.
    pub fn forward_close(&self) {
        self.free.acquire();
        let mut ring = self.ring.lock().expect("request buffer mutex poisoned");
        ring.insert(Request::close_marker());
        drop(ring);
        self.filled.release();
    }

    /// Current number of buffered requests, close marker included.
    pub fn len(&self) -> usize {
        self.ring.lock().expect("request buffer mutex poisoned").count
    }
}
