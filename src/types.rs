//! Shared identifiers and the request model used across the simulation.

/// Floor number; valid floors start at 1.
pub type Floor = i32;
/// Unique identifier for a lift worker thread.
pub type LiftId = usize;

/// Floor where every lift starts before serving its first request.
pub const HOME_FLOOR: Floor = 1;

/// Marker value outside the valid floor domain.
const OUT_OF_SERVICE: Floor = -1;

/// A transport request from one floor to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    pub src: Floor,
    pub dst: Floor,
}

impl Request {
    /// Construct a request between two valid floors.
    pub fn new(src: Floor, dst: Floor) -> Self {
        Self { src, dst }
    }

    /// The end-of-production marker that lifts forward to each other at
    /// shutdown. Never serviced.
    pub fn close_marker() -> Self {
        Self {
            src: OUT_OF_SERVICE,
            dst: OUT_OF_SERVICE,
        }
    }

    /// True if this request is the end-of-production marker.
    pub fn is_close_marker(&self) -> bool {
        self.src == OUT_OF_SERVICE && self.dst == OUT_OF_SERVICE
    }
}

/// Per-lift counters, owned exclusively by the lift thread that updates them
/// and read by the coordinator only after the thread has been joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiftStats {
    pub id: LiftId,
    pub position: Floor,
    pub requests_served: u64,
    pub total_distance: u64,
}

impl LiftStats {
    /// Fresh counters for a lift parked at the home floor.
    pub fn new(id: LiftId) -> Self {
        Self {
            id,
            position: HOME_FLOOR,
            requests_served: 0,
            total_distance: 0,
        }
    }

    /// Floors travelled to service `req` from the current position: first to
    /// the pickup floor, then to the destination.
    fn distance_to_serve(&self, req: &Request) -> u64 {
        u64::from((self.position - req.src).unsigned_abs())
            + u64::from((req.src - req.dst).unsigned_abs())
    }

    /// Record one serviced request and move to its destination.
    /// Returns the distance moved for this request alone.
    pub fn serve(&mut self, req: &Request) -> u64 {
        let moved = self.distance_to_serve(req);
        self.requests_served += 1;
        self.total_distance += moved;
        self.position = req.dst;
        moved
    }
}
