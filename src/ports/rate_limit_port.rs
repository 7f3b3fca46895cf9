//! Request pacing port, owned by whichever adapter talks to an upstream source.

pub trait RateLimiter {
    /// Block until the next request may be issued.
    fn acquire(&self);
}

