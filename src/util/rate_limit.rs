//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Movement updates per second per connection. Browser clients emit one
/// per animation frame, sometimes twice.
pub const MOVEMENT_RATE_LIMIT: u32 = 240;

/// Shots per second per connection
pub const SHOOT_RATE_LIMIT: u32 = 30;

/// Per-connection rate limiter state
#[derive(Clone)]
pub struct ConnectionRateLimiter {
    movement_limiter: Arc<Limiter>,
    shoot_limiter: Arc<Limiter>,
}

impl ConnectionRateLimiter {
    pub fn new() -> Self {
        Self {
            movement_limiter: create_limiter(MOVEMENT_RATE_LIMIT),
            shoot_limiter: create_limiter(SHOOT_RATE_LIMIT),
        }
    }

    /// Check if a movement update is allowed (returns true if allowed)
    pub fn check_movement(&self) -> bool {
        self.movement_limiter.check().is_ok()
    }

    /// Check if a shoot event is allowed (returns true if allowed)
    pub fn check_shoot(&self) -> bool {
        self.shoot_limiter.check().is_ok()
    }
}

impl Default for ConnectionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
