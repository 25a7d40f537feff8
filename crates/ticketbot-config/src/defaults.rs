//! Default values.

use crate::schema::*;
use std::time::Duration;

/// Default graceful shutdown window.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_millis(1_000);
/// Default delay between logging a fault and shutting down.
pub const DEFAULT_FAULT_FLUSH_DELAY: Duration = Duration::from_millis(1_000);
/// Default upper bound on the connect phase.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default cooldown sweep period.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            fault_flush_delay: DEFAULT_FAULT_FLUSH_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
