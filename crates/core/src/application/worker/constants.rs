// Worker constants (No magic values)
use std::time::Duration;

/// Sleep duration when no jobs are available (100ms)
pub const IDLE_SLEEP_DURATION: Duration = Duration::from_millis(100);

/// Sleep duration after worker error before retry (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// Maximum simultaneous pipeline runs (one per worker)
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// How long shutdown waits for in-flight jobs (5 seconds)
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);
