// ID Provider Port (for deterministic testing)

/// ID provider interface (allows deterministic execution IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique execution ID
    fn generate_id(&self) -> String;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Sequential provider: `exec-1`, `exec-2`, ...
pub struct SequentialIdProvider {
    next: std::sync::atomic::AtomicU64,
}

impl SequentialIdProvider {
    pub fn new() -> Self {
        Self {
            next: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdProvider for SequentialIdProvider {
    fn generate_id(&self) -> String {
        let n = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("exec-{}", n)
    }
}
