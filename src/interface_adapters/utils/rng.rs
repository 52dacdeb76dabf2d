use crate::interface_adapters::utils::clock::unix_millis;
use std::sync::{
    OnceLock,
    atomic::{AtomicU64, Ordering},
};

/// Returns a process-unique, monotonically increasing identifier for subscribers and
/// connections.
///
/// Seeded from the wall clock so ids from separate runs rarely overlap in logs.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(unix_millis() << 16));
    counter.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let first = rand_id();
        let second = rand_id();
        assert!(second > first);
    }
}
