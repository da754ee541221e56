use rand::Rng;
use std::time::Duration;

/// Sleeps `base_ms` plus a random extra of up to `jitter_ms`; a zero delay
/// returns immediately.
pub async fn sleep_with_jitter(base_ms: u64, jitter_ms: u64) {
    if base_ms == 0 && jitter_ms == 0 {
        return;
    }
    tokio::time::sleep(jittered(base_ms, jitter_ms)).await;
}

fn jittered(base_ms: u64, jitter_ms: u64) -> Duration {
    let jitter = rand::rng().random_range(0..=jitter_ms);
    Duration::from_millis(base_ms.saturating_add(jitter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_range() {
        for _ in 0..100 {
            let delay = jittered(100, 50);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
        assert_eq!(jittered(10, 0), Duration::from_millis(10));
    }

    #[test]
    fn huge_delays_saturate() {
        assert_eq!(jittered(u64::MAX, 0), Duration::from_millis(u64::MAX));
        assert!(jittered(u64::MAX - 1, 1000) <= Duration::from_millis(u64::MAX));
    }
}
