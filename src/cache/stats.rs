//! Cache Statistics Module
//!
//! Tracks hits, misses, latency, evictions and warmup outcomes.

use std::time::Duration;

use serde::Serialize;

// == Cache Stats ==
/// Cache performance metrics, updated incrementally by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// hits / (hits + misses) * 100, or 0 before any lookup
    pub hit_rate_percent: f64,
    /// Running mean of timed get/set latency in milliseconds
    pub avg_response_time_ms: f64,
    /// Entries removed by capacity eviction
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expired_removals: u64,
    pub warmup_successes: u64,
    pub warmup_failures: u64,
    /// Current number of entries in the cache
    pub current_size: usize,
    /// Samples behind `avg_response_time_ms`
    #[serde(skip)]
    timed_requests: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.update_hit_rate();
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.update_hit_rate();
    }

    // == Record Response Time ==
    /// Folds one latency sample into the running mean:
    /// `avg' = (avg * (n - 1) + sample) / n`.
    pub fn record_response_time(&mut self, elapsed: Duration) {
        self.timed_requests += 1;
        let n = self.timed_requests as f64;
        let sample = elapsed.as_secs_f64() * 1000.0;
        self.avg_response_time_ms = (self.avg_response_time_ms * (n - 1.0) + sample) / n;
    }

    // == Record Evictions ==
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired_removals += count as u64;
    }

    pub fn record_warmup_success(&mut self) {
        self.warmup_successes += 1;
    }

    pub fn record_warmup_failure(&mut self) {
        self.warmup_failures += 1;
    }

    // == Update Entry Count ==
    pub fn set_current_size(&mut self, count: usize) {
        self.current_size = count;
    }

    /// Zeroes every counter but keeps the size reading.
    pub fn reset(&mut self) {
        *self = Self {
            current_size: self.current_size,
            ..Self::default()
        };
    }

    fn update_hit_rate(&mut self) {
        let total = self.hits + self.misses;
        self.hit_rate_percent = if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        };
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.current_size, 0);
        assert_eq!(stats.hit_rate_percent, 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate_percent, 100.0);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate_percent, 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate_percent, 25.0);
    }

    #[test]
    fn test_running_mean_latency() {
        let mut stats = CacheStats::new();
        stats.record_response_time(Duration::from_millis(2));
        stats.record_response_time(Duration::from_millis(4));
        stats.record_response_time(Duration::from_millis(9));
        assert!((stats.avg_response_time_ms - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_evictions_batch() {
        let mut stats = CacheStats::new();
        stats.record_evictions(3);
        stats.record_evictions(2);
        assert_eq!(stats.evictions, 5);
    }

    #[test]
    fn test_reset_keeps_size() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_warmup_failure();
        stats.record_response_time(Duration::from_millis(3));
        stats.set_current_size(42);

        stats.reset();

        assert_eq!(stats.hits, 0);
        assert_eq!(stats.warmup_failures, 0);
        assert_eq!(stats.avg_response_time_ms, 0.0);
        assert_eq!(stats.current_size, 42);
    }

    #[test]
    fn test_timed_requests_not_serialized() {
        let json = serde_json::to_value(CacheStats::new()).unwrap();
        assert!(json.get("timed_requests").is_none());
        assert!(json.get("hit_rate_percent").is_some());
    }
}
