//! Eviction Policy
//!
//! Orders entries for removal when the store reaches capacity.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::entry::StoredEntry;
use crate::cache::expiry;

/// Share of `max_size` kept after an eviction pass (numerator / 5).
const RETAINED_FIFTHS: usize = 4;

// == Eviction Strategy ==
/// Victim selection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Least recently accessed first
    Lru,
    /// Expired first, then least remaining TTL
    Ttl,
    /// Lowest `priority weight * access count` first
    #[default]
    Hybrid,
}

impl EvictionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Ttl => "ttl",
            EvictionStrategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionStrategy::Lru),
            "ttl" => Ok(EvictionStrategy::Ttl),
            "hybrid" => Ok(EvictionStrategy::Hybrid),
            other => Err(format!("unknown eviction strategy '{}'", other)),
        }
    }
}

// == Target Size ==
/// Size an eviction pass shrinks the store to: `floor(max_size * 0.8)`.
pub(crate) fn target_size(max_size: usize) -> usize {
    max_size / 5 * RETAINED_FIFTHS + (max_size % 5) * RETAINED_FIFTHS / 5
}

// == Eviction Order ==
/// Returns every key, first victim first.
///
/// Ties fall back to the logical touch clock so ordering is deterministic
/// regardless of map iteration order.
pub(crate) fn eviction_order<T>(
    entries: &HashMap<String, StoredEntry<T>>,
    strategy: EvictionStrategy,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut candidates: Vec<(&String, &StoredEntry<T>)> = entries.iter().collect();

    match strategy {
        EvictionStrategy::Lru => {
            candidates.sort_by_key(|(_, e)| (e.last_accessed, e.touched));
        }
        EvictionStrategy::Ttl => {
            candidates.sort_by_key(|(_, e)| {
                (
                    Reverse(expiry::is_expired(*e, now)),
                    expiry::remaining_ms(*e, now),
                    e.touched,
                )
            });
        }
        EvictionStrategy::Hybrid => {
            candidates.sort_by_key(|(_, e)| (retention_score(*e), e.touched));
        }
    }

    candidates.into_iter().map(|(k, _)| k.clone()).collect()
}

/// Hybrid retention score; higher survives longer.
pub(crate) fn retention_score<T>(entry: &StoredEntry<T>) -> u64 {
    entry.priority.weight().saturating_mul(entry.access_count)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::{Priority, StoredValue};
    use chrono::Duration;
    use std::collections::HashSet;

    fn insert(
        map: &mut HashMap<String, StoredEntry<u8>>,
        key: &str,
        ttl: u64,
        created_at: DateTime<Utc>,
        priority: Priority,
        access_count: u64,
        touched: u64,
    ) {
        let mut entry = StoredEntry::new(
            StoredValue::Plain(0),
            ttl,
            HashSet::new(),
            priority,
            created_at,
            touched,
        );
        entry.access_count = access_count;
        map.insert(key.to_string(), entry);
    }

    #[test]
    fn test_target_size_is_floor_of_eighty_percent() {
        assert_eq!(target_size(1), 0);
        assert_eq!(target_size(2), 1);
        assert_eq!(target_size(5), 4);
        assert_eq!(target_size(7), 5);
        assert_eq!(target_size(10), 8);
        assert_eq!(target_size(1000), 800);
        assert_eq!(target_size(1001), 800);
    }

    #[test]
    fn test_strategy_parse_and_display() {
        assert_eq!("LRU".parse::<EvictionStrategy>(), Ok(EvictionStrategy::Lru));
        assert_eq!(" ttl ".parse::<EvictionStrategy>(), Ok(EvictionStrategy::Ttl));
        assert_eq!(EvictionStrategy::Hybrid.to_string(), "hybrid");
        assert!("random".parse::<EvictionStrategy>().is_err());
        assert_eq!(EvictionStrategy::default(), EvictionStrategy::Hybrid);
    }

    #[test]
    fn test_lru_orders_by_last_access() {
        let now = Utc::now();
        let mut map = HashMap::new();
        insert(&mut map, "new", 60, now, Priority::Low, 0, 3);
        insert(&mut map, "old", 60, now - Duration::seconds(10), Priority::High, 9, 1);
        insert(&mut map, "mid", 60, now - Duration::seconds(5), Priority::Low, 0, 2);

        let order = eviction_order(&map, EvictionStrategy::Lru, now);
        assert_eq!(order, vec!["old", "mid", "new"]);
    }

    #[test]
    fn test_lru_tie_broken_by_touch_clock() {
        let now = Utc::now();
        let mut map = HashMap::new();
        insert(&mut map, "second", 60, now, Priority::Medium, 0, 2);
        insert(&mut map, "first", 60, now, Priority::Medium, 0, 1);

        let order = eviction_order(&map, EvictionStrategy::Lru, now);
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn test_ttl_puts_expired_first_then_shortest_remaining() {
        let now = Utc::now();
        let mut map = HashMap::new();
        insert(&mut map, "long", 600, now, Priority::Low, 0, 1);
        insert(&mut map, "short", 30, now, Priority::Low, 0, 2);
        insert(&mut map, "expired", 1, now - Duration::seconds(10), Priority::High, 50, 3);

        let order = eviction_order(&map, EvictionStrategy::Ttl, now);
        assert_eq!(order, vec!["expired", "short", "long"]);
    }

    #[test]
    fn test_hybrid_scores_priority_times_access() {
        let now = Utc::now();
        let mut map = HashMap::new();
        // scores: hot_low = 1*5 = 5, warm_high = 3*1 = 3, cold_high = 0
        insert(&mut map, "hot_low", 60, now, Priority::Low, 5, 1);
        insert(&mut map, "warm_high", 60, now, Priority::High, 1, 2);
        insert(&mut map, "cold_high", 60, now, Priority::High, 0, 3);

        let order = eviction_order(&map, EvictionStrategy::Hybrid, now);
        assert_eq!(order, vec!["cold_high", "warm_high", "hot_low"]);
    }

    #[test]
    fn test_hybrid_same_priority_lower_access_first() {
        let now = Utc::now();
        let mut map = HashMap::new();
        insert(&mut map, "busy", 60, now, Priority::Medium, 4, 1);
        insert(&mut map, "idle", 60, now, Priority::Medium, 1, 2);

        let order = eviction_order(&map, EvictionStrategy::Hybrid, now);
        assert_eq!(order[0], "idle");
    }
}
