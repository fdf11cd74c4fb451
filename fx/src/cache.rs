//! Rate-table caching with TTL support.

use chrono::Duration;
use dashmap::DashMap;
use tracing::debug;

use cambio_common::{expires_in, now, Currency, RateTable, Timestamp};

/// Cached rate-table entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    table: RateTable,
    expires_at: Timestamp,
}

impl CacheEntry {
    fn new(table: RateTable, ttl: Duration) -> Self {
        Self {
            table,
            expires_at: expires_in(ttl),
        }
    }

    fn is_fresh(&self) -> bool {
        now() < self.expires_at
    }
}

/// Thread-safe rate-table cache keyed by base currency.
///
/// Expired entries are retained, not evicted: past expiry they back the
/// stale-cache fallback tier through [`RateCache::any`] and are only ever
/// superseded by a newer insert.
pub struct RateCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl RateCache {
    /// Create a cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Get the cached table for a base currency if it has not expired.
    pub fn fresh(&self, base: &Currency) -> Option<RateTable> {
        let entry = self.entries.get(base.code())?;
        if entry.is_fresh() {
            debug!(base = %base, "rate cache hit");
            Some(entry.table.clone())
        } else {
            debug!(base = %base, "rate cache entry expired");
            None
        }
    }

    /// Get the cached table regardless of expiry (degraded read).
    pub fn any(&self, base: &Currency) -> Option<RateTable> {
        self.entries.get(base.code()).map(|entry| entry.table.clone())
    }

    /// Insert or replace the entry for the table's base currency.
    pub fn insert(&self, table: RateTable) {
        let key = table.base().code().to_string();
        self.entries.insert(key, CacheEntry::new(table, self.ttl));
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn make_table(usd: rust_decimal::Decimal) -> RateTable {
        RateTable::new(Currency::eur(), HashMap::from([(Currency::usd(), usd)]))
    }

    #[test]
    fn test_insert_and_fresh() {
        let cache = RateCache::new(Duration::seconds(60));
        cache.insert(make_table(dec!(1.18)));

        let table = cache.fresh(&Currency::eur()).unwrap();
        assert_eq!(table.rate(&Currency::usd()), Some(dec!(1.18)));
    }

    #[test]
    fn test_miss() {
        let cache = RateCache::new(Duration::seconds(60));
        assert!(cache.fresh(&Currency::eur()).is_none());
        assert!(cache.any(&Currency::eur()).is_none());
    }

    #[test]
    fn test_expired_entry_remains_readable() {
        // Zero TTL: the entry is stale the moment it lands.
        let cache = RateCache::new(Duration::zero());
        cache.insert(make_table(dec!(1.18)));

        assert!(cache.fresh(&Currency::eur()).is_none());

        let stale = cache.any(&Currency::eur()).unwrap();
        assert_eq!(stale.rate(&Currency::usd()), Some(dec!(1.18)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_replaces_wholesale() {
        let cache = RateCache::new(Duration::seconds(60));
        cache.insert(make_table(dec!(1.18)));
        cache.insert(make_table(dec!(1.21)));

        assert_eq!(cache.len(), 1);
        let table = cache.fresh(&Currency::eur()).unwrap();
        assert_eq!(table.rate(&Currency::usd()), Some(dec!(1.21)));
    }
}
