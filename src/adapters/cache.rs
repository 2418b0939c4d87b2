use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::adapters::store::{KvStore, StoreError};
use crate::entitlement::clock::Clock;
use crate::types::BannerKind;
use crate::utils::constants::DISMISSALS_STORE_KEY;

/// Kinds whose dismissals a fresh limit hit overrides.
pub const LIMIT_HIT_RESET_KINDS: [BannerKind; 2] = [BannerKind::LimitReached, BannerKind::TrialEnding];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissalRecord {
    pub dismissed_at: DateTime<Utc>,
}

type DismissalMap = BTreeMap<String, DismissalRecord>;

/// TTL-bound banner dismissals kept in one blob of the local cache.
///
/// Every operation is a single read-modify-write under `lock`. An unreadable
/// blob counts as "nothing dismissed": banners reappear rather than vanish.
pub struct DismissalCache {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    lock: Mutex<()>,
}

impl DismissalCache {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            lock: Mutex::new(()),
        }
    }

    pub fn is_dismissed(&self, kind: BannerKind) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();
        self.read()
            .get(kind.as_str())
            .is_some_and(|record| self.is_live(record, now))
    }

    pub fn dismiss(&self, kind: BannerKind) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();
        let mut records = self.read();
        records.retain(|_, record| self.is_live(record, now));
        records.insert(
            kind.as_str().to_string(),
            DismissalRecord { dismissed_at: now },
        );
        self.write(&records)?;
        info!(banner = %kind, "Banner dismissed");
        Ok(())
    }

    /// Drops LimitReached and TrialEnding dismissals; other kinds stay.
    pub fn reset_for_limit_hit(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.read();
        let before = records.len();
        for kind in LIMIT_HIT_RESET_KINDS {
            records.remove(kind.as_str());
        }
        if records.len() != before {
            self.write(&records)?;
            info!(cleared = before - records.len(), "Dismissals reset after limit hit");
        }
        Ok(())
    }

    /// Live dismissals with the time each one lapses.
    pub fn active_dismissals(&self) -> Vec<(String, DateTime<Utc>)> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();
        self.read()
            .into_iter()
            .filter(|(_, record)| self.is_live(record, now))
            .map(|(kind, record)| (kind, record.dismissed_at + self.ttl))
            .collect()
    }

    fn is_live(&self, record: &DismissalRecord, now: DateTime<Utc>) -> bool {
        now - record.dismissed_at < self.ttl
    }

    fn read(&self) -> DismissalMap {
        let raw = match self.store.get(DISMISSALS_STORE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return DismissalMap::new(),
            Err(e) => {
                warn!(error = %e, "Dismissal store unreadable, treating as empty");
                return DismissalMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Dismissal blob corrupted, treating as empty");
                DismissalMap::new()
            }
        }
    }

    fn write(&self, records: &DismissalMap) -> Result<(), StoreError> {
        if records.is_empty() {
            return self.store.remove(DISMISSALS_STORE_KEY);
        }
        let json = serde_json::to_string(records)
            .map_err(|e| StoreError::Unavailable(format!("serialize dismissals: {}", e)))?;
        self.store.set(DISMISSALS_STORE_KEY, &json)
    }
}
