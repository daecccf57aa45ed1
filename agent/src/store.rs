//! Keyed table of in-progress fingerprints for one sniffer, guarded by a
//! single mutex held only during `ingest` or `snapshot_and_prune` (§4.2).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use bt_types::{Fingerprint, FingerprintKey, Packet, SnifferMode};

use crate::config::StoreTunables;
use crate::error::AgentError;

struct Inner {
    entries: HashMap<FingerprintKey, Fingerprint>,
    previous_cutoff: i64,
}

pub struct FingerprintStore {
    mode: SnifferMode,
    tunables: StoreTunables,
    inner: Mutex<Inner>,
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

impl FingerprintStore {
    pub fn new(mode: SnifferMode, tunables: StoreTunables) -> Self {
        Self {
            mode,
            tunables,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                previous_cutoff: 0,
            }),
        }
    }

    /// Locate or create the fingerprint for `packet`'s key and apply its
    /// variant-specific update rule.
    pub fn ingest(&self, antenna_id: u32, packet: &Packet) -> Result<(), AgentError> {
        let mut guard = self.inner.lock().expect("fingerprint store mutex poisoned");
        let key = match packet {
            Packet::Btbr(p) if self.mode == SnifferMode::Btbr => FingerprintKey::Lap(p.lap),
            Packet::Btle(p) if self.mode == SnifferMode::Btle => {
                FingerprintKey::AccessAddress(p.access_address)
            }
            Packet::BtleAdv(p) if self.mode == SnifferMode::BtleAdv => FingerprintKey::Mac(p.mac),
            _ => {
                return Err(AgentError::Invariant(format!(
                    "packet variant does not match store mode {}",
                    self.mode
                )))
            }
        };

        // Pull the slot out, mutate it through the shared sum-type dispatch,
        // then put it back — sidesteps holding a live `Entry` across the
        // variant-specific `ingest_*` call.
        let mut slot = guard.entries.remove(&key);
        match packet {
            Packet::Btbr(p) => {
                Fingerprint::ingest_btbr(&mut slot, antenna_id, p);
            }
            Packet::Btle(p) => {
                Fingerprint::ingest_btle(&mut slot, antenna_id, p);
            }
            Packet::BtleAdv(p) => {
                Fingerprint::ingest_btle_adv(&mut slot, antenna_id, p);
            }
        }
        guard.entries.insert(key, slot.expect("ingest_* always populates the slot"));
        Ok(())
    }

    /// Atomically compute `now`, prune stale entries, and return the
    /// reportable subset.
    pub fn snapshot_and_prune(&self) -> Vec<Fingerprint> {
        let now = now_epoch();
        let mut guard = self.inner.lock().expect("fingerprint store mutex poisoned");
        let previous_cutoff = guard.previous_cutoff;

        guard
            .entries
            .retain(|_, fp| fp.last_seen() >= previous_cutoff);

        let reportable: Vec<Fingerprint> = guard
            .entries
            .values()
            .filter(|fp| self.is_reportable(fp))
            .cloned()
            .collect();

        guard.previous_cutoff = now;
        reportable
    }

    fn is_reportable(&self, fp: &Fingerprint) -> bool {
        match fp {
            Fingerprint::Btbr(f) => f.is_reportable(self.tunables.seen_for),
            Fingerprint::Btle(f) => f.is_reportable(self.tunables.seen_threshold),
            Fingerprint::BtleAdv(f) => f.is_reportable(self.tunables.seen_for),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_types::BtleAdvPacket;

    fn adv_packet(mac: [u8; 6], ts: u32) -> Packet {
        Packet::BtleAdv(BtleAdvPacket {
            adv_type: 0,
            is_random: true,
            mac,
            timestamp: ts,
            rssi: -55,
            service_uuid: 42,
            company_id: 7,
        })
    }

    #[test]
    fn ingest_creates_then_updates_one_fingerprint_per_mac() {
        let store = FingerprintStore::new(SnifferMode::BtleAdv, StoreTunables {
            seen_for: 0,
            seen_threshold: 1,
        });
        let mac = [1, 2, 3, 4, 5, 6];
        store.ingest(1, &adv_packet(mac, 100)).unwrap();
        store.ingest(1, &adv_packet(mac, 200)).unwrap();

        let snapshot = store.snapshot_and_prune();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].first_seen(), 100);
        assert_eq!(snapshot[0].last_seen(), 200);
    }

    #[test]
    fn mismatched_packet_variant_is_invariant_error() {
        let store = FingerprintStore::new(SnifferMode::Btle, StoreTunables::default());
        let err = store.ingest(1, &adv_packet([0; 6], 1)).unwrap_err();
        assert!(matches!(err, AgentError::Invariant(_)));
    }

    #[test]
    fn snapshot_prunes_entries_older_than_previous_cutoff() {
        let store = FingerprintStore::new(SnifferMode::BtleAdv, StoreTunables {
            seen_for: 0,
            seen_threshold: 1,
        });
        let mac_a = [1; 6];
        store.ingest(1, &adv_packet(mac_a, 1)).unwrap();
        let first = store.snapshot_and_prune();
        assert_eq!(first.len(), 1);

        // No further updates to mac_a: its last_seen (1) is older than "now" at
        // the time of the second snapshot, so it is evicted and the next
        // snapshot comes back empty.
        let second = store.snapshot_and_prune();
        assert!(second.is_empty());
    }
}
