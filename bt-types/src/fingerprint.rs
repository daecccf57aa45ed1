//! The fingerprint sum type: one continuous observation of a device on one
//! antenna, aggregated from a stream of decoded packets.
//!
//! The three sniffer modes share only timestamp bookkeeping; everything
//! mode-specific lives in its own variant struct and `ingest` dispatches on
//! the tag rather than going through a trait object.

use serde::{Deserialize, Serialize};

use crate::packet::{BtbrPacket, BtleAdvPacket, BtlePacket};
use crate::stats::StreamingStats;

/// Key used to locate a fingerprint's slot in a per-mode store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerprintKey {
    Lap(u32),
    AccessAddress(u32),
    Mac([u8; 6]),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BtbrFingerprint {
    pub first_seen: i64,
    pub last_seen: i64,
    pub antenna_id: u32,
    pub lap: u32,
    pub uap: Option<u8>,
    pub nap: Option<u16>,
}

impl BtbrFingerprint {
    fn new(antenna_id: u32, packet: &BtbrPacket) -> Self {
        let mut fp = Self {
            first_seen: packet.timestamp as i64,
            last_seen: packet.timestamp as i64,
            antenna_id,
            lap: packet.lap,
            uap: None,
            nap: None,
        };
        fp.update(packet);
        fp
    }

    /// Apply one more packet for this LAP. `uap` is populated the first time
    /// a packet arrives with its flag bit set, and never cleared afterward.
    fn update(&mut self, packet: &BtbrPacket) {
        self.last_seen = self.last_seen.max(packet.timestamp as i64);
        if self.uap.is_none() && packet.uap_present() {
            self.uap = Some(packet.uap);
        }
    }

    /// Reportable once it has been observed continuously for longer than `seen_for`.
    pub fn is_reportable(&self, seen_for: i64) -> bool {
        self.last_seen - self.first_seen > seen_for
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BtleFingerprint {
    pub first_seen: i64,
    pub last_seen: i64,
    pub antenna_id: u32,
    pub access_address: u32,
    pub times_seen: u64,
    pub rssi: StreamingStats,
}

impl BtleFingerprint {
    fn new(antenna_id: u32, packet: &BtlePacket) -> Self {
        let mut fp = Self {
            first_seen: packet.timestamp as i64,
            last_seen: packet.timestamp as i64,
            antenna_id,
            access_address: packet.access_address,
            times_seen: 0,
            rssi: StreamingStats::new(),
        };
        fp.update(packet);
        fp
    }

    fn update(&mut self, packet: &BtlePacket) {
        self.last_seen = self.last_seen.max(packet.timestamp as i64);
        self.times_seen += 1;
        self.rssi.update(packet.rssi as f64);
    }

    pub fn is_reportable(&self, seen_threshold: u64) -> bool {
        self.times_seen >= seen_threshold
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BtleAdvFingerprint {
    pub first_seen: i64,
    pub last_seen: i64,
    pub antenna_id: u32,
    pub mac: [u8; 6],
    pub is_random: bool,
    pub service_uuid: u16,
    pub company_id: u16,
    pub rssi: StreamingStats,
}

impl BtleAdvFingerprint {
    fn new(antenna_id: u32, packet: &BtleAdvPacket) -> Self {
        let mut fp = Self {
            first_seen: packet.timestamp as i64,
            last_seen: packet.timestamp as i64,
            antenna_id,
            mac: packet.mac,
            is_random: packet.is_random,
            service_uuid: packet.service_uuid,
            company_id: packet.company_id,
            rssi: StreamingStats::new(),
        };
        fp.update(packet);
        fp
    }

    fn update(&mut self, packet: &BtleAdvPacket) {
        self.last_seen = self.last_seen.max(packet.timestamp as i64);
        self.rssi.update(packet.rssi as f64);
    }

    pub fn is_reportable(&self, seen_for: i64) -> bool {
        self.last_seen - self.first_seen > seen_for
    }
}

/// Tagged fingerprint variant, with a common `(first_seen, last_seen, antenna_id)` header
/// reachable without matching on the tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Fingerprint {
    Btbr(BtbrFingerprint),
    Btle(BtleFingerprint),
    BtleAdv(BtleAdvFingerprint),
}

impl Fingerprint {
    pub fn first_seen(&self) -> i64 {
        match self {
            Fingerprint::Btbr(f) => f.first_seen,
            Fingerprint::Btle(f) => f.first_seen,
            Fingerprint::BtleAdv(f) => f.first_seen,
        }
    }

    pub fn last_seen(&self) -> i64 {
        match self {
            Fingerprint::Btbr(f) => f.last_seen,
            Fingerprint::Btle(f) => f.last_seen,
            Fingerprint::BtleAdv(f) => f.last_seen,
        }
    }

    pub fn antenna_id(&self) -> u32 {
        match self {
            Fingerprint::Btbr(f) => f.antenna_id,
            Fingerprint::Btle(f) => f.antenna_id,
            Fingerprint::BtleAdv(f) => f.antenna_id,
        }
    }

    /// Create (for a new key) or update (for an existing key) the fingerprint
    /// for a BTBR packet. Returns `true` if this call created the fingerprint.
    pub fn ingest_btbr(slot: &mut Option<Fingerprint>, antenna_id: u32, packet: &BtbrPacket) -> bool {
        match slot {
            None => {
                *slot = Some(Fingerprint::Btbr(BtbrFingerprint::new(antenna_id, packet)));
                true
            }
            Some(Fingerprint::Btbr(fp)) => {
                fp.update(packet);
                false
            }
            Some(_) => unreachable!("BTBR key collided with a different variant"),
        }
    }

    pub fn ingest_btle(slot: &mut Option<Fingerprint>, antenna_id: u32, packet: &BtlePacket) -> bool {
        match slot {
            None => {
                *slot = Some(Fingerprint::Btle(BtleFingerprint::new(antenna_id, packet)));
                true
            }
            Some(Fingerprint::Btle(fp)) => {
                fp.update(packet);
                false
            }
            Some(_) => unreachable!("BTLE key collided with a different variant"),
        }
    }

    pub fn ingest_btle_adv(
        slot: &mut Option<Fingerprint>,
        antenna_id: u32,
        packet: &BtleAdvPacket,
    ) -> bool {
        match slot {
            None => {
                *slot = Some(Fingerprint::BtleAdv(BtleAdvFingerprint::new(antenna_id, packet)));
                true
            }
            Some(Fingerprint::BtleAdv(fp)) => {
                fp.update(packet);
                false
            }
            Some(_) => unreachable!("BTLE-Adv key collided with a different variant"),
        }
    }
}
