//! Row shapes shared between the agent's HTTP reports and the correlator's
//! database reads. These mirror the `MacAddresses`/`Metadata` tables in
//! SPEC_FULL.md §3.1 and are deliberately plain data — no behavior lives here
//! beyond simple field access.

use serde::{Deserialize, Serialize};

/// One row of the `Metadata` table: an antenna's location at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntennaMetadataRow {
    pub antenna_id: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
}

/// One row of the `MacAddresses` table: a persisted BTLE-Adv fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintRow {
    pub id: i64,
    pub mac: [u8; 6],
    pub rssi: i32,
    pub std: f64,
    pub mean: f64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub service_uuid: u16,
    pub company_id: u16,
    pub is_random: bool,
    pub antenna_id: u32,
}

/// Format a MAC as the colon-separated, byte-reversed string used by `/api/MacAddr`
/// and by this codebase's human-facing chain printer.
pub fn format_mac_reversed(mac: &[u8; 6]) -> String {
    mac.iter()
        .rev()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
