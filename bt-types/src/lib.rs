//! Shared data model for the Bluetooth telemetry agent and correlator.
//!
//! This crate holds the pieces both binaries agree on: fingerprint shapes,
//! the streaming RSSI estimator, the wire packet codec, geodesy, and the
//! persisted row shapes the correlator reads back out of the database.

pub mod fingerprint;
pub mod geodesy;
pub mod packet;
pub mod persist;
pub mod stats;

pub use fingerprint::{BtbrFingerprint, BtleAdvFingerprint, BtleFingerprint, Fingerprint, FingerprintKey};
pub use geodesy::haversine_km;
pub use packet::{decode, BtbrPacket, BtleAdvPacket, BtlePacket, MalformedRecord, Packet, SnifferMode};
pub use persist::{format_mac_reversed, AntennaMetadataRow, FingerprintRow};
pub use stats::StreamingStats;
