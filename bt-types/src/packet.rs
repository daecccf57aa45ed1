//! Fixed-layout binary packet decoding for the three sniffer modes.
//!
//! Each mode's wire format is little-endian with no padding; see the per-mode
//! decode functions for the exact field order and record size.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A sniffer mode, one per supported capture tool / pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnifferMode {
    Btbr,
    Btle,
    BtleAdv,
}

impl SnifferMode {
    pub fn record_size(&self) -> usize {
        match self {
            SnifferMode::Btbr => 12,
            SnifferMode::Btle => 12,
            SnifferMode::BtleAdv => 20,
        }
    }

    /// Pipe filename under `pipes/`.
    pub fn pipe_name(&self) -> &'static str {
        match self {
            SnifferMode::Btbr => "btbr",
            SnifferMode::Btle => "btle",
            SnifferMode::BtleAdv => "btle-adv",
        }
    }
}

impl fmt::Display for SnifferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pipe_name())
    }
}

impl std::str::FromStr for SnifferMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "btbr" => Ok(SnifferMode::Btbr),
            "btle" => Ok(SnifferMode::Btle),
            "btle-adv" => Ok(SnifferMode::BtleAdv),
            other => Err(format!("unknown sniffer mode: {other}")),
        }
    }
}

/// A decode failure: short read or a field outside its documented domain.
#[derive(Debug, thiserror::Error)]
pub enum MalformedRecord {
    #[error("short record for {mode}: expected {expected} bytes, got {got}")]
    ShortRead {
        mode: SnifferMode,
        expected: usize,
        got: usize,
    },
    #[error("is_random field out of domain {{0,1}}: {0}")]
    InvalidIsRandom(u8),
}

/// `u16 flags`, `u8 uap`, `u32 lap`, `u32 timestamp` — 12 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BtbrPacket {
    pub flags: u16,
    pub uap: u8,
    pub lap: u32,
    pub timestamp: u32,
}

impl BtbrPacket {
    /// Bit 0 of `flags` gates whether `uap` is considered populated on this packet.
    pub fn uap_present(&self) -> bool {
        self.flags & 0x0001 != 0
    }

    pub fn decode(buf: &[u8]) -> Result<Self, MalformedRecord> {
        let expected = SnifferMode::Btbr.record_size();
        if buf.len() != expected {
            return Err(MalformedRecord::ShortRead {
                mode: SnifferMode::Btbr,
                expected,
                got: buf.len(),
            });
        }
        Ok(Self {
            flags: u16::from_le_bytes([buf[0], buf[1]]),
            uap: buf[2],
            lap: u32::from_le_bytes([buf[3], buf[4], buf[5], buf[6]]),
            timestamp: u32::from_le_bytes([buf[7], buf[8], buf[9], buf[10]]),
            // buf[11] is the structure-padding byte implicit in the 12-byte layout.
        })
    }
}

/// `u32 access_address`, `u32 timestamp`, `i32 rssi` — 12 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BtlePacket {
    pub access_address: u32,
    pub timestamp: u32,
    pub rssi: i32,
}

impl BtlePacket {
    pub fn decode(buf: &[u8]) -> Result<Self, MalformedRecord> {
        let expected = SnifferMode::Btle.record_size();
        if buf.len() != expected {
            return Err(MalformedRecord::ShortRead {
                mode: SnifferMode::Btle,
                expected,
                got: buf.len(),
            });
        }
        Ok(Self {
            access_address: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            timestamp: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            rssi: i32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }
}

/// `u8 type`, `u8 is_random`, `6B mac` (LE), `u32 timestamp`, `i32 rssi`,
/// `u16 service_uuid`, `u16 company_id` — 20 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtleAdvPacket {
    pub adv_type: u8,
    pub is_random: bool,
    pub mac: [u8; 6],
    pub timestamp: u32,
    pub rssi: i32,
    pub service_uuid: u16,
    pub company_id: u16,
}

impl BtleAdvPacket {
    pub fn decode(buf: &[u8]) -> Result<Self, MalformedRecord> {
        let expected = SnifferMode::BtleAdv.record_size();
        if buf.len() != expected {
            return Err(MalformedRecord::ShortRead {
                mode: SnifferMode::BtleAdv,
                expected,
                got: buf.len(),
            });
        }
        let is_random_raw = buf[1];
        if is_random_raw > 1 {
            return Err(MalformedRecord::InvalidIsRandom(is_random_raw));
        }
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&buf[2..8]);
        Ok(Self {
            adv_type: buf[0],
            is_random: is_random_raw == 1,
            mac,
            timestamp: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            rssi: i32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
            service_uuid: u16::from_le_bytes([buf[16], buf[17]]),
            company_id: u16::from_le_bytes([buf[18], buf[19]]),
        })
    }
}

/// Decoded packet, one of the three sniffer modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Packet {
    Btbr(BtbrPacket),
    Btle(BtlePacket),
    BtleAdv(BtleAdvPacket),
}

pub fn decode(mode: SnifferMode, buf: &[u8]) -> Result<Packet, MalformedRecord> {
    match mode {
        SnifferMode::Btbr => BtbrPacket::decode(buf).map(Packet::Btbr),
        SnifferMode::Btle => BtlePacket::decode(buf).map(Packet::Btle),
        SnifferMode::BtleAdv => BtleAdvPacket::decode(buf).map(Packet::BtleAdv),
    }
}
