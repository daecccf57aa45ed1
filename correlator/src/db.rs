//! Read-only access to the correlator's input database (§3.1, §4.15).
//!
//! Modeled as an explicitly constructed service object rather than a
//! process-wide singleton (§9): callers own a `DbReader` and pass it where
//! needed.

use std::path::Path;

use rusqlite::Connection;

use bt_types::FingerprintRow;

use crate::error::CorrelatorError;

pub struct DbReader {
    conn: Connection,
}

impl DbReader {
    pub fn open(path: &Path) -> Result<Self, CorrelatorError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Most recent `Metadata` row for `antenna_id` with `Timestamp <= at`.
    pub fn get_antenna_location(
        &self,
        antenna_id: u32,
        at: i64,
    ) -> Result<(f64, f64), CorrelatorError> {
        self.conn
            .query_row(
                "SELECT Latitude, Longitude FROM Metadata \
                 WHERE AntennaId = ?1 AND Timestamp <= ?2 \
                 ORDER BY Timestamp DESC LIMIT 1",
                rusqlite::params![antenna_id, at],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CorrelatorError::Lookup {
                    antenna_id,
                    timestamp: at,
                },
                other => CorrelatorError::Database(other),
            })
    }

    /// All `MacAddresses` rows for one MAC, time-ordered by `FirstSeen`.
    pub fn get_mac_rows(&self, mac: &str) -> Result<Vec<FingerprintRow>, CorrelatorError> {
        let mut stmt = self.conn.prepare(
            "SELECT Id, MacAddress, Rssi, Std, Mean, FirstSeen, LastSeen, \
                    ServiceUUID, CompanyId, Random, AntennaId \
             FROM MacAddresses WHERE MacAddress = ?1 ORDER BY FirstSeen ASC",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![mac], row_to_fingerprint)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// All `MacAddresses` rows, time-ordered — the correlator's batch input.
    pub fn get_all_rows(&self) -> Result<Vec<FingerprintRow>, CorrelatorError> {
        let mut stmt = self.conn.prepare(
            "SELECT Id, MacAddress, Rssi, Std, Mean, FirstSeen, LastSeen, \
                    ServiceUUID, CompanyId, Random, AntennaId \
             FROM MacAddresses ORDER BY FirstSeen ASC",
        )?;
        let rows = stmt
            .query_map([], row_to_fingerprint)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Distinct MAC addresses present in the database — drives the CLI's
    /// `-a/--all` whole-database mode (supplemented from the original
    /// implementation's `get_all_macs`, dropped from the distilled spec).
    pub fn get_all_macs(&self) -> Result<Vec<String>, CorrelatorError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT MacAddress FROM MacAddresses ORDER BY MacAddress")?;
        let macs = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(macs)
    }
}

fn row_to_fingerprint(row: &rusqlite::Row) -> rusqlite::Result<FingerprintRow> {
    let mac_str: String = row.get(1)?;
    let mac = parse_mac(&mac_str).unwrap_or([0; 6]);
    let is_random: i64 = row.get(9)?;
    Ok(FingerprintRow {
        id: row.get(0)?,
        mac,
        rssi: row.get(2)?,
        std: row.get(3)?,
        mean: row.get(4)?,
        first_seen: row.get(5)?,
        last_seen: row.get(6)?,
        service_uuid: row.get(7)?,
        company_id: row.get(8)?,
        is_random: is_random != 0,
        antenna_id: row.get(10)?,
    })
}

#[cfg(test)]
impl DbReader {
    pub fn raw_insert_metadata_for_test(
        &self,
        antenna_id: u32,
        lat: f64,
        lng: f64,
        ts: i64,
    ) -> Result<(), CorrelatorError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS Metadata (AntennaMetadataId INTEGER PRIMARY KEY, \
             Longitude REAL, Latitude REAL, Timestamp INTEGER, AntennaId INTEGER)",
        )?;
        self.conn.execute(
            "INSERT INTO Metadata (Longitude, Latitude, Timestamp, AntennaId) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![lng, lat, ts, antenna_id],
        )?;
        Ok(())
    }
}

fn parse_mac(s: &str) -> Option<[u8; 6]> {
    let mut out = [0u8; 6];
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        return None;
    }
    for (i, part) in parts.iter().enumerate() {
        out[i] = u8::from_str_radix(part, 16).ok()?;
    }
    Some(out)
}
