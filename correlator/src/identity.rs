//! Decide whether two fingerprints could be the same physical device (§4.8).

use bt_types::haversine_km;

use crate::arena::CorrelatorFingerprint;
use crate::db::DbReader;
use crate::error::CorrelatorError;

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 15.0;
const FORWARD_WINDOW_SECS: i64 = 900;
const OVERLAP_DISTANCE_KM: f64 = 0.1;

/// `true` iff `old` could be an earlier sighting of the same device as `new`.
///
/// A missing antenna-location row is propagated as [`CorrelatorError::Lookup`];
/// per §7 the caller treats that one pair as non-same rather than aborting.
pub fn is_same(
    old: &CorrelatorFingerprint,
    new: &CorrelatorFingerprint,
    db: &DbReader,
    max_distance_km: f64,
) -> Result<bool, CorrelatorError> {
    if !(old.first_seen() <= new.first_seen()
        && new.first_seen() <= old.last_seen() + FORWARD_WINDOW_SECS)
    {
        return Ok(false);
    }
    if old.row.service_uuid != new.row.service_uuid {
        return Ok(false);
    }
    if old.row.company_id != new.row.company_id {
        return Ok(false);
    }

    let overlapping = old.last_seen() > new.first_seen();
    let (old_loc, new_loc, limit_km) = if overlapping {
        let t = new.first_seen();
        (
            db.get_antenna_location(old.row.antenna_id, t)?,
            db.get_antenna_location(new.row.antenna_id, t)?,
            OVERLAP_DISTANCE_KM,
        )
    } else {
        (
            db.get_antenna_location(old.row.antenna_id, old.last_seen())?,
            db.get_antenna_location(new.row.antenna_id, new.first_seen())?,
            max_distance_km,
        )
    };

    let distance = haversine_km(old_loc.0, old_loc.1, new_loc.0, new_loc.1);
    Ok(distance <= limit_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_types::FingerprintRow;
    use std::path::Path;

    fn row(
        id: i64,
        first_seen: i64,
        last_seen: i64,
        antenna_id: u32,
        service_uuid: u16,
        company_id: u16,
    ) -> CorrelatorFingerprint {
        CorrelatorFingerprint {
            row: FingerprintRow {
                id,
                mac: [0; 6],
                rssi: -60,
                std: 1.0,
                mean: -60.0,
                first_seen,
                last_seen,
                service_uuid,
                company_id,
                is_random: true,
                antenna_id,
            },
            successors: vec![],
            is_successor: false,
            antenna_hop: None,
            is_hopped: false,
        }
    }

    fn memory_db_with_antennas(locations: &[(u32, f64, f64, i64)]) -> DbReader {
        let reader = DbReader::open(Path::new(":memory:")).unwrap();
        for (antenna_id, lat, lng, ts) in locations {
            reader
                .raw_insert_metadata_for_test(*antenna_id, *lat, *lng, *ts)
                .unwrap();
        }
        reader
    }

    #[test]
    fn scenario_1_identical_signature_same_window_same_place() {
        let db = memory_db_with_antennas(&[
            (1, 50.4266708374024, 11.7100004196167, 1621775133),
            (2, 50.4266708374024, 11.7100004196167, 1621775133),
        ]);
        let a = row(1, 1621775133, 1621775386, 1, 42, 7);
        let b = row(2, 1621775133, 1621775386, 2, 42, 7);
        assert!(is_same(&a, &b, &db, DEFAULT_MAX_DISTANCE_KM).unwrap());
    }

    #[test]
    fn scenario_2_different_service_uuid_is_never_same() {
        let db = memory_db_with_antennas(&[
            (1, 50.4266708374024, 11.7100004196167, 1621775133),
            (2, 50.4266708374024, 11.7100004196167, 1621775133),
        ]);
        let a = row(1, 1621775133, 1621775386, 1, 42, 7);
        let b = row(2, 1621775133, 1621775386, 2, 69, 7);
        assert!(!is_same(&a, &b, &db, DEFAULT_MAX_DISTANCE_KM).unwrap());
    }

    #[test]
    fn scenario_3_gap_boundary_900_vs_901() {
        let db = memory_db_with_antennas(&[
            (1, 50.0, 11.0, 1621775386),
            (1, 50.0, 11.0, 1621776286),
            (2, 50.0, 11.0, 1621776286),
            (2, 50.0, 11.0, 1621776287),
        ]);
        let a = row(1, 1621775133, 1621775386, 1, 42, 7);
        let b_900 = row(2, 1621776286, 1621776286, 2, 42, 7);
        assert!(is_same(&a, &b_900, &db, DEFAULT_MAX_DISTANCE_KM).unwrap());

        let b_901 = row(3, 1621776287, 1621776287, 2, 42, 7);
        assert!(!is_same(&a, &b_901, &db, DEFAULT_MAX_DISTANCE_KM).unwrap());
    }

    #[test]
    fn scenario_4_overlap_distance_boundary() {
        let db_close = memory_db_with_antennas(&[
            (1, 50.0, 11.0, 1621775133),
            (2, 50.0, 11.0012, 1621775133),
        ]);
        let a = row(1, 1621775133, 1621775386, 1, 42, 7);
        let b = row(2, 1621775133, 1621775386, 2, 42, 7);
        assert!(is_same(&a, &b, &db_close, DEFAULT_MAX_DISTANCE_KM).unwrap());

        let db_far = memory_db_with_antennas(&[
            (1, 50.0, 11.0, 1621775133),
            (2, 50.0, 11.0016, 1621775133),
        ]);
        assert!(!is_same(&a, &b, &db_far, DEFAULT_MAX_DISTANCE_KM).unwrap());
    }

    #[test]
    fn missing_antenna_location_is_lookup_error() {
        let db = memory_db_with_antennas(&[]);
        let a = row(1, 100, 200, 1, 42, 7);
        let b = row(2, 150, 250, 2, 42, 7);
        let err = is_same(&a, &b, &db, DEFAULT_MAX_DISTANCE_KM).unwrap_err();
        assert!(matches!(err, CorrelatorError::Lookup { .. }));
    }
}
