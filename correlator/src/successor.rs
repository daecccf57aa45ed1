//! Link fingerprints across antennas into same-device successor chains (§4.13).

use tracing::warn;

use crate::arena::{Arena, FpId};
use crate::db::DbReader;
use crate::error::CorrelatorError;

pub const DEFAULT_DELTA_MAX_SECS: i64 = 5;
pub const DEFAULT_CANDIDATES_LIMIT: usize = 5;
pub const DEFAULT_MAX_CANDIDATES: usize = 2;
const SUCCESSOR_DISTANCE_KM: f64 = 10.0;

pub struct SuccessorTunables {
    pub delta_max_secs: i64,
    pub candidates_limit: usize,
    pub max_candidates: usize,
}

impl Default for SuccessorTunables {
    fn default() -> Self {
        Self {
            delta_max_secs: DEFAULT_DELTA_MAX_SECS,
            candidates_limit: DEFAULT_CANDIDATES_LIMIT,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// `a` sorts before `b` once `a` could plausibly precede `b` in time. Not a
/// strict weak ordering (it isn't transitive across a whole set), so it is
/// used only to bisect a single `first_seen`-sorted slice, never to fully
/// sort one (§9).
fn earlier_than(a: &crate::arena::CorrelatorFingerprint, b: &crate::arena::CorrelatorFingerprint) -> bool {
    a.first_seen() < b.last_seen()
}

/// A throwaway fingerprint whose only meaningful field is `last_seen`, used
/// to reuse `earlier_than` as the bisection predicate for a window boundary.
fn synthetic_boundary(last_seen: i64) -> crate::arena::CorrelatorFingerprint {
    crate::arena::CorrelatorFingerprint {
        row: bt_types::FingerprintRow {
            id: 0,
            mac: [0; 6],
            rssi: 0,
            std: 0.0,
            mean: 0.0,
            first_seen: last_seen,
            last_seen,
            service_uuid: 0,
            company_id: 0,
            is_random: false,
            antenna_id: 0,
        },
        successors: Vec::new(),
        is_successor: false,
        antenna_hop: None,
        is_hopped: false,
    }
}

/// For every fingerprint in `ids` (assumed already ordered by `first_seen`),
/// find the near-simultaneous sightings on other antennas that could be the
/// same device continuing its journey, and record them as successors.
///
/// A candidate set larger than `candidates_limit` is treated as too
/// ambiguous to resolve and is skipped entirely, rather than guessing.
pub fn link_successors(
    arena: &mut Arena,
    ids: &[FpId],
    db: &DbReader,
    tunables: &SuccessorTunables,
) {
    let mut sorted = ids.to_vec();
    sorted.sort_by_key(|&id| arena.get(id).first_seen());

    for i in 0..sorted.len() {
        let current_id = sorted[i];
        if !arena.get(current_id).row.is_random {
            continue;
        }
        let window_start = arena.get(current_id).last_seen();
        // Strict per §4.13: candidate.first_seen - current.last_seen < delta_max.
        let window_end = window_start + tunables.delta_max_secs;

        // Bisect the first_seen-sorted slice for the window's lower bound.
        // `earlier_than` is not a strict weak order over the whole slice,
        // but restricted to this one sweep it correctly finds where
        // `first_seen >= window_start` begins.
        let lo = sorted.partition_point(|&id| earlier_than(arena.get(id), &synthetic_boundary(window_start)));
        let hi = sorted[lo..].partition_point(|&id| arena.get(id).first_seen() < window_end) + lo;

        let mut candidates: Vec<(FpId, f64)> = Vec::new();
        for &candidate_id in &sorted[lo..hi] {
            if candidate_id == current_id {
                continue;
            }
            if !is_possible_successor(arena, current_id, candidate_id, db) {
                continue;
            }
            let current = arena.get(current_id);
            let candidate = arena.get(candidate_id);
            let key = (current.row.rssi as f64 - candidate.row.mean).abs() - candidate.row.std;
            candidates.push((candidate_id, key.max(0.0)));
        }

        if candidates.is_empty() || candidates.len() > tunables.candidates_limit {
            continue;
        }
        let sole_candidate = candidates.len() == 1;
        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(tunables.max_candidates);

        let successor_ids: Vec<FpId> = candidates.into_iter().map(|(id, _)| id).collect();
        if sole_candidate {
            arena.get_mut(successor_ids[0]).is_successor = true;
        }
        arena.get_mut(current_id).successors = successor_ids;
    }
}

fn is_possible_successor(arena: &Arena, current_id: FpId, candidate_id: FpId, db: &DbReader) -> bool {
    let current = arena.get(current_id);
    let candidate = arena.get(candidate_id);
    if current.row.company_id != candidate.row.company_id
        || current.row.service_uuid != candidate.row.service_uuid
    {
        return false;
    }
    match location_distance(current, candidate, db) {
        Ok(distance) => distance <= SUCCESSOR_DISTANCE_KM,
        Err(CorrelatorError::Lookup { antenna_id, timestamp }) => {
            warn!(antenna_id, timestamp, "no antenna location for successor candidate, skipping");
            false
        }
        Err(e) => {
            warn!(error = %e, "successor distance check failed, skipping");
            false
        }
    }
}

fn location_distance(
    current: &crate::arena::CorrelatorFingerprint,
    candidate: &crate::arena::CorrelatorFingerprint,
    db: &DbReader,
) -> Result<f64, CorrelatorError> {
    let current_loc = db.get_antenna_location(current.row.antenna_id, current.last_seen())?;
    let candidate_loc = db.get_antenna_location(candidate.row.antenna_id, candidate.first_seen())?;
    Ok(bt_types::haversine_km(
        current_loc.0,
        current_loc.1,
        candidate_loc.0,
        candidate_loc.1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_types::FingerprintRow;
    use std::path::Path;

    fn fp(id: i64, first_seen: i64, last_seen: i64, antenna_id: u32, rssi: i32) -> FingerprintRow {
        FingerprintRow {
            id,
            mac: [0; 6],
            rssi,
            std: 2.0,
            mean: -60.0,
            first_seen,
            last_seen,
            service_uuid: 1,
            company_id: 1,
            is_random: true,
            antenna_id,
        }
    }

    #[test]
    fn links_single_close_candidate_within_window() {
        let db = DbReader::open(Path::new(":memory:")).unwrap();
        db.raw_insert_metadata_for_test(1, 50.0, 11.0, 0).unwrap();
        db.raw_insert_metadata_for_test(2, 50.0, 11.0, 0).unwrap();

        let mut arena = Arena::from_rows(vec![fp(1, 0, 100, 1, -60), fp(2, 102, 200, 2, -61)]);
        let ids: Vec<FpId> = arena.ids().collect();
        link_successors(&mut arena, &ids, &db, &SuccessorTunables::default());

        assert_eq!(arena.get(0).successors, vec![1]);
        assert!(arena.get(1).is_successor);
    }

    #[test]
    fn no_candidate_outside_delta_max_window() {
        let db = DbReader::open(Path::new(":memory:")).unwrap();
        db.raw_insert_metadata_for_test(1, 50.0, 11.0, 0).unwrap();
        db.raw_insert_metadata_for_test(2, 50.0, 11.0, 0).unwrap();

        let mut arena = Arena::from_rows(vec![fp(1, 0, 100, 1, -60), fp(2, 200, 300, 2, -61)]);
        let ids: Vec<FpId> = arena.ids().collect();
        link_successors(&mut arena, &ids, &db, &SuccessorTunables::default());

        assert!(arena.get(0).successors.is_empty());
    }

    #[test]
    fn too_many_candidates_resolves_to_none() {
        let db = DbReader::open(Path::new(":memory:")).unwrap();
        for antenna in 1..=8u32 {
            db.raw_insert_metadata_for_test(antenna, 50.0, 11.0, 0).unwrap();
        }
        let mut rows = vec![fp(1, 0, 100, 1, -60)];
        for antenna in 2..=8u32 {
            rows.push(fp(antenna as i64, 101, 150, antenna, -60));
        }
        let mut arena = Arena::from_rows(rows);
        let ids: Vec<FpId> = arena.ids().collect();
        link_successors(&mut arena, &ids, &db, &SuccessorTunables::default());

        assert!(arena.get(0).successors.is_empty());
    }
}
