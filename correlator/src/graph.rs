//! Group fingerprints that could be the same device into connected components (§4.9).

use petgraph::graph::UnGraph;
use petgraph::unionfind::UnionFind;
use tracing::warn;

use crate::arena::{Arena, FpId};
use crate::db::DbReader;
use crate::error::CorrelatorError;
use crate::identity::is_same;

/// Partitions `ids` into components where an edge exists between `a` and `b`
/// iff `is_same(a, b, ..)` or `is_same(b, a, ..)` holds. A [`CorrelatorError::Lookup`]
/// encountered while testing one candidate pair only rules out that pair
/// (§7); it never aborts the whole run.
pub fn get_components(
    ids: &[FpId],
    arena: &Arena,
    db: &DbReader,
    max_distance_km: f64,
) -> Vec<Vec<FpId>> {
    let mut graph: UnGraph<FpId, ()> = UnGraph::new_undirected();
    let node_indices: Vec<_> = ids.iter().map(|&id| graph.add_node(id)).collect();

    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            if pair_is_same(arena.get(ids[i]), arena.get(ids[j]), db, max_distance_km)
                || pair_is_same(arena.get(ids[j]), arena.get(ids[i]), db, max_distance_km)
            {
                graph.add_edge(node_indices[i], node_indices[j], ());
            }
        }
    }

    let mut uf = UnionFind::new(ids.len());
    for edge in graph.edge_indices() {
        if let Some((a, b)) = graph.edge_endpoints(edge) {
            uf.union(a.index(), b.index());
        }
    }

    let mut components: std::collections::HashMap<usize, Vec<FpId>> =
        std::collections::HashMap::new();
    for i in 0..ids.len() {
        components.entry(uf.find(i)).or_default().push(ids[i]);
    }
    components.into_values().collect()
}

fn pair_is_same(
    old: &crate::arena::CorrelatorFingerprint,
    new: &crate::arena::CorrelatorFingerprint,
    db: &DbReader,
    max_distance_km: f64,
) -> bool {
    match is_same(old, new, db, max_distance_km) {
        Ok(same) => same,
        Err(CorrelatorError::Lookup {
            antenna_id,
            timestamp,
        }) => {
            warn!(antenna_id, timestamp, "no antenna location for pair, treating as distinct");
            false
        }
        Err(e) => {
            warn!(error = %e, "identity check failed, treating pair as distinct");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_types::FingerprintRow;
    use std::path::Path;

    fn fp(id: i64, first_seen: i64, last_seen: i64, antenna_id: u32) -> FingerprintRow {
        FingerprintRow {
            id,
            mac: [0; 6],
            rssi: -60,
            std: 1.0,
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
    fn chains_pairwise_same_fingerprints_into_one_component() {
        let db = DbReader::open(Path::new(":memory:")).unwrap();
        db.raw_insert_metadata_for_test(1, 50.0, 11.0, 0).unwrap();
        db.raw_insert_metadata_for_test(2, 50.0, 11.0, 0).unwrap();
        db.raw_insert_metadata_for_test(3, 50.0, 11.0, 0).unwrap();

        let rows = vec![
            fp(1, 0, 100, 1),
            fp(2, 50, 150, 2),
            fp(3, 2000, 2100, 3),
        ];
        let arena = Arena::from_rows(rows);
        let ids: Vec<FpId> = arena.ids().collect();
        let components = get_components(&ids, &arena, &db, 15.0);

        let with_first_two = components
            .iter()
            .find(|c| c.contains(&0) || c.contains(&1))
            .unwrap();
        assert!(with_first_two.contains(&0) && with_first_two.contains(&1));
        assert!(components.iter().any(|c| c == &vec![2] || c == &[2]));
    }
}
