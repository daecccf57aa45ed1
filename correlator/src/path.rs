//! Find each component's entry/exit fingerprints and the path between them (§4.10, §4.11).

use petgraph::algo::astar;
use petgraph::graph::UnGraph;

use crate::arena::{Arena, FpId};
use crate::db::DbReader;
use crate::error::CorrelatorError;
use crate::identity::is_same;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Head,
    Tail,
}

/// The component's earliest (`Head`) or latest (`Tail`) fingerprint, ties
/// broken by longest duration, then by position in `ids`.
pub fn find_end(ids: &[FpId], arena: &Arena, end: End) -> Result<FpId, CorrelatorError> {
    if ids.is_empty() {
        return Err(CorrelatorError::Invariant(
            "find_end called on an empty component".into(),
        ));
    }
    let mut best = ids[0];
    for &candidate in &ids[1..] {
        if is_better_end(arena, candidate, best, end) {
            best = candidate;
        }
    }
    Ok(best)
}

fn is_better_end(arena: &Arena, candidate: FpId, current_best: FpId, end: End) -> bool {
    let c = arena.get(candidate);
    let b = arena.get(current_best);
    let primary = match end {
        End::Head => c.first_seen().cmp(&b.first_seen()).reverse(),
        End::Tail => c.last_seen().cmp(&b.last_seen()),
    };
    match primary {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => c.duration() > b.duration(),
    }
}

pub struct PathResult {
    pub head: FpId,
    pub tail: FpId,
    /// Shortest head-to-tail path, inclusive of both ends.
    pub path: Vec<FpId>,
    /// Component members not on the chosen path.
    pub unused: Vec<FpId>,
}

/// One [`PathResult`] per component with more than one member; size-1
/// components have no path to trace and are skipped.
pub fn get_paths(
    components: &[Vec<FpId>],
    arena: &Arena,
    db: &DbReader,
    max_distance_km: f64,
) -> Result<Vec<PathResult>, CorrelatorError> {
    let mut results = Vec::new();
    for component in components {
        if component.len() < 2 {
            continue;
        }
        let head = find_end(component, arena, End::Head)?;
        let tail = find_end(component, arena, End::Tail)?;
        let path = shortest_path(component, arena, db, max_distance_km, head, tail);
        let unused = component
            .iter()
            .copied()
            .filter(|id| !path.contains(id))
            .collect();
        results.push(PathResult {
            head,
            tail,
            path,
            unused,
        });
    }
    Ok(results)
}

fn shortest_path(
    component: &[FpId],
    arena: &Arena,
    db: &DbReader,
    max_distance_km: f64,
    head: FpId,
    tail: FpId,
) -> Vec<FpId> {
    let mut graph: UnGraph<FpId, u32> = UnGraph::new_undirected();
    let node_indices: Vec<_> = component.iter().map(|&id| graph.add_node(id)).collect();
    for i in 0..component.len() {
        for j in (i + 1)..component.len() {
            let same = is_same(arena.get(component[i]), arena.get(component[j]), db, max_distance_km)
                .unwrap_or(false)
                || is_same(arena.get(component[j]), arena.get(component[i]), db, max_distance_km)
                    .unwrap_or(false);
            if same {
                graph.add_edge(node_indices[i], node_indices[j], 1);
            }
        }
    }

    let head_idx = node_indices[component.iter().position(|&id| id == head).unwrap()];
    let tail_idx = node_indices[component.iter().position(|&id| id == tail).unwrap()];

    match astar(&graph, head_idx, |n| n == tail_idx, |e| *e.weight(), |_| 0) {
        Some((_, node_path)) => node_path.into_iter().map(|n| graph[n]).collect(),
        None => vec![head],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_types::FingerprintRow;

    fn fp(id: i64, first_seen: i64, last_seen: i64) -> FingerprintRow {
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
            antenna_id: 1,
        }
    }

    #[test]
    fn head_is_earliest_first_seen() {
        let arena = Arena::from_rows(vec![fp(1, 100, 200), fp(2, 50, 300), fp(3, 400, 500)]);
        let ids: Vec<FpId> = arena.ids().collect();
        assert_eq!(find_end(&ids, &arena, End::Head).unwrap(), 1);
        assert_eq!(find_end(&ids, &arena, End::Tail).unwrap(), 2);
    }

    #[test]
    fn tie_break_prefers_longer_duration() {
        let arena = Arena::from_rows(vec![fp(1, 0, 10), fp(2, 0, 50)]);
        let ids: Vec<FpId> = arena.ids().collect();
        assert_eq!(find_end(&ids, &arena, End::Head).unwrap(), 1);
    }
}
