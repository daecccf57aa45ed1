//! Resolve a component's path into the antenna-hop chain an operator reads (§4.12).

use crate::arena::Arena;
use crate::path::PathResult;

/// Links consecutive path members via `antenna_hop`, leaves the head
/// unmarked so it still roots the printed chain, and marks every other path
/// member plus every unused member as `is_hopped` so they're skipped when
/// chains are enumerated from [`Arena::chain_roots`].
pub fn resolve_hops(arena: &mut Arena, result: &PathResult) {
    for window in result.path.windows(2) {
        let (prev, next) = (window[0], window[1]);
        arena.get_mut(prev).antenna_hop = Some(next);
        arena.get_mut(next).is_hopped = true;
    }
    for &id in &result.unused {
        arena.get_mut(id).is_hopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use bt_types::FingerprintRow;

    fn fp(id: i64) -> FingerprintRow {
        FingerprintRow {
            id,
            mac: [0; 6],
            rssi: -60,
            std: 1.0,
            mean: -60.0,
            first_seen: id,
            last_seen: id + 10,
            service_uuid: 1,
            company_id: 1,
            is_random: true,
            antenna_id: 1,
        }
    }

    #[test]
    fn links_path_and_hides_non_head_and_unused_members() {
        let mut arena = Arena::from_rows(vec![fp(1), fp(2), fp(3), fp(4)]);
        let result = PathResult {
            head: 0,
            tail: 2,
            path: vec![0, 1, 2],
            unused: vec![3],
        };
        resolve_hops(&mut arena, &result);

        assert_eq!(arena.get(0).antenna_hop, Some(1));
        assert_eq!(arena.get(1).antenna_hop, Some(2));
        assert_eq!(arena.get(2).antenna_hop, None);
        assert!(!arena.get(0).is_hopped);
        assert!(arena.get(1).is_hopped);
        assert!(arena.get(2).is_hopped);
        assert!(arena.get(3).is_hopped);
    }
}
