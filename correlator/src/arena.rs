//! Arena of fingerprints indexed by integer IDs (§9).
//!
//! `successors` and `antenna_hop` form a DAG in intent but nothing in
//! `is_same` forbids a cycle if timestamps tie; representing the graph as
//! index links into a flat arena (rather than `Rc<RefCell<...>>` chains)
//! keeps that possibility inert instead of undefined behavior.

use bt_types::FingerprintRow;

pub type FpId = usize;

#[derive(Debug, Clone)]
pub struct CorrelatorFingerprint {
    pub row: FingerprintRow,
    /// Chain continuation(s) assigned by successor linking (§4.13): empty,
    /// one sole successor, or up to `max_candidates` ambiguous ones.
    pub successors: Vec<FpId>,
    /// Set when this fingerprint was assigned as someone's sole successor.
    pub is_successor: bool,
    /// Next fingerprint in this MAC's chosen hop path (§4.12), set by the
    /// hop resolver; `None` for a chain tail or an unused member.
    pub antenna_hop: Option<FpId>,
    /// Set on every non-head path element and every member of an "unused"
    /// set, so the top-level chain printer skips it (§4.12).
    pub is_hopped: bool,
}

impl CorrelatorFingerprint {
    fn new(row: FingerprintRow) -> Self {
        Self {
            row,
            successors: Vec::new(),
            is_successor: false,
            antenna_hop: None,
            is_hopped: false,
        }
    }

    pub fn first_seen(&self) -> i64 {
        self.row.first_seen
    }

    pub fn last_seen(&self) -> i64 {
        self.row.last_seen
    }

    pub fn duration(&self) -> i64 {
        self.row.last_seen - self.row.first_seen
    }
}

/// Owns all fingerprints for one correlation run; everything else refers to
/// them by `FpId`.
#[derive(Debug, Default)]
pub struct Arena {
    fps: Vec<CorrelatorFingerprint>,
}

impl Arena {
    pub fn from_rows(rows: Vec<FingerprintRow>) -> Self {
        Self {
            fps: rows.into_iter().map(CorrelatorFingerprint::new).collect(),
        }
    }

    pub fn get(&self, id: FpId) -> &CorrelatorFingerprint {
        &self.fps[id]
    }

    pub fn get_mut(&mut self, id: FpId) -> &mut CorrelatorFingerprint {
        &mut self.fps[id]
    }

    pub fn len(&self) -> usize {
        self.fps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fps.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = FpId> {
        0..self.fps.len()
    }

    /// Root chains are printed starting from any fingerprint that is neither
    /// a claimed successor nor hopped into (§4.13).
    pub fn chain_roots(&self) -> Vec<FpId> {
        self.ids()
            .filter(|&id| {
                let fp = self.get(id);
                !fp.is_successor && !fp.is_hopped
            })
            .collect()
    }
}
