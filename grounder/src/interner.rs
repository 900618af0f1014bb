//! Interning of predicate symbols.
//!
//! Dependency-graph nodes and derivation-set keys are both, ultimately,
//! predicate `(name, arity)` pairs. Comparing and hashing those repeatedly
//! during grounding is wasted work once a program has any recursion, so both
//! structures instead address a predicate by a small interned
//! [`PredicateId`] — a flat array-of-structs with integer adjacency, per the
//! design note on avoiding back-reference cycles in the dependency graph.

use rustc_hash::FxHashMap;
use std::rc::Rc;

/// An interned `(name, arity)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateId(u32);

impl PredicateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Default, Debug)]
pub struct PredicateInterner {
    // Nested on name then arity, rather than a single `(Rc<str>, usize)`
    // key, so `lookup` can probe by `&str` via `Rc<str>`'s `Borrow<str>`
    // impl instead of allocating an `Rc<str>` (or scanning `entries`) just
    // to run the query — this is on the hottest path in the grounder,
    // walked once per positive/negative literal match attempt.
    ids: FxHashMap<Rc<str>, FxHashMap<usize, PredicateId>>,
    entries: Vec<(Rc<str>, usize)>,
}

impl PredicateInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `(name, arity)`, returning its existing id if already known.
    pub fn intern(&mut self, name: &Rc<str>, arity: usize) -> PredicateId {
        if let Some(id) = self.ids.get(name.as_ref()).and_then(|by_arity| by_arity.get(&arity)) {
            return *id;
        }
        let id = PredicateId(self.entries.len() as u32);
        self.entries.push((name.clone(), arity));
        self.ids.entry(name.clone()).or_default().insert(arity, id);
        id
    }

    pub fn lookup(&self, name: &str, arity: usize) -> Option<PredicateId> {
        self.ids.get(name).and_then(|by_arity| by_arity.get(&arity)).copied()
    }

    pub fn name_of(&self, id: PredicateId) -> &(Rc<str>, usize) {
        &self.entries[id.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = PredicateId> + '_ {
        (0..self.entries.len()).map(|i| PredicateId(i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = PredicateInterner::new();
        let name: Rc<str> = Rc::from("p");
        let a = interner.intern(&name, 2);
        let b = interner.intern(&name, 2);
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn differing_arity_is_a_different_predicate() {
        let mut interner = PredicateInterner::new();
        let name: Rc<str> = Rc::from("p");
        let a = interner.intern(&name, 1);
        let b = interner.intern(&name, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn lookup_finds_an_interned_predicate_by_borrowed_str() {
        let mut interner = PredicateInterner::new();
        let name: Rc<str> = Rc::from("edge");
        let id = interner.intern(&name, 2);
        assert_eq!(interner.lookup("edge", 2), Some(id));
        assert_eq!(interner.lookup("edge", 3), None);
        assert_eq!(interner.lookup("missing", 2), None);
    }
}
