//! Details on some change during a procedure or to an internal structure.

use crate::interner::PredicateId;

/// High level distinction of changes, by 'location' of the change.
#[derive(Clone, Debug)]
pub enum Delta {
    /// Within the [dependency analyzer](crate::deps).
    Deps(self::Deps),
    /// Within the [instantiator](crate::instantiate).
    Instantiate(self::Instantiate),
}

/// Changes during [dependency analysis](crate::deps).
#[derive(Clone, Debug)]
pub enum Deps {
    /// An edge `from -> to` was added to the dependency graph, with
    /// `negative` set when the edge crosses a `not`.
    Edge {
        from: PredicateId,
        to: PredicateId,
        negative: bool,
    },
}

/// Changes during [instantiation](crate::instantiate).
#[derive(Clone, Debug)]
pub enum Instantiate {
    /// A ground atom was added to `predicate`'s derivation set.
    Derived { predicate: PredicateId },
}
