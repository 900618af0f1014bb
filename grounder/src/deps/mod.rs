//! Dependency analysis: the predicate dependency graph, its strongly
//! connected components, and a topological order over them that the driver
//! grounds in.

pub mod scc;

use crate::dispatch::library::delta::{Deps as DepsDelta, Delta};
use crate::dispatch::{Dispatch, Dispatcher};
use crate::interner::{PredicateId, PredicateInterner};
use crate::program::Program;
use rustc_hash::FxHashSet;

/// The predicate dependency graph together with its component structure.
///
/// Nodes are every predicate occurring anywhere in the program, head or
/// body — including predicates that never appear in a head, which simply
/// end up as isolated nodes with an always-empty derivation set (§4.3).
pub struct DependencyGraph {
    pub interner: PredicateInterner,
    /// `edges[b]` holds every `(h, negative)` such that some rule has `b` in
    /// its body (positively if `!negative`) and `h` in its head.
    edges: Vec<Vec<(PredicateId, bool)>>,
    /// Component id per predicate, from [`scc::strongly_connected_components`].
    pub component_of: Vec<usize>,
    /// Components in an order where every edge `b -> h` with `component_of[b]
    /// != component_of[h]` goes from an earlier component to a later one —
    /// producers ground before their consumers.
    pub component_order: Vec<usize>,
}

impl DependencyGraph {
    /// Build the graph for `program`, interning every predicate occurrence
    /// (head and body alike) before adding edges.
    pub fn build(program: &Program, dispatcher: Option<&Dispatcher>) -> DependencyGraph {
        let mut interner = PredicateInterner::new();

        for rule in &program.rules {
            for (name, arity) in rule.head.head_predicates() {
                interner.intern(&name, arity);
            }
            for ((name, arity), _) in rule.body_predicate_occurrences() {
                interner.intern(&name, arity);
            }
        }

        let n = interner.len();
        let mut edges: Vec<Vec<(PredicateId, bool)>> = vec![Vec::new(); n];
        let mut seen_edges: FxHashSet<(PredicateId, PredicateId, bool)> = FxHashSet::default();

        for rule in &program.rules {
            let heads = rule.head.head_predicates();
            let body = rule.body_predicate_occurrences();
            for (h_name, h_arity) in &heads {
                let h = interner
                    .lookup(h_name, *h_arity)
                    .expect("interned above");
                for ((b_name, b_arity), positive) in &body {
                    let b = interner
                        .lookup(b_name, *b_arity)
                        .expect("interned above");
                    let negative = !positive;
                    if seen_edges.insert((b, h, negative)) {
                        edges[b.index()].push((h, negative));
                        if let Some(dispatcher) = dispatcher {
                            dispatcher(Dispatch::Delta(Delta::Deps(DepsDelta::Edge {
                                from: b,
                                to: h,
                                negative,
                            })));
                        }
                    }
                }
            }
        }

        let adjacency: Vec<Vec<PredicateId>> = edges
            .iter()
            .map(|outs| outs.iter().map(|(h, _)| *h).collect())
            .collect();
        let component_of = scc::strongly_connected_components(&adjacency);
        let component_count = component_of.iter().copied().max().map_or(0, |m| m + 1);
        let component_order = topological_component_order(&edges, &component_of, component_count);

        DependencyGraph {
            interner,
            edges,
            component_of,
            component_order,
        }
    }

    /// Outgoing edges from `predicate`: heads it may feed, with polarity.
    pub fn successors(&self, predicate: PredicateId) -> &[(PredicateId, bool)] {
        &self.edges[predicate.index()]
    }

    /// `true` if any edge from `predicate` within its own component is
    /// negative — i.e. the component has a negative cycle through it, which
    /// callers may want to flag or treat conservatively (§9 open question).
    pub fn has_internal_negative_edge(&self, component: usize) -> bool {
        self.edges.iter().enumerate().any(|(from, outs)| {
            self.component_of[from] == component
                && outs
                    .iter()
                    .any(|(to, negative)| *negative && self.component_of[*to] == component)
        })
    }
}

/// Collapse the predicate graph to its SCC condensation and topologically
/// sort it via Kahn's algorithm, so every producer component precedes every
/// component that consumes from it. Tarjan's own output order is an
/// arbitrary numbering of components, not this order, so it is computed
/// independently here rather than reused.
fn topological_component_order(
    edges: &[Vec<(PredicateId, bool)>],
    component_of: &[usize],
    component_count: usize,
) -> Vec<usize> {
    let mut condensation: Vec<FxHashSet<usize>> = vec![FxHashSet::default(); component_count];
    for (from, outs) in edges.iter().enumerate() {
        let c_from = component_of[from];
        for (to, _) in outs {
            let c_to = component_of[to.index()];
            if c_from != c_to {
                condensation[c_from].insert(c_to);
            }
        }
    }

    let mut in_degree = vec![0usize; component_count];
    for targets in &condensation {
        for &c in targets {
            in_degree[c] += 1;
        }
    }

    let mut ready: Vec<usize> = (0..component_count).filter(|&c| in_degree[c] == 0).collect();
    ready.sort_unstable();
    let mut order = Vec::with_capacity(component_count);
    let mut queue = std::collections::VecDeque::from(ready);

    while let Some(c) = queue.pop_front() {
        order.push(c);
        let mut newly_ready = Vec::new();
        for &next in &condensation[c] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                newly_ready.push(next);
            }
        }
        newly_ready.sort_unstable();
        for next in newly_ready {
            queue.push_back(next);
        }
    }

    debug_assert_eq!(
        order.len(),
        component_count,
        "condensation of an SCC graph is acyclic by construction"
    );
    order
}
