// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Reachability, SearchOptions, StateSpace, Undecided};
use crate::expr::StringRef;
use crate::smt::{self, Decision};
use crate::system::{Expansion, SymbolicState, Trace};
use indexmap::IndexMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

impl NodeId {
    fn index(&self) -> usize {
        self.0 as usize
    }
}

struct Node {
    state: SymbolicState,
    parent: Option<NodeId>,
    depth: usize,
}

/// Decides the order in which discovered states are expanded.
pub(crate) trait Frontier {
    fn push(&mut self, node: NodeId, state: &SymbolicState, depth: usize);
    fn pop(&mut self) -> Option<NodeId>;
    fn len(&self) -> usize;
}

/// All states discovered so far. Nodes are never removed, parents always have a smaller id.
#[derive(Default)]
struct Graph {
    nodes: Vec<Node>,
    /// visited nodes grouped by location
    by_location: IndexMap<StringRef, Vec<NodeId>>,
}

impl Graph {
    fn add(&mut self, state: SymbolicState, parent: Option<NodeId>) -> NodeId {
        let depth = parent.map(|p| self.nodes[p.index()].depth + 1).unwrap_or(0);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            state,
            parent,
            depth,
        });
        self.by_location.entry(state.location).or_default().push(id);
        id
    }

    fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn trace(&self, id: NodeId) -> Trace {
        let mut states = Vec::with_capacity(self.get(id).depth + 1);
        let mut current = Some(id);
        while let Some(node) = current {
            states.push(self.get(node).state);
            current = self.get(node).parent;
        }
        states.reverse();
        Trace::new(states)
    }

    /// Is `state` subsumed by any visited state at the same location?
    /// With `duplicates_only`, only an identical visited state counts.
    fn is_covered(
        &self,
        space: &mut dyn StateSpace,
        state: &SymbolicState,
        duplicates_only: bool,
    ) -> smt::Result<bool> {
        let Some(visited) = self.by_location.get(&state.location) else {
            return Ok(false);
        };
        if duplicates_only {
            return Ok(visited.iter().any(|other| self.get(*other).state == *state));
        }
        for other in visited.iter() {
            // an undecided check does not allow us to drop the state
            if space.subsumed_by(state, &self.get(*other).state)?.is_yes() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

pub(crate) fn explore(
    frontier: &mut impl Frontier,
    options: &SearchOptions,
    space: &mut dyn StateSpace,
    initial: SymbolicState,
) -> smt::Result<Reachability> {
    let mut graph = Graph::default();
    let root = graph.add(initial, None);
    frontier.push(root, &initial, 0);

    let duplicates_only = !space.goals_closed_under_subsumption();
    if options.prune_subsumed && duplicates_only {
        debug!("goals are not closed under subsumption, only pruning duplicate states");
    }

    let mut expansions = 0usize;
    let mut unknown = 0usize;

    while let Some(id) = frontier.pop() {
        if options.is_aborted() {
            info!("search aborted after {expansions} expansions");
            return Ok(Reachability::Aborted);
        }
        let state = graph.get(id).state;
        let depth = graph.get(id).depth;

        match space.is_goal(&state)? {
            Decision::Yes => {
                info!(
                    "goal reached at depth {depth} after {expansions} expansions: {}",
                    space.describe(&state)
                );
                return Ok(Reachability::Reached(graph.trace(id)));
            }
            Decision::Unknown => unknown += 1,
            Decision::No => {}
        }

        if let Some(max) = options.max_expansions {
            if expansions >= max {
                // the state we just popped has not been expanded either
                let waiting = frontier.len() + 1;
                info!("budget of {max} expansions exhausted, {waiting} states left");
                return Ok(Reachability::Undecided(Undecided::BudgetExhausted {
                    expansions,
                    frontier: waiting,
                }));
            }
        }

        expansions += 1;
        debug!("expanding #{} {}", id.0, space.describe(&state));
        let Expansion {
            successors,
            undecided,
        } = space.expand(&state)?;
        unknown += undecided;

        for next in successors {
            if options.prune_subsumed && graph.is_covered(space, &next, duplicates_only)? {
                debug!("pruned {}", space.describe(&next));
                continue;
            }
            let child = graph.add(next, Some(id));
            frontier.push(child, &next, depth + 1);
        }
    }

    if unknown > 0 {
        info!("no goal found, but {unknown} queries were undecided");
        Ok(Reachability::Undecided(Undecided::SolverUnknown {
            queries: unknown,
        }))
    } else {
        info!("goal unreachable after {expansions} expansions");
        Ok(Reachability::Unreachable)
    }
}
