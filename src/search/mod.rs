// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod explore;
mod strategies;

pub use strategies::{BestFirst, BreadthFirst, DepthFirst};

use crate::smt::{self, Decision};
use crate::system::{Expansion, SymbolicState, Trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Everything a search strategy needs to know about the states it explores.
pub trait StateSpace {
    /// Does `state` match any of the goals?
    fn is_goal(&mut self, state: &SymbolicState) -> smt::Result<Decision>;
    /// All successors of `state`.
    fn expand(&mut self, state: &SymbolicState) -> smt::Result<Expansion>;
    /// Is every configuration of `state` also a configuration of `other`?
    fn subsumed_by(&mut self, state: &SymbolicState, other: &SymbolicState)
        -> smt::Result<Decision>;
    /// Is every state contained in a goal state a goal state itself? Only then can a
    /// subsumed successor be dropped without losing a goal. Otherwise pruning is limited
    /// to exact duplicates.
    fn goals_closed_under_subsumption(&self) -> bool;
    /// Human readable representation for logging.
    fn describe(&self, state: &SymbolicState) -> String;
}

pub trait SearchStrategy {
    fn search(
        &mut self,
        space: &mut dyn StateSpace,
        initial: SymbolicState,
    ) -> smt::Result<Reachability>;
}

/// Can be shared with another thread in order to stop a running search.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Give up after expanding this many states.
    pub max_expansions: Option<usize>,
    /// Do not explore states that are subsumed by a state visited before.
    pub prune_subsumed: bool,
    /// Checked before every expansion.
    pub abort: Option<AbortSignal>,
}

impl SearchOptions {
    /// Explores until the state space is exhausted. Only terminates on finite abstractions.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_budget(max_expansions: usize) -> Self {
        Self {
            max_expansions: Some(max_expansions),
            ..Default::default()
        }
    }

    pub fn with_pruning() -> Self {
        Self {
            prune_subsumed: true,
            ..Default::default()
        }
    }

    fn is_aborted(&self) -> bool {
        self.abort.as_ref().map(|a| a.is_aborted()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undecided {
    /// The search stopped after `expansions` while `frontier` states were still waiting.
    BudgetExhausted { expansions: usize, frontier: usize },
    /// No goal was found, but `queries` solver queries could not be decided.
    SolverUnknown { queries: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reached(Trace),
    Unreachable,
    Undecided(Undecided),
    Aborted,
}

impl Reachability {
    pub fn is_reached(&self) -> bool {
        matches!(self, Reachability::Reached(_))
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Reachability::Unreachable)
    }

    pub fn trace(&self) -> Option<&Trace> {
        match self {
            Reachability::Reached(trace) => Some(trace),
            _ => None,
        }
    }
}
