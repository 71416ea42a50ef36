// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::SymbolicState;
use crate::expr::Context;

/// States visited on the way from the start to a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    states: Vec<SymbolicState>,
}

impl Trace {
    pub fn new(states: Vec<SymbolicState>) -> Self {
        debug_assert!(!states.is_empty(), "a trace contains at least the start state");
        Self { states }
    }

    pub fn states(&self) -> &[SymbolicState] {
        &self.states
    }

    /// Number of states, i.e., one more than the number of edges taken.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> &SymbolicState {
        &self.states[self.states.len() - 1]
    }

    pub fn serialize_to_str(&self, ctx: &Context) -> String {
        let mut out = String::new();
        for (step, state) in self.states.iter().enumerate() {
            out.push_str(&format!("{step}: {}\n", state.serialize_to_str(ctx)));
        }
        out
    }
}
