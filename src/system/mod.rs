// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod state;
mod trace;
mod transition_system;

pub use state::SymbolicState;
pub use trace::Trace;
pub use transition_system::{Expansion, GoalRelation, TransitionSystem};
