// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::expr::{Context, ExprRef, StringRef};
use crate::smt::{self, Decision, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    id: StringRef,
    invariant: ExprRef,
}

impl Location {
    pub fn new(id: StringRef, invariant: ExprRef) -> Self {
        Self { id, invariant }
    }

    /// A location without any restriction on the variables.
    pub fn unconstrained(ctx: &mut Context, id: StringRef) -> Self {
        Self::new(id, ctx.tru())
    }

    pub fn id(&self) -> StringRef {
        self.id
    }

    pub fn invariant(&self) -> ExprRef {
        self.invariant
    }

    /// Does the location admit any configuration under the assertions of the current
    /// solver scope?
    pub fn is_enabled(&self, ctx: &Context, solver: &mut Session) -> smt::Result<Decision> {
        Ok(solver.satisfiable(ctx, self.invariant)?.as_decision())
    }
}
