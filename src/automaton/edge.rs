// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::Update;
use crate::expr::{
    free_variables, substitute_variables, Context, ExprRef, StringRef, Substitution, TypeCheck,
    Valuations,
};
use crate::smt::{self, Decision, Session};
use crate::system::SymbolicState;
use indexmap::IndexMap;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    source: StringRef,
    guard: ExprRef,
    update: Update,
    destination: StringRef,
}

impl Edge {
    pub fn new(source: StringRef, guard: ExprRef, update: Update, destination: StringRef) -> Self {
        Self {
            source,
            guard,
            update,
            destination,
        }
    }

    pub fn source(&self) -> StringRef {
        self.source
    }

    pub fn guard(&self) -> ExprRef {
        self.guard
    }

    pub fn update(&self) -> &Update {
        &self.update
    }

    pub fn destination(&self) -> StringRef {
        self.destination
    }

    /// Can the edge be taken from at least one configuration of `state`?
    pub fn is_enabled(
        &self,
        ctx: &Context,
        state: &SymbolicState,
        solver: &mut Session,
    ) -> smt::Result<Decision> {
        solver.scoped(|s| {
            s.assert(ctx, state.constraint)?;
            Ok(s.satisfiable(ctx, self.guard)?.as_decision())
        })
    }

    /// Computes the state reached by taking the edge from `state`.
    ///
    /// The new constraint relates the values after the update to the values before it.
    /// Every assigned variable whose old value is still needed is renamed to a fresh
    /// existentially bound name:
    /// `exists x@0. C[x@0/x] && g[x@0/x] && x == t[x@0/x]`
    /// Variables that are not assigned keep their value.
    pub fn traverse(&self, ctx: &mut Context, state: &SymbolicState) -> SymbolicState {
        debug_assert_eq!(state.location, self.source, "edge does not start at the state");

        let mut next = Valuations::new();
        match self.update.interpret(&mut Substitution::new(ctx), &mut next) {
            Ok(()) => {}
            Err(never) => match never {},
        }

        let mut used = free_variables(ctx, state.constraint);
        used.extend(free_variables(ctx, self.guard));
        for (_, term) in next.iter() {
            used.extend(free_variables(ctx, *term));
        }

        // rename the old value of every assigned variable that is referenced
        let mut renamed: IndexMap<StringRef, ExprRef> = IndexMap::new();
        let mut bound = Vec::new();
        for (name, _) in next.iter() {
            if let Some(sort) = used.get(&name) {
                let base = ctx.get_str(name).to_string();
                let fresh = ctx.add_unique_str(&base);
                renamed.insert(name, ctx.symbol(fresh, *sort));
                bound.push((fresh, *sort));
            }
        }

        let mut parts = Vec::with_capacity(2 + next.len());
        parts.push(substitute_variables(ctx, state.constraint, &renamed));
        parts.push(substitute_variables(ctx, self.guard, &renamed));
        for (name, term) in next.iter() {
            let sort = term.get_type(ctx);
            let var = ctx.symbol(name, sort);
            let value = substitute_variables(ctx, *term, &renamed);
            parts.push(ctx.equal(var, value));
        }
        parts.retain(|p| !ctx.get(*p).is_true());

        let body = match parts.as_slice() {
            [] => ctx.tru(),
            [single] => *single,
            _ => ctx.conjunction(parts.iter().cloned()),
        };
        let constraint = ctx.exists(bound, body);
        trace!(
            "traverse {} -> {}",
            ctx.get_str(self.source),
            ctx.get_str(self.destination)
        );
        SymbolicState::new(self.destination, constraint)
    }
}
