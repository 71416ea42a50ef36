// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::expr::{Context, ExprRef, SerializableIrNode, StringRef, Value};
use crate::smt::{self, Decision, Session};

/// A location together with a constraint over the declared variables that describes
/// all configurations reachable along one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolicState {
    pub location: StringRef,
    pub constraint: ExprRef,
}

impl SymbolicState {
    pub fn new(location: StringRef, constraint: ExprRef) -> Self {
        Self {
            location,
            constraint,
        }
    }

    /// The state that admits exactly one assignment of values to variables.
    pub fn from_valuation(
        ctx: &mut Context,
        location: StringRef,
        values: impl IntoIterator<Item = (StringRef, Value)>,
    ) -> Self {
        let equalities = values
            .into_iter()
            .map(|(name, value)| {
                let var = ctx.symbol(name, value.sort());
                let value = value.to_expr(ctx);
                ctx.equal(var, value)
            })
            .collect::<Vec<_>>();
        let constraint = match equalities.as_slice() {
            [] => ctx.tru(),
            [single] => *single,
            _ => ctx.conjunction(equalities),
        };
        Self::new(location, constraint)
    }

    /// Is every configuration of `self` also a configuration of `other`?
    /// States at different locations are never related.
    pub fn subset_of(
        &self,
        other: &SymbolicState,
        ctx: &Context,
        solver: &mut Session,
    ) -> smt::Result<Decision> {
        if self.location != other.location {
            return Ok(Decision::No);
        }
        if self.constraint == other.constraint {
            return Ok(Decision::Yes);
        }
        solver.entails(ctx, self.constraint, other.constraint)
    }

    pub fn serialize_to_str(&self, ctx: &Context) -> String {
        format!(
            "{}: {}",
            ctx.get_str(self.location),
            self.constraint.serialize_to_str(ctx)
        )
    }
}
