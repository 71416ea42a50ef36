// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{ExprRef, Valuations};

/// Maps expressions into some term domain. Implemented by the solver term converter,
/// the substitution into plain expressions and the concrete evaluator.
///
/// All implementations agree on the following:
/// - a `Variable` is interpreted as the current value and never looks at `valuations`
/// - a `Valuation` is interpreted as the entry in `valuations` or, if there is none, as the
///   current value
/// - empty conjunctions are `true`, empty disjunctions are `false` and single operand
///   conjunctions or disjunctions are the operand itself
/// - both branches of an `Ite` are interpreted
pub trait Interpreter {
    type Term;
    type Error;

    fn interpret(
        &mut self,
        expr: ExprRef,
        valuations: &Valuations<Self::Term>,
    ) -> Result<Self::Term, Self::Error>;
}
