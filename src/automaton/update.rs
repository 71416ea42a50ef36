// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::expr::{Context, ExprRef, Interpreter, SerializableIrNode, StringRef, Valuations};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `lhs' = rhs`
    Assignment { lhs: StringRef, rhs: ExprRef },
    Block(Vec<Statement>),
}

impl Statement {
    /// Interprets the right-hand side under the current `valuations` before overwriting the
    /// entry of the left-hand side. Blocks are executed in order.
    pub fn interpret<I: Interpreter>(
        &self,
        interpreter: &mut I,
        valuations: &mut Valuations<I::Term>,
    ) -> Result<(), I::Error> {
        match self {
            Statement::Assignment { lhs, rhs } => {
                let value = interpreter.interpret(*rhs, valuations)?;
                valuations.assign(*lhs, value);
            }
            Statement::Block(stmts) => {
                for stmt in stmts.iter() {
                    stmt.interpret(interpreter, valuations)?;
                }
            }
        }
        Ok(())
    }

    /// Calls `f` on every assignment in textual order.
    pub fn for_each_assignment(&self, f: &mut impl FnMut(StringRef, ExprRef)) {
        match self {
            Statement::Assignment { lhs, rhs } => f(*lhs, *rhs),
            Statement::Block(stmts) => {
                for stmt in stmts.iter() {
                    stmt.for_each_assignment(f);
                }
            }
        }
    }
}

/// The block of assignments executed when an edge is taken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Update {
    block: Vec<Statement>,
}

impl Update {
    pub fn new(block: Vec<Statement>) -> Self {
        Self { block }
    }

    /// An update that does not change any variable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Convenience constructor for a flat list of assignments.
    pub fn assignments(assignments: impl IntoIterator<Item = (StringRef, ExprRef)>) -> Self {
        Self::new(
            assignments
                .into_iter()
                .map(|(lhs, rhs)| Statement::Assignment { lhs, rhs })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        let mut empty = true;
        self.for_each_assignment(|_, _| empty = false);
        empty
    }

    pub fn statements(&self) -> &[Statement] {
        &self.block
    }

    pub fn for_each_assignment(&self, mut f: impl FnMut(StringRef, ExprRef)) {
        self.block.iter().for_each(|s| s.for_each_assignment(&mut f));
    }

    pub fn interpret<I: Interpreter>(
        &self,
        interpreter: &mut I,
        valuations: &mut Valuations<I::Term>,
    ) -> Result<(), I::Error> {
        for stmt in self.block.iter() {
            stmt.interpret(interpreter, valuations)?;
        }
        Ok(())
    }

    pub fn serialize_to_str(&self, ctx: &Context) -> String {
        let mut parts = Vec::new();
        self.for_each_assignment(|lhs, rhs| {
            parts.push(format!("{}' := {}", ctx.get_str(lhs), rhs.serialize_to_str(ctx)))
        });
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Evaluator, Substitution, Value};

    #[test]
    fn sequencing() {
        let mut ctx = Context::default();
        let v_name = ctx.string("v".into());
        let w_name = ctx.string("w".into());
        let v = ctx.int_var("v");
        let v_next = ctx.primed(v);
        let one = ctx.int(1);
        let e1 = ctx.add(v, one);
        let ten = ctx.int(10);
        let e2 = ctx.mul(v_next, ten);
        let update = Update::assignments([(v_name, e1), (w_name, e2)]);
        assert_eq!(update.serialize_to_str(&ctx), "v' := (v + 1); w' := (v' * 10)");

        // concrete
        let current = Valuations::from_iter([(v_name, Value::Int(4)), (w_name, Value::Int(0))]);
        let mut next = Valuations::new();
        update
            .interpret(&mut Evaluator::new(&ctx, &current), &mut next)
            .unwrap();
        assert_eq!(next.get(w_name), Some(&Value::Int(50)));

        // symbolic
        let mut next = Valuations::new();
        update
            .interpret(&mut Substitution::new(&mut ctx), &mut next)
            .unwrap();
        let expected = ctx.mul(e1, ten);
        assert_eq!(next.get(w_name), Some(&expected));
    }

    #[test]
    fn nested_blocks_run_in_order() {
        let mut ctx = Context::default();
        let x_name = ctx.string("x".into());
        let one = ctx.int(1);
        let two = ctx.int(2);
        let update = Update::new(vec![
            Statement::Assignment {
                lhs: x_name,
                rhs: one,
            },
            Statement::Block(vec![Statement::Assignment {
                lhs: x_name,
                rhs: two,
            }]),
        ]);
        assert!(!update.is_empty());
        assert!(Update::empty().is_empty());
        let current = Valuations::new();
        let mut next = Valuations::new();
        update
            .interpret(&mut Evaluator::new(&ctx, &current), &mut next)
            .unwrap();
        assert_eq!(next.get(x_name), Some(&Value::Int(2)));
        assert_eq!(next.len(), 1);
    }
}
