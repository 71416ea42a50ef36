// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Context, Expr, ExprRef, ForEachChild, Interpreter, StringRef, Valuations};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::convert::Infallible;

/// Rebuilds `root` bottom up. Leaves are handed to `leaf` which may replace them,
/// inner nodes are re-created with their transformed children.
/// Conjunctions and disjunctions with zero or one operand are normalized on the way.
fn rebuild(
    ctx: &mut Context,
    root: ExprRef,
    mut leaf: impl FnMut(&mut Context, &Expr) -> Option<ExprRef>,
) -> ExprRef {
    let mut transformed: HashMap<ExprRef, ExprRef> = HashMap::new();
    let mut todo = vec![root];
    let mut children = Vec::with_capacity(4);

    while let Some(expr_ref) = todo.pop() {
        if transformed.contains_key(&expr_ref) {
            continue;
        }
        let expr = ctx.get(expr_ref).clone();
        if expr.num_children() == 0 {
            let new_expr = leaf(ctx, &expr).unwrap_or(expr_ref);
            transformed.insert(expr_ref, new_expr);
            continue;
        }

        // check to see if we translated all the children
        children.clear();
        let mut all_transformed = true;
        expr.for_each_child(|c| match transformed.get(c) {
            Some(new_child) => children.push(*new_child),
            None => {
                if all_transformed {
                    todo.push(expr_ref);
                }
                all_transformed = false;
                todo.push(*c);
            }
        });
        if !all_transformed {
            continue;
        }

        let new_expr = with_children(ctx, &expr, &children);
        transformed.insert(expr_ref, new_expr);
    }
    transformed[&root]
}

fn with_children(ctx: &mut Context, expr: &Expr, children: &[ExprRef]) -> ExprRef {
    match expr {
        Expr::Unary(op, _) => ctx.add_expr(Expr::Unary(*op, children[0])),
        Expr::Binary(_, op, _) => ctx.binary(children[0], *op, children[1]),
        Expr::Ite { .. } => ctx.ite(children[0], children[1], children[2]),
        Expr::Conjunction(_) => match children {
            [] => ctx.tru(),
            [single] => *single,
            _ => ctx.conjunction(children.iter().cloned()),
        },
        Expr::Disjunction(_) => match children {
            [] => ctx.fals(),
            [single] => *single,
            _ => ctx.disjunction(children.iter().cloned()),
        },
        Expr::Exists { bound, .. } => ctx.exists(bound.iter().cloned(), children[0]),
        leaf => ctx.add_expr(leaf.clone()),
    }
}

/// Replaces every occurrence of the current value of a variable in `map` with the
/// associated expression. Primed references are left alone.
pub fn substitute_variables(
    ctx: &mut Context,
    expr: ExprRef,
    map: &IndexMap<StringRef, ExprRef>,
) -> ExprRef {
    if map.is_empty() {
        return expr;
    }
    rebuild(ctx, expr, |_, e| match e {
        Expr::Variable { name, .. } => map.get(name).copied(),
        _ => None,
    })
}

/// Interprets expressions as expressions: primed references are replaced by the value
/// assigned so far, everything else is kept.
pub struct Substitution<'a> {
    ctx: &'a mut Context,
}

impl<'a> Substitution<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        Self { ctx }
    }
}

impl<'a> Interpreter for Substitution<'a> {
    type Term = ExprRef;
    type Error = Infallible;

    fn interpret(
        &mut self,
        expr: ExprRef,
        valuations: &Valuations<ExprRef>,
    ) -> Result<ExprRef, Infallible> {
        Ok(rebuild(self.ctx, expr, |ctx, e| match e {
            Expr::Valuation { name, sort } => Some(
                valuations
                    .get(*name)
                    .copied()
                    .unwrap_or_else(|| ctx.symbol(*name, *sort)),
            ),
            _ => None,
        }))
    }
}
