// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::expr::{Context, Expr, ExprRef, Sort, StringRef};
use indexmap::IndexMap;
use std::collections::HashSet;

pub trait ForEachChild<T: Clone> {
    fn for_each_child(&self, visitor: impl FnMut(&T));
    fn num_children(&self) -> usize;
}

impl ForEachChild<ExprRef> for Expr {
    fn for_each_child(&self, mut visitor: impl FnMut(&ExprRef)) {
        match self {
            Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Real(_)
            | Expr::Variable { .. }
            | Expr::Valuation { .. } => {} // no children
            Expr::Unary(_, e) => visitor(e),
            Expr::Binary(a, _, b) => {
                visitor(a);
                visitor(b);
            }
            Expr::Ite { cond, tru, fals } => {
                visitor(cond);
                visitor(tru);
                visitor(fals);
            }
            Expr::Conjunction(ops) | Expr::Disjunction(ops) => ops.iter().for_each(visitor),
            Expr::Exists { body, .. } => visitor(body),
        }
    }

    fn num_children(&self) -> usize {
        match self {
            Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Real(_)
            | Expr::Variable { .. }
            | Expr::Valuation { .. } => 0,
            Expr::Unary(..) | Expr::Exists { .. } => 1,
            Expr::Binary(..) => 2,
            Expr::Ite { .. } => 3,
            Expr::Conjunction(ops) | Expr::Disjunction(ops) => ops.len(),
        }
    }
}

/// Visits every expression reachable from `expr` exactly once.
pub fn visit_dag(ctx: &Context, expr: ExprRef, mut f: impl FnMut(ExprRef, &Expr)) {
    let mut seen = HashSet::new();
    let mut todo = vec![expr];
    while let Some(e) = todo.pop() {
        if !seen.insert(e) {
            continue;
        }
        let node = ctx.get(e);
        f(e, node);
        node.for_each_child(|c| todo.push(*c));
    }
}

/// Collects all variables that occur free in `expr`, i.e., are not bound by an enclosing
/// existential quantifier.
pub fn free_variables(ctx: &Context, expr: ExprRef) -> IndexMap<StringRef, Sort> {
    let mut bound = IndexMap::new();
    let mut all = IndexMap::new();
    visit_dag(ctx, expr, |_, node| match node {
        Expr::Variable { name, sort } => {
            all.insert(*name, *sort);
        }
        Expr::Exists { bound: b, .. } => {
            for (name, sort) in b.iter() {
                bound.insert(*name, *sort);
            }
        }
        _ => {}
    });
    // bound variables are always freshly named, thus they can never collide with free ones
    all.retain(|name, _| !bound.contains_key(name));
    all
}

/// Returns `true` iff a primed reference occurs anywhere in `expr`.
pub fn contains_valuation(ctx: &Context, expr: ExprRef) -> bool {
    let mut found = false;
    visit_dag(ctx, expr, |_, node| {
        found |= matches!(node, Expr::Valuation { .. });
    });
    found
}
