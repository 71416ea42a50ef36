// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::expr::nodes::*;
use num_rational::Rational64;
use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;

#[derive(PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct StringRef(NonZeroU32);

impl Debug for StringRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringRef({})", self.index())
    }
}

impl StringRef {
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new((index + 1) as u32).unwrap())
    }

    fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ExprRef(NonZeroU32);

impl Debug for ExprRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // we need a custom implementation in order to show the zero based index
        write!(f, "ExprRef({})", self.index())
    }
}

impl ExprRef {
    pub(crate) fn from_index(index: usize) -> Self {
        ExprRef(NonZeroU32::new((index + 1) as u32).unwrap())
    }

    pub(crate) fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Context which is used to create all expressions. Expressions are interned such that
/// reference equivalence implies structural equivalence.
#[derive(Clone, Default)]
pub struct Context {
    strings: indexmap::IndexSet<String>,
    exprs: indexmap::IndexSet<Expr>,
}

impl Context {
    /// ensures that the value is unique (by appending a number if necessary) and then adds it to the store
    pub(crate) fn add_unique_str(&mut self, value: &str) -> StringRef {
        let mut name: String = value.to_string();
        let mut count: usize = 0;
        while self.is_interned(&name) {
            name = format!("{value}@{count}");
            count += 1;
        }
        self.string(name.into())
    }

    fn is_interned(&self, value: &str) -> bool {
        self.strings.get(value).is_some()
    }

    /// Number of interned expressions.
    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }
}

/// Adding and looking up nodes.
impl Context {
    pub fn get(&self, reference: ExprRef) -> &Expr {
        self.exprs
            .get_index(reference.index())
            .expect("Invalid ExprRef!")
    }

    pub fn add_expr(&mut self, value: Expr) -> ExprRef {
        let (index, _) = self.exprs.insert_full(value);
        ExprRef::from_index(index)
    }

    pub fn get_str(&self, reference: StringRef) -> &str {
        self.strings
            .get_index(reference.index())
            .expect("Invalid StringRef!")
    }

    pub fn string(&mut self, value: std::borrow::Cow<str>) -> StringRef {
        if let Some(index) = self.strings.get_index_of(value.as_ref()) {
            StringRef::from_index(index)
        } else {
            let (index, _) = self.strings.insert_full(value.into_owned());
            StringRef::from_index(index)
        }
    }

    /// Looks up a string without interning it.
    pub fn find_str(&self, value: &str) -> Option<StringRef> {
        self.strings.get_index_of(value).map(StringRef::from_index)
    }
}

/// Convenience methods to construct expressions.
impl Context {
    pub fn tru(&mut self) -> ExprRef {
        self.add_expr(Expr::Bool(true))
    }
    pub fn fals(&mut self) -> ExprRef {
        self.add_expr(Expr::Bool(false))
    }
    pub fn bool_lit(&mut self, value: bool) -> ExprRef {
        self.add_expr(Expr::Bool(value))
    }
    pub fn int(&mut self, value: IntLit) -> ExprRef {
        self.add_expr(Expr::Int(value))
    }
    /// Real literal `numer / denom`. Panics if `denom` is zero.
    pub fn real(&mut self, numer: i64, denom: i64) -> ExprRef {
        self.add_expr(Expr::Real(Rational64::new(numer, denom)))
    }
    pub fn symbol(&mut self, name: StringRef, sort: Sort) -> ExprRef {
        self.add_expr(Expr::Variable { name, sort })
    }
    pub fn var(&mut self, name: &str, sort: Sort) -> ExprRef {
        let name = self.string(name.into());
        self.symbol(name, sort)
    }
    pub fn int_var(&mut self, name: &str) -> ExprRef {
        self.var(name, Sort::Int)
    }
    pub fn real_var(&mut self, name: &str) -> ExprRef {
        self.var(name, Sort::Real)
    }
    /// Primed reference to the value `name` is being assigned in the current update.
    pub fn valuation(&mut self, name: StringRef, sort: Sort) -> ExprRef {
        self.add_expr(Expr::Valuation { name, sort })
    }
    /// Primed reference to the variable expression `var`.
    pub fn primed(&mut self, var: ExprRef) -> ExprRef {
        let (name, sort) = match self.get(var) {
            Expr::Variable { name, sort } => (*name, *sort),
            other => panic!("can only prime a variable, not {other:?}"),
        };
        self.valuation(name, sort)
    }

    pub fn not(&mut self, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::Unary(UnaryOp::Not, e))
    }
    pub fn minus(&mut self, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::Unary(UnaryOp::Minus, e))
    }
    pub fn is_int(&mut self, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::Unary(UnaryOp::IsInt, e))
    }
    pub fn to_real(&mut self, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::Unary(UnaryOp::ToReal, e))
    }
    pub fn to_int(&mut self, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::Unary(UnaryOp::ToInt, e))
    }
    pub fn binary(&mut self, a: ExprRef, op: BinaryOp, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::Binary(a, op, b))
    }
    pub fn add(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Add, b)
    }
    pub fn sub(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Sub, b)
    }
    pub fn mul(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Mul, b)
    }
    pub fn div(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Div, b)
    }
    pub fn modulo(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Mod, b)
    }
    pub fn remainder(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Rem, b)
    }
    pub fn pow(&mut self, base: ExprRef, exponent: ExprRef) -> ExprRef {
        self.binary(base, BinaryOp::Pow, exponent)
    }
    /// `a` divides `b`
    pub fn divides(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Divides, b)
    }
    pub fn equal(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Equal, b)
    }
    pub fn not_equal(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::NotEqual, b)
    }
    pub fn less(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Less, b)
    }
    pub fn less_or_equal(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::LessEqual, b)
    }
    pub fn greater(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Greater, b)
    }
    pub fn greater_or_equal(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::GreaterEqual, b)
    }
    pub fn and(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::And, b)
    }
    pub fn or(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Or, b)
    }
    pub fn implies(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Implies, b)
    }
    pub fn iff(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.binary(a, BinaryOp::Iff, b)
    }
    pub fn ite(&mut self, cond: ExprRef, tru: ExprRef, fals: ExprRef) -> ExprRef {
        self.add_expr(Expr::Ite { cond, tru, fals })
    }
    /// n-ary conjunction, operands are kept as given (no flattening, no simplification)
    pub fn conjunction(&mut self, operands: impl IntoIterator<Item = ExprRef>) -> ExprRef {
        self.add_expr(Expr::Conjunction(operands.into_iter().collect()))
    }
    /// n-ary disjunction, operands are kept as given (no flattening, no simplification)
    pub fn disjunction(&mut self, operands: impl IntoIterator<Item = ExprRef>) -> ExprRef {
        self.add_expr(Expr::Disjunction(operands.into_iter().collect()))
    }
    pub fn exists(
        &mut self,
        bound: impl IntoIterator<Item = (StringRef, Sort)>,
        body: ExprRef,
    ) -> ExprRef {
        let bound: Bound = bound.into_iter().collect();
        if bound.is_empty() {
            body
        } else {
            self.add_expr(Expr::Exists { bound, body })
        }
    }
}
