// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Error, Result};
use crate::expr::{
    BinaryOp, Context, Expr, ExprRef, Interpreter, Sort, StringRef, TypeCheck, UnaryOp,
    Valuations,
};
use easy_smt as smt;
use indexmap::IndexMap;
use std::borrow::Cow;

pub fn convert_sort(smt_ctx: &smt::Context, sort: Sort) -> smt::SExpr {
    match sort {
        Sort::Bool => smt_ctx.bool_sort(),
        Sort::Int => smt_ctx.atom("Int"),
        Sort::Real => smt_ctx.atom("Real"),
    }
}

/// Translates expressions into solver terms. Free variables need to be declared,
/// variables bound by a quantifier are only valid inside of its body.
pub struct SmtInterpreter<'a> {
    ctx: &'a Context,
    smt_ctx: &'a smt::Context,
    declarations: &'a IndexMap<StringRef, Sort>,
    bound: Vec<(StringRef, Sort)>,
}

impl<'a> SmtInterpreter<'a> {
    pub fn new(
        ctx: &'a Context,
        smt_ctx: &'a smt::Context,
        declarations: &'a IndexMap<StringRef, Sort>,
    ) -> Self {
        Self {
            ctx,
            smt_ctx,
            declarations,
            bound: Vec::new(),
        }
    }

    fn symbol(&self, name: StringRef, sort: Sort) -> Result<smt::SExpr> {
        let declared = self
            .bound
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| *s)
            .or_else(|| self.declarations.get(&name).copied());
        match declared {
            None => Err(Error::UndeclaredVariable(
                self.ctx.get_str(name).to_string(),
            )),
            Some(existing) if existing != sort => Err(Error::SortConflict {
                name: self.ctx.get_str(name).to_string(),
                existing,
                requested: sort,
            }),
            Some(_) => Ok(self
                .smt_ctx
                .atom(escape_smt_identifier(self.ctx.get_str(name)))),
        }
    }

    fn int_lit(&self, value: i64) -> smt::SExpr {
        if value < 0 {
            self.smt_ctx.list(vec![
                self.smt_ctx.atom("-"),
                self.smt_ctx.atom(value.unsigned_abs().to_string()),
            ])
        } else {
            self.smt_ctx.atom(value.to_string())
        }
    }

    fn real_lit(&self, numer: i64, denom: i64) -> smt::SExpr {
        let magnitude = self.smt_ctx.list(vec![
            self.smt_ctx.atom("/"),
            self.smt_ctx.atom(format!("{}.0", numer.unsigned_abs())),
            self.smt_ctx.atom(format!("{denom}.0")),
        ]);
        if numer < 0 {
            self.smt_ctx
                .list(vec![self.smt_ctx.atom("-"), magnitude])
        } else {
            magnitude
        }
    }

    fn apply(&self, op: &str, args: impl IntoIterator<Item = smt::SExpr>) -> smt::SExpr {
        let mut list = vec![self.smt_ctx.atom(op)];
        list.extend(args);
        self.smt_ctx.list(list)
    }

    fn convert(&mut self, expr: ExprRef, valuations: &Valuations<smt::SExpr>) -> Result<smt::SExpr> {
        let ctx = self.ctx;
        let smt_ctx = self.smt_ctx;
        let res = match ctx.get(expr) {
            Expr::Bool(true) => smt_ctx.true_(),
            Expr::Bool(false) => smt_ctx.false_(),
            Expr::Int(value) => self.int_lit(*value),
            Expr::Real(value) => self.real_lit(*value.numer(), *value.denom()),
            Expr::Variable { name, sort } => self.symbol(*name, *sort)?,
            Expr::Valuation { name, sort } => match valuations.get(*name) {
                Some(term) => *term,
                None => self.symbol(*name, *sort)?,
            },
            Expr::Unary(UnaryOp::Not, e) => smt_ctx.not(self.convert(*e, valuations)?),
            Expr::Unary(
                op @ (UnaryOp::Minus | UnaryOp::IsInt | UnaryOp::ToReal | UnaryOp::ToInt),
                e,
            ) => {
                let e = self.convert(*e, valuations)?;
                let name = match op {
                    UnaryOp::IsInt => "is_int",
                    UnaryOp::ToReal => "to_real",
                    UnaryOp::ToInt => "to_int",
                    _ => "-",
                };
                self.apply(name, [e])
            }
            Expr::Binary(a_ref, op, b_ref) => {
                let a = self.convert(*a_ref, valuations)?;
                let b = self.convert(*b_ref, valuations)?;
                match op {
                    BinaryOp::Add => self.apply("+", [a, b]),
                    BinaryOp::Sub => self.apply("-", [a, b]),
                    BinaryOp::Mul => self.apply("*", [a, b]),
                    BinaryOp::Div => match a_ref.get_type(ctx) {
                        Sort::Real => self.apply("/", [a, b]),
                        _ => self.apply("div", [a, b]),
                    },
                    BinaryOp::Mod => self.apply("mod", [a, b]),
                    BinaryOp::Rem => self.apply("rem", [a, b]),
                    BinaryOp::Pow => self.apply("^", [a, b]),
                    BinaryOp::Divides => {
                        let rest = self.apply("mod", [b, a]);
                        smt_ctx.eq(rest, self.int_lit(0))
                    }
                    BinaryOp::Equal | BinaryOp::Iff => smt_ctx.eq(a, b),
                    BinaryOp::NotEqual => smt_ctx.not(smt_ctx.eq(a, b)),
                    BinaryOp::Less => self.apply("<", [a, b]),
                    BinaryOp::LessEqual => self.apply("<=", [a, b]),
                    BinaryOp::Greater => self.apply(">", [a, b]),
                    BinaryOp::GreaterEqual => self.apply(">=", [a, b]),
                    BinaryOp::And => smt_ctx.and(a, b),
                    BinaryOp::Or => smt_ctx.or(a, b),
                    BinaryOp::Implies => smt_ctx.imp(a, b),
                }
            }
            Expr::Ite { cond, tru, fals } => {
                let cond = self.convert(*cond, valuations)?;
                let tru = self.convert(*tru, valuations)?;
                let fals = self.convert(*fals, valuations)?;
                smt_ctx.ite(cond, tru, fals)
            }
            Expr::Conjunction(ops) => match ops.as_slice() {
                [] => smt_ctx.true_(),
                [single] => self.convert(*single, valuations)?,
                _ => {
                    let ops = ops
                        .iter()
                        .map(|op| self.convert(*op, valuations))
                        .collect::<Result<Vec<_>>>()?;
                    smt_ctx.and_many(ops)
                }
            },
            Expr::Disjunction(ops) => match ops.as_slice() {
                [] => smt_ctx.false_(),
                [single] => self.convert(*single, valuations)?,
                _ => {
                    let ops = ops
                        .iter()
                        .map(|op| self.convert(*op, valuations))
                        .collect::<Result<Vec<_>>>()?;
                    smt_ctx.or_many(ops)
                }
            },
            Expr::Exists { bound, body } => {
                let vars = bound
                    .iter()
                    .map(|(name, sort)| {
                        smt_ctx.list(vec![
                            smt_ctx.atom(escape_smt_identifier(ctx.get_str(*name))),
                            convert_sort(smt_ctx, *sort),
                        ])
                    })
                    .collect::<Vec<_>>();
                let scope = self.bound.len();
                self.bound.extend(bound.iter().cloned());
                let body = self.convert(*body, valuations);
                self.bound.truncate(scope);
                self.apply("exists", [smt_ctx.list(vars), body?])
            }
        };
        Ok(res)
    }
}

impl<'a> Interpreter for SmtInterpreter<'a> {
    type Term = smt::SExpr;
    type Error = Error;

    fn interpret(
        &mut self,
        expr: ExprRef,
        valuations: &Valuations<smt::SExpr>,
    ) -> Result<smt::SExpr> {
        self.convert(expr, valuations)
    }
}

/// Matches `<simple_symbol>` from the concrete syntax appendix of the SMT-LIB standard.
fn is_simple_smt_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        None => false,
        Some(first) if first.is_ascii_digit() => false,
        Some(first) => std::iter::once(first).chain(chars).all(|cc| {
            cc.is_ascii_alphanumeric() || "+-/*=%?!.$_~&^<>@".contains(cc)
        }),
    }
}

pub fn escape_smt_identifier(id: &str) -> Cow<'_, str> {
    if is_simple_smt_identifier(id) {
        Cow::Borrowed(id)
    } else {
        Cow::Owned(format!("|{}|", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easy_smt::ContextBuilder;

    fn to_smt_str(ctx: &Context, decls: &IndexMap<StringRef, Sort>, e: ExprRef) -> String {
        let smt_ctx = ContextBuilder::new().build().unwrap();
        let term = SmtInterpreter::new(ctx, &smt_ctx, decls)
            .interpret(e, &Valuations::new())
            .unwrap();
        smt_ctx.display(term).to_string()
    }

    #[test]
    fn convert_arithmetic() {
        let mut ctx = Context::default();
        let x_name = ctx.string("x".into());
        let y_name = ctx.string("y".into());
        let decls = IndexMap::from_iter([(x_name, Sort::Int), (y_name, Sort::Real)]);
        let x = ctx.int_var("x");
        let y = ctx.real_var("y");
        let minus_three = ctx.int(-3);
        let div = ctx.div(x, minus_three);
        let rem = ctx.remainder(div, x);
        assert_eq!(to_smt_str(&ctx, &decls, rem), "(rem (div x (- 3)) x)");
        let half = ctx.real(-1, 2);
        let real_div = ctx.div(y, half);
        assert_eq!(to_smt_str(&ctx, &decls, real_div), "(/ y (- (/ 1.0 2.0)))");
    }

    #[test]
    fn convert_conversions_and_powers() {
        let mut ctx = Context::default();
        let x_name = ctx.string("x".into());
        let y_name = ctx.string("y".into());
        let decls = IndexMap::from_iter([(x_name, Sort::Int), (y_name, Sort::Real)]);
        let x = ctx.int_var("x");
        let y = ctx.real_var("y");
        let x_real = ctx.to_real(x);
        let sum = ctx.add(x_real, y);
        let floor = ctx.to_int(sum);
        assert_eq!(to_smt_str(&ctx, &decls, floor), "(to_int (+ (to_real x) y))");
        let integral = ctx.is_int(y);
        assert_eq!(to_smt_str(&ctx, &decls, integral), "(is_int y)");
        let two = ctx.int(2);
        let square = ctx.pow(x, two);
        assert_eq!(to_smt_str(&ctx, &decls, square), "(^ x 2)");
        let three = ctx.int(3);
        let divides = ctx.divides(three, x);
        assert_eq!(to_smt_str(&ctx, &decls, divides), "(= (mod x 3) 0)");
    }

    #[test]
    fn convert_nary() {
        let mut ctx = Context::default();
        let x_name = ctx.string("x".into());
        let decls = IndexMap::from_iter([(x_name, Sort::Int)]);
        let x = ctx.int_var("x");
        let zero = ctx.int(0);
        let pos = ctx.greater(x, zero);
        let empty_and = ctx.conjunction([]);
        let empty_or = ctx.disjunction([]);
        let single = ctx.conjunction([pos]);
        let neg = ctx.less(x, zero);
        let both = ctx.disjunction([pos, neg]);
        assert_eq!(to_smt_str(&ctx, &decls, empty_and), "true");
        assert_eq!(to_smt_str(&ctx, &decls, empty_or), "false");
        assert_eq!(to_smt_str(&ctx, &decls, single), "(> x 0)");
        assert_eq!(to_smt_str(&ctx, &decls, both), "(or (> x 0) (< x 0))");
    }

    #[test]
    fn convert_valuation_and_quantifier() {
        let mut ctx = Context::default();
        let x_name = ctx.string("x".into());
        let decls = IndexMap::from_iter([(x_name, Sort::Int)]);
        let x = ctx.int_var("x");
        let old_name = ctx.add_unique_str("x");
        let old = ctx.symbol(old_name, Sort::Int);
        let one = ctx.int(1);
        let inc = ctx.add(old, one);
        let update = ctx.equal(x, inc);
        let closed = ctx.exists([(old_name, Sort::Int)], update);
        assert_eq!(
            to_smt_str(&ctx, &decls, closed),
            "(exists ((x@0 Int)) (= x (+ x@0 1)))"
        );
        // the bound variable is not visible outside of the quantifier
        let smt_ctx = ContextBuilder::new().build().unwrap();
        let err = SmtInterpreter::new(&ctx, &smt_ctx, &decls)
            .interpret(inc, &Valuations::new())
            .unwrap_err();
        assert!(matches!(err, Error::UndeclaredVariable(name) if name == "x@0"));

        let x_next = ctx.primed(x);
        let mut vals = Valuations::new();
        vals.assign(x_name, smt_ctx.atom("5"));
        let sum = ctx.add(x_next, x);
        let term = SmtInterpreter::new(&ctx, &smt_ctx, &decls)
            .interpret(sum, &vals)
            .unwrap();
        assert_eq!(smt_ctx.display(term).to_string(), "(+ 5 x)");
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_smt_identifier("x@1"), "x@1");
        assert_eq!(escape_smt_identifier("a b"), "|a b|");
        assert_eq!(escape_smt_identifier("1x"), "|1x|");
    }
}
