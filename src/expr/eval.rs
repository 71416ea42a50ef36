// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{
    BinaryOp, Context, Expr, ExprRef, Interpreter, Sort, StringRef, UnaryOp, Valuations,
};
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Zero};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Real(Rational64),
}

impl Value {
    pub fn zero(sort: Sort) -> Self {
        match sort {
            Sort::Bool => Value::Bool(false),
            Sort::Int => Value::Int(0),
            Sort::Real => Value::Real(Rational64::zero()),
        }
    }

    pub fn sort(&self) -> Sort {
        match self {
            Value::Bool(_) => Sort::Bool,
            Value::Int(_) => Sort::Int,
            Value::Real(_) => Sort::Real,
        }
    }

    pub fn to_expr(&self, ctx: &mut Context) -> ExprRef {
        match self {
            Value::Bool(v) => ctx.bool_lit(*v),
            Value::Int(v) => ctx.int(*v),
            Value::Real(v) => ctx.real(*v.numer(), *v.denom()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("[eval] no value for `{0}`")]
    Unassigned(String),
    #[error("[eval] division by zero")]
    DivisionByZero,
    #[error("[eval] arithmetic overflow")]
    Overflow,
    #[error("[eval] expected a {expected} value, got {actual}")]
    SortMismatch { expected: Sort, actual: Value },
    #[error("[eval] cannot raise to the power of {0}")]
    UnsupportedExponent(Value),
    #[error("[eval] quantifiers cannot be evaluated concretely")]
    Quantifier,
}

pub type Result<T> = std::result::Result<T, EvalError>;

/// Evaluates expressions over concrete values. Integer division, modulus and remainder
/// follow the SMT-LIB / Z3 definitions.
pub struct Evaluator<'a> {
    ctx: &'a Context,
    current: &'a Valuations<Value>,
}

impl<'a> Evaluator<'a> {
    /// `current` holds the value of every variable before the update.
    pub fn new(ctx: &'a Context, current: &'a Valuations<Value>) -> Self {
        Self { ctx, current }
    }

    fn current_value(&self, name: StringRef) -> Result<Value> {
        self.current
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::Unassigned(self.ctx.get_str(name).to_string()))
    }

    fn eval(&self, expr: ExprRef, valuations: &Valuations<Value>) -> Result<Value> {
        match self.ctx.get(expr) {
            Expr::Bool(v) => Ok(Value::Bool(*v)),
            Expr::Int(v) => Ok(Value::Int(*v)),
            Expr::Real(v) => Ok(Value::Real(*v)),
            Expr::Variable { name, .. } => self.current_value(*name),
            Expr::Valuation { name, .. } => match valuations.get(*name) {
                Some(value) => Ok(*value),
                None => self.current_value(*name),
            },
            Expr::Unary(UnaryOp::Not, e) => Ok(Value::Bool(!as_bool(self.eval(*e, valuations)?)?)),
            Expr::Unary(UnaryOp::Minus, e) => match self.eval(*e, valuations)? {
                Value::Int(v) => v.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
                Value::Real(v) => Rational64::zero()
                    .checked_sub(&v)
                    .map(Value::Real)
                    .ok_or(EvalError::Overflow),
                other => Err(EvalError::SortMismatch {
                    expected: Sort::Int,
                    actual: other,
                }),
            },
            Expr::Unary(UnaryOp::IsInt, e) => {
                let v = as_real(self.eval(*e, valuations)?)?;
                Ok(Value::Bool(v.is_integer()))
            }
            Expr::Unary(UnaryOp::ToInt, e) => {
                let v = as_real(self.eval(*e, valuations)?)?;
                Ok(Value::Int(v.floor().to_integer()))
            }
            Expr::Unary(UnaryOp::ToReal, e) => match self.eval(*e, valuations)? {
                Value::Int(v) => Ok(Value::Real(Rational64::from_integer(v))),
                other => Err(EvalError::SortMismatch {
                    expected: Sort::Int,
                    actual: other,
                }),
            },
            Expr::Binary(a, op, b) => {
                let a = self.eval(*a, valuations)?;
                let b = self.eval(*b, valuations)?;
                eval_binary(a, *op, b)
            }
            Expr::Ite { cond, tru, fals } => {
                let cond = as_bool(self.eval(*cond, valuations)?)?;
                // both branches are evaluated, only the selected one may fail
                let tru = self.eval(*tru, valuations);
                let fals = self.eval(*fals, valuations);
                if cond {
                    tru
                } else {
                    fals
                }
            }
            Expr::Conjunction(ops) => {
                let mut res = true;
                for op in ops.iter() {
                    res &= as_bool(self.eval(*op, valuations)?)?;
                }
                Ok(Value::Bool(res))
            }
            Expr::Disjunction(ops) => {
                let mut res = false;
                for op in ops.iter() {
                    res |= as_bool(self.eval(*op, valuations)?)?;
                }
                Ok(Value::Bool(res))
            }
            Expr::Exists { .. } => Err(EvalError::Quantifier),
        }
    }
}

impl<'a> Interpreter for Evaluator<'a> {
    type Term = Value;
    type Error = EvalError;

    fn interpret(&mut self, expr: ExprRef, valuations: &Valuations<Value>) -> Result<Value> {
        self.eval(expr, valuations)
    }
}

fn as_real(value: Value) -> Result<Rational64> {
    match value {
        Value::Real(v) => Ok(v),
        other => Err(EvalError::SortMismatch {
            expected: Sort::Real,
            actual: other,
        }),
    }
}

fn as_bool(value: Value) -> Result<bool> {
    match value {
        Value::Bool(v) => Ok(v),
        other => Err(EvalError::SortMismatch {
            expected: Sort::Bool,
            actual: other,
        }),
    }
}

/// Euclidean division as defined by SMT-LIB: the remainder is always non-negative.
fn int_div(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(EvalError::DivisionByZero);
    }
    a.checked_div_euclid(b).ok_or(EvalError::Overflow)
}

fn int_mod(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(EvalError::DivisionByZero);
    }
    a.checked_rem_euclid(b).ok_or(EvalError::Overflow)
}

/// Z3's `rem`: the result takes the sign of the divisor.
fn int_rem(a: i64, b: i64) -> Result<i64> {
    let m = int_mod(a, b)?;
    if b >= 0 {
        Ok(m)
    } else {
        Ok(-m)
    }
}

/// Only non-negative integer exponents have an integer result.
fn int_pow(base: i64, exponent: i64) -> Result<i64> {
    if exponent < 0 {
        return Err(EvalError::UnsupportedExponent(Value::Int(exponent)));
    }
    let exponent = u32::try_from(exponent).map_err(|_| EvalError::Overflow)?;
    base.checked_pow(exponent).ok_or(EvalError::Overflow)
}

/// Irrational results cannot be represented, thus the exponent needs to be integral.
fn real_pow(base: Rational64, exponent: Rational64) -> Result<Rational64> {
    if !exponent.is_integer() {
        return Err(EvalError::UnsupportedExponent(Value::Real(exponent)));
    }
    let magnitude = usize::try_from(exponent.numer().unsigned_abs())
        .map_err(|_| EvalError::Overflow)?;
    let power = num_traits::checked_pow(base, magnitude).ok_or(EvalError::Overflow)?;
    if *exponent.numer() >= 0 {
        Ok(power)
    } else if power.is_zero() {
        Err(EvalError::DivisionByZero)
    } else {
        Ok(power.recip())
    }
}

fn eval_binary(a: Value, op: BinaryOp, b: Value) -> Result<Value> {
    use BinaryOp::*;
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => match op {
            Add => a.checked_add(b).map(Value::Int).ok_or(EvalError::Overflow),
            Sub => a.checked_sub(b).map(Value::Int).ok_or(EvalError::Overflow),
            Mul => a.checked_mul(b).map(Value::Int).ok_or(EvalError::Overflow),
            Div => int_div(a, b).map(Value::Int),
            Mod => int_mod(a, b).map(Value::Int),
            Rem => int_rem(a, b).map(Value::Int),
            Pow => int_pow(a, b).map(Value::Int),
            Divides => int_mod(b, a).map(|m| Value::Bool(m == 0)),
            Equal => Ok(Value::Bool(a == b)),
            NotEqual => Ok(Value::Bool(a != b)),
            Less => Ok(Value::Bool(a < b)),
            LessEqual => Ok(Value::Bool(a <= b)),
            Greater => Ok(Value::Bool(a > b)),
            GreaterEqual => Ok(Value::Bool(a >= b)),
            And | Or | Implies | Iff => Err(EvalError::SortMismatch {
                expected: Sort::Bool,
                actual: Value::Int(a),
            }),
        },
        (Value::Real(a), Value::Real(b)) => match op {
            Add => a.checked_add(&b).map(Value::Real).ok_or(EvalError::Overflow),
            Sub => a.checked_sub(&b).map(Value::Real).ok_or(EvalError::Overflow),
            Mul => a.checked_mul(&b).map(Value::Real).ok_or(EvalError::Overflow),
            Div if b.is_zero() => Err(EvalError::DivisionByZero),
            Div => a.checked_div(&b).map(Value::Real).ok_or(EvalError::Overflow),
            Pow => real_pow(a, b).map(Value::Real),
            Equal => Ok(Value::Bool(a == b)),
            NotEqual => Ok(Value::Bool(a != b)),
            Less => Ok(Value::Bool(a < b)),
            LessEqual => Ok(Value::Bool(a <= b)),
            Greater => Ok(Value::Bool(a > b)),
            GreaterEqual => Ok(Value::Bool(a >= b)),
            Mod | Rem | Divides => Err(EvalError::SortMismatch {
                expected: Sort::Int,
                actual: Value::Real(a),
            }),
            And | Or | Implies | Iff => Err(EvalError::SortMismatch {
                expected: Sort::Bool,
                actual: Value::Real(a),
            }),
        },
        (Value::Bool(a), Value::Bool(b)) => match op {
            And => Ok(Value::Bool(a && b)),
            Or => Ok(Value::Bool(a || b)),
            Implies => Ok(Value::Bool(!a || b)),
            Iff | Equal => Ok(Value::Bool(a == b)),
            NotEqual => Ok(Value::Bool(a != b)),
            _ => Err(EvalError::SortMismatch {
                expected: Sort::Int,
                actual: Value::Bool(a),
            }),
        },
        (a, b) => Err(EvalError::SortMismatch {
            expected: a.sort(),
            actual: b,
        }),
    }
}
