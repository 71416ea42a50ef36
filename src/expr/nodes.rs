// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{ExprRef, StringRef};
use num_rational::Rational64;
use smallvec::SmallVec;

/// Integer literals are restricted to what fits into a machine word.
pub type IntLit = i64;

/// Operands of an n-ary conjunction or disjunction.
pub type Operands = SmallVec<[ExprRef; 4]>;

/// Variables bound by an existential quantifier.
pub type Bound = SmallVec<[(StringRef, Sort); 2]>;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Sort {
    Bool,
    Int,
    Real,
}

impl Sort {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Sort::Int | Sort::Real)
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Int => write!(f, "Int"),
            Sort::Real => write!(f, "Real"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum UnaryOp {
    /// logical negation
    Not,
    /// arithmetic negation
    Minus,
    /// is a real value integral?
    IsInt,
    /// integer to real conversion
    ToReal,
    /// largest integer not above a real value
    ToInt,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BinaryOp {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Rem,
    Pow,
    // relational
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// `a` divides `b` without remainder
    Divides,
    // logical
    And,
    Or,
    Implies,
    Iff,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::Mod
                | BinaryOp::Rem
                | BinaryOp::Pow
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(
            self,
            BinaryOp::And | BinaryOp::Or | BinaryOp::Implies | BinaryOp::Iff
        )
    }
}

/// Represents an arithmetic or boolean expression over declared variables.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Expr {
    // nullary
    Bool(bool),
    Int(IntLit),
    Real(Rational64),
    /// The current value of a variable.
    Variable {
        name: StringRef,
        sort: Sort,
    },
    /// The value a variable is being assigned. Only valid on the right-hand side of an update.
    Valuation {
        name: StringRef,
        sort: Sort,
    },
    // unary
    Unary(UnaryOp, ExprRef),
    // binary
    Binary(ExprRef, BinaryOp, ExprRef),
    // ternary
    Ite {
        cond: ExprRef,
        tru: ExprRef,
        fals: ExprRef,
    },
    // n-ary
    Conjunction(Operands),
    Disjunction(Operands),
    /// Binds fresh copies of variables. Introduced when closing the path constraint of a
    /// traversed edge over the values the variables had before the update.
    Exists {
        bound: Bound,
        body: ExprRef,
    },
}

impl Expr {
    pub fn is_variable(&self) -> bool {
        matches!(self, Expr::Variable { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Bool(_) | Expr::Int(_) | Expr::Real(_))
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Bool(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Expr::Bool(false))
    }

    /// Returns the name of a variable or valuation.
    pub fn symbol_name(&self) -> Option<StringRef> {
        match self {
            Expr::Variable { name, .. } | Expr::Valuation { name, .. } => Some(*name),
            _ => None,
        }
    }
}
