// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{BinaryOp, Context, Expr, ExprRef, Sort, UnaryOp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheckError {
    msg: String,
}

impl TypeCheckError {
    fn new(msg: String) -> Self {
        Self { msg }
    }

    pub fn get_msg(&self) -> &str {
        &self.msg
    }
}

impl std::fmt::Display for TypeCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for TypeCheckError {}

impl Sort {
    fn expect_bool(&self, op: &str) -> Result<Sort, TypeCheckError> {
        match self {
            Sort::Bool => Ok(Sort::Bool),
            other => Err(TypeCheckError::new(format!(
                "{op} only works on booleans, not {other}."
            ))),
        }
    }

    fn expect_numeric(&self, op: &str) -> Result<Sort, TypeCheckError> {
        if self.is_numeric() {
            Ok(*self)
        } else {
            Err(TypeCheckError::new(format!(
                "{op} only works on integers or reals, not {self}."
            )))
        }
    }

    fn expect_int(&self, op: &str) -> Result<Sort, TypeCheckError> {
        match self {
            Sort::Int => Ok(Sort::Int),
            other => Err(TypeCheckError::new(format!(
                "{op} only works on integers, not {other}."
            ))),
        }
    }

    fn expect_real(&self, op: &str) -> Result<Sort, TypeCheckError> {
        match self {
            Sort::Real => Ok(Sort::Real),
            other => Err(TypeCheckError::new(format!(
                "{op} only works on reals, not {other}."
            ))),
        }
    }
}

fn expect_same_sort(op: &str, a: Sort, b: Sort) -> Result<Sort, TypeCheckError> {
    if a == b {
        Ok(a)
    } else {
        Err(TypeCheckError::new(format!(
            "{op} requires two operands of the same sort, not {a} and {b}"
        )))
    }
}

fn binop_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "div",
        BinaryOp::Mod => "mod",
        BinaryOp::Rem => "rem",
        BinaryOp::Pow => "pow",
        BinaryOp::Equal => "equal",
        BinaryOp::NotEqual => "not equal",
        BinaryOp::Less => "less",
        BinaryOp::LessEqual => "less or equal",
        BinaryOp::Greater => "greater",
        BinaryOp::GreaterEqual => "greater or equal",
        BinaryOp::Divides => "divides",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
        BinaryOp::Implies => "implies",
        BinaryOp::Iff => "iff",
    }
}

pub trait TypeCheck {
    /// Fully checks the expression and all of its children.
    fn type_check(&self, ctx: &Context) -> Result<Sort, TypeCheckError>;

    /// Derives the sort of a well-typed expression by only looking at the minimum number
    /// of children. Results are meaningless for ill-typed expressions.
    fn get_type(&self, ctx: &Context) -> Sort;

    fn is_bool(&self, ctx: &Context) -> bool {
        self.get_type(ctx) == Sort::Bool
    }
}

impl TypeCheck for Expr {
    fn type_check(&self, ctx: &Context) -> Result<Sort, TypeCheckError> {
        match self {
            Expr::Bool(_) => Ok(Sort::Bool),
            Expr::Int(_) => Ok(Sort::Int),
            Expr::Real(_) => Ok(Sort::Real),
            Expr::Variable { sort, .. } | Expr::Valuation { sort, .. } => {
                if *sort == Sort::Bool {
                    Err(TypeCheckError::new(
                        "variables need to be integers or reals".to_string(),
                    ))
                } else {
                    Ok(*sort)
                }
            }
            Expr::Unary(UnaryOp::Not, e) => e.type_check(ctx)?.expect_bool("not"),
            Expr::Unary(UnaryOp::Minus, e) => e.type_check(ctx)?.expect_numeric("minus"),
            Expr::Unary(UnaryOp::IsInt, e) => {
                e.type_check(ctx)?.expect_real("is_int")?;
                Ok(Sort::Bool)
            }
            Expr::Unary(UnaryOp::ToReal, e) => {
                e.type_check(ctx)?.expect_int("to_real")?;
                Ok(Sort::Real)
            }
            Expr::Unary(UnaryOp::ToInt, e) => {
                e.type_check(ctx)?.expect_real("to_int")?;
                Ok(Sort::Int)
            }
            Expr::Binary(a, op, b) => {
                let name = binop_name(*op);
                let a_sort = a.type_check(ctx)?;
                let b_sort = b.type_check(ctx)?;
                let sort = expect_same_sort(name, a_sort, b_sort)?;
                match op {
                    BinaryOp::Add
                    | BinaryOp::Sub
                    | BinaryOp::Mul
                    | BinaryOp::Div
                    | BinaryOp::Pow => sort.expect_numeric(name),
                    BinaryOp::Mod | BinaryOp::Rem => sort.expect_int(name),
                    BinaryOp::Divides => {
                        sort.expect_int(name)?;
                        Ok(Sort::Bool)
                    }
                    BinaryOp::Less
                    | BinaryOp::LessEqual
                    | BinaryOp::Greater
                    | BinaryOp::GreaterEqual => {
                        sort.expect_numeric(name)?;
                        Ok(Sort::Bool)
                    }
                    BinaryOp::Equal | BinaryOp::NotEqual => Ok(Sort::Bool),
                    BinaryOp::And | BinaryOp::Or | BinaryOp::Implies | BinaryOp::Iff => {
                        sort.expect_bool(name)
                    }
                }
            }
            Expr::Ite { cond, tru, fals } => {
                cond.type_check(ctx)?.expect_bool("ite condition")?;
                expect_same_sort("ite", tru.type_check(ctx)?, fals.type_check(ctx)?)
            }
            Expr::Conjunction(ops) => {
                for op in ops.iter() {
                    op.type_check(ctx)?.expect_bool("conjunction")?;
                }
                Ok(Sort::Bool)
            }
            Expr::Disjunction(ops) => {
                for op in ops.iter() {
                    op.type_check(ctx)?.expect_bool("disjunction")?;
                }
                Ok(Sort::Bool)
            }
            Expr::Exists { body, .. } => body.type_check(ctx)?.expect_bool("exists"),
        }
    }

    fn get_type(&self, ctx: &Context) -> Sort {
        match self {
            Expr::Bool(_) => Sort::Bool,
            Expr::Int(_) => Sort::Int,
            Expr::Real(_) => Sort::Real,
            Expr::Variable { sort, .. } | Expr::Valuation { sort, .. } => *sort,
            Expr::Unary(UnaryOp::Not | UnaryOp::IsInt, _) => Sort::Bool,
            Expr::Unary(UnaryOp::Minus, e) => e.get_type(ctx),
            Expr::Unary(UnaryOp::ToReal, _) => Sort::Real,
            Expr::Unary(UnaryOp::ToInt, _) => Sort::Int,
            Expr::Binary(a, op, _) => {
                if op.is_arithmetic() {
                    a.get_type(ctx)
                } else {
                    Sort::Bool
                }
            }
            Expr::Ite { tru, .. } => tru.get_type(ctx),
            Expr::Conjunction(_) | Expr::Disjunction(_) | Expr::Exists { .. } => Sort::Bool,
        }
    }
}

impl TypeCheck for ExprRef {
    fn type_check(&self, ctx: &Context) -> Result<Sort, TypeCheckError> {
        ctx.get(*self).type_check(ctx)
    }

    fn get_type(&self, ctx: &Context) -> Sort {
        ctx.get(*self).get_type(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_check_arithmetic() {
        let mut ctx = Context::default();
        let x = ctx.int_var("x");
        let y = ctx.real_var("y");
        let one = ctx.int(1);
        let half = ctx.real(1, 2);
        let x_plus_one = ctx.add(x, one);
        assert_eq!(x_plus_one.type_check(&ctx), Ok(Sort::Int));
        let y_div = ctx.div(y, half);
        assert_eq!(y_div.type_check(&ctx), Ok(Sort::Real));
        let mixed = ctx.add(x, y);
        assert!(mixed.type_check(&ctx).is_err());
        let real_mod = ctx.modulo(y, half);
        assert_eq!(
            real_mod.type_check(&ctx).unwrap_err().get_msg(),
            "mod only works on integers, not Real."
        );
    }

    #[test]
    fn type_check_boolean() {
        let mut ctx = Context::default();
        let x = ctx.int_var("x");
        let two = ctx.int(2);
        let ge = ctx.greater_or_equal(x, two);
        let le = ctx.less_or_equal(x, two);
        let both = ctx.conjunction([ge, le]);
        assert_eq!(both.type_check(&ctx), Ok(Sort::Bool));
        let none = ctx.disjunction([]);
        assert_eq!(none.type_check(&ctx), Ok(Sort::Bool));
        let bad = ctx.conjunction([ge, x]);
        assert!(bad.type_check(&ctx).is_err());
        let not_int = ctx.not(x);
        assert!(not_int.type_check(&ctx).is_err());
    }

    #[test]
    fn type_check_conversions() {
        let mut ctx = Context::default();
        let x = ctx.int_var("x");
        let y = ctx.real_var("y");
        let x_real = ctx.to_real(x);
        let mixed = ctx.add(x_real, y);
        assert_eq!(mixed.type_check(&ctx), Ok(Sort::Real));
        let y_int = ctx.to_int(y);
        let floor_sum = ctx.add(x, y_int);
        assert_eq!(floor_sum.type_check(&ctx), Ok(Sort::Int));
        let integral = ctx.is_int(y);
        assert_eq!(integral.type_check(&ctx), Ok(Sort::Bool));
        assert_eq!(integral.get_type(&ctx), Sort::Bool);
        let bad = ctx.is_int(x);
        assert_eq!(
            bad.type_check(&ctx).unwrap_err().get_msg(),
            "is_int only works on reals, not Int."
        );
        let bad = ctx.to_real(y);
        assert!(bad.type_check(&ctx).is_err());

        let two = ctx.int(2);
        let square = ctx.pow(x, two);
        assert_eq!(square.type_check(&ctx), Ok(Sort::Int));
        let half = ctx.real(1, 2);
        let root = ctx.pow(y, half);
        assert_eq!(root.type_check(&ctx), Ok(Sort::Real));
        let divides = ctx.divides(two, x);
        assert_eq!(divides.type_check(&ctx), Ok(Sort::Bool));
        assert_eq!(divides.get_type(&ctx), Sort::Bool);
        let real_divides = ctx.divides(half, y);
        assert!(real_divides.type_check(&ctx).is_err());
    }

    #[test]
    fn type_check_ite() {
        let mut ctx = Context::default();
        let x = ctx.int_var("x");
        let zero = ctx.int(0);
        let one = ctx.int(1);
        let two = ctx.int(2);
        let cond = ctx.greater(x, zero);
        let ite = ctx.ite(cond, one, two);
        assert_eq!(ite.type_check(&ctx), Ok(Sort::Int));
        assert_eq!(ite.get_type(&ctx), Sort::Int);
        let bad_cond = ctx.ite(x, one, two);
        assert!(bad_cond.type_check(&ctx).is_err());
        let t = ctx.tru();
        let bad_branches = ctx.ite(cond, one, t);
        assert!(bad_branches.type_check(&ctx).is_err());
    }
}
