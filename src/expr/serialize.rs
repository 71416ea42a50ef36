// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{BinaryOp, Context, Expr, ExprRef, Sort, UnaryOp};
use std::io::Write;

pub trait SerializableIrNode {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()>;
    fn serialize_to_str(&self, ctx: &Context) -> String {
        let mut buf = Vec::new();
        self.serialize(ctx, &mut buf)
            .expect("Failed to write to string!");
        String::from_utf8(buf).expect("Failed to read string we wrote!")
    }
}

impl SerializableIrNode for Expr {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        serialize_expr(self, ctx, writer)
    }
}

impl SerializableIrNode for ExprRef {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        ctx.get(*self).serialize(ctx, writer)
    }
}

impl SerializableIrNode for Sort {
    fn serialize<W: Write>(&self, _ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "{}", self)
    }
}

fn binop_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "mod",
        BinaryOp::Rem => "rem",
        BinaryOp::Pow => "^",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::Less => "<",
        BinaryOp::LessEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEqual => ">=",
        BinaryOp::Divides => "divides",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Implies => "=>",
        BinaryOp::Iff => "<=>",
    }
}

fn serialize_nary<W: Write>(
    ops: &[ExprRef],
    separator: &str,
    empty: &str,
    ctx: &Context,
    writer: &mut W,
) -> std::io::Result<()> {
    match ops {
        [] => write!(writer, "{empty}"),
        [single] => single.serialize(ctx, writer),
        [first, rest @ ..] => {
            write!(writer, "(")?;
            first.serialize(ctx, writer)?;
            for op in rest {
                write!(writer, " {separator} ")?;
                op.serialize(ctx, writer)?;
            }
            write!(writer, ")")
        }
    }
}

fn serialize_expr<W: Write>(expr: &Expr, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
    match expr {
        Expr::Bool(value) => write!(writer, "{value}"),
        Expr::Int(value) => write!(writer, "{value}"),
        Expr::Real(value) => {
            if value.is_integer() {
                write!(writer, "{}.0", value.numer())
            } else {
                write!(writer, "{value}")
            }
        }
        Expr::Variable { name, .. } => write!(writer, "{}", ctx.get_str(*name)),
        Expr::Valuation { name, .. } => write!(writer, "{}'", ctx.get_str(*name)),
        Expr::Unary(op, e) => {
            let call = match op {
                UnaryOp::Not => {
                    write!(writer, "!")?;
                    return e.serialize(ctx, writer);
                }
                UnaryOp::Minus => {
                    write!(writer, "-")?;
                    return e.serialize(ctx, writer);
                }
                UnaryOp::IsInt => "is_int",
                UnaryOp::ToReal => "to_real",
                UnaryOp::ToInt => "to_int",
            };
            write!(writer, "{call}(")?;
            e.serialize(ctx, writer)?;
            write!(writer, ")")
        }
        Expr::Binary(a, op, b) => {
            write!(writer, "(")?;
            a.serialize(ctx, writer)?;
            write!(writer, " {} ", binop_symbol(*op))?;
            b.serialize(ctx, writer)?;
            write!(writer, ")")
        }
        Expr::Ite { cond, tru, fals } => {
            write!(writer, "(")?;
            cond.serialize(ctx, writer)?;
            write!(writer, " ? ")?;
            tru.serialize(ctx, writer)?;
            write!(writer, " : ")?;
            fals.serialize(ctx, writer)?;
            write!(writer, ")")
        }
        Expr::Conjunction(ops) => serialize_nary(ops, "&&", "true", ctx, writer),
        Expr::Disjunction(ops) => serialize_nary(ops, "||", "false", ctx, writer),
        Expr::Exists { bound, body } => {
            write!(writer, "exists ")?;
            for (ii, (name, sort)) in bound.iter().enumerate() {
                if ii > 0 {
                    write!(writer, ", ")?;
                }
                write!(writer, "{}: {sort}", ctx.get_str(*name))?;
            }
            write!(writer, ". ")?;
            body.serialize(ctx, writer)
        }
    }
}
