// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod context;
mod declarations;
mod eval;
mod interpreter;
mod nodes;
mod serialize;
mod transform;
mod traversal;
mod type_check;
mod valuations;

pub use context::{Context, ExprRef, StringRef};
pub use declarations::{DeclarationError, Declarations};
pub use eval::{EvalError, Evaluator, Value};
pub use interpreter::Interpreter;
pub use nodes::{BinaryOp, Bound, Expr, IntLit, Operands, Sort, UnaryOp};
pub use serialize::SerializableIrNode;
pub use transform::{substitute_variables, Substitution};
pub use traversal::{contains_valuation, free_variables, visit_dag, ForEachChild};
pub use type_check::{TypeCheck, TypeCheckError};
pub use valuations::Valuations;
