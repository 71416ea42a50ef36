// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod convert;
mod solver;

pub use convert::{convert_sort, escape_smt_identifier, SmtInterpreter};
pub use easy_smt::SExpr;
pub use solver::{
    CheckSatResponse, Decision, Error, Result, Session, SessionOptions, SmtSolverCmd, CVC5_CMD,
    Z3_CMD,
};
