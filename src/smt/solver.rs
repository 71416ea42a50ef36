// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::convert::{convert_sort, escape_smt_identifier, SmtInterpreter};
use crate::expr::{Context, Declarations, ExprRef, Interpreter, Sort, StringRef, Valuations};
use easy_smt as smt;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy)]
pub struct SmtSolverCmd {
    pub name: &'static str,
    pub args: &'static [&'static str],
    pub supports_check_assuming: bool,
    /// name of the option that limits the time spent on a single query in milliseconds
    pub timeout_option: Option<&'static str>,
}

pub const Z3_CMD: SmtSolverCmd = SmtSolverCmd {
    name: "z3",
    args: &["-smt2", "-in"],
    supports_check_assuming: false,
    timeout_option: Some(":timeout"),
};

pub const CVC5_CMD: SmtSolverCmd = SmtSolverCmd {
    name: "cvc5",
    args: &["--incremental", "--lang", "smt2"],
    supports_check_assuming: true,
    timeout_option: Some(":tlimit-per"),
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Give up on a single query after this many milliseconds. The query then returns `Unknown`.
    pub timeout_ms: Option<u64>,
    /// If true, the communication with the SMT solver will be logged into a `replay.smt` file.
    pub save_smt_replay: bool,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("[smt] I/O operation failed")]
    Io(#[from] std::io::Error),
    #[error("[smt] cannot pop, the assertion stack is empty")]
    StackUnderflow,
    #[error("[smt] `{0}` has not been declared")]
    UndeclaredVariable(String),
    #[error("[smt] `{name}` is declared as {existing}, cannot use it as {requested}")]
    SortConflict {
        name: String,
        existing: Sort,
        requested: Sort,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckSatResponse {
    Sat,
    Unsat,
    Unknown,
}

impl From<smt::Response> for CheckSatResponse {
    fn from(value: smt::Response) -> Self {
        match value {
            smt::Response::Sat => CheckSatResponse::Sat,
            smt::Response::Unsat => CheckSatResponse::Unsat,
            smt::Response::Unknown => CheckSatResponse::Unknown,
        }
    }
}

/// Three valued answer to a yes/no question asked to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Yes,
    No,
    Unknown,
}

impl Decision {
    pub fn is_yes(&self) -> bool {
        matches!(self, Decision::Yes)
    }

    pub fn is_no(&self) -> bool {
        matches!(self, Decision::No)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Decision::Unknown)
    }
}

impl From<bool> for Decision {
    fn from(value: bool) -> Self {
        if value {
            Decision::Yes
        } else {
            Decision::No
        }
    }
}

impl CheckSatResponse {
    /// Is there a model?
    pub fn as_decision(&self) -> Decision {
        match self {
            CheckSatResponse::Sat => Decision::Yes,
            CheckSatResponse::Unsat => Decision::No,
            CheckSatResponse::Unknown => Decision::Unknown,
        }
    }
}

/// A running SMT solver together with the variables declared in it.
/// All constraints added through a session are interpreted with respect to the
/// current assertion stack.
pub struct Session {
    smt_ctx: smt::Context,
    cmd: SmtSolverCmd,
    declarations: IndexMap<StringRef, Sort>,
    /// number of open push scopes
    depth: usize,
}

impl Session {
    pub fn start(cmd: SmtSolverCmd, opts: SessionOptions) -> Result<Self> {
        let replay_file = if opts.save_smt_replay {
            Some(std::fs::File::create("replay.smt")?)
        } else {
            None
        };
        let mut smt_ctx = smt::ContextBuilder::new()
            .solver(cmd.name, cmd.args)
            .replay_file(replay_file)
            .build()?;
        // quantified formulas over mixed integer and real arithmetic
        smt_ctx.set_logic("ALL")?;
        if let (Some(option), Some(ms)) = (cmd.timeout_option, opts.timeout_ms) {
            let value = smt_ctx.atom(ms.to_string());
            smt_ctx.set_option(option, value)?;
        }
        debug!("started {} session", cmd.name);
        Ok(Self {
            smt_ctx,
            cmd,
            declarations: IndexMap::new(),
            depth: 0,
        })
    }

    pub fn cmd(&self) -> &SmtSolverCmd {
        &self.cmd
    }

    /// Number of currently open scopes.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Makes a variable known to the solver. Declaring a variable again with the same
    /// sort has no effect.
    pub fn declare_variable(&mut self, ctx: &Context, name: StringRef, sort: Sort) -> Result<()> {
        match self.declarations.get(&name) {
            Some(existing) if *existing == sort => Ok(()),
            Some(existing) => Err(Error::SortConflict {
                name: ctx.get_str(name).to_string(),
                existing: *existing,
                requested: sort,
            }),
            None => {
                let smt_sort = convert_sort(&self.smt_ctx, sort);
                let id = escape_smt_identifier(ctx.get_str(name));
                trace!("declare {id}: {sort}");
                self.smt_ctx.declare_const(id, smt_sort)?;
                self.declarations.insert(name, sort);
                Ok(())
            }
        }
    }

    pub fn declare_all(&mut self, ctx: &Context, declarations: &Declarations) -> Result<()> {
        for (name, sort) in declarations.iter() {
            self.declare_variable(ctx, name, sort)?;
        }
        Ok(())
    }

    pub fn is_declared(&self, name: StringRef) -> bool {
        self.declarations.contains_key(&name)
    }

    /// Returns an interpreter that translates expressions over the declared variables.
    pub fn interpreter<'a>(&'a self, ctx: &'a Context) -> SmtInterpreter<'a> {
        SmtInterpreter::new(ctx, &self.smt_ctx, &self.declarations)
    }

    pub fn interpret(
        &self,
        ctx: &Context,
        expr: ExprRef,
        valuations: &Valuations<smt::SExpr>,
    ) -> Result<smt::SExpr> {
        self.interpreter(ctx).interpret(expr, valuations)
    }

    fn term(&self, ctx: &Context, expr: ExprRef) -> Result<smt::SExpr> {
        self.interpret(ctx, expr, &Valuations::new())
    }

    /// Adds `expr` to the current scope.
    pub fn assert(&mut self, ctx: &Context, expr: ExprRef) -> Result<()> {
        let term = self.term(ctx, expr)?;
        self.assert_term(term)
    }

    pub fn assert_term(&mut self, term: smt::SExpr) -> Result<()> {
        trace!("assert {}", self.smt_ctx.display(term));
        self.smt_ctx.assert(term)?;
        Ok(())
    }

    /// Is `expr` satisfiable together with everything asserted so far?
    pub fn satisfiable(&mut self, ctx: &Context, expr: ExprRef) -> Result<CheckSatResponse> {
        let term = self.term(ctx, expr)?;
        self.satisfiable_term(term)
    }

    pub fn satisfiable_term(&mut self, term: smt::SExpr) -> Result<CheckSatResponse> {
        trace!("check-sat {}", self.smt_ctx.display(term));
        let res = if self.cmd.supports_check_assuming {
            self.smt_ctx.check_assuming([term])?
        } else {
            self.smt_ctx.push_many(1)?;
            let res = self
                .smt_ctx
                .assert(term)
                .and_then(|_| self.smt_ctx.check());
            // always pop, a failed assertion must not leave a scope behind
            self.smt_ctx.pop_many(1)?;
            res?
        };
        let res = CheckSatResponse::from(res);
        trace!("-> {res:?}");
        Ok(res)
    }

    /// Does `expr` hold in every model of the current assertions?
    pub fn proven(&mut self, ctx: &Context, expr: ExprRef) -> Result<Decision> {
        let term = self.term(ctx, expr)?;
        self.proven_term(term)
    }

    pub fn proven_term(&mut self, term: smt::SExpr) -> Result<Decision> {
        let negated = self.smt_ctx.not(term);
        let res = match self.satisfiable_term(negated)? {
            CheckSatResponse::Unsat => Decision::Yes,
            CheckSatResponse::Sat => Decision::No,
            CheckSatResponse::Unknown => Decision::Unknown,
        };
        Ok(res)
    }

    /// Does `a` imply `b`?
    pub fn entails(&mut self, ctx: &Context, a: ExprRef, b: ExprRef) -> Result<Decision> {
        let a = self.term(ctx, a)?;
        let b = self.term(ctx, b)?;
        let imp = self.smt_ctx.imp(a, b);
        self.proven_term(imp)
    }

    pub fn push(&mut self) -> Result<()> {
        self.smt_ctx.push_many(1)?;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::StackUnderflow);
        }
        self.smt_ctx.pop_many(1)?;
        self.depth -= 1;
        Ok(())
    }

    /// Runs `f` inside of a fresh scope. The scope is closed even if `f` fails.
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.push()?;
        let res = f(self);
        self.pop()?;
        res
    }

    /// Renders a solver term, mostly useful for logging.
    pub fn display(&self, term: smt::SExpr) -> String {
        self.smt_ctx.display(term).to_string()
    }
}
