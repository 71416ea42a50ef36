// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::automaton::{Automaton, EdgeId};
use crate::expr::{
    Context, EvalError, Evaluator, ExprRef, Interpreter as _, Sort, StringRef, Valuations, Value,
};
use num_rational::Rational64;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Specifies how to initialize variables.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum InitKind {
    Zero,
    /// Pseudo random values from the given seed.
    Random(u64),
}

/// Random values are kept small so that a few steps of arithmetic do not overflow.
const RANDOM_RANGE: i64 = 1 << 16;

pub trait Simulator {
    /// Assigns an initial value to every variable and moves to the initial location.
    fn init(&mut self, kind: InitKind);

    /// Takes `edge`, which needs to start in the current location.
    fn step(&mut self, ctx: &Context, edge: EdgeId) -> Result<(), EvalError>;

    /// Change the value of a variable. Be careful!
    fn set(&mut self, name: StringRef, value: Value);

    fn get(&self, name: StringRef) -> Option<Value>;

    fn step_count(&self) -> u64;
}

/// Executes an automaton on concrete values.
pub struct Interpreter<'a> {
    automaton: &'a Automaton,
    location: StringRef,
    values: Valuations<Value>,
    step_count: u64,
}

impl<'a> Interpreter<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        let mut sim = Self {
            automaton,
            location: automaton.initial().id(),
            values: Valuations::new(),
            step_count: 0,
        };
        sim.init(InitKind::Zero);
        sim
    }

    pub fn location(&self) -> StringRef {
        self.location
    }

    pub fn values(&self) -> &Valuations<Value> {
        &self.values
    }

    fn eval_bool(&self, ctx: &Context, expr: ExprRef) -> Result<bool, EvalError> {
        match Evaluator::new(ctx, &self.values).interpret(expr, &Valuations::new())? {
            Value::Bool(value) => Ok(value),
            other => Err(EvalError::SortMismatch {
                expected: Sort::Bool,
                actual: other,
            }),
        }
    }

    /// Does the current configuration satisfy the invariant of the current location?
    pub fn invariant_holds(&self, ctx: &Context) -> Result<bool, EvalError> {
        let invariant = self.automaton.location(self.location).invariant();
        self.eval_bool(ctx, invariant)
    }

    /// All edges that could be taken from the current configuration.
    pub fn enabled_edges(&self, ctx: &Context) -> Result<Vec<EdgeId>, EvalError> {
        let mut enabled = Vec::new();
        for (id, edge) in self.automaton.outgoing(self.location) {
            if self.eval_bool(ctx, edge.guard())? {
                enabled.push(id);
            }
        }
        Ok(enabled)
    }
}

impl<'a> Simulator for Interpreter<'a> {
    fn init(&mut self, kind: InitKind) {
        self.location = self.automaton.initial().id();
        self.step_count = 0;
        let mut values = Valuations::new();
        match kind {
            InitKind::Zero => {
                for (name, sort) in self.automaton.declarations().iter() {
                    values.assign(name, Value::zero(sort));
                }
            }
            InitKind::Random(seed) => {
                let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed);
                for (name, sort) in self.automaton.declarations().iter() {
                    let value = match sort {
                        Sort::Bool => Value::Bool(rng.gen_bool(0.5)),
                        Sort::Int => Value::Int(rng.gen_range(-RANDOM_RANGE..RANDOM_RANGE)),
                        Sort::Real => Value::Real(Rational64::new(
                            rng.gen_range(-RANDOM_RANGE..RANDOM_RANGE),
                            rng.gen_range(1..64),
                        )),
                    };
                    values.assign(name, value);
                }
            }
        }
        self.values = values;
    }

    fn step(&mut self, ctx: &Context, edge_id: EdgeId) -> Result<(), EvalError> {
        let edge = self.automaton.edge(edge_id);
        assert_eq!(
            edge.source(),
            self.location,
            "edge #{} does not start in the current location",
            edge_id.index()
        );
        let mut next = Valuations::new();
        edge.update()
            .interpret(&mut Evaluator::new(ctx, &self.values), &mut next)?;
        for (name, value) in next.iter() {
            trace!("{}' = {value}", ctx.get_str(name));
            self.values.assign(name, *value);
        }
        self.location = edge.destination();
        self.step_count += 1;
        Ok(())
    }

    fn set(&mut self, name: StringRef, value: Value) {
        debug_assert_eq!(
            self.automaton.declarations().sort_of(name),
            Some(value.sort()),
            "value does not match the declared sort"
        );
        self.values.assign(name, value);
    }

    fn get(&self, name: StringRef) -> Option<Value> {
        self.values.get(name).copied()
    }

    fn step_count(&self) -> u64 {
        self.step_count
    }
}
