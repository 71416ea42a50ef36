// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::SymbolicState;
use crate::automaton::{check_condition, Automaton, AutomatonError};
use crate::expr::{Context, ExprRef, StringRef};
use crate::search::{Reachability, SearchStrategy, StateSpace};
use crate::smt::{self, Decision, Session};
use tracing::debug;

/// Successors of a state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub successors: Vec<SymbolicState>,
    /// Number of edges (or locations) for which the solver could not decide whether
    /// they are enabled. Their successors are missing from `successors`.
    pub undecided: usize,
}

/// When does an explored state count as reaching a goal?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoalRelation {
    /// Every configuration of the explored state is a goal configuration.
    #[default]
    Within,
    /// Every goal configuration is a configuration of the explored state.
    Covers,
    /// At least one configuration of the explored state is a goal configuration.
    Intersects,
}

/// Symbolic semantics of an automaton.
#[derive(Debug, Clone)]
pub struct TransitionSystem {
    automaton: Automaton,
}

impl TransitionSystem {
    pub fn new(automaton: Automaton) -> Self {
        Self { automaton }
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Makes all variables of the automaton known to the solver.
    pub fn declare(&self, ctx: &Context, solver: &mut Session) -> smt::Result<()> {
        solver.declare_all(ctx, self.automaton.declarations())
    }

    /// The initial location constrained by its invariant.
    pub fn initial(&self) -> SymbolicState {
        let loc = self.automaton.initial();
        SymbolicState::new(loc.id(), loc.invariant())
    }

    /// Creates a goal state after making sure that `location` exists and `constraint`
    /// is a boolean condition over the declared variables.
    pub fn goal(
        &self,
        ctx: &Context,
        location: StringRef,
        constraint: ExprRef,
    ) -> Result<SymbolicState, AutomatonError> {
        if self.automaton.find_location(location).is_none() {
            return Err(AutomatonError::UnknownLocation {
                what: "goal".to_string(),
                name: ctx.get_str(location).to_string(),
            });
        }
        check_condition(ctx, self.automaton.declarations(), constraint, "goal")?;
        Ok(SymbolicState::new(location, constraint))
    }

    /// Computes all successors of `state`. A location that admits no configuration under
    /// the constraint of `state` has no successors.
    pub fn outgoing(
        &self,
        ctx: &mut Context,
        solver: &mut Session,
        state: &SymbolicState,
    ) -> smt::Result<Expansion> {
        let location = self.automaton.location(state.location);
        let mut expansion = Expansion::default();

        let enabled = solver.scoped(|s| {
            s.assert(ctx, state.constraint)?;
            location.is_enabled(ctx, s)
        })?;
        match enabled {
            Decision::No => return Ok(expansion),
            Decision::Unknown => {
                expansion.undecided += 1;
                return Ok(expansion);
            }
            Decision::Yes => {}
        }

        for (id, edge) in self.automaton.outgoing(state.location) {
            match edge.is_enabled(ctx, state, solver)? {
                Decision::Yes => expansion.successors.push(edge.traverse(ctx, state)),
                Decision::No => {}
                Decision::Unknown => {
                    debug!("could not decide whether edge #{} is enabled", id.index());
                    expansion.undecided += 1;
                }
            }
        }
        Ok(expansion)
    }

    /// Searches for a path from the initial state to a state within one of the `goals`.
    ///
    /// This uses [`GoalRelation::Within`]: the explored constraint has to imply the goal
    /// constraint. Use [`TransitionSystem::reachability_with`] and [`GoalRelation::Covers`]
    /// to instead require that every goal configuration is contained in the explored state.
    pub fn reachability(
        &self,
        ctx: &mut Context,
        solver: &mut Session,
        strategy: &mut dyn SearchStrategy,
        goals: &[SymbolicState],
    ) -> smt::Result<Reachability> {
        self.reachability_from(ctx, solver, strategy, self.initial(), goals)
    }

    pub fn reachability_from(
        &self,
        ctx: &mut Context,
        solver: &mut Session,
        strategy: &mut dyn SearchStrategy,
        start: SymbolicState,
        goals: &[SymbolicState],
    ) -> smt::Result<Reachability> {
        self.reachability_with(ctx, solver, strategy, start, goals, GoalRelation::default())
    }

    pub fn reachability_with(
        &self,
        ctx: &mut Context,
        solver: &mut Session,
        strategy: &mut dyn SearchStrategy,
        start: SymbolicState,
        goals: &[SymbolicState],
        relation: GoalRelation,
    ) -> smt::Result<Reachability> {
        self.declare(ctx, solver)?;
        let mut space = Exploration {
            sys: self,
            ctx,
            solver,
            goals,
            relation,
        };
        strategy.search(&mut space, start)
    }
}

/// The states of a transition system as seen by a search strategy.
struct Exploration<'a> {
    sys: &'a TransitionSystem,
    ctx: &'a mut Context,
    solver: &'a mut Session,
    goals: &'a [SymbolicState],
    relation: GoalRelation,
}

impl<'a> Exploration<'a> {
    fn matches(&mut self, state: &SymbolicState, goal: &SymbolicState) -> smt::Result<Decision> {
        match self.relation {
            GoalRelation::Within => state.subset_of(goal, self.ctx, self.solver),
            GoalRelation::Covers => goal.subset_of(state, self.ctx, self.solver),
            GoalRelation::Intersects => {
                if state.location != goal.location {
                    return Ok(Decision::No);
                }
                let ctx = &*self.ctx;
                self.solver.scoped(|s| {
                    s.assert(ctx, state.constraint)?;
                    Ok(s.satisfiable(ctx, goal.constraint)?.as_decision())
                })
            }
        }
    }
}

impl<'a> StateSpace for Exploration<'a> {
    fn is_goal(&mut self, state: &SymbolicState) -> smt::Result<Decision> {
        let mut res = Decision::No;
        for goal in self.goals.iter() {
            match self.matches(state, goal)? {
                Decision::Yes => return Ok(Decision::Yes),
                Decision::Unknown => res = Decision::Unknown,
                Decision::No => {}
            }
        }
        Ok(res)
    }

    fn expand(&mut self, state: &SymbolicState) -> smt::Result<Expansion> {
        self.sys.outgoing(self.ctx, self.solver, state)
    }

    fn subsumed_by(
        &mut self,
        state: &SymbolicState,
        other: &SymbolicState,
    ) -> smt::Result<Decision> {
        state.subset_of(other, self.ctx, self.solver)
    }

    fn describe(&self, state: &SymbolicState) -> String {
        state.serialize_to_str(self.ctx)
    }

    fn goals_closed_under_subsumption(&self) -> bool {
        // a small state may be within a goal while the visited state containing it is not
        self.relation != GoalRelation::Within
    }
}
