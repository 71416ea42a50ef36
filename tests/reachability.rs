// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use symreach::automaton::{Automaton, AutomatonError, Edge, Location, Statement, Update};
use symreach::expr::{Context, Declarations, ExprRef, SerializableIrNode, Sort, StringRef, Value};
use symreach::search::{
    BreadthFirst, DepthFirst, Reachability, SearchOptions, SearchStrategy, Undecided,
};
use symreach::smt::{CheckSatResponse, Decision, Error, Session, SessionOptions, Z3_CMD};
use symreach::system::{GoalRelation, SymbolicState, TransitionSystem};

fn z3() -> Session {
    Session::start(Z3_CMD, SessionOptions::default()).expect("failed to start z3")
}

struct TwoLocations {
    ctx: Context,
    sys: TransitionSystem,
    x: StringRef,
    l0: StringRef,
    l1: StringRef,
}

/// `L0 -> L1` guarded by `x == 2` without an update.
fn two_locations() -> TwoLocations {
    let mut ctx = Context::default();
    let mut decls = Declarations::default();
    let x = decls.declare_str(&mut ctx, "x", Sort::Int).unwrap();
    let l0 = ctx.string("L0".into());
    let l1 = ctx.string("L1".into());
    let t = ctx.tru();
    let x_var = ctx.int_var("x");
    let two = ctx.int(2);
    let guard = ctx.equal(x_var, two);
    let automaton = Automaton::new(
        &ctx,
        decls,
        [Location::new(l0, t), Location::new(l1, t)],
        [Edge::new(l0, guard, Update::empty(), l1)],
        l0,
    )
    .unwrap();
    TwoLocations {
        ctx,
        sys: TransitionSystem::new(automaton),
        x,
        l0,
        l1,
    }
}

fn holds_in(ctx: &Context, solver: &mut Session, state: &SymbolicState, prop: ExprRef) -> Decision {
    solver
        .scoped(|s| {
            s.assert(ctx, state.constraint)?;
            s.proven(ctx, prop)
        })
        .unwrap()
}

#[test]
fn two_location_scenario() {
    let TwoLocations {
        mut ctx,
        sys,
        x,
        l0,
        l1,
    } = two_locations();
    let mut solver = z3();
    let t = ctx.tru();
    let goal = sys.goal(&ctx, l1, t).unwrap();

    let start = SymbolicState::from_valuation(&mut ctx, l0, [(x, Value::Int(2))]);
    let res = sys
        .reachability_from(&mut ctx, &mut solver, &mut BreadthFirst::default(), start, &[goal])
        .unwrap();
    let trace = res.trace().expect("goal should be reachable");
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.states()[0], start);
    assert_eq!(trace.last().location, l1);
    assert_eq!(
        trace.serialize_to_str(&ctx),
        "0: L0: (x == 2)\n1: L1: ((x == 2) && (x == 2))\n"
    );

    let start = SymbolicState::from_valuation(&mut ctx, l0, [(x, Value::Int(3))]);
    let res = sys
        .reachability_from(&mut ctx, &mut solver, &mut BreadthFirst::default(), start, &[goal])
        .unwrap();
    assert_eq!(res, Reachability::Unreachable);
}

#[test]
fn goal_relations() {
    let TwoLocations {
        mut ctx,
        sys,
        x,
        l0,
        l1,
    } = two_locations();
    let mut solver = z3();
    let t = ctx.tru();
    let goal = sys.goal(&ctx, l1, t).unwrap();
    let start = SymbolicState::from_valuation(&mut ctx, l0, [(x, Value::Int(2))]);

    // `true` is not contained in `x == 2`
    let res = sys
        .reachability_with(
            &mut ctx,
            &mut solver,
            &mut BreadthFirst::default(),
            start,
            &[goal],
            GoalRelation::Covers,
        )
        .unwrap();
    assert_eq!(res, Reachability::Unreachable);

    let res = sys
        .reachability_with(
            &mut ctx,
            &mut solver,
            &mut BreadthFirst::default(),
            start,
            &[goal],
            GoalRelation::Intersects,
        )
        .unwrap();
    assert!(res.is_reached());

    // from an unconstrained start, x == 5 is possible in L0 but not guaranteed
    let x_var = ctx.int_var("x");
    let five = ctx.int(5);
    let is_five = ctx.equal(x_var, five);
    let goal = sys.goal(&ctx, l0, is_five).unwrap();
    let initial = sys.initial();
    let mut bfs = BreadthFirst::default();
    let within = sys
        .reachability(&mut ctx, &mut solver, &mut bfs, &[goal])
        .unwrap();
    assert!(within.is_unreachable());
    let intersects = sys
        .reachability_with(
            &mut ctx,
            &mut solver,
            &mut bfs,
            initial,
            &[goal],
            GoalRelation::Intersects,
        )
        .unwrap();
    assert_eq!(intersects.trace().map(|t| t.len()), Some(1));
}

#[test]
fn goal_validation() {
    let TwoLocations { mut ctx, sys, .. } = two_locations();
    let missing = ctx.string("L7".into());
    let t = ctx.tru();
    assert!(matches!(
        sys.goal(&ctx, missing, t),
        Err(AutomatonError::UnknownLocation { .. })
    ));
    let l0 = ctx.string("L0".into());
    let y = ctx.int_var("y");
    let zero = ctx.int(0);
    let y_pos = ctx.greater(y, zero);
    assert!(matches!(
        sys.goal(&ctx, l0, y_pos),
        Err(AutomatonError::UndeclaredVariable { .. })
    ));
}

/// One location with a self loop that runs `update` when `guard` holds.
fn self_loop(ctx: &mut Context, names: &[&str], guard: ExprRef, update: Update) -> TransitionSystem {
    let mut decls = Declarations::default();
    for name in names {
        decls.declare_str(ctx, name, Sort::Int).unwrap();
    }
    let l0 = ctx.string("L0".into());
    let t = ctx.tru();
    let automaton = Automaton::new(
        ctx,
        decls,
        [Location::new(l0, t)],
        [Edge::new(l0, guard, update, l0)],
        l0,
    )
    .unwrap();
    TransitionSystem::new(automaton)
}

#[test]
fn assignment_of_constant_is_proven() {
    let mut ctx = Context::default();
    let x_name = ctx.string("x".into());
    let two = ctx.int(2);
    let t = ctx.tru();
    let sys = self_loop(&mut ctx, &["x"], t, Update::assignments([(x_name, two)]));
    let mut solver = z3();
    sys.declare(&ctx, &mut solver).unwrap();
    let x = ctx.int_var("x");
    let x_is_two = ctx.equal(x, two);

    let l0 = sys.initial().location;
    for before in [-5, 2, 7] {
        let state = SymbolicState::from_valuation(&mut ctx, l0, [(x_name, Value::Int(before))]);
        let next = sys.outgoing(&mut ctx, &mut solver, &state).unwrap();
        assert_eq!(next.successors.len(), 1);
        let succ = next.successors[0];
        assert_eq!(holds_in(&ctx, &mut solver, &succ, x_is_two), Decision::Yes);
    }
    // also from an unconstrained state
    let state = sys.initial();
    let next = sys.outgoing(&mut ctx, &mut solver, &state).unwrap();
    assert_eq!(
        holds_in(&ctx, &mut solver, &next.successors[0], x_is_two),
        Decision::Yes
    );
}

#[test]
fn unassigned_variables_keep_their_value() {
    let mut ctx = Context::default();
    let x_name = ctx.string("x".into());
    let y_name = ctx.string("y".into());
    let x = ctx.int_var("x");
    let y = ctx.int_var("y");
    let one = ctx.int(1);
    let inc = ctx.add(x, one);
    let t = ctx.tru();
    let sys = self_loop(&mut ctx, &["x", "y"], t, Update::assignments([(x_name, inc)]));
    let mut solver = z3();
    sys.declare(&ctx, &mut solver).unwrap();

    let l0 = sys.initial().location;
    let state = SymbolicState::from_valuation(
        &mut ctx,
        l0,
        [(x_name, Value::Int(10)), (y_name, Value::Int(-4))],
    );
    let next = sys.outgoing(&mut ctx, &mut solver, &state).unwrap().successors[0];
    let minus_four = ctx.int(-4);
    let eleven = ctx.int(11);
    let y_kept = ctx.equal(y, minus_four);
    let x_inc = ctx.equal(x, eleven);
    assert_eq!(holds_in(&ctx, &mut solver, &next, y_kept), Decision::Yes);
    assert_eq!(holds_in(&ctx, &mut solver, &next, x_inc), Decision::Yes);
    insta::assert_snapshot!(next.constraint.serialize_to_str(&ctx), @"exists x@0: Int. (((x@0 == 10) && (y == -4)) && (x == (x@0 + 1)))");
}

#[test]
fn updates_are_sequenced() {
    let mut ctx = Context::default();
    let v_name = ctx.string("v".into());
    let w_name = ctx.string("w".into());
    let v = ctx.int_var("v");
    let w = ctx.int_var("w");
    let v_next = ctx.primed(v);
    let one = ctx.int(1);
    let ten = ctx.int(10);
    let e1 = ctx.add(v, one);
    let e2 = ctx.mul(v_next, ten);
    let update = Update::new(vec![
        Statement::Assignment { lhs: v_name, rhs: e1 },
        Statement::Assignment { lhs: w_name, rhs: e2 },
    ]);
    let t = ctx.tru();
    let sys = self_loop(&mut ctx, &["v", "w"], t, update);
    let mut solver = z3();
    sys.declare(&ctx, &mut solver).unwrap();

    let l0 = sys.initial().location;
    let state = SymbolicState::from_valuation(
        &mut ctx,
        l0,
        [(v_name, Value::Int(4)), (w_name, Value::Int(0))],
    );
    let next = sys.outgoing(&mut ctx, &mut solver, &state).unwrap().successors[0];
    let fifty = ctx.int(50);
    let forty = ctx.int(40);
    let new_value = ctx.equal(w, fifty);
    let old_value = ctx.equal(w, forty);
    assert_eq!(holds_in(&ctx, &mut solver, &next, new_value), Decision::Yes);
    assert_eq!(holds_in(&ctx, &mut solver, &next, old_value), Decision::No);
}

#[test]
fn subsumption() {
    let TwoLocations {
        mut ctx,
        sys,
        x,
        l0,
        l1,
    } = two_locations();
    let mut solver = z3();
    sys.declare(&ctx, &mut solver).unwrap();

    let a = SymbolicState::from_valuation(&mut ctx, l0, [(x, Value::Int(2))]);
    assert_eq!(a.subset_of(&a, &ctx, &mut solver).unwrap(), Decision::Yes);

    let x_var = ctx.int_var("x");
    let zero = ctx.int(0);
    let positive = ctx.greater(x_var, zero);
    let b = SymbolicState::new(l0, positive);
    assert_eq!(b.subset_of(&b, &ctx, &mut solver).unwrap(), Decision::Yes);
    assert_eq!(a.subset_of(&b, &ctx, &mut solver).unwrap(), Decision::Yes);
    assert_eq!(b.subset_of(&a, &ctx, &mut solver).unwrap(), Decision::No);

    // same constraint, different location
    let t = ctx.tru();
    let c = SymbolicState::new(l0, t);
    let d = SymbolicState::new(l1, t);
    assert_eq!(c.subset_of(&d, &ctx, &mut solver).unwrap(), Decision::No);
    assert_eq!(a.subset_of(&d, &ctx, &mut solver).unwrap(), Decision::No);
}

#[test]
fn disabled_location_has_no_successors() {
    let mut ctx = Context::default();
    let mut decls = Declarations::default();
    decls.declare_str(&mut ctx, "x", Sort::Int).unwrap();
    let x = ctx.int_var("x");
    let zero = ctx.int(0);
    let pos = ctx.greater(x, zero);
    let neg = ctx.less(x, zero);
    let impossible = ctx.conjunction([pos, neg]);
    let t = ctx.tru();
    let l0 = ctx.string("L0".into());
    let l1 = ctx.string("L1".into());
    let automaton = Automaton::new(
        &ctx,
        decls,
        [Location::new(l0, impossible), Location::new(l1, t)],
        [
            Edge::new(l0, t, Update::empty(), l1),
            Edge::new(l0, t, Update::empty(), l0),
        ],
        l0,
    )
    .unwrap();
    let sys = TransitionSystem::new(automaton);
    let mut solver = z3();
    sys.declare(&ctx, &mut solver).unwrap();

    let unconstrained = SymbolicState::new(l0, t);
    let next = sys.outgoing(&mut ctx, &mut solver, &unconstrained).unwrap();
    assert!(next.successors.is_empty());
    assert_eq!(next.undecided, 0);

    let goal = sys.goal(&ctx, l1, t).unwrap();
    let res = sys
        .reachability(&mut ctx, &mut solver, &mut BreadthFirst::default(), &[goal])
        .unwrap();
    assert!(res.is_unreachable());
}

/// `x` counts up forever.
fn counter(ctx: &mut Context) -> TransitionSystem {
    let x_name = ctx.string("x".into());
    let x = ctx.int_var("x");
    let one = ctx.int(1);
    let inc = ctx.add(x, one);
    let t = ctx.tru();
    let mut decls = Declarations::default();
    decls.declare(ctx, x_name, Sort::Int).unwrap();
    let l0 = ctx.string("L0".into());
    let automaton = Automaton::new(
        ctx,
        decls,
        [Location::new(l0, t)],
        [Edge::new(l0, t, Update::assignments([(x_name, inc)]), l0)],
        l0,
    )
    .unwrap();
    TransitionSystem::new(automaton)
}

#[test]
fn breadth_and_depth_first_agree_on_counter() {
    let mut ctx = Context::default();
    let sys = counter(&mut ctx);
    let mut solver = z3();
    let x = ctx.int_var("x");
    let three = ctx.int(3);
    let is_three = ctx.equal(x, three);
    let l0 = sys.initial().location;
    let goal = sys.goal(&ctx, l0, is_three).unwrap();
    let x_name = ctx.string("x".into());
    let start = SymbolicState::from_valuation(&mut ctx, l0, [(x_name, Value::Int(0))]);

    let options = SearchOptions::with_budget(20);
    let strategies: [Box<dyn SearchStrategy>; 2] = [
        Box::new(BreadthFirst::new(options.clone())),
        Box::new(DepthFirst::new(options)),
    ];
    for mut strategy in strategies {
        let res = sys
            .reachability_from(&mut ctx, &mut solver, strategy.as_mut(), start, &[goal])
            .unwrap();
        assert_eq!(res.trace().map(|t| t.len()), Some(4));
    }
}

#[test]
fn budget_exhaustion_is_not_unreachability() {
    let mut ctx = Context::default();
    let sys = counter(&mut ctx);
    let mut solver = z3();
    let x = ctx.int_var("x");
    let zero = ctx.int(0);
    let negative = ctx.less(x, zero);
    let l0 = sys.initial().location;
    let goal = sys.goal(&ctx, l0, negative).unwrap();
    let x_name = ctx.string("x".into());
    let start = SymbolicState::from_valuation(&mut ctx, l0, [(x_name, Value::Int(0))]);

    let mut bfs = BreadthFirst::new(SearchOptions::with_budget(3));
    let res = sys
        .reachability_from(&mut ctx, &mut solver, &mut bfs, start, &[goal])
        .unwrap();
    assert_eq!(
        res,
        Reachability::Undecided(Undecided::BudgetExhausted {
            expansions: 3,
            frontier: 1
        })
    );
}

#[test]
fn pruning_terminates_on_self_loops() {
    let mut ctx = Context::default();
    let x_name = ctx.string("x".into());
    let x = ctx.int_var("x");
    let zero = ctx.int(0);
    let ten = ctx.int(10);
    let guard = ctx.greater(x, zero);
    // x' := x, i.e. nothing changes
    let sys = self_loop(&mut ctx, &["x"], guard, Update::assignments([(x_name, x)]));
    let mut solver = z3();
    let l0 = sys.initial().location;
    let above_ten = ctx.greater(x, ten);
    let goal = sys.goal(&ctx, l0, above_ten).unwrap();
    let start = SymbolicState::from_valuation(&mut ctx, l0, [(x_name, Value::Int(5))]);

    // every successor has a freshly named constraint, thus only semantic subsumption
    // stops the search, which requires goals that are closed under subsumption
    let mut dfs = DepthFirst::new(SearchOptions::with_pruning());
    let res = sys
        .reachability_with(
            &mut ctx,
            &mut solver,
            &mut dfs,
            start,
            &[goal],
            GoalRelation::Intersects,
        )
        .unwrap();
    assert!(res.is_unreachable());
}

#[test]
fn pruning_keeps_narrower_goal_states() {
    let mut ctx = Context::default();
    let x_name = ctx.string("x".into());
    let five = ctx.int(5);
    let t = ctx.tru();
    let sys = self_loop(&mut ctx, &["x"], t, Update::assignments([(x_name, five)]));
    let mut solver = z3();
    let x = ctx.int_var("x");
    let is_five = ctx.equal(x, five);
    let l0 = sys.initial().location;
    let goal = sys.goal(&ctx, l0, is_five).unwrap();

    // the successor `x == 5` is contained in the unconstrained start state
    let mut bfs = BreadthFirst::new(SearchOptions::with_pruning());
    let res = sys
        .reachability(&mut ctx, &mut solver, &mut bfs, &[goal])
        .unwrap();
    let trace = res.trace().expect("x == 5 is reachable");
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.states()[0], sys.initial());
    assert_eq!(
        holds_in(&ctx, &mut solver, trace.last(), is_five),
        Decision::Yes
    );

    let mut bfs = BreadthFirst::new(SearchOptions::unbounded());
    let unpruned = sys
        .reachability(&mut ctx, &mut solver, &mut bfs, &[goal])
        .unwrap();
    assert_eq!(unpruned, res);
}

#[test]
fn solver_facade() {
    let mut ctx = Context::default();
    let mut solver = z3();
    let x_name = ctx.string("x".into());
    let x = ctx.int_var("x");
    let zero = ctx.int(0);
    let pos = ctx.greater(x, zero);

    // undeclared variables are an error
    assert!(matches!(
        solver.satisfiable(&ctx, pos),
        Err(Error::UndeclaredVariable(name)) if name == "x"
    ));

    solver.declare_variable(&ctx, x_name, Sort::Int).unwrap();
    solver.declare_variable(&ctx, x_name, Sort::Int).unwrap();
    assert!(matches!(
        solver.declare_variable(&ctx, x_name, Sort::Real),
        Err(Error::SortConflict { .. })
    ));

    assert_eq!(solver.satisfiable(&ctx, pos).unwrap(), CheckSatResponse::Sat);
    assert_eq!(solver.proven(&ctx, pos).unwrap(), Decision::No);

    solver.push().unwrap();
    solver.assert(&ctx, pos).unwrap();
    let neg = ctx.less(x, zero);
    assert_eq!(solver.satisfiable(&ctx, neg).unwrap(), CheckSatResponse::Unsat);
    assert_eq!(solver.proven(&ctx, pos).unwrap(), Decision::Yes);
    solver.pop().unwrap();
    assert_eq!(solver.satisfiable(&ctx, neg).unwrap(), CheckSatResponse::Sat);
    assert!(matches!(solver.pop(), Err(Error::StackUnderflow)));

    // literal only expressions do not depend on any declarations
    let a = ctx.int(7);
    let b = ctx.int(3);
    let m = ctx.modulo(a, b);
    let one = ctx.int(1);
    let is_one = ctx.equal(m, one);
    assert_eq!(solver.proven(&ctx, is_one).unwrap(), Decision::Yes);
    assert_eq!(solver.proven(&ctx, is_one).unwrap(), Decision::Yes);
    let six = ctx.int(6);
    let divides = ctx.divides(b, six);
    assert_eq!(solver.proven(&ctx, divides).unwrap(), Decision::Yes);
    let minus_seven_halves = ctx.real(-7, 2);
    let floor = ctx.to_int(minus_seven_halves);
    let minus_four = ctx.int(-4);
    let is_floor = ctx.equal(floor, minus_four);
    assert_eq!(solver.proven(&ctx, is_floor).unwrap(), Decision::Yes);
    let x_real = ctx.to_real(x);
    let integral = ctx.is_int(x_real);
    assert_eq!(solver.proven(&ctx, integral).unwrap(), Decision::Yes);
    let empty_and = ctx.conjunction([]);
    let empty_or = ctx.disjunction([]);
    assert_eq!(solver.proven(&ctx, empty_and).unwrap(), Decision::Yes);
    assert_eq!(solver.satisfiable(&ctx, empty_or).unwrap(), CheckSatResponse::Unsat);
    assert_eq!(solver.entails(&ctx, pos, pos).unwrap(), Decision::Yes);
    assert_eq!(solver.depth(), 0);
}
