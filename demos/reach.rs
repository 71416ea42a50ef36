// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use clap::{Parser, ValueEnum};
use symreach::automaton::{Automaton, Edge, Location, Update};
use symreach::expr::{Context, Declarations, Sort, Value};
use symreach::search::{BreadthFirst, DepthFirst, Reachability, SearchOptions, SearchStrategy};
use symreach::smt::{Session, SessionOptions, CVC5_CMD, Z3_CMD};
use symreach::system::{GoalRelation, SymbolicState, TransitionSystem};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reach")]
#[command(author = "Kevin Laeufer <laeufer@cornell.edu>")]
#[command(version)]
#[command(
    about = "Searches a small counter automaton for a path from `x = START` to `x = TARGET` in location `done`.",
    long_about = None
)]
struct Args {
    #[arg(value_name = "START", index = 1)]
    start: i64,
    #[arg(value_name = "TARGET", index = 2)]
    target: i64,
    #[arg(long, value_enum, default_value = "bfs")]
    strategy: Strategy,
    #[arg(long, value_enum, default_value = "z3")]
    solver: Solver,
    #[arg(long, value_enum, default_value = "within")]
    relation: Relation,
    #[arg(long, help = "stop after expanding this many states")]
    max_expansions: Option<usize>,
    #[arg(long, help = "skip states that are contained in an already visited state")]
    prune: bool,
    #[arg(long, help = "timeout for every solver query in milliseconds")]
    timeout: Option<u64>,
    #[arg(long, help = "saves all solver commands to replay.smt")]
    save_smt_replay: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Strategy {
    Bfs,
    Dfs,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Solver {
    Z3,
    Cvc5,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Relation {
    Within,
    Covers,
    Intersects,
}

/// `count` increments `x` by one or two as long as `x < target`, `done` is entered once
/// `x >= target`.
fn counter(ctx: &mut Context, target: i64) -> Automaton {
    let mut decls = Declarations::default();
    let x_name = decls
        .declare_str(ctx, "x", Sort::Int)
        .expect("failed to declare x");
    let x = ctx.int_var("x");
    let one = ctx.int(1);
    let two = ctx.int(2);
    let limit = ctx.int(target);
    let below = ctx.less(x, limit);
    let reached = ctx.greater_or_equal(x, limit);
    let inc1 = ctx.add(x, one);
    let inc2 = ctx.add(x, two);
    let t = ctx.tru();
    let count = ctx.string("count".into());
    let done = ctx.string("done".into());
    Automaton::new(
        ctx,
        decls,
        [Location::new(count, t), Location::new(done, t)],
        [
            Edge::new(count, below, Update::assignments([(x_name, inc1)]), count),
            Edge::new(count, below, Update::assignments([(x_name, inc2)]), count),
            Edge::new(count, reached, Update::empty(), done),
        ],
        count,
    )
    .expect("invalid automaton")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut ctx = Context::default();
    let sys = TransitionSystem::new(counter(&mut ctx, args.target));
    println!(
        "Loaded automaton with {} locations",
        sys.automaton().locations().count()
    );

    let x_name = ctx.string("x".into());
    let count = sys.initial().location;
    let start = SymbolicState::from_valuation(&mut ctx, count, [(x_name, Value::Int(args.start))]);
    let x = ctx.int_var("x");
    let target = ctx.int(args.target);
    let at_target = ctx.equal(x, target);
    let done = ctx.string("done".into());
    let goal = sys
        .goal(&ctx, done, at_target)
        .expect("failed to create goal");

    let cmd = match args.solver {
        Solver::Z3 => Z3_CMD,
        Solver::Cvc5 => CVC5_CMD,
    };
    let session_opts = SessionOptions {
        timeout_ms: args.timeout,
        save_smt_replay: args.save_smt_replay,
    };
    let mut solver = Session::start(cmd, session_opts).expect("failed to start SMT solver");

    let options = SearchOptions {
        max_expansions: args.max_expansions,
        prune_subsumed: args.prune,
        abort: None,
    };
    let mut strategy: Box<dyn SearchStrategy> = match args.strategy {
        Strategy::Bfs => Box::new(BreadthFirst::new(options)),
        Strategy::Dfs => Box::new(DepthFirst::new(options)),
    };
    let relation = match args.relation {
        Relation::Within => GoalRelation::Within,
        Relation::Covers => GoalRelation::Covers,
        Relation::Intersects => GoalRelation::Intersects,
    };

    let res = sys
        .reachability_with(&mut ctx, &mut solver, strategy.as_mut(), start, &[goal], relation)
        .expect("solver failure");
    match res {
        Reachability::Reached(trace) => {
            println!("reachable in {} steps:", trace.len() - 1);
            print!("{}", trace.serialize_to_str(&ctx));
        }
        Reachability::Unreachable => println!("unreachable"),
        Reachability::Undecided(reason) => println!("unknown: {reason:?}"),
        Reachability::Aborted => println!("aborted"),
    }
}
