// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod edge;
mod location;
mod update;

pub use edge::Edge;
pub use location::Location;
pub use update::{Statement, Update};

use crate::expr::{
    visit_dag, Context, Declarations, Expr, ExprRef, Sort, StringRef, TypeCheck, TypeCheckError,
};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("location `{0}` is defined more than once")]
    DuplicateLocation(String),
    #[error("{what} references unknown location `{name}`")]
    UnknownLocation { what: String, name: String },
    #[error("{what} uses undeclared variable `{name}`")]
    UndeclaredVariable { what: String, name: String },
    #[error("{what} uses `{name}` as {used}, but it is declared as {declared}")]
    SortMismatch {
        what: String,
        name: String,
        declared: Sort,
        used: Sort,
    },
    #[error("{what} is ill-typed: {source}")]
    IllTyped {
        what: String,
        source: TypeCheckError,
    },
    #[error("{what} needs to be a boolean, not {sort}")]
    NotBoolean { what: String, sort: Sort },
    #[error("{what} may only refer to current values, not to `{name}'`")]
    MisplacedValuation { what: String, name: String },
}

pub type Result<T> = std::result::Result<T, AutomatonError>;

/// Index of an edge inside of its automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u32);

impl EdgeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Locations connected by guarded edges that update integer and real variables.
#[derive(Debug, Clone)]
pub struct Automaton {
    declarations: Declarations,
    locations: IndexMap<StringRef, Location>,
    edges: Vec<Edge>,
    /// edges indexed by source location
    outgoing: IndexMap<StringRef, Vec<EdgeId>>,
    initial: StringRef,
}

impl Automaton {
    /// Checks that all locations are unique and that every expression is well-typed and
    /// only uses declared variables.
    pub fn new(
        ctx: &Context,
        declarations: Declarations,
        locations: impl IntoIterator<Item = Location>,
        edges: impl IntoIterator<Item = Edge>,
        initial: StringRef,
    ) -> Result<Self> {
        let mut by_id = IndexMap::new();
        for loc in locations {
            let what = format!("invariant of `{}`", ctx.get_str(loc.id()));
            check_condition(ctx, &declarations, loc.invariant(), &what)?;
            if by_id.insert(loc.id(), loc).is_some() {
                return Err(AutomatonError::DuplicateLocation(
                    ctx.get_str(loc.id()).to_string(),
                ));
            }
        }

        let resolve = |what: &str, id: StringRef| -> Result<()> {
            if by_id.contains_key(&id) {
                Ok(())
            } else {
                Err(AutomatonError::UnknownLocation {
                    what: what.to_string(),
                    name: ctx.get_str(id).to_string(),
                })
            }
        };
        resolve("initial location", initial)?;

        let edges: Vec<Edge> = edges.into_iter().collect();
        let mut outgoing: IndexMap<StringRef, Vec<EdgeId>> = IndexMap::new();
        for (ii, edge) in edges.iter().enumerate() {
            let what = format!(
                "edge #{ii} ({} -> {})",
                ctx.get_str(edge.source()),
                ctx.get_str(edge.destination())
            );
            resolve(&what, edge.source())?;
            resolve(&what, edge.destination())?;
            check_condition(ctx, &declarations, edge.guard(), &format!("guard of {what}"))?;
            check_update(ctx, &declarations, edge.update(), &what)?;
            outgoing
                .entry(edge.source())
                .or_default()
                .push(EdgeId(ii as u32));
        }

        Ok(Self {
            declarations,
            locations: by_id,
            edges,
            outgoing,
            initial,
        })
    }

    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    pub fn initial(&self) -> &Location {
        self.location(self.initial)
    }

    pub fn find_location(&self, id: StringRef) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Panics if `id` does not belong to this automaton, since a state that refers to an
    /// unknown location was not created from this automaton.
    pub fn location(&self, id: StringRef) -> &Location {
        self.find_location(id)
            .unwrap_or_else(|| panic!("invalid location reference {id:?}"))
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> + '_ {
        self.locations.values()
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(ii, e)| (EdgeId(ii as u32), e))
    }

    /// All edges that start in `source`.
    pub fn outgoing(&self, source: StringRef) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.outgoing
            .get(&source)
            .into_iter()
            .flatten()
            .map(|id| (*id, self.edge(*id)))
    }
}

/// Makes sure that all variables in `expr` are declared with a matching sort.
fn check_variables(
    ctx: &Context,
    declarations: &Declarations,
    expr: ExprRef,
    what: &str,
    allow_valuations: bool,
) -> Result<()> {
    let mut res = Ok(());
    visit_dag(ctx, expr, |_, node| {
        if res.is_err() {
            return;
        }
        let (name, sort) = match node {
            Expr::Variable { name, sort } => (*name, *sort),
            Expr::Valuation { name, sort } => {
                if !allow_valuations {
                    res = Err(AutomatonError::MisplacedValuation {
                        what: what.to_string(),
                        name: ctx.get_str(*name).to_string(),
                    });
                    return;
                }
                (*name, *sort)
            }
            _ => return,
        };
        res = match declarations.sort_of(name) {
            None => Err(AutomatonError::UndeclaredVariable {
                what: what.to_string(),
                name: ctx.get_str(name).to_string(),
            }),
            Some(declared) if declared != sort => Err(AutomatonError::SortMismatch {
                what: what.to_string(),
                name: ctx.get_str(name).to_string(),
                declared,
                used: sort,
            }),
            Some(_) => Ok(()),
        };
    });
    res
}

fn check_typed(ctx: &Context, expr: ExprRef, what: &str) -> Result<Sort> {
    expr.type_check(ctx)
        .map_err(|source| AutomatonError::IllTyped {
            what: what.to_string(),
            source,
        })
}

/// Guards and invariants.
pub(crate) fn check_condition(
    ctx: &Context,
    declarations: &Declarations,
    expr: ExprRef,
    what: &str,
) -> Result<()> {
    check_variables(ctx, declarations, expr, what, false)?;
    match check_typed(ctx, expr, what)? {
        Sort::Bool => Ok(()),
        sort => Err(AutomatonError::NotBoolean {
            what: what.to_string(),
            sort,
        }),
    }
}

fn check_update(
    ctx: &Context,
    declarations: &Declarations,
    update: &Update,
    edge: &str,
) -> Result<()> {
    let mut res = Ok(());
    update.for_each_assignment(|lhs, rhs| {
        if res.is_err() {
            return;
        }
        let what = format!("assignment to `{}` on {edge}", ctx.get_str(lhs));
        res = check_variables(ctx, declarations, rhs, &what, true)
            .and_then(|_| check_typed(ctx, rhs, &what))
            .and_then(|sort| match declarations.sort_of(lhs) {
                None => Err(AutomatonError::UndeclaredVariable {
                    what: what.clone(),
                    name: ctx.get_str(lhs).to_string(),
                }),
                Some(declared) if declared != sort => Err(AutomatonError::SortMismatch {
                    what: what.clone(),
                    name: ctx.get_str(lhs).to_string(),
                    declared,
                    used: sort,
                }),
                Some(_) => Ok(()),
            });
    });
    res
}
