// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Context, Sort, StringRef};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("variables can only be integers or reals, `{0}` was declared as Bool")]
    BoolVariable(String),
    #[error("`{name}` is already declared as {existing}, cannot redeclare it as {requested}")]
    SortConflict {
        name: String,
        existing: Sort,
        requested: Sort,
    },
}

/// Maps every variable to its sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    vars: IndexMap<StringRef, Sort>,
}

impl Declarations {
    /// Declares a variable. Declaring the same variable twice with the same sort is a no-op.
    pub fn declare(
        &mut self,
        ctx: &Context,
        name: StringRef,
        sort: Sort,
    ) -> Result<(), DeclarationError> {
        if sort == Sort::Bool {
            return Err(DeclarationError::BoolVariable(ctx.get_str(name).to_string()));
        }
        match self.vars.get(&name) {
            Some(existing) if *existing != sort => Err(DeclarationError::SortConflict {
                name: ctx.get_str(name).to_string(),
                existing: *existing,
                requested: sort,
            }),
            Some(_) => Ok(()),
            None => {
                self.vars.insert(name, sort);
                Ok(())
            }
        }
    }

    /// Interns `name` and declares it.
    pub fn declare_str(
        &mut self,
        ctx: &mut Context,
        name: &str,
        sort: Sort,
    ) -> Result<StringRef, DeclarationError> {
        let name_ref = ctx.string(name.into());
        self.declare(ctx, name_ref, sort)?;
        Ok(name_ref)
    }

    pub fn sort_of(&self, name: StringRef) -> Option<Sort> {
        self.vars.get(&name).copied()
    }

    pub fn contains(&self, name: StringRef) -> bool {
        self.vars.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StringRef, Sort)> + '_ {
        self.vars.iter().map(|(n, s)| (*n, *s))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
