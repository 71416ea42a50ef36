// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

pub mod automaton;
pub mod expr;
pub mod search;
pub mod sim;
pub mod smt;
pub mod system;
