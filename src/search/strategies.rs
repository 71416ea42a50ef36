// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::explore::{explore, Frontier, NodeId};
use super::{Reachability, SearchOptions, SearchStrategy, StateSpace};
use crate::smt;
use crate::system::SymbolicState;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

/// Explores states level by level. Finds a trace with the fewest edges.
#[derive(Debug, Clone, Default)]
pub struct BreadthFirst {
    options: SearchOptions,
}

impl BreadthFirst {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }
}

#[derive(Default)]
struct Queue(VecDeque<NodeId>);

impl Frontier for Queue {
    fn push(&mut self, node: NodeId, _state: &SymbolicState, _depth: usize) {
        self.0.push_back(node);
    }

    fn pop(&mut self) -> Option<NodeId> {
        self.0.pop_front()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

impl SearchStrategy for BreadthFirst {
    fn search(
        &mut self,
        space: &mut dyn StateSpace,
        initial: SymbolicState,
    ) -> smt::Result<Reachability> {
        explore(&mut Queue::default(), &self.options, space, initial)
    }
}

/// Always expands the most recently discovered state first.
#[derive(Debug, Clone, Default)]
pub struct DepthFirst {
    options: SearchOptions,
}

impl DepthFirst {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }
}

#[derive(Default)]
struct Stack(Vec<NodeId>);

impl Frontier for Stack {
    fn push(&mut self, node: NodeId, _state: &SymbolicState, _depth: usize) {
        self.0.push(node);
    }

    fn pop(&mut self) -> Option<NodeId> {
        self.0.pop()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

impl SearchStrategy for DepthFirst {
    fn search(
        &mut self,
        space: &mut dyn StateSpace,
        initial: SymbolicState,
    ) -> smt::Result<Reachability> {
        explore(&mut Stack::default(), &self.options, space, initial)
    }
}

/// Priority of a state with the given depth. States with a higher priority are expanded first.
pub type Priority<'a> = Box<dyn FnMut(&SymbolicState, usize) -> i64 + 'a>;

/// Expands states in the order given by a user supplied priority.
/// States with equal priority are expanded in the order in which they were discovered.
pub struct BestFirst<'a> {
    options: SearchOptions,
    priority: Priority<'a>,
}

impl<'a> BestFirst<'a> {
    pub fn new(
        options: SearchOptions,
        priority: impl FnMut(&SymbolicState, usize) -> i64 + 'a,
    ) -> Self {
        Self {
            options,
            priority: Box::new(priority),
        }
    }
}

struct Heap<'b, 'a> {
    priority: &'b mut Priority<'a>,
    heap: BinaryHeap<(i64, Reverse<u64>, NodeId)>,
    count: u64,
}

impl<'b, 'a> Frontier for Heap<'b, 'a> {
    fn push(&mut self, node: NodeId, state: &SymbolicState, depth: usize) {
        let prio = (self.priority)(state, depth);
        self.heap.push((prio, Reverse(self.count), node));
        self.count += 1;
    }

    fn pop(&mut self) -> Option<NodeId> {
        self.heap.pop().map(|(_, _, node)| node)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

impl<'a> SearchStrategy for BestFirst<'a> {
    fn search(
        &mut self,
        space: &mut dyn StateSpace,
        initial: SymbolicState,
    ) -> smt::Result<Reachability> {
        let mut heap = Heap {
            priority: &mut self.priority,
            heap: BinaryHeap::new(),
            count: 0,
        };
        explore(&mut heap, &self.options, space, initial)
    }
}
