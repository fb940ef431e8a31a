//! # Conflict resolution search
//!
//! Bounded A* over the joint state of a conflicting pair. Each edge applies one
//! maneuver from a fixed catalogue to one of the two agents, and the heuristic
//! scores how far the pair's predicted closest approach falls short of the
//! separation minima.
//!
//! The heuristic is monotone in the separation deficit but is not a proven lower
//! bound on the remaining maneuver cost, so returned plans are cheap rather than
//! guaranteed optimal.

use crate::conflict::{closest_approach, SeparationMinima};
use crate::kinematics::{KinematicState, StateLimits};
use crate::maneuver::{ActionSet, Catalogue, Maneuver};
use crate::AgentId;
use log::debug;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Scale applied to the summed deficit ratios.
const HEURISTIC_WEIGHT: f64 = 5.0;

/// Bucket widths used to decide whether two search states are the same.
///
/// Wider buckets merge more states, which shrinks the search space but can hide
/// a distinct state behind one already visited with an equal or cheaper cost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quantization {
    /// Position bucket in NM.
    pub position: f64,
    /// Altitude bucket in ft.
    pub altitude: f64,
    /// Speed bucket in knots.
    pub speed: f64,
    /// Heading bucket in degrees.
    pub heading: f64,
}

impl Default for Quantization {
    fn default() -> Self {
        Self {
            position: 1.0,
            altitude: 1.0,
            speed: 1.0,
            heading: 0.1,
        }
    }
}

impl Quantization {
    fn bucket(value: f64, width: f64) -> i64 {
        (value / width).round() as i64
    }

    fn fingerprint(&self, states: &[KinematicState; 2]) -> Fingerprint {
        let mut key = [0; 10];
        for (chunk, state) in key.chunks_exact_mut(5).zip(states) {
            chunk[0] = Self::bucket(state.pos.x, self.position);
            chunk[1] = Self::bucket(state.pos.y, self.position);
            chunk[2] = Self::bucket(state.altitude, self.altitude);
            chunk[3] = Self::bucket(state.speed, self.speed);
            chunk[4] = Self::bucket(state.heading, self.heading);
        }
        Fingerprint(key)
    }
}

/// The quantized joint state of a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Fingerprint([i64; 10]);

/// Tuning of the resolution search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// The maximum number of nodes popped from the open set.
    pub node_budget: usize,
    /// The maneuvers available to each agent.
    pub actions: ActionSet,
    /// Bucket widths for duplicate detection.
    pub quantization: Quantization,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            node_budget: 1000,
            actions: ActionSet::default(),
            quantization: Quantization::default(),
        }
    }
}

/// Two agents predicted to lose separation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConflictPair {
    pub ids: [AgentId; 2],
    pub states: [KinematicState; 2],
}

impl ConflictPair {
    /// Returns the index of the agent within the pair.
    fn slot(&self, agent: AgentId) -> Option<usize> {
        self.ids.iter().position(|id| *id == agent)
    }
}

/// The result of a resolution search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    /// A maneuver sequence restoring separation, oldest first.
    Resolved {
        maneuvers: Vec<Maneuver>,
        cost: f64,
        expansions: usize,
    },
    /// No sequence was found within the node budget.
    Exhausted { expansions: usize },
}

impl SearchOutcome {
    /// The number of nodes popped from the open set.
    pub fn expansions(&self) -> usize {
        match self {
            Self::Resolved { expansions, .. } | Self::Exhausted { expansions } => *expansions,
        }
    }

    /// Consumes the outcome, returning the plan if one was found.
    pub fn into_maneuvers(self) -> Option<Vec<Maneuver>> {
        match self {
            Self::Resolved { maneuvers, .. } => Some(maneuvers),
            Self::Exhausted { .. } => None,
        }
    }
}

/// A node of the search tree, stored in the resolver's arena.
#[derive(Clone, Debug)]
struct SearchNode {
    states: [KinematicState; 2],
    g: f64,
    h: f64,
    parent: Option<usize>,
    maneuver: Option<Maneuver>,
}

impl SearchNode {
    fn f(&self) -> f64 {
        self.g + self.h
    }
}

/// Searches for a maneuver sequence that resolves one conflicting pair.
pub struct Resolver<'a> {
    pair: ConflictPair,
    lookahead: f64,
    minima: &'a SeparationMinima,
    limits: &'a StateLimits,
    config: &'a SearchConfig,
    catalogue: Catalogue,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for a pair with the given lookahead horizon in hours.
    pub fn new(
        pair: ConflictPair,
        lookahead: f64,
        minima: &'a SeparationMinima,
        limits: &'a StateLimits,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            catalogue: config.actions.catalogue(pair.ids),
            pair,
            lookahead,
            minima,
            limits,
            config,
        }
    }

    /// Scores the remaining separation deficit of a joint state; zero means resolved.
    pub fn heuristic(&self, states: &[KinematicState; 2]) -> f64 {
        let cpa = closest_approach(&states[0], &states[1], self.minima, self.lookahead);
        if cpa.is_safe(self.minima) {
            return 0.0;
        }
        let deficit = |min: f64, actual: f64| f64::max(0.0, min - actual) / min;
        HEURISTIC_WEIGHT
            * (deficit(self.minima.horizontal, cpa.horizontal)
                + deficit(self.minima.vertical, cpa.vertical))
    }

    /// Runs the search. Ties between equal `f` values are broken by insertion order.
    pub fn search(&self) -> SearchOutcome {
        let root = SearchNode {
            states: self.pair.states,
            g: 0.0,
            h: self.heuristic(&self.pair.states),
            parent: None,
            maneuver: None,
        };

        let quant = &self.config.quantization;
        let mut best_g = HashMap::new();
        best_g.insert(quant.fingerprint(&root.states), 0.0);

        let mut open = BinaryHeap::new();
        open.push(Reverse((OrderedFloat(root.f()), 0)));
        let mut arena = vec![root];
        let mut expansions = 0;

        while expansions < self.config.node_budget {
            let Some(Reverse((_, idx))) = open.pop() else {
                break;
            };
            expansions += 1;

            if arena[idx].h == 0.0 {
                let maneuvers = reconstruct(&arena, idx);
                debug!(
                    "Resolved pair after {} expansions with {} maneuvers",
                    expansions,
                    maneuvers.len()
                );
                return SearchOutcome::Resolved {
                    maneuvers,
                    cost: arena[idx].g,
                    expansions,
                };
            }

            for maneuver in &self.catalogue {
                let Some(slot) = self.pair.slot(maneuver.agent) else {
                    continue;
                };
                let current = &arena[idx];
                let mut states = current.states;
                states[slot] = states[slot].apply(&maneuver.kind, self.limits);
                let g = current.g + maneuver.cost();

                let fingerprint = quant.fingerprint(&states);
                if matches!(best_g.get(&fingerprint), Some(&best) if g >= best) {
                    continue;
                }
                best_g.insert(fingerprint, g);

                let node = SearchNode {
                    h: self.heuristic(&states),
                    states,
                    g,
                    parent: Some(idx),
                    maneuver: Some(*maneuver),
                };
                open.push(Reverse((OrderedFloat(node.f()), arena.len())));
                arena.push(node);
            }
        }

        debug!("Search exhausted after {} expansions", expansions);
        SearchOutcome::Exhausted { expansions }
    }

    /// Applies a plan to the pair's starting states, returning the final states.
    pub fn replay(&self, maneuvers: &[Maneuver]) -> [KinematicState; 2] {
        replay(&self.pair, maneuvers, self.limits)
    }
}

/// Walks the parent links back to the root, returning the maneuvers oldest first.
fn reconstruct(arena: &[SearchNode], mut idx: usize) -> Vec<Maneuver> {
    let mut maneuvers = vec![];
    while let Some(parent) = arena[idx].parent {
        maneuvers.extend(arena[idx].maneuver);
        idx = parent;
    }
    maneuvers.reverse();
    maneuvers
}

/// Applies a sequence of maneuvers to a pair's states in order.
/// Maneuvers naming an agent outside the pair are ignored.
pub fn replay(
    pair: &ConflictPair,
    maneuvers: &[Maneuver],
    limits: &StateLimits,
) -> [KinematicState; 2] {
    let mut states = pair.states;
    for maneuver in maneuvers {
        if let Some(slot) = pair.slot(maneuver.agent) {
            states[slot] = states[slot].apply(&maneuver.kind, limits);
        }
    }
    states
}
