use crate::agent::{normalize_callsign, Agent, AgentAttributes, AgentSnapshot};
use crate::config::{QueuePolicy, SimConfig};
use crate::conflict::{classify, Encounter};
use crate::error::{Error, Result};
use crate::maneuver::Maneuver;
use crate::report::{ConflictReport, ResolutionStatus, TimeToConflict};
use crate::search::{ConflictPair, Resolver, SearchOutcome};
use crate::util::Interval;
use crate::{AgentId, AgentSet};
use itertools::Itertools;
use log::{debug, info, warn};
use slotmap::SecondaryMap;
use std::collections::VecDeque;

/// Predicts and resolves losses of separation between agents.
#[derive(Default)]
pub struct Coordinator {
    /// The simulation parameters.
    config: SimConfig,
    /// The agents being simulated.
    agents: AgentSet,
    /// Maneuvers waiting to be applied, one per agent per tick.
    queues: SecondaryMap<AgentId, VecDeque<Maneuver>>,
    /// The number of ticks simulated.
    frame: usize,
    /// The number of resolution searches run.
    searches: usize,
}

impl Coordinator {
    /// Creates a coordinator with the default configuration.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a coordinator with the given configuration.
    pub fn with_config(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Registers a new agent. Callsigns are compared case-insensitively.
    pub fn add_agent(&mut self, attributes: &AgentAttributes) -> Result<AgentId> {
        attributes.validate()?;
        let callsign = normalize_callsign(&attributes.callsign);
        if self.find_agent(&callsign).is_some() {
            return Err(Error::DuplicateCallsign(callsign));
        }
        let id = self
            .agents
            .insert_with_key(|id| Agent::new(id, attributes));
        info!("Registered {}", callsign);
        Ok(id)
    }

    /// Removes an agent and any maneuvers queued for it.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        self.queues.remove(id);
        self.agents.remove(id)
    }

    /// Removes every agent and resets the clock.
    pub fn clear(&mut self) {
        self.agents.clear();
        self.queues.clear();
        self.frame = 0;
    }

    /// Clears the simulation and registers the given roster.
    /// Nothing is registered if any entry is rejected.
    pub fn load_roster(&mut self, roster: &[AgentAttributes]) -> Result<Vec<AgentId>> {
        let mut staged = Coordinator {
            config: self.config.clone(),
            ..Default::default()
        };
        let ids = roster
            .iter()
            .map(|attributes| staged.add_agent(attributes))
            .collect::<Result<Vec<_>>>()?;
        staged.searches = self.searches;
        *self = staged;
        Ok(ids)
    }

    /// Advances the simulation by one tick, returning the conflicts examined.
    pub fn tick(&mut self) -> Vec<ConflictReport> {
        self.clear_conflict_flags();
        if self.config.queue_policy == QueuePolicy::Rescan {
            self.queues.clear();
        }
        let reports = self.scan_conflicts();
        self.apply_queued_maneuvers();
        self.integrate();
        self.frame += 1;
        reports
    }

    /// Gets the number of ticks simulated.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the simulated time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.frame as f64 * self.config.tick_seconds
    }

    /// The number of resolution searches run so far.
    pub fn searches_dispatched(&self) -> usize {
        self.searches
    }

    /// Returns an iterator over all the agents in the simulation.
    pub fn iter_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Gets a reference to the agent with the given ID.
    pub fn get_agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Finds an agent by callsign, ignoring case.
    pub fn find_agent(&self, callsign: &str) -> Option<&Agent> {
        let callsign = normalize_callsign(callsign);
        self.agents.values().find(|agent| agent.callsign() == callsign)
    }

    /// The maneuvers still queued for an agent.
    pub fn pending_maneuvers(&self, id: AgentId) -> Vec<Maneuver> {
        self.queues
            .get(id)
            .map(|queue| queue.iter().copied().collect())
            .unwrap_or_default()
    }

    /// A read-only view of every agent.
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents
            .values()
            .map(|agent| {
                let pending = self.queues.get(agent.id()).map_or(0, VecDeque::len);
                agent.snapshot(pending)
            })
            .collect()
    }

    /// Resets every agent's conflict flag.
    fn clear_conflict_flags(&mut self) {
        for agent in self.agents.values_mut() {
            agent.set_conflict(false);
        }
    }

    /// Checks every pair of agents and resolves predicted conflicts.
    fn scan_conflicts(&mut self) -> Vec<ConflictReport> {
        let window = Interval::new(0.0, self.config.lookahead_hours());
        let minima = self.config.minima;
        let ids = self.agents.keys().collect::<Vec<_>>();
        // Agents taking part in a search this tick.
        let mut claimed = SecondaryMap::<AgentId, ()>::new();
        let mut reports = vec![];

        for (a, b) in ids.into_iter().tuple_combinations() {
            let busy = |id: AgentId| claimed.contains_key(id) || self.queues.contains_key(id);
            if busy(a) || busy(b) {
                continue;
            }

            let states = [*self.agents[a].state(), *self.agents[b].state()];
            match classify(&states[0], &states[1], &minima) {
                Encounter::VerticallySeparated { .. } => {}
                Encounter::NonConverging { distance, vertical } => {
                    if distance < minima.horizontal {
                        warn!(
                            "{} and {} are {:.2} NM apart on parallel tracks",
                            self.agents[a].callsign(),
                            self.agents[b].callsign(),
                            distance
                        );
                        self.flag([a, b]);
                        reports.push(self.report(
                            [a, b],
                            TimeToConflict::Immediate,
                            distance,
                            vertical,
                            ResolutionStatus::NotAttempted,
                        ));
                    }
                }
                Encounter::Converging {
                    time,
                    min_separation,
                    vertical,
                } => {
                    if window.contains(time) && min_separation < minima.horizontal {
                        claimed.insert(a, ());
                        claimed.insert(b, ());
                        let pair = ConflictPair {
                            ids: [a, b],
                            states,
                        };
                        let status = self.resolve(pair);
                        reports.push(self.report(
                            [a, b],
                            TimeToConflict::In(time),
                            min_separation,
                            vertical,
                            status,
                        ));
                    }
                }
            }
        }

        reports
    }

    /// Searches for a resolution and queues it, or flags the pair on failure.
    fn resolve(&mut self, pair: ConflictPair) -> ResolutionStatus {
        self.searches += 1;
        let [a, b] = pair.ids;
        debug!(
            "Resolving {} vs {}",
            self.agents[a].callsign(),
            self.agents[b].callsign()
        );

        let outcome = Resolver::new(
            pair,
            self.config.lookahead_hours(),
            &self.config.minima,
            &self.config.limits,
            &self.config.search,
        )
        .search();

        match outcome {
            SearchOutcome::Resolved { maneuvers, .. } => {
                info!(
                    "{} vs {} resolved: {}",
                    self.agents[a].callsign(),
                    self.agents[b].callsign(),
                    maneuvers
                        .iter()
                        .map(|m| format!("{} {}", self.agents[m.agent].callsign(), m.kind))
                        .join(", ")
                );
                let steps = maneuvers.len();
                for maneuver in maneuvers {
                    if let Some(queue) = self.queues.entry(maneuver.agent) {
                        queue.or_insert_with(VecDeque::new).push_back(maneuver);
                    }
                }
                ResolutionStatus::Resolved(steps)
            }
            SearchOutcome::Exhausted { expansions } => {
                warn!(
                    "No resolution for {} vs {} after {} expansions",
                    self.agents[a].callsign(),
                    self.agents[b].callsign(),
                    expansions
                );
                self.flag([a, b]);
                ResolutionStatus::Failed
            }
        }
    }

    fn flag(&mut self, ids: [AgentId; 2]) {
        for id in ids {
            self.agents[id].set_conflict(true);
        }
    }

    fn report(
        &self,
        [a, b]: [AgentId; 2],
        time_to_conflict: TimeToConflict,
        horizontal: f64,
        vertical: f64,
        status: ResolutionStatus,
    ) -> ConflictReport {
        ConflictReport {
            callsign_a: self.agents[a].callsign().to_string(),
            callsign_b: self.agents[b].callsign().to_string(),
            time_to_conflict,
            horizontal,
            vertical,
            status,
        }
    }

    /// Applies the next queued maneuver of every agent, dropping emptied queues.
    fn apply_queued_maneuvers(&mut self) {
        let limits = self.config.limits;
        for (id, agent) in &mut self.agents {
            let Some(queue) = self.queues.get_mut(id) else {
                continue;
            };
            if let Some(maneuver) = queue.pop_front() {
                let state = agent.state_mut();
                *state = state.apply(&maneuver.kind, &limits);
            }
            if queue.is_empty() {
                self.queues.remove(id);
            }
        }
    }

    /// Moves every agent along its track for one tick.
    fn integrate(&mut self) {
        let dt = self.config.tick_hours();
        for agent in self.agents.values_mut() {
            agent.state_mut().advance(dt);
        }
    }
}
