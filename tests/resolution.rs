//! Tests that run the coordinator end to end on small rosters.

use atc_sim::scenario::random_roster;
use atc_sim::search::replay;
use atc_sim::{
    closest_approach, AgentAttributes, ConflictPair, Coordinator, QueuePolicy, ResolutionStatus,
    Resolver, Scenario, SimConfig, TimeToConflict,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

fn agent(callsign: &str, x: f64, y: f64, altitude: f64, speed: f64, heading: f64) -> AgentAttributes {
    AgentAttributes {
        callsign: callsign.into(),
        x,
        y,
        altitude,
        speed,
        heading,
    }
}

fn head_on() -> Vec<AgentAttributes> {
    vec![
        agent("AAL123", -20.0, 0.0, 30000.0, 450.0, 90.0),
        agent("UAL456", 20.0, 0.0, 30000.0, 450.0, 270.0),
    ]
}

/// Two agents 40 NM apart head-on are resolved, and the full plan restores separation.
#[test]
fn head_on_pair_is_resolved() {
    let mut coordinator = Coordinator::new();
    let ids = coordinator.load_roster(&head_on()).unwrap();
    let config = coordinator.config().clone();
    let pair = ConflictPair {
        ids: [ids[0], ids[1]],
        states: [
            *coordinator.get_agent(ids[0]).unwrap().state(),
            *coordinator.get_agent(ids[1]).unwrap().state(),
        ],
    };

    let reports = coordinator.tick();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.callsign_a, "AAL123");
    assert_eq!(report.callsign_b, "UAL456");
    assert!(matches!(report.time_to_conflict, TimeToConflict::In(t) if t > 0.0));
    let steps = match report.status {
        ResolutionStatus::Resolved(steps) => steps,
        other => panic!("expected a resolution, got {:?}", other),
    };
    assert!(steps > 0);
    assert_eq!(coordinator.searches_dispatched(), 1);

    let plan = Resolver::new(
        pair,
        config.lookahead_hours(),
        &config.minima,
        &config.limits,
        &config.search,
    )
    .search()
    .into_maneuvers()
    .unwrap();
    assert_eq!(plan.len(), steps);

    let [a, b] = replay(&pair, &plan, &config.limits);
    let cpa = closest_approach(&a, &b, &config.minima, config.lookahead_hours());
    assert!(cpa.horizontal >= config.minima.horizontal);
    assert!(cpa.is_safe(&config.minima));
}

/// The coordinator applies the plan and the pair stays separated afterwards.
#[test]
fn resolved_pair_stays_separated() {
    let mut coordinator = Coordinator::new();
    coordinator.load_roster(&head_on()).unwrap();
    coordinator.tick();
    for _ in 0..60 {
        let reports = coordinator.tick();
        assert!(reports.is_empty(), "unexpected conflicts {:?}", reports);
    }
    let altitudes = coordinator
        .iter_agents()
        .map(|agent| agent.state().altitude)
        .collect::<Vec<_>>();
    assert!((altitudes[0] - altitudes[1]).abs() >= 1000.0);
    assert!(coordinator.iter_agents().all(|agent| !agent.in_conflict()));
}

/// Parallel agents on the same heading and speed never trigger a search.
#[test]
fn parallel_traffic_is_never_searched() {
    let mut coordinator = Coordinator::new();
    coordinator
        .load_roster(&[
            agent("A", 0.0, 0.0, 30000.0, 450.0, 45.0),
            agent("B", 10.0, 0.0, 30000.0, 450.0, 45.0),
        ])
        .unwrap();
    for _ in 0..100 {
        assert!(coordinator.tick().is_empty());
    }
    assert_eq!(coordinator.searches_dispatched(), 0);
}

/// Vertically separated traffic is ignored even when crossing overhead.
#[test]
fn vertically_separated_traffic_is_ignored() {
    let mut coordinator = Coordinator::new();
    coordinator
        .load_roster(&[
            agent("A", -20.0, 0.0, 30000.0, 450.0, 90.0),
            agent("B", 20.0, 0.0, 31000.0, 450.0, 270.0),
        ])
        .unwrap();
    assert!(coordinator.tick().is_empty());
    assert_eq!(coordinator.searches_dispatched(), 0);
}

/// A conflict beyond the lookahead horizon is not acted upon yet.
#[test]
fn distant_conflict_waits_for_lookahead() {
    let mut coordinator = Coordinator::new();
    coordinator
        .load_roster(&[
            agent("A", -100.0, 0.0, 30000.0, 450.0, 90.0),
            agent("B", 100.0, 0.0, 30000.0, 450.0, 270.0),
        ])
        .unwrap();
    // Closest approach is 200 / 900 h = 13.3 minutes away.
    assert!(coordinator.tick().is_empty());
    let mut ticks = 1;
    while coordinator.tick().is_empty() {
        ticks += 1;
        assert!(ticks < 200);
    }
    // The conflict enters the 5 minute window after ~8.3 minutes (100 ticks of 5s).
    assert!((99..=101).contains(&ticks), "detected after {} ticks", ticks);
}

/// Three agents converging on one point: no agent joins two searches in one tick.
#[test]
fn agents_join_at_most_one_search_per_tick() {
    let mut coordinator = Coordinator::new();
    coordinator
        .load_roster(&[
            agent("A", -20.0, 0.0, 30000.0, 450.0, 90.0),
            agent("B", 20.0, 0.0, 30000.0, 450.0, 270.0),
            agent("C", 0.0, -20.0, 30000.0, 450.0, 0.0),
        ])
        .unwrap();
    for _ in 0..20 {
        let reports = coordinator.tick();
        let mut searched = HashMap::new();
        for report in &reports {
            if report.status != ResolutionStatus::NotAttempted {
                for callsign in [&report.callsign_a, &report.callsign_b] {
                    *searched.entry(callsign.clone()).or_insert(0) += 1;
                }
            }
        }
        assert!(searched.values().all(|count| *count == 1), "{:?}", searched);
    }
}

/// Unapplied maneuvers survive between ticks when retained.
#[test]
fn retained_queues_drain_one_per_tick() {
    let mut config = SimConfig {
        queue_policy: QueuePolicy::Retain,
        ..Default::default()
    };
    // Half-step climbs from the altitude floor, so one agent needs two maneuvers.
    config.search.actions.heading.clear();
    config.search.actions.altitude = vec![-500.0, 500.0];
    config.limits.min_altitude = 30000.0;
    let mut coordinator = Coordinator::with_config(config.clone()).unwrap();
    let ids = coordinator
        .load_roster(&[
            agent("A", -20.0, 0.0, 30000.0, 450.0, 90.0),
            agent("B", 20.0, 1.0, 30000.0, 450.0, 270.0),
        ])
        .unwrap();
    let ids = [ids[0], ids[1]];
    let pair = ConflictPair {
        ids,
        states: ids.map(|id| *coordinator.get_agent(id).unwrap().state()),
    };
    let plan = Resolver::new(
        pair,
        config.lookahead_hours(),
        &config.minima,
        &config.limits,
        &config.search,
    )
    .search()
    .into_maneuvers()
    .unwrap();
    assert_eq!(plan.len(), 2);
    let climber = plan[0].agent;
    assert!(plan.iter().all(|m| m.agent == climber));
    let other = if climber == ids[0] { ids[1] } else { ids[0] };

    let reports = coordinator.tick();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, ResolutionStatus::Resolved(2));
    assert_eq!(coordinator.pending_maneuvers(climber), vec![plan[1]]);
    assert!(coordinator.pending_maneuvers(other).is_empty());
    assert_eq!(coordinator.get_agent(climber).unwrap().state().altitude, 30500.0);

    // The climber is still busy, so the pair is not searched again.
    assert!(coordinator.tick().is_empty());
    assert!(coordinator.pending_maneuvers(climber).is_empty());
    assert_eq!(coordinator.get_agent(climber).unwrap().state().altitude, 31000.0);
    assert_eq!(coordinator.get_agent(other).unwrap().state().altitude, 30000.0);

    for _ in 0..10 {
        assert!(coordinator.tick().is_empty());
    }
    assert_eq!(coordinator.searches_dispatched(), 1);
}

/// The demo scenario runs for a simulated hour without unresolved conflicts.
#[test]
fn demo_scenario_runs() {
    let scenario = Scenario::demo();
    let mut coordinator = Coordinator::with_config(scenario.config).unwrap();
    coordinator.load_roster(&scenario.roster).unwrap();
    let mut statuses = vec![];
    for _ in 0..720 {
        statuses.extend(coordinator.tick().into_iter().map(|r| r.status));
    }
    assert!(statuses.contains(&ResolutionStatus::Resolved(1)));
    assert!(!statuses.contains(&ResolutionStatus::Failed));
    assert_eq!(coordinator.elapsed_secs(), 3600.0);
}

/// Random traffic never leaves the state limits and always completes a tick.
#[test]
fn random_traffic_respects_limits() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut coordinator = Coordinator::new();
    coordinator.load_roster(&random_roster(12, &mut rng)).unwrap();
    let limits = coordinator.config().limits;
    for _ in 0..120 {
        coordinator.tick();
        for snapshot in coordinator.snapshot() {
            assert!(snapshot.altitude >= limits.min_altitude);
            assert!(snapshot.speed >= limits.min_speed);
            assert!((0.0..360.0).contains(&snapshot.heading));
        }
    }
}

/// An unsolvable pair fails within the node budget and both agents are flagged.
#[test]
fn unsolvable_pair_is_flagged() {
    let mut config = SimConfig::default();
    config.search.actions.altitude.clear();
    config.search.node_budget = 300;
    let mut coordinator = Coordinator::with_config(config).unwrap();
    coordinator
        .load_roster(&[
            agent("A", 0.0, 0.0, 30000.0, 450.0, 90.0),
            agent("B", 0.0, 0.0, 30000.0, 450.0, 0.0),
        ])
        .unwrap();
    let reports = coordinator.tick();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, ResolutionStatus::Failed);
    assert!(coordinator.snapshot().iter().all(|s| s.conflict));
    assert!(coordinator.snapshot().iter().all(|s| s.pending_maneuvers == 0));
}
