//! Built-in and randomly generated rosters.

use crate::agent::AgentAttributes;
use crate::config::{Scenario, SimConfig};
use crate::math::wrap_degrees;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Radius of the ring random agents start on.
const SPAWN_RADIUS: f64 = 30.0; // NM

/// Standard deviation of the inbound heading of random agents.
const HEADING_STDDEV: f64 = 15.0; // deg

/// Mean and standard deviation of the speed of random agents.
const SPEED_MEAN: f64 = 450.0; // kts
const SPEED_STDDEV: f64 = 40.0; // kts

fn attributes(callsign: &str, x: f64, y: f64, altitude: f64, speed: f64, heading: f64) -> AgentAttributes {
    AgentAttributes {
        callsign: callsign.to_string(),
        x,
        y,
        altitude,
        speed,
        heading,
    }
}

/// Two aircraft head-on at the same level, and two crossing aircraft 1000 ft apart.
pub fn demo_roster() -> Vec<AgentAttributes> {
    vec![
        attributes("AAL123", -20.0, 0.0, 30000.0, 450.0, 90.0),
        attributes("UAL456", 20.0, 0.0, 30000.0, 450.0, 270.0),
        attributes("SWA789", -10.0, -20.0, 35000.0, 500.0, 45.0),
        attributes("DAL001", 10.0, -20.0, 34000.0, 500.0, 135.0),
    ]
}

impl Scenario {
    /// The default configuration with the demo roster.
    pub fn demo() -> Self {
        Self {
            config: SimConfig::default(),
            roster: demo_roster(),
        }
    }
}

/// Generates `count` agents on a ring around the origin, each heading roughly inbound.
pub fn random_roster(count: usize, rng: &mut impl Rng) -> Vec<AgentAttributes> {
    let jitter = Normal::new(0.0, HEADING_STDDEV).expect("Invalid heading deviation");
    let speeds = Normal::new(SPEED_MEAN, SPEED_STDDEV).expect("Invalid speed deviation");
    (0..count)
        .map(|i| {
            let bearing: f64 = rng.gen_range(0.0..360.0);
            let (sin, cos) = bearing.to_radians().sin_cos();
            let level = rng.gen_range(28..=36);
            let inbound = wrap_degrees(bearing + 180.0 + jitter.sample(rng));
            attributes(
                &format!("RND{:03}", i + 1),
                SPAWN_RADIUS * sin,
                SPAWN_RADIUS * cos,
                1000.0 * level as f64,
                speeds.sample(rng).clamp(250.0, 600.0),
                inbound,
            )
        })
        .collect()
}
