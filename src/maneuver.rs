use crate::AgentId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Cost per degree of heading change.
const HEADING_COST: f64 = 0.1;

/// Cost per 1000 ft of altitude change.
const ALTITUDE_COST: f64 = 0.5;

/// Cost per 50 knots of speed change.
const SPEED_COST: f64 = 0.2;

/// A single discrete change to an agent's flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ManeuverKind {
    /// Turn by the given number of degrees, positive is clockwise.
    Heading(f64),
    /// Climb (positive) or descend (negative) by the given number of ft.
    Altitude(f64),
    /// Speed up or slow down by the given number of knots.
    Speed(f64),
}

impl ManeuverKind {
    pub fn heading_change(&self) -> f64 {
        match self {
            Self::Heading(deg) => *deg,
            _ => 0.0,
        }
    }

    pub fn altitude_change(&self) -> f64 {
        match self {
            Self::Altitude(ft) => *ft,
            _ => 0.0,
        }
    }

    pub fn speed_change(&self) -> f64 {
        match self {
            Self::Speed(kts) => *kts,
            _ => 0.0,
        }
    }

    /// The weighted magnitude of the change.
    pub fn cost(&self) -> f64 {
        match self {
            Self::Heading(deg) => deg.abs() * HEADING_COST,
            Self::Altitude(ft) => (ft / 1000.0).abs() * ALTITUDE_COST,
            Self::Speed(kts) => (kts / 50.0).abs() * SPEED_COST,
        }
    }
}

impl fmt::Display for ManeuverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heading(deg) => write!(f, "H:{:+.0}°", deg),
            Self::Altitude(ft) => write!(f, "Z:{:+.0}ft", ft),
            Self::Speed(kts) => write!(f, "S:{:+.0}kts", kts),
        }
    }
}

/// A maneuver assigned to a specific agent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    /// The agent that executes the maneuver.
    pub agent: AgentId,
    /// What the agent does.
    pub kind: ManeuverKind,
}

impl Maneuver {
    pub fn new(agent: AgentId, kind: ManeuverKind) -> Self {
        Self { agent, kind }
    }

    pub fn cost(&self) -> f64 {
        self.kind.cost()
    }

    pub fn heading_change(&self) -> f64 {
        self.kind.heading_change()
    }

    pub fn altitude_change(&self) -> f64 {
        self.kind.altitude_change()
    }

    pub fn speed_change(&self) -> f64 {
        self.kind.speed_change()
    }
}

/// The maneuvers available to either agent of a conflicting pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSet {
    /// Heading deltas in degrees.
    pub heading: Vec<f64>,
    /// Altitude deltas in ft.
    pub altitude: Vec<f64>,
    /// Speed deltas in knots.
    pub speed: Vec<f64>,
}

impl Default for ActionSet {
    fn default() -> Self {
        Self {
            heading: vec![-10.0, 10.0, -5.0, 5.0],
            altitude: vec![-1000.0, 1000.0],
            speed: vec![],
        }
    }
}

/// The fixed list of maneuvers explored when resolving one pair.
pub type Catalogue = SmallVec<[Maneuver; 16]>;

impl ActionSet {
    /// Expands the action set into concrete maneuvers for both agents of a pair.
    pub fn catalogue(&self, pair: [AgentId; 2]) -> Catalogue {
        let kinds: [(&[f64], fn(f64) -> ManeuverKind); 3] = [
            (&self.heading, ManeuverKind::Heading),
            (&self.altitude, ManeuverKind::Altitude),
            (&self.speed, ManeuverKind::Speed),
        ];
        kinds
            .iter()
            .flat_map(|(deltas, kind)| {
                pair.into_iter().flat_map(move |agent| {
                    deltas
                        .iter()
                        .filter(|delta| **delta != 0.0)
                        .map(move |delta| Maneuver::new(agent, kind(*delta)))
                })
            })
            .collect()
    }
}
