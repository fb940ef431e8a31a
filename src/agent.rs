use crate::error::{Error, Result};
use crate::kinematics::KinematicState;
use crate::AgentId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A simulated aircraft.
#[derive(Clone, Debug)]
pub struct Agent {
    /// The agent's ID.
    pub(crate) id: AgentId,
    /// The normalised (upper case) callsign.
    callsign: String,
    /// Position, altitude, speed and heading.
    state: KinematicState,
    /// Whether the agent is in an unresolved conflict.
    conflict: bool,
}

/// The attributes used to register an agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentAttributes {
    pub callsign: String,
    /// Starting x coordinate in NM.
    pub x: f64,
    /// Starting y coordinate in NM.
    pub y: f64,
    /// Altitude in ft.
    pub altitude: f64,
    /// Ground speed in knots.
    pub speed: f64,
    /// Heading in degrees.
    pub heading: f64,
}

/// A read-only view of an agent for rendering and reporting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub callsign: String,
    pub x: f64,
    pub y: f64,
    pub altitude: f64,
    pub speed: f64,
    pub heading: f64,
    pub conflict: bool,
    pub pending_maneuvers: usize,
}

/// Trims and upper-cases a callsign.
pub fn normalize_callsign(callsign: &str) -> String {
    callsign.trim().to_uppercase()
}

impl AgentAttributes {
    /// Checks the attributes describe a physical agent.
    pub fn validate(&self) -> Result<()> {
        if normalize_callsign(&self.callsign).is_empty() {
            return Err(Error::EmptyCallsign);
        }
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("altitude", self.altitude),
            ("speed", self.speed),
            ("heading", self.heading),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(Error::InvalidAttribute {
                    field,
                    value: value.to_string(),
                });
            }
        }
        if self.speed < 0.0 {
            return Err(Error::InvalidAttribute {
                field: "speed",
                value: self.speed.to_string(),
            });
        }
        Ok(())
    }
}

impl FromStr for AgentAttributes {
    type Err = Error;

    /// Parses `"CALLSIGN x y altitude speed heading"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let callsign = parts.next().ok_or(Error::EmptyCallsign)?.to_string();
        let mut number = |field: &'static str| -> Result<f64> {
            let text = parts.next().unwrap_or_default();
            text.parse().map_err(|_| Error::InvalidAttribute {
                field,
                value: text.to_string(),
            })
        };
        let attributes = Self {
            callsign,
            x: number("x")?,
            y: number("y")?,
            altitude: number("altitude")?,
            speed: number("speed")?,
            heading: number("heading")?,
        };
        attributes.validate()?;
        Ok(attributes)
    }
}

impl Agent {
    /// Creates a new agent. The attributes must already be validated.
    pub(crate) fn new(id: AgentId, attributes: &AgentAttributes) -> Self {
        Self {
            id,
            callsign: normalize_callsign(&attributes.callsign),
            state: KinematicState::new(
                attributes.x,
                attributes.y,
                attributes.altitude,
                attributes.speed,
                attributes.heading,
            ),
            conflict: false,
        }
    }

    /// Gets the agent's ID.
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    /// The agent's current kinematic state.
    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Whether the agent is flagged as being in an unresolved conflict.
    pub fn in_conflict(&self) -> bool {
        self.conflict
    }

    pub(crate) fn state_mut(&mut self) -> &mut KinematicState {
        &mut self.state
    }

    pub(crate) fn set_conflict(&mut self, conflict: bool) {
        self.conflict = conflict;
    }

    pub(crate) fn snapshot(&self, pending_maneuvers: usize) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            callsign: self.callsign.clone(),
            x: self.state.pos.x,
            y: self.state.pos.y,
            altitude: self.state.altitude,
            speed: self.state.speed,
            heading: self.state.heading,
            conflict: self.conflict,
            pending_maneuvers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attributes() {
        let attributes: AgentAttributes = "new123 0 0 33000 450 0".parse().unwrap();
        assert_eq!(attributes.callsign, "new123");
        assert_eq!(attributes.altitude, 33000.0);
        assert_eq!(normalize_callsign(&attributes.callsign), "NEW123");
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let err = "NEW123 0 abc 33000 450 0"
            .parse::<AgentAttributes>()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { field: "y", .. }));

        let err = "NEW123 0 0 33000".parse::<AgentAttributes>().unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { field: "speed", .. }));
    }

    #[test]
    fn rejects_non_finite_values() {
        let attributes = AgentAttributes {
            callsign: "X".into(),
            x: f64::NAN,
            y: 0.0,
            altitude: 30000.0,
            speed: 400.0,
            heading: 0.0,
        };
        assert!(attributes.validate().is_err());
    }
}
