//! Closest point of approach between two agents on straight tracks.

use crate::kinematics::KinematicState;
use crate::math::Vector2d;
use crate::util::Interval;
use cgmath::prelude::*;
use serde::{Deserialize, Serialize};

/// Relative speed squared below which two tracks are treated as parallel, in knots<sup>2</sup>.
const PARALLEL_EPSILON: f64 = 0.001;

/// The minimum separation that must be maintained between any two agents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationMinima {
    /// Horizontal minimum in NM.
    pub horizontal: f64,
    /// Vertical minimum in ft.
    pub vertical: f64,
}

impl Default for SeparationMinima {
    fn default() -> Self {
        Self {
            horizontal: 5.0,
            vertical: 1000.0,
        }
    }
}

/// The predicted separation of a pair at their closest approach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosestApproach {
    /// Minimum horizontal separation in NM, infinite when vertically separated.
    pub horizontal: f64,
    /// Vertical separation in ft.
    pub vertical: f64,
    /// Time until the closest approach in hours, never negative.
    pub time: f64,
}

impl ClosestApproach {
    /// Whether both separations meet their minima.
    pub fn is_safe(&self, minima: &SeparationMinima) -> bool {
        self.horizontal >= minima.horizontal && self.vertical >= minima.vertical
    }
}

/// How a pair of agents is moving relative to one another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Encounter {
    /// The vertical minimum is already met.
    VerticallySeparated { vertical: f64 },
    /// The tracks are parallel, so the current distance never changes.
    NonConverging { distance: f64, vertical: f64 },
    /// The agents have a well-defined time of closest approach.
    Converging {
        /// Time of closest approach in hours; negative if it has already passed.
        time: f64,
        /// Horizontal separation at that time in NM.
        min_separation: f64,
        vertical: f64,
    },
}

/// Relative position and velocity of `b` as seen from `a`.
struct RelativeMotion {
    pos: Vector2d,
    vel: Vector2d,
}

impl RelativeMotion {
    fn new(a: &KinematicState, b: &KinematicState) -> Self {
        Self {
            pos: b.pos - a.pos,
            vel: b.velocity() - a.velocity(),
        }
    }

    fn is_parallel(&self) -> bool {
        self.vel.magnitude2() < PARALLEL_EPSILON
    }

    /// The time minimising the separation, `-(r·v)/|v|²`.
    fn time_of_closest_approach(&self) -> f64 {
        -self.pos.dot(self.vel) / self.vel.magnitude2()
    }

    /// The horizontal separation `t` hours from now.
    fn separation_at(&self, t: f64) -> f64 {
        (self.pos + t * self.vel).magnitude()
    }
}

/// Classifies the geometry of a pair without any lookahead horizon.
pub fn classify(a: &KinematicState, b: &KinematicState, minima: &SeparationMinima) -> Encounter {
    let vertical = (a.altitude - b.altitude).abs();
    if vertical >= minima.vertical {
        return Encounter::VerticallySeparated { vertical };
    }

    let rel = RelativeMotion::new(a, b);
    if rel.is_parallel() {
        return Encounter::NonConverging {
            distance: rel.pos.magnitude(),
            vertical,
        };
    }

    let time = rel.time_of_closest_approach();
    Encounter::Converging {
        time,
        min_separation: rel.separation_at(time),
        vertical,
    }
}

/// Computes the minimum predicted separation of two agents within the `lookahead` horizon (hours).
///
/// The result does not depend on the order of the agents.
pub fn closest_approach(
    a: &KinematicState,
    b: &KinematicState,
    minima: &SeparationMinima,
    lookahead: f64,
) -> ClosestApproach {
    let window = Interval::new(0.0, lookahead);
    match classify(a, b, minima) {
        Encounter::VerticallySeparated { vertical } => ClosestApproach {
            horizontal: f64::INFINITY,
            vertical,
            time: 0.0,
        },
        Encounter::NonConverging { distance, vertical } => ClosestApproach {
            horizontal: distance,
            vertical,
            time: window.midpoint(),
        },
        Encounter::Converging {
            time,
            min_separation,
            vertical,
        } => {
            let rel = RelativeMotion::new(a, b);
            let mut horizontal = if time < window.min {
                rel.separation_at(0.0)
            } else {
                min_separation
            };
            if time > window.max {
                horizontal = f64::min(horizontal, rel.separation_at(window.max));
            }
            ClosestApproach {
                horizontal,
                vertical,
                time: f64::max(time, 0.0),
            }
        }
    }
}
