use crate::maneuver::ManeuverKind;
use crate::math::{heading_vector, wrap_degrees, Point2d, Vector2d};
use serde::{Deserialize, Serialize};

/// The continuous state of an agent flying a straight track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// The planar position in NM.
    pub pos: Point2d,
    /// The altitude in ft.
    pub altitude: f64,
    /// The ground speed in knots.
    pub speed: f64,
    /// The heading in degrees clockwise from north, in `[0, 360)`.
    pub heading: f64,
}

/// Lower bounds applied to an agent's state after every maneuver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateLimits {
    /// The lowest altitude an agent may be assigned, in ft.
    pub min_altitude: f64,
    /// The lowest speed an agent may be assigned, in knots.
    pub min_speed: f64,
}

impl Default for StateLimits {
    fn default() -> Self {
        Self {
            min_altitude: 5000.0,
            min_speed: 200.0,
        }
    }
}

impl KinematicState {
    /// Creates a new state, wrapping the heading into `[0, 360)`.
    pub fn new(x: f64, y: f64, altitude: f64, speed: f64, heading: f64) -> Self {
        Self {
            pos: Point2d::new(x, y),
            altitude,
            speed,
            heading: wrap_degrees(heading),
        }
    }

    /// The velocity vector in knots.
    pub fn velocity(&self) -> Vector2d {
        self.speed * heading_vector(self.heading)
    }

    /// Moves the agent along its track for `dt` hours.
    pub fn advance(&mut self, dt: f64) {
        self.pos += dt * self.velocity();
    }

    /// The state `dt` hours from now, holding heading and speed constant.
    pub fn project(&self, dt: f64) -> Self {
        let mut state = *self;
        state.advance(dt);
        state
    }

    /// Returns the state after executing a maneuver.
    pub fn apply(&self, kind: &ManeuverKind, limits: &StateLimits) -> Self {
        let mut state = *self;
        state.heading = wrap_degrees(self.heading + kind.heading_change());
        state.altitude = f64::max(limits.min_altitude, self.altitude + kind.altitude_change());
        state.speed = f64::max(limits.min_speed, self.speed + kind.speed_change());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn advances_along_heading() {
        let mut state = KinematicState::new(0.0, 0.0, 30000.0, 450.0, 90.0);
        state.advance(1.0 / 60.0);
        assert_approx_eq!(state.pos.x, 7.5);
        assert_approx_eq!(state.pos.y, 0.0);
    }

    #[test]
    fn projection_leaves_state_untouched() {
        let state = KinematicState::new(1.0, 2.0, 30000.0, 300.0, 0.0);
        let ahead = state.project(0.5);
        assert_eq!(state.pos, Point2d::new(1.0, 2.0));
        assert_approx_eq!(ahead.pos.y, 152.0);
    }

    #[test]
    fn maneuvers_wrap_and_clamp() {
        let limits = StateLimits::default();
        let state = KinematicState::new(0.0, 0.0, 5500.0, 220.0, 355.0);

        let turned = state.apply(&ManeuverKind::Heading(10.0), &limits);
        assert_approx_eq!(turned.heading, 5.0);

        let descended = state.apply(&ManeuverKind::Altitude(-1000.0), &limits);
        assert_approx_eq!(descended.altitude, 5000.0);

        let slowed = state.apply(&ManeuverKind::Speed(-50.0), &limits);
        assert_approx_eq!(slowed.speed, 200.0);
    }
}
