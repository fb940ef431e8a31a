//! Mathematical structs and functions.

use cgmath::{Point2, Vector2};

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// Wraps an angle in degrees into the range `[0, 360)`.
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // `rem_euclid` can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// The unit vector for a heading in degrees,
/// measured clockwise from the positive y-axis (north).
pub fn heading_vector(heading_deg: f64) -> Vector2d {
    let rad = heading_deg.to_radians();
    Vector2d::new(rad.sin(), rad.cos())
}
