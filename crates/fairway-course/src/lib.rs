//! Static course data and shot physics for Fairway.
//!
//! Two pieces, both free of mutable state:
//!
//! - [`COURSE_HOLES`] — the nine hole layouts (start, cup, bounds,
//!   obstacles). Pure data.
//! - [`simulate_shot`] — the deterministic function mapping (start,
//!   angle, power, hole) to a resting position and hazard flags.
//!
//! The session state machine is this crate's only consumer; nothing here
//! knows about players, turns, or the network.

mod catalog;
mod physics;

pub use catalog::{COURSE_HOLES, CourseHole, HOLE_COUNT, Obstacle, ObstacleType};
pub use physics::{BALL_RADIUS, ShotResult, simulate_shot};
