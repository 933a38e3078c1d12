//! Deterministic shot simulation.
//!
//! [`simulate_shot`] is a pure function: the same start position, angle,
//! power, and hole always produce the same result. The server is the
//! sole source of truth for ball positions, so reproducibility is a hard
//! requirement — no randomness, no wall-clock dependence.

use crate::{CourseHole, Obstacle, ObstacleType};

/// Radius of the ball, used to expand containment tests.
pub const BALL_RADIUS: f32 = 0.1;

const FRICTION: f32 = 0.95;
const SAND_FRICTION: f32 = 0.8;
const STOP_THRESHOLD: f32 = 0.01;
const MAX_STEPS: u32 = 100;
const POWER_SCALE: f32 = 0.05;
const CAPTURE_RADIUS: f32 = 0.15;
const BOUNCE_DAMPING: f32 = 0.7;

/// Outcome of a simulated shot.
///
/// The flags are not mutually exclusive in principle, but `in_hole`
/// takes precedence: once the ball is captured the simulation stops and
/// nothing else can happen to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotResult {
    /// Where the ball came to rest (or the start position after a water
    /// hazard).
    pub position: [f32; 3],
    pub in_hole: bool,
    pub in_water: bool,
    pub in_sand: bool,
}

/// What the ball ran into this step, if anything.
enum Contact {
    Water,
    Sand,
    /// Unit surface normal in the x/z plane.
    Wall { normal: [f32; 2] },
    Ramp,
}

/// Simulates a shot from `start` with the given angle (degrees, 0° = +x,
/// counter-clockwise) and power (0..=100), against one hole layout.
///
/// The simulation advances in discrete steps. Each step, in order:
/// position advances by the current velocity; friction is applied (the
/// sand multiplier once the ball has touched sand — the flag is sticky
/// for the remainder of the shot); the cup capture check runs; the
/// obstacle list is scanned in declaration order and only the first
/// contact is resolved; finally the outer boundary clamps the position
/// with a damped velocity flip. The loop ends when the speed drops below
/// a small threshold, or at a step cap that bounds pathological
/// bounce sequences near boundaries.
///
/// A shot that starts inside an obstacle is simulated as-is; there is no
/// pre-check.
pub fn simulate_shot(
    start: [f32; 3],
    angle_degrees: f32,
    power: f32,
    hole: &CourseHole,
) -> ShotResult {
    let radians = angle_degrees.to_radians();
    let speed = power * POWER_SCALE;

    let mut position = start;
    // The course is flat: velocity lives in the x/z plane, y stays 0.
    let mut vx = radians.cos() * speed;
    let mut vz = radians.sin() * speed;

    let mut in_hole = false;
    let mut in_water = false;
    let mut in_sand = false;
    let mut steps = 0;

    while (vx * vx + vz * vz).sqrt() > STOP_THRESHOLD && steps < MAX_STEPS {
        position[0] += vx;
        position[2] += vz;

        let friction = if in_sand { SAND_FRICTION } else { FRICTION };
        vx *= friction;
        vz *= friction;

        // Cup capture ends the shot immediately; no collision or
        // boundary handling may perturb the captured position.
        let dx = position[0] - hole.position[0];
        let dz = position[2] - hole.position[2];
        if (dx * dx + dz * dz).sqrt() < CAPTURE_RADIUS {
            in_hole = true;
            break;
        }

        match first_contact(position, BALL_RADIUS, hole.obstacles) {
            Some(Contact::Water) => {
                // Water always aborts the shot back to where it began;
                // no partial credit for distance traveled.
                in_water = true;
                position = start;
                vx = 0.0;
                vz = 0.0;
                break;
            }
            Some(Contact::Sand) => {
                in_sand = true;
            }
            Some(Contact::Wall { normal }) => {
                let dot = vx * normal[0] + vz * normal[1];
                vx = (vx - 2.0 * dot * normal[0]) * BOUNCE_DAMPING;
                vz = (vz - 2.0 * dot * normal[1]) * BOUNCE_DAMPING;
            }
            Some(Contact::Ramp) | None => {}
        }

        // Outer boundary: clamp and reflect with energy loss.
        let half_width = hole.width / 2.0;
        let half_length = hole.length / 2.0;

        if position[0] < -half_width + BALL_RADIUS {
            position[0] = -half_width + BALL_RADIUS;
            vx *= -BOUNCE_DAMPING;
        } else if position[0] > half_width - BALL_RADIUS {
            position[0] = half_width - BALL_RADIUS;
            vx *= -BOUNCE_DAMPING;
        }

        if position[2] < -half_length + BALL_RADIUS {
            position[2] = -half_length + BALL_RADIUS;
            vz *= -BOUNCE_DAMPING;
        } else if position[2] > half_length - BALL_RADIUS {
            position[2] = half_length - BALL_RADIUS;
            vz *= -BOUNCE_DAMPING;
        }

        steps += 1;
    }

    ShotResult {
        position,
        in_hole,
        in_water,
        in_sand,
    }
}

/// Scans the obstacle list in declaration order and returns the first
/// region containing the ball, if any. Overlapping obstacles resolve to
/// whichever was declared first; there is no multi-contact resolution.
fn first_contact(position: [f32; 3], radius: f32, obstacles: &[Obstacle]) -> Option<Contact> {
    for obstacle in obstacles {
        let min_x = obstacle.position[0] - obstacle.size[0] / 2.0;
        let max_x = obstacle.position[0] + obstacle.size[0] / 2.0;
        let min_z = obstacle.position[2] - obstacle.size[2] / 2.0;
        let max_z = obstacle.position[2] + obstacle.size[2] / 2.0;

        let overlaps = position[0] + radius > min_x
            && position[0] - radius < max_x
            && position[2] + radius > min_z
            && position[2] - radius < max_z;
        if !overlaps {
            continue;
        }

        return Some(match obstacle.kind {
            ObstacleType::Water => Contact::Water,
            ObstacleType::Sand => Contact::Sand,
            ObstacleType::Ramp => Contact::Ramp,
            ObstacleType::Wall => {
                // Pick the face with the shallowest penetration.
                let penetration_x = (position[0] - min_x)
                    .abs()
                    .min((position[0] - max_x).abs());
                let penetration_z = (position[2] - min_z)
                    .abs()
                    .min((position[2] - max_z).abs());

                let normal = if penetration_x < penetration_z {
                    if position[0] < obstacle.position[0] {
                        [-1.0, 0.0]
                    } else {
                        [1.0, 0.0]
                    }
                } else if position[2] < obstacle.position[2] {
                    [0.0, -1.0]
                } else {
                    [0.0, 1.0]
                };
                Contact::Wall { normal }
            }
        });
    }

    None
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::COURSE_HOLES;

    /// An obstacle-free layout with generous bounds, for tests that
    /// need to watch friction alone.
    const OPEN_FIELD: CourseHole = CourseHole {
        id: 0,
        name: "open field",
        position: [0.0, 0.0, -500.0],
        start: [0.0, 0.0, 0.0],
        par: 2,
        width: 1000.0,
        length: 1000.0,
        obstacles: &[],
    };

    const ONE_WALL: CourseHole = CourseHole {
        id: 0,
        name: "one wall",
        position: [0.0, 0.0, -10.0],
        start: [0.0, 0.0, 0.0],
        par: 2,
        width: 30.0,
        length: 30.0,
        obstacles: &[Obstacle {
            position: [1.0, 0.0, 0.0],
            size: [0.5, 0.5, 4.0],
            kind: ObstacleType::Wall,
        }],
    };

    #[test]
    fn test_simulate_shot_zero_power_leaves_ball_in_place() {
        let start = [1.0, 0.0, 2.0];
        let result = simulate_shot(start, 37.0, 0.0, &COURSE_HOLES[0]);

        assert_eq!(result.position, start);
        assert!(!result.in_hole);
        assert!(!result.in_water);
        assert!(!result.in_sand);
    }

    #[test]
    fn test_simulate_shot_is_deterministic() {
        let a = simulate_shot([0.0, 0.0, 5.0], 213.7, 64.2, &COURSE_HOLES[8]);
        let b = simulate_shot([0.0, 0.0, 5.0], 213.7, 64.2, &COURSE_HOLES[8]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_straight_shot_travels_along_x_only() {
        // Angle 0 points down +x; sin(0) is exactly 0, so z never moves.
        let result = simulate_shot([0.0, 0.0, 5.0], 0.0, 5.0, &COURSE_HOLES[0]);

        assert!(!result.in_hole && !result.in_water && !result.in_sand);
        assert_eq!(result.position[2], 5.0);
        // v0 = 0.25; the geometric decay series tops out around 5 units,
        // minus the tail cut off by the stop threshold.
        assert!(result.position[0] > 4.0, "got {}", result.position[0]);
        assert!(result.position[0] < 5.0, "got {}", result.position[0]);
    }

    #[test]
    fn test_shot_into_cup_sets_in_hole_and_keeps_position() {
        // One step of v = 0.45 from half a unit out lands 0.05 from the
        // cup, inside the capture radius.
        let result = simulate_shot([0.0, 0.0, -4.5], -90.0, 9.0, &COURSE_HOLES[0]);

        assert!(result.in_hole);
        assert!(!result.in_water && !result.in_sand);
        // Captured position is reported as-is, unperturbed by boundary
        // or bounce handling.
        assert!((result.position[2] + 4.95).abs() < 1e-3);
        assert!(result.position[0].abs() < 1e-3);
    }

    #[test]
    fn test_long_putt_drains_into_cup() {
        // Hole 1 is a straight flat lane: start at z = 5, cup at z = -5.
        // v0 tuned so the 13th step lands on the cup.
        let result = simulate_shot([0.0, 0.0, 5.0], -90.0, 20.55, &COURSE_HOLES[0]);

        assert!(result.in_hole);
        assert!((result.position[2] + 5.0).abs() < CAPTURE_RADIUS);
    }

    #[test]
    fn test_water_returns_ball_to_start() {
        // Hole 3 has a pond across the middle; a firm straight shot
        // toward the cup lands in it.
        let start = [0.0, 0.0, 6.0];
        let result = simulate_shot(start, -90.0, 20.0, &COURSE_HOLES[2]);

        assert!(result.in_water);
        assert!(!result.in_hole);
        // Never a position inside or beyond the hazard — always the
        // original start.
        assert_eq!(result.position, start);
    }

    #[test]
    fn test_sand_flags_and_slows_the_ball() {
        // Hole 4's back trap spans x in [-2.5, 2.5], z in [-6, -4]; a
        // straight shot down the middle rolls into it and dies there.
        let result = simulate_shot([0.0, 0.0, 7.0], -90.0, 20.0, &COURSE_HOLES[3]);

        assert!(result.in_sand);
        assert!(!result.in_water && !result.in_hole);
        assert!(result.position[2] < -3.9, "got {}", result.position[2]);
        assert!(result.position[2] > -6.5, "got {}", result.position[2]);
    }

    #[test]
    fn test_wall_reflects_the_ball_back() {
        // Straight +x shot grazing into the wall face at x = 0.75: the
        // contact step reflects the velocity and the ball rolls back
        // well behind where it started.
        let result = simulate_shot([0.0, 0.0, 0.0], 0.0, 7.0, &ONE_WALL);

        assert!(!result.in_water && !result.in_hole && !result.in_sand);
        assert!(result.position[0] < -1.0, "got {}", result.position[0]);
        assert_eq!(result.position[2], 0.0);
    }

    #[test]
    fn test_corridor_walls_contain_the_ball() {
        // Hole 2's corridor walls sit at x = ±2. Fired sideways from
        // between them, the ball ping-pongs but never escapes.
        let result = simulate_shot([0.0, 0.0, 0.0], 0.0, 40.0, &COURSE_HOLES[1]);

        assert!(result.position[0].abs() < 2.5, "got {}", result.position[0]);
    }

    #[test]
    fn test_outer_boundary_clamps_position() {
        // Full power at hole 1's right edge: the ball can never rest
        // outside the course.
        let result = simulate_shot([0.0, 0.0, 5.0], 0.0, 100.0, &COURSE_HOLES[0]);

        let half_width = COURSE_HOLES[0].width / 2.0;
        assert!(result.position[0] <= half_width - BALL_RADIUS + 1e-4);
        assert!(result.position[0] >= -half_width + BALL_RADIUS - 1e-4);
    }

    #[test]
    fn test_step_cap_bounds_a_full_power_shot() {
        // v0 = 5 needs ~121 steps to decay below the stop threshold, so
        // this run is ended by the cap. Total travel is the truncated
        // geometric series: 100 * (1 - 0.95^100) ≈ 99.4.
        let result = simulate_shot([0.0, 0.0, 0.0], 0.0, 100.0, &OPEN_FIELD);

        assert!(result.position[0] > 90.0, "got {}", result.position[0]);
        assert!(result.position[0] < 100.0, "got {}", result.position[0]);
    }

    #[test]
    fn test_shot_starting_inside_sand_is_still_simulated() {
        // No pre-check: the ball only picks up the sand flag once a
        // step's contact scan sees it, then drags to a stop.
        let inside_trap = [0.0, 0.0, -5.0];
        let result = simulate_shot(inside_trap, 90.0, 10.0, &COURSE_HOLES[3]);

        assert!(result.in_sand);
        assert!(result.position[2] > inside_trap[2]);
    }
}
