//! The static nine-hole course.
//!
//! Pure data: hole layouts are `const` and never mutated at runtime.
//! Coordinates live in a flat x/z plane (y is up and unused by the
//! simulation); each hole is centered on the origin with `width` along x
//! and `length` along z.

/// What a region of the course does to a ball that enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleType {
    /// Solid: the ball bounces off with energy loss.
    Wall,
    /// Hazard: the shot is aborted back to its starting position.
    Water,
    /// Slow ground: elevated friction for the rest of the shot.
    Sand,
    /// Decorative slope. No effect on the simulation.
    Ramp,
}

/// An axis-aligned region on a hole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Center of the region, `[x, y, z]`.
    pub position: [f32; 3],
    /// Full extents, `[width, height, depth]`. Height is cosmetic.
    pub size: [f32; 3],
    pub kind: ObstacleType,
}

/// One of the nine static hole layouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseHole {
    /// 0-based hole index.
    pub id: usize,
    pub name: &'static str,
    /// Where the cup sits.
    pub position: [f32; 3],
    /// Where every ball starts.
    pub start: [f32; 3],
    /// Target stroke count. Cosmetic — never enforced.
    pub par: u32,
    /// Course extent along x.
    pub width: f32,
    /// Course extent along z.
    pub length: f32,
    /// Regions affecting the ball, evaluated in declaration order.
    pub obstacles: &'static [Obstacle],
}

/// Number of holes in a round.
pub const HOLE_COUNT: usize = 9;

const fn wall(position: [f32; 3], size: [f32; 3]) -> Obstacle {
    Obstacle {
        position,
        size,
        kind: ObstacleType::Wall,
    }
}

const fn water(position: [f32; 3], size: [f32; 3]) -> Obstacle {
    Obstacle {
        position,
        size,
        kind: ObstacleType::Water,
    }
}

const fn sand(position: [f32; 3], size: [f32; 3]) -> Obstacle {
    Obstacle {
        position,
        size,
        kind: ObstacleType::Sand,
    }
}

/// The full nine-hole course, in play order.
pub static COURSE_HOLES: [CourseHole; HOLE_COUNT] = [
    CourseHole {
        id: 0,
        name: "Simple Start",
        position: [0.0, 0.0, -5.0],
        start: [0.0, 0.0, 5.0],
        par: 2,
        width: 15.0,
        length: 15.0,
        obstacles: &[],
    },
    CourseHole {
        id: 1,
        name: "Narrow Path",
        position: [0.0, 0.0, -6.0],
        start: [0.0, 0.0, 6.0],
        par: 3,
        width: 15.0,
        length: 15.0,
        obstacles: &[
            // Walls on either side of the fairway.
            wall([-2.0, 0.0, 0.0], [0.5, 0.5, 8.0]),
            wall([2.0, 0.0, 0.0], [0.5, 0.5, 8.0]),
        ],
    },
    CourseHole {
        id: 2,
        name: "Water Hazard",
        position: [0.0, 0.0, -6.0],
        start: [0.0, 0.0, 6.0],
        par: 3,
        width: 15.0,
        length: 15.0,
        obstacles: &[
            // Pond across the middle, with a wall guarding the detour.
            water([0.0, -0.1, 0.0], [6.0, 0.2, 3.0]),
            wall([4.0, 0.0, 0.0], [0.5, 0.5, 10.0]),
        ],
    },
    CourseHole {
        id: 3,
        name: "Sand Traps",
        position: [0.0, 0.0, -7.0],
        start: [0.0, 0.0, 7.0],
        par: 3,
        width: 16.0,
        length: 16.0,
        obstacles: &[
            sand([-3.0, -0.1, -2.0], [3.0, 0.2, 2.0]),
            sand([3.0, -0.1, -2.0], [3.0, 0.2, 2.0]),
            sand([0.0, -0.1, -5.0], [5.0, 0.2, 2.0]),
        ],
    },
    CourseHole {
        id: 4,
        name: "Zigzag Challenge",
        position: [5.0, 0.0, -7.0],
        start: [-5.0, 0.0, 7.0],
        par: 4,
        width: 20.0,
        length: 20.0,
        obstacles: &[
            wall([0.0, 0.0, 3.0], [8.0, 0.5, 0.5]),
            wall([0.0, 0.0, -3.0], [8.0, 0.5, 0.5]),
        ],
    },
    CourseHole {
        id: 5,
        name: "Island Hole",
        position: [0.0, 0.0, 0.0],
        start: [0.0, 0.0, 7.0],
        par: 4,
        width: 20.0,
        length: 20.0,
        obstacles: &[
            // Water ringing the cup; the island wall sits on top and is
            // found first by a ball that makes it there.
            water([0.0, -0.1, 0.0], [10.0, 0.2, 10.0]),
            wall([0.0, -0.05, 0.0], [2.0, 0.3, 2.0]),
        ],
    },
    CourseHole {
        id: 6,
        name: "Mini Maze",
        position: [5.0, 0.0, -5.0],
        start: [-5.0, 0.0, 6.0],
        par: 5,
        width: 20.0,
        length: 20.0,
        obstacles: &[
            wall([0.0, 0.0, 2.0], [8.0, 0.5, 0.5]),
            wall([0.0, 0.0, -2.0], [8.0, 0.5, 0.5]),
            wall([-3.0, 0.0, 0.0], [0.5, 0.5, 3.0]),
            wall([3.0, 0.0, 0.0], [0.5, 0.5, 3.0]),
        ],
    },
    CourseHole {
        id: 7,
        name: "The Loop",
        position: [0.0, 0.0, 0.0],
        start: [0.0, 0.0, 7.0],
        par: 4,
        width: 18.0,
        length: 18.0,
        obstacles: &[
            wall([4.0, 0.0, 0.0], [0.5, 0.5, 6.0]),
            wall([-4.0, 0.0, 0.0], [0.5, 0.5, 6.0]),
            wall([0.0, 0.0, -3.0], [7.5, 0.5, 0.5]),
            // Front wall with gaps forming the entrance.
            wall([0.0, 0.0, 3.0], [3.0, 0.5, 0.5]),
            wall([-3.5, 0.0, 3.0], [2.0, 0.5, 0.5]),
            wall([3.5, 0.0, 3.0], [2.0, 0.5, 0.5]),
        ],
    },
    CourseHole {
        id: 8,
        name: "Grand Finale",
        position: [0.0, 0.0, -8.0],
        start: [0.0, 0.0, 8.0],
        par: 5,
        width: 22.0,
        length: 22.0,
        obstacles: &[
            water([0.0, -0.1, 0.0], [10.0, 0.2, 3.0]),
            sand([-5.0, -0.1, -4.0], [3.0, 0.2, 2.0]),
            sand([5.0, -0.1, -4.0], [3.0, 0.2, 2.0]),
            wall([-3.0, 0.0, 4.0], [2.0, 0.5, 0.5]),
            wall([3.0, 0.0, 4.0], [2.0, 0.5, 0.5]),
        ],
    },
];
