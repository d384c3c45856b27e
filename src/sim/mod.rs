//! Simulation helpers
//!
//! Small, deterministic building blocks the games share. There is no engine
//! here: each game keeps its own state and update loop and only borrows:
//! - Rect/circle collision tests
//! - A row-major grid for board games
//! - A seeded RNG

pub mod collision;
pub mod grid;
pub mod rng;

pub use collision::{
    CollisionResult, Rect, circle_circle, circle_rect, paddle_deflection, point_in_circle,
    reflect_velocity, wrap_position,
};
pub use grid::{Cell, Dir, Grid};
pub use rng::GameRng;
