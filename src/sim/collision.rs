//! Collision detection and response for axis-aligned rects and circles
//!
//! Everything in the arcade is a box or a ball, so these few tests cover
//! paddles, bricks, bullets, cars, pipes and explosions alike.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Strict overlap (touching edges don't count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    /// Grow (or shrink, with a negative amount) on every side
    pub fn inflate(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.w + amount * 2.0,
            self.h + amount * 2.0,
        )
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// Result of a collision check
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at contact (pointing toward the circle, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against a rect
///
/// When the centre is inside the rect the normal points out through the
/// nearest face, so a tunnelled ball still gets pushed back the way it came.
pub fn circle_rect(center: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    let closest = rect.closest_point(center);
    let offset = center - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > 0.0 {
        if dist_sq >= radius * radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            normal: offset / dist,
            penetration: radius - dist,
        };
    }

    // Centre inside: pick the face with the least overlap
    let faces = [
        (center.x - rect.x, Vec2::NEG_X),
        (rect.right() - center.x, Vec2::X),
        (center.y - rect.y, Vec2::NEG_Y),
        (rect.bottom() - center.y, Vec2::Y),
    ];
    let (depth, normal) = faces
        .iter()
        .copied()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, Vec2::NEG_Y));

    CollisionResult {
        hit: true,
        normal,
        penetration: depth + radius,
    }
}

#[inline]
pub fn circle_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

#[inline]
pub fn point_in_circle(p: Vec2, center: Vec2, radius: f32) -> bool {
    p.distance_squared(center) <= radius * radius
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Wrap a position into [0, size) on both axes (toroidal playfield)
pub fn wrap_position(p: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(p.x.rem_euclid(size.x), p.y.rem_euclid(size.y))
}

/// Bounce angle for paddle games: contact offset -1..1 maps to ±max_angle
/// off the paddle's facing direction
pub fn paddle_deflection(offset: f32, max_angle: f32) -> f32 {
    offset.clamp(-1.0, 1.0) * max_angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(a.contains(Vec2::new(0.0, 9.9)));
        assert!(!a.contains(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn circle_hits_rect_face() {
        let rect = Rect::new(0.0, 100.0, 200.0, 20.0);
        // Ball just above the top face
        let result = circle_rect(Vec2::new(50.0, 95.0), 8.0, &rect);
        assert!(result.hit);
        assert!((result.normal - Vec2::NEG_Y).length() < 1e-5);
        assert!((result.penetration - 3.0).abs() < 1e-4);

        let result = circle_rect(Vec2::new(50.0, 80.0), 8.0, &rect);
        assert!(!result.hit);
    }

    #[test]
    fn circle_inside_rect_pushes_out_nearest_face() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let result = circle_rect(Vec2::new(50.0, 18.0), 4.0, &rect);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn wraps_negative_coordinates() {
        let size = Vec2::new(800.0, 600.0);
        let p = wrap_position(Vec2::new(-10.0, 610.0), size);
        assert!((p - Vec2::new(790.0, 10.0)).length() < 1e-3);
    }

    proptest! {
        #[test]
        fn circle_circle_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            ra in 0.0f32..50.0, rb in 0.0f32..50.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(circle_circle(a, ra, b, rb), circle_circle(b, rb, a, ra));
        }

        #[test]
        fn rect_intersection_is_symmetric(
            x1 in -100.0f32..100.0, y1 in -100.0f32..100.0, w1 in 0.1f32..50.0, h1 in 0.1f32..50.0,
            x2 in -100.0f32..100.0, y2 in -100.0f32..100.0, w2 in 0.1f32..50.0, h2 in 0.1f32..50.0,
        ) {
            let a = Rect::new(x1, y1, w1, h1);
            let b = Rect::new(x2, y2, w2, h2);
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn reflection_preserves_speed(vx in -500.0f32..500.0, vy in -500.0f32..500.0, angle in 0.0f32..6.28) {
            let v = Vec2::new(vx, vy);
            let n = Vec2::new(angle.cos(), angle.sin());
            let r = reflect_velocity(v, n);
            prop_assert!((r.length() - v.length()).abs() < 1e-2);
        }
    }
}
