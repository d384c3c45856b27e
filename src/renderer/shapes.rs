//! Shape generation for 2D primitives
//!
//! Games describe each frame by pushing primitives into a [`Scene`] in their
//! own game-space coordinates; the pipeline maps them to the canvas.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::{Color, Vertex, colors};
use crate::sim::Rect;

/// 3x5 bitmap numerals, one row per entry, bit 2 = left column
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// One frame's worth of triangles in game space
#[derive(Debug, Clone)]
pub struct Scene {
    size: Vec2,
    background: Color,
    effects: bool,
    vertices: Vec<Vertex>,
}

impl Scene {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            background: colors::BACKGROUND,
            effects: true,
            vertices: Vec::with_capacity(4096),
        }
    }

    /// Start a new frame, keeping the allocation
    pub fn begin(&mut self, size: Vec2, effects: bool) {
        self.size = size;
        self.effects = effects;
        self.background = colors::BACKGROUND;
        self.vertices.clear();
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Particles, flashes and other non-gameplay flourishes
    pub fn effects_enabled(&self) -> bool {
        self.effects
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.vertices.push(Vertex::new(a.x, a.y, color));
        self.vertices.push(Vertex::new(b.x, b.y, color));
        self.vertices.push(Vertex::new(c.x, c.y, color));
    }

    fn quad(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: Color) {
        self.triangle(a, b, c, color);
        self.triangle(a, c, d, color);
    }

    /// Filled axis-aligned rectangle
    pub fn rect(&mut self, rect: Rect, color: Color) {
        let a = rect.min();
        let c = rect.max();
        self.quad(a, Vec2::new(c.x, a.y), c, Vec2::new(a.x, c.y), color);
    }

    /// Rectangle border drawn inside the rect bounds
    pub fn rect_outline(&mut self, rect: Rect, thickness: f32, color: Color) {
        let t = thickness.min(rect.w / 2.0).min(rect.h / 2.0);
        self.rect(Rect::new(rect.x, rect.y, rect.w, t), color);
        self.rect(Rect::new(rect.x, rect.bottom() - t, rect.w, t), color);
        self.rect(Rect::new(rect.x, rect.y + t, t, rect.h - 2.0 * t), color);
        self.rect(Rect::new(rect.right() - t, rect.y + t, t, rect.h - 2.0 * t), color);
    }

    /// Thick line segment
    pub fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) {
        let dir = (to - from).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let perp = Vec2::new(-dir.y, dir.x) * (thickness / 2.0);
        self.quad(from + perp, to + perp, to - perp, from - perp, color);
    }

    /// Generate a filled circle
    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let segments = segments_for(radius);
        for i in 0..segments {
            let theta1 = (i as f32 / segments as f32) * TAU;
            let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
            self.triangle(
                center,
                center + Vec2::new(theta1.cos(), theta1.sin()) * radius,
                center + Vec2::new(theta2.cos(), theta2.sin()) * radius,
                color,
            );
        }
    }

    /// Hollow circle band between two radii
    pub fn ring(&mut self, center: Vec2, inner_radius: f32, outer_radius: f32, color: Color) {
        let segments = segments_for(outer_radius);
        for i in 0..segments {
            let theta1 = (i as f32 / segments as f32) * TAU;
            let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
            let d1 = Vec2::new(theta1.cos(), theta1.sin());
            let d2 = Vec2::new(theta2.cos(), theta2.sin());
            self.quad(
                center + d1 * inner_radius,
                center + d1 * outer_radius,
                center + d2 * outer_radius,
                center + d2 * inner_radius,
                color,
            );
        }
    }

    /// Closed outline through `points`
    pub fn polygon_outline(&mut self, points: &[Vec2], thickness: f32, color: Color) {
        if points.len() < 2 {
            return;
        }
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.line(a, b, thickness, color);
        }
    }

    /// Non-negative integer in 3x5 pixel digits, `pixel` game units per dot.
    /// Returns the drawn width.
    pub fn digits(&mut self, value: u64, top_left: Vec2, pixel: f32, color: Color) -> f32 {
        let text = value.to_string();
        let advance = pixel * 4.0;
        for (i, ch) in text.bytes().enumerate() {
            let glyph = &DIGIT_GLYPHS[(ch - b'0') as usize];
            let origin = top_left + Vec2::new(i as f32 * advance, 0.0);
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        self.rect(
                            Rect::new(
                                origin.x + col as f32 * pixel,
                                origin.y + row as f32 * pixel,
                                pixel,
                                pixel,
                            ),
                            color,
                        );
                    }
                }
            }
        }
        text.len() as f32 * advance - pixel
    }

    /// Digits centred on a point
    pub fn digits_centered(&mut self, value: u64, center: Vec2, pixel: f32, color: Color) {
        let len = value.to_string().len() as f32;
        let width = len * pixel * 4.0 - pixel;
        let top_left = center - Vec2::new(width / 2.0, pixel * 2.5);
        self.digits(value, top_left, pixel, color);
    }
}

fn segments_for(radius: f32) -> u32 {
    ((radius * 0.8) as u32).clamp(8, 48)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_two_triangles() {
        let mut scene = Scene::new(Vec2::new(100.0, 100.0));
        scene.rect(Rect::new(0.0, 0.0, 10.0, 10.0), colors::WHITE);
        assert_eq!(scene.vertices().len(), 6);
    }

    #[test]
    fn digit_one_lights_eight_pixels() {
        let mut scene = Scene::new(Vec2::new(100.0, 100.0));
        let width = scene.digits(1, Vec2::ZERO, 2.0, colors::WHITE);
        assert_eq!(scene.vertices().len(), 8 * 6);
        assert_eq!(width, 6.0);
    }

    #[test]
    fn begin_clears_previous_frame() {
        let mut scene = Scene::new(Vec2::new(100.0, 100.0));
        scene.circle(Vec2::splat(50.0), 10.0, colors::WHITE);
        scene.set_background(colors::NAVY);
        scene.begin(Vec2::new(200.0, 100.0), false);
        assert!(scene.vertices().is_empty());
        assert!(!scene.effects_enabled());
        assert_eq!(scene.background(), colors::BACKGROUND);
    }
}
