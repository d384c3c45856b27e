//! Letterboxed mapping between game space, canvas pixels and NDC

use glam::Vec2;

/// Uniformly scales a game-space rectangle (origin top-left, y down) into the
/// canvas, centred, with bars on the longer axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub game_size: Vec2,
    pub canvas_size: Vec2,
    pub scale: f32,
    pub offset: Vec2,
}

impl Viewport {
    pub fn fit(game_size: Vec2, canvas_size: Vec2) -> Self {
        let game = game_size.max(Vec2::ONE);
        let canvas = canvas_size.max(Vec2::ONE);
        let scale = (canvas.x / game.x).min(canvas.y / game.y);
        let offset = (canvas - game * scale) / 2.0;
        Self {
            game_size: game,
            canvas_size: canvas,
            scale,
            offset,
        }
    }

    pub fn game_to_canvas(&self, p: Vec2) -> Vec2 {
        self.offset + p * self.scale
    }

    /// Inverse of `game_to_canvas` (pointer events)
    pub fn canvas_to_game(&self, p: Vec2) -> Vec2 {
        (p - self.offset) / self.scale
    }

    /// Game space to normalized device coordinates (-1..1, y up)
    pub fn game_to_ndc(&self, p: Vec2) -> Vec2 {
        let c = self.game_to_canvas(p);
        Vec2::new(c.x / self.canvas_size.x * 2.0 - 1.0, 1.0 - c.y / self.canvas_size.y * 2.0)
    }

    /// Whether a canvas point lands on the playfield rather than a letterbox bar
    pub fn contains_canvas_point(&self, p: Vec2) -> bool {
        let g = self.canvas_to_game(p);
        g.x >= 0.0 && g.y >= 0.0 && g.x <= self.game_size.x && g.y <= self.game_size.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn letterboxes_wide_canvas() {
        let vp = Viewport::fit(Vec2::new(800.0, 600.0), Vec2::new(1600.0, 600.0));
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.offset, Vec2::new(400.0, 0.0));
        assert_eq!(vp.game_to_ndc(Vec2::ZERO), Vec2::new(-0.5, 1.0));
        assert_eq!(vp.game_to_ndc(Vec2::new(800.0, 600.0)), Vec2::new(0.5, -1.0));
        assert!(!vp.contains_canvas_point(Vec2::new(100.0, 300.0)));
    }

    proptest! {
        #[test]
        fn canvas_roundtrip(
            gw in 50.0f32..2000.0, gh in 50.0f32..2000.0,
            cw in 50.0f32..4000.0, ch in 50.0f32..4000.0,
            px in 0.0f32..1.0, py in 0.0f32..1.0,
        ) {
            let vp = Viewport::fit(Vec2::new(gw, gh), Vec2::new(cw, ch));
            let p = Vec2::new(px * gw, py * gh);
            let back = vp.canvas_to_game(vp.game_to_canvas(p));
            prop_assert!((back - p).length() < 0.05);
        }
    }
}
