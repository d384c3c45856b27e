//! Input collection
//!
//! DOM callbacks push raw events into an [`InputCollector`]; once per frame the
//! shell takes a [`FrameInput`] snapshot that the mounted game reads during its
//! fixed-timestep ticks.

use glam::Vec2;
use std::collections::HashSet;

/// Logical keys shared by every game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Space bar: fire, jump, flap, launch
    Action,
    /// Enter: confirm menu selection, start
    Confirm,
    Pause,
    Restart,
    /// Leave the current game for the menu
    Back,
    Mute,
    Digit(u8),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value to a logical key
    pub fn from_dom(name: &str) -> Option<Self> {
        let key = match name {
            "ArrowLeft" | "a" | "A" => Key::Left,
            "ArrowRight" | "d" | "D" => Key::Right,
            "ArrowUp" | "w" | "W" => Key::Up,
            "ArrowDown" | "s" | "S" => Key::Down,
            " " | "Spacebar" => Key::Action,
            "Enter" => Key::Confirm,
            "Escape" | "p" | "P" => Key::Pause,
            "r" | "R" => Key::Restart,
            "q" | "Q" | "Backspace" => Key::Back,
            "m" | "M" => Key::Mute,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c @ '1'..='9'), None) => Key::Digit(c as u8 - b'0'),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Which pointer button produced a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

impl PointerButton {
    /// From `MouseEvent.button()` (0 = primary, 2 = secondary)
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(PointerButton::Primary),
            2 => Some(PointerButton::Secondary),
            _ => None,
        }
    }
}

/// A click in game-space coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerClick {
    pub pos: Vec2,
    pub button: PointerButton,
}

/// Input state for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    held: HashSet<Key>,
    pressed: Vec<Key>,
    /// Last known pointer position in game space
    pub pointer: Option<Vec2>,
    clicks: Vec<PointerClick>,
}

impl FrameInput {
    /// Nothing held, nothing pressed
    pub fn idle() -> Self {
        Self::default()
    }

    /// Builder used by tests and the native attract mode
    pub fn with_pressed(mut self, key: Key) -> Self {
        self.pressed.push(key);
        self.held.insert(key);
        self
    }

    pub fn with_held(mut self, key: Key) -> Self {
        self.held.insert(key);
        self
    }

    pub fn with_click(mut self, pos: Vec2, button: PointerButton) -> Self {
        self.clicks.push(PointerClick { pos, button });
        self.pointer = Some(pos);
        self
    }

    pub fn held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Key went down this frame
    pub fn pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn pressed_keys(&self) -> &[Key] {
        &self.pressed
    }

    /// -1, 0 or 1 from Left/Right
    pub fn axis_x(&self) -> f32 {
        (self.held(Key::Right) as i32 - self.held(Key::Left) as i32) as f32
    }

    /// -1, 0 or 1 from Up/Down (down is positive, matching screen space)
    pub fn axis_y(&self) -> f32 {
        (self.held(Key::Down) as i32 - self.held(Key::Up) as i32) as f32
    }

    pub fn clicks(&self) -> &[PointerClick] {
        &self.clicks
    }

    pub fn primary_click(&self) -> Option<Vec2> {
        self.clicks
            .iter()
            .find(|c| c.button == PointerButton::Primary)
            .map(|c| c.pos)
    }

    pub fn secondary_click(&self) -> Option<Vec2> {
        self.clicks
            .iter()
            .find(|c| c.button == PointerButton::Secondary)
            .map(|c| c.pos)
    }

    /// Presses or clicks that a tick has yet to see
    pub fn has_one_shots(&self) -> bool {
        !self.pressed.is_empty() || !self.clicks.is_empty()
    }

    /// This frame's state with one-shots from an earlier, unticked frame
    /// queued in front of its own
    pub fn carry_over(mut self, earlier: FrameInput) -> Self {
        let mut pressed = earlier.pressed;
        pressed.extend(self.pressed);
        self.pressed = pressed;
        let mut clicks = earlier.clicks;
        clicks.extend(self.clicks);
        self.clicks = clicks;
        self.pointer = self.pointer.or(earlier.pointer);
        self
    }

    /// Same frame with one-shot events removed (for extra substeps)
    pub fn continuous(&self) -> Self {
        Self {
            held: self.held.clone(),
            pressed: Vec::new(),
            pointer: self.pointer,
            clicks: Vec::new(),
        }
    }
}

/// Accumulates raw events between frames
#[derive(Debug, Default)]
pub struct InputCollector {
    held: HashSet<Key>,
    pressed: Vec<Key>,
    pointer: Option<Vec2>,
    clicks: Vec<PointerClick>,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key down; auto-repeat is ignored so `pressed` fires once per physical press
    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.pressed.push(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
    }

    pub fn pointer_down(&mut self, pos: Vec2, button: PointerButton) {
        self.pointer = Some(pos);
        self.clicks.push(PointerClick { pos, button });
    }

    /// Window lost focus: release everything so keys don't stick
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Snapshot for this frame, clearing one-shot events
    pub fn take_frame(&mut self) -> FrameInput {
        FrameInput {
            held: self.held.clone(),
            pressed: std::mem::take(&mut self.pressed),
            pointer: self.pointer,
            clicks: std::mem::take(&mut self.clicks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_dom_names() {
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom("W"), Some(Key::Up));
        assert_eq!(Key::from_dom(" "), Some(Key::Action));
        assert_eq!(Key::from_dom("3"), Some(Key::Digit(3)));
        assert_eq!(Key::from_dom("0"), None);
        assert_eq!(Key::from_dom("F5"), None);
    }

    #[test]
    fn auto_repeat_only_presses_once() {
        let mut input = InputCollector::new();
        input.key_down(Key::Action);
        input.key_down(Key::Action);
        let frame = input.take_frame();
        assert_eq!(frame.pressed_keys(), &[Key::Action]);
        assert!(frame.held(Key::Action));

        // Still held next frame, but not newly pressed
        let frame = input.take_frame();
        assert!(!frame.pressed(Key::Action));
        assert!(frame.held(Key::Action));

        input.key_up(Key::Action);
        assert!(!input.take_frame().held(Key::Action));
    }

    #[test]
    fn clicks_are_one_shot() {
        let mut input = InputCollector::new();
        input.pointer_down(Vec2::new(10.0, 20.0), PointerButton::Secondary);
        let frame = input.take_frame();
        assert_eq!(frame.secondary_click(), Some(Vec2::new(10.0, 20.0)));
        assert_eq!(frame.primary_click(), None);
        assert!(frame.continuous().clicks().is_empty());

        let frame = input.take_frame();
        assert!(frame.clicks().is_empty());
        assert_eq!(frame.pointer, Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn carried_presses_come_first() {
        let earlier = FrameInput::idle()
            .with_pressed(Key::Up)
            .with_click(Vec2::new(1.0, 2.0), PointerButton::Primary);
        let frame = FrameInput::idle().with_pressed(Key::Left).carry_over(earlier);
        assert_eq!(frame.pressed_keys(), &[Key::Up, Key::Left]);
        assert_eq!(frame.primary_click(), Some(Vec2::new(1.0, 2.0)));
        // Held state is this frame's only
        assert!(!frame.held(Key::Up));
        assert!(frame.has_one_shots());
        assert!(!frame.continuous().has_one_shots());
    }

    #[test]
    fn axes() {
        let frame = FrameInput::idle().with_held(Key::Left).with_held(Key::Down);
        assert_eq!(frame.axis_x(), -1.0);
        assert_eq!(frame.axis_y(), 1.0);
    }
}
