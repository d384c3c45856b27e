//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Linear RGBA
pub type Color = [f32; 4];

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// 0xRRGGBB to an opaque color
pub const fn rgb(hex: u32) -> Color {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

/// Same color with a different alpha
pub const fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha]
}

/// Shared arcade palette
pub mod colors {
    use super::{Color, rgb};

    pub const BACKGROUND: Color = [0.02, 0.02, 0.05, 1.0];
    pub const BACKGROUND_HIGH_CONTRAST: Color = [0.0, 0.0, 0.0, 1.0];
    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const DIM: Color = [0.35, 0.35, 0.45, 1.0];
    pub const PANEL: Color = [0.1, 0.1, 0.16, 1.0];
    pub const RED: Color = rgb(0xFF4136);
    pub const ORANGE: Color = rgb(0xFF851B);
    pub const YELLOW: Color = rgb(0xFFDC00);
    pub const GREEN: Color = rgb(0x2ECC40);
    pub const LIME: Color = rgb(0x01FF70);
    pub const TEAL: Color = rgb(0x39CCCC);
    pub const BLUE: Color = rgb(0x0074D9);
    pub const NAVY: Color = rgb(0x001F3F);
    pub const PURPLE: Color = rgb(0xB10DC9);
    pub const PINK: Color = rgb(0xF012BE);
    pub const BROWN: Color = rgb(0x8B5A2B);
    pub const GRAY: Color = rgb(0x888888);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(rgb(0xFF0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(with_alpha(colors::WHITE, 0.5)[3], 0.5);
    }
}
