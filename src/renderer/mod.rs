//! WebGPU rendering module
//!
//! Games build a [`Scene`] of flat-coloured triangles in their own coordinate
//! space; [`RenderState`] letterboxes it onto the canvas.

pub mod pipeline;
pub mod shapes;
pub mod vertex;
pub mod viewport;

pub use pipeline::RenderState;
pub use shapes::Scene;
pub use vertex::{Color, Vertex, colors, rgb, with_alpha};
pub use viewport::Viewport;
