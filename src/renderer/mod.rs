//! Rendering module
//!
//! `scene` holds the backend-independent draw requests; the WebGPU pipeline
//! tessellates them into flat-colored triangles.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderFailure, RenderState};
pub use scene::{Circle, DrawRequest, Label, LineSegment, static_labels};
