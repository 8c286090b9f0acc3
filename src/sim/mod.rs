//! Deterministic simulation module
//!
//! All pendulum logic lives here. This module must stay pure:
//! - Fixed integration span per frame
//! - Input applied before physics, physics before drawing
//! - No GPU or platform dependencies (draw requests are plain data)

pub mod dynamics;
pub mod integrator;
pub mod projection;
pub mod state;
pub mod tick;

pub use dynamics::{PendulumState, derivative, total_energy};
pub use integrator::{IntegrationError, Tolerances, integrate, step};
pub use projection::{BobPositions, project};
pub use state::{DragPhase, EventEffect, SimState};
pub use tick::{FrameInput, FrameOutcome, FrameReport, InputEvent, advance, tick};
