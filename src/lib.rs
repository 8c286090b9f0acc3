//! Pendulum Sim - an interactive double pendulum
//!
//! Core modules:
//! - `sim`: Dynamics model, ODE integrator and the per-frame state machine
//! - `renderer`: Draw requests and the WebGPU pipeline that consumes them
//! - `platform`: Input queue and frame pacing shared by the browser/native hosts
//! - `settings`: Immutable startup configuration

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{DisplayParams, InteractionParams, PhysicsParams, Settings, SettingsError};

use glam::{DVec2, IVec2};

/// Simulation configuration constants
pub mod consts {
    /// Integration span per frame (simulation time units)
    pub const SIM_DT: f64 = 0.01;
    /// Target frame rate (Hz)
    pub const FRAME_RATE: u32 = 100;
    /// Maximum ticks per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Screen dimensions (pixels)
    pub const SCREEN_WIDTH: u32 = 800;
    pub const SCREEN_HEIGHT: u32 = 800;
    /// Pivot point, screen centre moved 150px up
    pub const ORIGIN: (i32, i32) = (400, 250);
    /// Pixels per unit of rod length
    pub const SCALE: f64 = 200.0;

    /// Physical constants
    pub const GRAVITY: f64 = 9.81;
    pub const LENGTH_1: f64 = 1.0;
    pub const LENGTH_2: f64 = 1.0;
    pub const MASS_1: f64 = 1.0;
    pub const MASS_2: f64 = 1.0;
    /// Linear damping on each angular velocity (visual stability, not physics)
    pub const DRAG: f64 = 0.1;

    /// Starting angles (radians from the downward vertical)
    pub const INITIAL_THETA_1: f64 = std::f64::consts::PI / 7.0;
    pub const INITIAL_THETA_2: f64 = std::f64::consts::PI / 4.0;

    /// Drawing
    pub const ROD_WIDTH: f32 = 5.0;
    pub const BOB_RADIUS: f32 = 10.0;
    pub const BACKGROUND_COLOR: [u8; 3] = [173, 216, 230]; // Light blue
    pub const ROD_COLOR: [u8; 3] = [0, 0, 0];
    pub const BOB_COLOR: [u8; 3] = [255, 255, 0]; // Yellow
    pub const TEXT_COLOR: [u8; 3] = [0, 0, 0];

    /// Static labels
    pub const TITLE_TEXT: &str = "Pendulum Simulator";
    pub const TITLE_POS: (i32, i32) = (10, 10);
    pub const TITLE_SIZE: f32 = 50.0;
    pub const INSTRUCTIONS_TEXT: &str = "Drag and drop the pendulum to the location you want.";
    pub const INSTRUCTIONS_POS: (i32, i32) = (10, 70);
    pub const INSTRUCTIONS_SIZE: f32 = 30.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Angle of a pointer relative to the pivot, measured from the downward vertical
///
/// Screen Y grows downward, so the vertical delta is negated before `atan2`.
#[inline]
pub fn pointer_to_angle(pointer: IVec2, origin: IVec2) -> f64 {
    let delta = (pointer - origin).as_dvec2();
    normalize_angle((-delta.y).atan2(delta.x) + std::f64::consts::FRAC_PI_2)
}

/// Pendulum-frame offset (rod of length `r` at angle `theta`) in screen axes
#[inline]
pub fn rod_offset(r: f64, theta: f64) -> DVec2 {
    let (sin, cos) = theta.sin_cos();
    DVec2::new(r * sin, r * cos)
}
