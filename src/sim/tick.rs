//! Fixed-cadence frame step
//!
//! Strict order per frame: drain input, apply any drag override, integrate
//! one step, project, emit the draw request.

use glam::IVec2;

use super::dynamics::PendulumState;
use super::integrator::{self, IntegrationError, Tolerances};
use super::projection::project;
use super::state::{EventEffect, SimState};
use crate::consts::SIM_DT;
use crate::renderer::scene::DrawRequest;
use crate::settings::Settings;

/// A discrete input event, in arrival order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Window/page is going away
    Quit,
    /// Pointer button pressed (position comes from the pointer query)
    PointerDown,
    /// Pointer button released at `position`
    PointerUp { position: IVec2 },
    /// Pointer moved (keeps the last known position fresh)
    PointerMoved { position: IVec2 },
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Events drained this frame, oldest first
    pub events: Vec<InputEvent>,
    /// Current pointer position, if the host can report one
    pub pointer: Option<IVec2>,
}

/// What the host should do after a frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Draw and keep going
    Continue(FrameReport),
    /// Quit was requested; nothing was integrated this frame
    Quit,
}

/// Result of a frame that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub draw: DrawRequest,
    /// False when the integration step was rejected and the previous
    /// state was kept
    pub stepped: bool,
}

/// Advance the simulation by one frame
pub fn tick(state: &mut SimState, input: &FrameInput, settings: &Settings) -> FrameOutcome {
    // 1. Input
    for event in &input.events {
        match state.apply_event(event, settings) {
            EventEffect::Quit => {
                log::info!("Quit requested after {} frames", state.frame);
                return FrameOutcome::Quit;
            }
            EventEffect::PhaseChanged(phase) => log::debug!("Drag phase -> {:?}", phase),
            EventEffect::None => {}
        }
    }

    // 2. Drag override
    if state.is_dragging() {
        let pointer = input.pointer.unwrap_or(state.pointer);
        state.pointer = pointer;
        state.override_angles(pointer, settings);
    }

    // 3-4. Integrate, keeping the previous state on failure
    let stepped = match advance(&state.pendulum, settings) {
        Ok(next) => {
            state.pendulum = next;
            true
        }
        Err(e) => {
            state.skipped_steps += 1;
            log::warn!(
                "Frame {}: integration step skipped ({}), {} skipped so far",
                state.frame,
                e,
                state.skipped_steps
            );
            false
        }
    };
    state.frame += 1;

    // 5-6. Project and draw
    let bobs = project(&state.pendulum, &settings.physics, &settings.display);
    FrameOutcome::Continue(FrameReport {
        draw: DrawRequest::for_pendulum(&bobs, &settings.display),
        stepped,
    })
}

/// One integration step of `SIM_DT` from the given state
pub fn advance(
    pendulum: &PendulumState,
    settings: &Settings,
) -> Result<PendulumState, IntegrationError> {
    let next = PendulumState::from_vec(integrator::step(
        settings.physics.rhs(),
        pendulum.to_vec(),
        SIM_DT,
        &Tolerances::default(),
    )?);
    if !next.is_finite() {
        return Err(IntegrationError::NonFiniteState { t: SIM_DT });
    }
    Ok(next)
}
