//! Interaction state owned by the frame loop
//!
//! The pendulum state vector has a single writer: either a drag override
//! (angles only) or the integrator's output at the end of a frame.

use glam::IVec2;

use super::dynamics::PendulumState;
use super::tick::InputEvent;
use crate::pointer_to_angle;
use crate::settings::Settings;

/// Whether the user is currently dictating the angles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    /// Pointer not held, integrator evolves freely
    #[default]
    Idle,
    /// Pointer held, angles follow the pointer every frame
    Dragging,
}

/// Result of feeding one input event to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventEffect {
    None,
    /// Drag started or ended
    PhaseChanged(DragPhase),
    Quit,
}

/// Everything the frame loop carries from one frame to the next
#[derive(Debug, Clone, Default)]
pub struct SimState {
    pub pendulum: PendulumState,
    pub phase: DragPhase,
    /// Last known pointer position (pixels)
    pub pointer: IVec2,
    /// Frames processed
    pub frame: u64,
    /// Frames whose integration step was rejected
    pub skipped_steps: u64,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Apply one input event
    pub fn apply_event(&mut self, event: &InputEvent, settings: &Settings) -> EventEffect {
        match *event {
            InputEvent::Quit => EventEffect::Quit,
            InputEvent::PointerDown => {
                if self.phase == DragPhase::Dragging {
                    return EventEffect::None;
                }
                self.phase = DragPhase::Dragging;
                EventEffect::PhaseChanged(DragPhase::Dragging)
            }
            InputEvent::PointerUp { position } => {
                self.pointer = position;
                if self.phase == DragPhase::Idle {
                    // Release without a matching press (e.g. press outside the canvas)
                    return EventEffect::None;
                }
                // Final override at the release position
                self.override_angles(position, settings);
                self.phase = DragPhase::Idle;
                EventEffect::PhaseChanged(DragPhase::Idle)
            }
            InputEvent::PointerMoved { position } => {
                self.pointer = position;
                EventEffect::None
            }
        }
    }

    /// Point both rods at the pointer
    ///
    /// Angular velocities are kept unless the settings ask for a reset, so
    /// the first free frame after a drag may carry a stale velocity.
    pub fn override_angles(&mut self, pointer: IVec2, settings: &Settings) {
        let theta = pointer_to_angle(pointer, settings.display.origin);
        self.pendulum.theta1 = theta;
        self.pendulum.theta2 = theta;
        if settings.interaction.reset_velocity_on_drag {
            self.pendulum.omega1 = 0.0;
            self.pendulum.omega2 = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_starts_idle_at_initial_condition() {
        let state = SimState::new();
        assert_eq!(state.phase, DragPhase::Idle);
        assert_eq!(state.pendulum, PendulumState::INITIAL);
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn test_press_then_release_straight_down() {
        let settings = Settings::default();
        let mut state = SimState::new();
        state.pendulum.omega1 = 1.5;
        state.pendulum.omega2 = -0.5;

        let effect = state.apply_event(&InputEvent::PointerDown, &settings);
        assert_eq!(effect, EventEffect::PhaseChanged(DragPhase::Dragging));
        assert!(state.is_dragging());

        let origin = settings.display.origin;
        let release = IVec2::new(origin.x, origin.y + 100);
        let effect = state.apply_event(&InputEvent::PointerUp { position: release }, &settings);
        assert_eq!(effect, EventEffect::PhaseChanged(DragPhase::Idle));
        assert_eq!(state.phase, DragPhase::Idle);
        assert!(state.pendulum.theta1.abs() < 1e-12);
        assert_eq!(state.pendulum.theta1, state.pendulum.theta2);
        // Velocities untouched by the override
        assert_eq!(state.pendulum.omega1, 1.5);
        assert_eq!(state.pendulum.omega2, -0.5);
    }

    #[test]
    fn test_release_to_the_right() {
        let settings = Settings::default();
        let mut state = SimState::new();
        state.apply_event(&InputEvent::PointerDown, &settings);
        let origin = settings.display.origin;
        state.apply_event(
            &InputEvent::PointerUp {
                position: IVec2::new(origin.x + 50, origin.y),
            },
            &settings,
        );
        assert!((state.pendulum.theta1 - PI / 2.0).abs() < 1e-12);
        assert!((state.pendulum.theta2 - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let settings = Settings::default();
        let mut state = SimState::new();
        let effect = state.apply_event(
            &InputEvent::PointerUp {
                position: IVec2::new(0, 0),
            },
            &settings,
        );
        assert_eq!(effect, EventEffect::None);
        assert_eq!(state.pendulum, PendulumState::INITIAL);
        assert_eq!(state.pointer, IVec2::new(0, 0));
    }

    #[test]
    fn test_repeated_press_stays_dragging() {
        let settings = Settings::default();
        let mut state = SimState::new();
        state.apply_event(&InputEvent::PointerDown, &settings);
        let effect = state.apply_event(&InputEvent::PointerDown, &settings);
        assert_eq!(effect, EventEffect::None);
        assert!(state.is_dragging());
    }

    #[test]
    fn test_move_only_tracks_pointer() {
        let settings = Settings::default();
        let mut state = SimState::new();
        let effect = state.apply_event(
            &InputEvent::PointerMoved {
                position: IVec2::new(12, 34),
            },
            &settings,
        );
        assert_eq!(effect, EventEffect::None);
        assert_eq!(state.pointer, IVec2::new(12, 34));
        assert_eq!(state.pendulum, PendulumState::INITIAL);
    }

    #[test]
    fn test_quit() {
        let settings = Settings::default();
        let mut state = SimState::new();
        assert_eq!(
            state.apply_event(&InputEvent::Quit, &settings),
            EventEffect::Quit
        );
    }

    #[test]
    fn test_reset_velocity_option() {
        let mut settings = Settings::default();
        settings.interaction.reset_velocity_on_drag = true;
        let mut state = SimState::new();
        state.pendulum.omega1 = 3.0;
        state.pendulum.omega2 = 4.0;
        state.override_angles(IVec2::new(400, 500), &settings);
        assert_eq!(state.pendulum.omega1, 0.0);
        assert_eq!(state.pendulum.omega2, 0.0);
    }
}
