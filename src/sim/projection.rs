//! Angles to screen coordinates

use glam::{DVec2, IVec2};

use super::dynamics::PendulumState;
use crate::rod_offset;
use crate::settings::{DisplayParams, PhysicsParams};

/// Bob centres in screen pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BobPositions {
    pub bob1: DVec2,
    pub bob2: DVec2,
}

impl BobPositions {
    /// Integer pixels, truncated toward zero
    pub fn to_pixels(&self) -> (IVec2, IVec2) {
        (self.bob1.as_ivec2(), self.bob2.as_ivec2())
    }
}

/// Project the current angles onto the screen
pub fn project(
    state: &PendulumState,
    physics: &PhysicsParams,
    display: &DisplayParams,
) -> BobPositions {
    let origin = display.origin.as_dvec2();
    let bob1 = origin + rod_offset(display.scale * physics.length1, state.theta1);
    let bob2 = bob1 + rod_offset(display.scale * physics.length2, state.theta2);
    BobPositions { bob1, bob2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hanging_pendulum() {
        let physics = PhysicsParams {
            length1: 1.0,
            length2: 1.0,
            ..Default::default()
        };
        let display = DisplayParams {
            scale: 200.0,
            origin: IVec2::new(400, 250),
            ..Default::default()
        };
        let bobs = project(&PendulumState::new(0.0, 0.0, 0.0, 0.0), &physics, &display);
        assert_eq!(bobs.bob1, DVec2::new(400.0, 450.0));
        assert_eq!(bobs.bob2, DVec2::new(400.0, 650.0));
        assert_eq!(
            bobs.to_pixels(),
            (IVec2::new(400, 450), IVec2::new(400, 650))
        );
    }

    #[test]
    fn test_horizontal_first_rod() {
        let physics = PhysicsParams::default();
        let display = DisplayParams::default();
        let state = PendulumState::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0, 0.0);
        let bobs = project(&state, &physics, &display);
        assert!((bobs.bob1 - DVec2::new(600.0, 250.0)).length() < 1e-9);
        assert!((bobs.bob2 - DVec2::new(600.0, 450.0)).length() < 1e-9);
    }

    #[test]
    fn test_truncates_like_int_cast() {
        let bobs = BobPositions {
            bob1: DVec2::new(400.9, 450.2),
            bob2: DVec2::new(-0.7, 10.99),
        };
        assert_eq!(bobs.to_pixels(), (IVec2::new(400, 450), IVec2::new(0, 10)));
    }

    proptest! {
        #[test]
        fn prop_rod_lengths_preserved(
            theta1 in -10.0f64..10.0,
            theta2 in -10.0f64..10.0,
            length1 in 0.1f64..3.0,
            length2 in 0.1f64..3.0,
        ) {
            let physics = PhysicsParams { length1, length2, ..Default::default() };
            let display = DisplayParams::default();
            let bobs = project(&PendulumState::new(theta1, 0.0, theta2, 0.0), &physics, &display);
            let origin = display.origin.as_dvec2();
            prop_assert!(((bobs.bob1 - origin).length() - display.scale * length1).abs() < 1e-9);
            prop_assert!(((bobs.bob2 - bobs.bob1).length() - display.scale * length2).abs() < 1e-9);
        }
    }
}
