//! Double pendulum equations of motion
//!
//! Two point masses on massless rigid rods, derived from the Lagrangian, plus
//! a linear drag term on each angular velocity.

use glam::DVec4;
use serde::{Deserialize, Serialize};

use crate::consts::{INITIAL_THETA_1, INITIAL_THETA_2};
use crate::settings::PhysicsParams;

/// Instantaneous pendulum configuration
///
/// Angles are measured from the downward vertical, positive toward +x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    pub theta1: f64,
    pub omega1: f64,
    pub theta2: f64,
    pub omega2: f64,
}

impl Default for PendulumState {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl PendulumState {
    /// Small-angle starting condition, at rest
    pub const INITIAL: Self = Self {
        theta1: INITIAL_THETA_1,
        omega1: 0.0,
        theta2: INITIAL_THETA_2,
        omega2: 0.0,
    };

    pub const fn new(theta1: f64, omega1: f64, theta2: f64, omega2: f64) -> Self {
        Self {
            theta1,
            omega1,
            theta2,
            omega2,
        }
    }

    /// Integrator layout: (θ1, ω1, θ2, ω2)
    #[inline]
    pub fn to_vec(self) -> DVec4 {
        DVec4::new(self.theta1, self.omega1, self.theta2, self.omega2)
    }

    #[inline]
    pub fn from_vec(v: DVec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }

    pub fn is_finite(&self) -> bool {
        self.to_vec().is_finite()
    }
}

/// Time derivative of (θ1, ω1, θ2, ω2)
///
/// Time does not appear in the equations; it is accepted so the function
/// matches the integrator's right-hand-side signature.
///
/// The `m2·g·sin(θ2)` term in ω1' carries no `cos(θ1 - θ2)` factor, so even
/// with zero drag [`total_energy`] is not exactly conserved.
pub fn derivative(params: &PhysicsParams, _t: f64, y: DVec4) -> DVec4 {
    let PhysicsParams {
        gravity: g,
        length1: l1,
        length2: l2,
        mass1: m1,
        mass2: m2,
        drag,
    } = *params;
    let (theta1, z1, theta2, z2) = (y.x, y.y, y.z, y.w);

    let (s, c) = (theta1 - theta2).sin_cos();
    // m1 + m2·s² ≥ m1 > 0 for positive masses
    let denom = m1 + m2 * s * s;

    let z1_dot = (m2 * g * theta2.sin()
        - m2 * s * (l1 * z1 * z1 * c + l2 * z2 * z2)
        - (m1 + m2) * g * theta1.sin())
        / (l1 * denom)
        - drag * z1;
    let z2_dot = ((m1 + m2) * (l1 * z1 * z1 * s - g * theta2.sin() + g * theta1.sin() * c)
        + m2 * l2 * z2 * z2 * s * c)
        / (l2 * denom)
        - drag * z2;

    DVec4::new(z1, z1_dot, z2, z2_dot)
}

impl PhysicsParams {
    /// Right-hand side closure for [`crate::sim::integrate`]
    pub fn rhs(&self) -> impl Fn(f64, DVec4) -> DVec4 + '_ {
        move |t, y| derivative(self, t, y)
    }
}

/// Kinetic plus potential energy, with the pivot as the potential zero
pub fn total_energy(params: &PhysicsParams, state: &PendulumState) -> f64 {
    let PhysicsParams {
        gravity: g,
        length1: l1,
        length2: l2,
        mass1: m1,
        mass2: m2,
        ..
    } = *params;
    let PendulumState {
        theta1,
        omega1,
        theta2,
        omega2,
    } = *state;

    let kinetic = 0.5 * (m1 + m2) * l1 * l1 * omega1 * omega1
        + 0.5 * m2 * l2 * l2 * omega2 * omega2
        + m2 * l1 * l2 * omega1 * omega2 * (theta1 - theta2).cos();
    // Height is measured upward, rods hang along -y at θ = 0
    let potential = -(m1 + m2) * g * l1 * theta1.cos() - m2 * g * l2 * theta2.cos();

    kinetic + potential
}
