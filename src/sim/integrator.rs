//! Adaptive Dormand-Prince 5(4) initial-value solver
//!
//! A pure function of (right-hand side, initial state, output times). No
//! solver state survives a call, so the frame loop can overwrite the state
//! between calls without invalidating anything.

use glam::DVec4;
use thiserror::Error;

/// Reasons an integration call produced no usable result
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IntegrationError {
    #[error("need at least two time points, got {got}")]
    TooFewTimePoints { got: usize },
    #[error("time points must be finite and strictly increasing (index {index})")]
    NonIncreasingTimes { index: usize },
    #[error("initial state is not finite")]
    NonFiniteInput,
    #[error("derivative is not finite at t = {t}")]
    NonFiniteDerivative { t: f64 },
    #[error("state became non-finite at t = {t}")]
    NonFiniteState { t: f64 },
    #[error("step size underflow at t = {t}")]
    StepSizeUnderflow { t: f64 },
    #[error("step limit exceeded at t = {t}")]
    StepLimitExceeded { t: f64 },
}

/// Error control for the adaptive step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Relative tolerance per component
    pub rtol: f64,
    /// Absolute tolerance per component
    pub atol: f64,
    /// Maximum accepted + rejected steps per call
    pub max_steps: u32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            rtol: 1e-9,
            atol: 1e-12,
            max_steps: 10_000,
        }
    }
}

// Dormand-Prince tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

/// 5th order weights (also the 7th stage row, FSAL)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

/// Difference between 5th and embedded 4th order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Solve y' = rhs(t, y), y(times[0]) = y0, reporting y at every time point
///
/// The first entry of the result is `y0` itself. Fails without partial
/// output if the times are invalid or any evaluation goes non-finite.
pub fn integrate<F>(
    rhs: F,
    y0: DVec4,
    times: &[f64],
    tol: &Tolerances,
) -> Result<Vec<DVec4>, IntegrationError>
where
    F: Fn(f64, DVec4) -> DVec4,
{
    if times.len() < 2 {
        return Err(IntegrationError::TooFewTimePoints { got: times.len() });
    }
    for (index, pair) in times.windows(2).enumerate() {
        if !pair[0].is_finite() || !pair[1].is_finite() || pair[1] <= pair[0] {
            return Err(IntegrationError::NonIncreasingTimes { index: index + 1 });
        }
    }
    if !y0.is_finite() {
        return Err(IntegrationError::NonFiniteInput);
    }

    let eval = |t: f64, y: DVec4| -> Result<DVec4, IntegrationError> {
        let d = rhs(t, y);
        if d.is_finite() {
            Ok(d)
        } else {
            Err(IntegrationError::NonFiniteDerivative { t })
        }
    };

    let mut out = Vec::with_capacity(times.len());
    out.push(y0);

    let mut t = times[0];
    let mut y = y0;
    let mut k1 = eval(t, y)?;
    let mut h = times[1] - times[0];
    let mut steps = 0u32;

    for &target in &times[1..] {
        while t < target {
            steps += 1;
            if steps > tol.max_steps {
                return Err(IntegrationError::StepLimitExceeded { t });
            }

            // Land exactly on the output time, absorbing slivers into this step
            let remaining = target - t;
            let last = h * (1.0 + 1e-8) >= remaining;
            let step = if last { remaining } else { h };
            if step <= 4.0 * f64::EPSILON * t.abs().max(1.0) {
                return Err(IntegrationError::StepSizeUnderflow { t });
            }

            let k2 = eval(t + C2 * step, y + step * (A21 * k1))?;
            let k3 = eval(t + C3 * step, y + step * (A31 * k1 + A32 * k2))?;
            let k4 = eval(t + C4 * step, y + step * (A41 * k1 + A42 * k2 + A43 * k3))?;
            let k5 = eval(
                t + C5 * step,
                y + step * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4),
            )?;
            let k6 = eval(
                t + step,
                y + step * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5),
            )?;
            let y_new = y + step * (B1 * k1 + B3 * k3 + B4 * k4 + B5 * k5 + B6 * k6);
            let t_new = if last { target } else { t + step };
            if !y_new.is_finite() {
                return Err(IntegrationError::NonFiniteState { t: t_new });
            }
            let k7 = eval(t_new, y_new)?;

            let err_vec = step * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7);
            let err = error_norm(err_vec, y, y_new, tol);

            if err <= 1.0 {
                t = t_new;
                y = y_new;
                k1 = k7;
                let factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                // A clamped final step says nothing about the natural step size
                if !last || factor < 1.0 {
                    h = step * factor;
                }
            } else {
                let factor = (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, 1.0);
                h = step * factor;
            }
        }
        out.push(y);
    }

    Ok(out)
}

/// Integrate over [0, dt] and return only the final state
pub fn step<F>(rhs: F, y0: DVec4, dt: f64, tol: &Tolerances) -> Result<DVec4, IntegrationError>
where
    F: Fn(f64, DVec4) -> DVec4,
{
    let states = integrate(rhs, y0, &[0.0, dt], tol)?;
    states
        .last()
        .copied()
        .ok_or(IntegrationError::TooFewTimePoints { got: 0 })
}

/// RMS of the scaled local error estimate
fn error_norm(err: DVec4, y: DVec4, y_new: DVec4, tol: &Tolerances) -> f64 {
    let scale = DVec4::splat(tol.atol) + tol.rtol * y.abs().max(y_new.abs());
    let scaled = err / scale;
    (scaled.length_squared() / 4.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PhysicsParams;
    use crate::sim::dynamics::{PendulumState, derivative};

    /// Classic fourth-order Runge-Kutta, used as an independent reference
    fn rk4_step<F: Fn(f64, DVec4) -> DVec4>(f: F, y: DVec4, dt: f64) -> DVec4 {
        let k1 = f(0.0, y);
        let k2 = f(dt / 2.0, y + dt / 2.0 * k1);
        let k3 = f(dt / 2.0, y + dt / 2.0 * k2);
        let k4 = f(dt, y + dt * k3);
        y + dt / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
    }

    fn assert_close(a: DVec4, b: DVec4, rel: f64) {
        for i in 0..4 {
            let scale = b[i].abs().max(1e-3);
            assert!(
                (a[i] - b[i]).abs() <= rel * scale,
                "component {i}: {} vs {} (rel tol {rel})",
                a[i],
                b[i]
            );
        }
    }

    #[test]
    fn test_exponential_decay() {
        let rhs = |_t: f64, y: DVec4| -y;
        let y0 = DVec4::ONE;
        let out = integrate(rhs, y0, &[0.0, 0.5, 1.0], &Tolerances::default()).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], y0);
        assert!((out[1].x - (-0.5f64).exp()).abs() < 1e-8);
        assert!((out[2].x - (-1.0f64).exp()).abs() < 1e-8);
    }

    #[test]
    fn test_harmonic_oscillator_full_period() {
        // x'' = -x as (x, v, x, v)
        let rhs = |_t: f64, y: DVec4| DVec4::new(y.y, -y.x, y.w, -y.z);
        let y0 = DVec4::new(1.0, 0.0, 0.0, 1.0);
        let period = 2.0 * std::f64::consts::PI;
        let out = integrate(rhs, y0, &[0.0, period], &Tolerances::default()).unwrap();
        let end = out[1];
        assert!((end - y0).abs().max_element() < 1e-6, "{end:?}");
    }

    #[test]
    fn test_matches_rk4_reference_without_drag() {
        let params = PhysicsParams {
            drag: 0.0,
            ..Default::default()
        };
        let y0 = DVec4::new(0.9, 1.3, -0.4, -2.1);
        let dt = 0.01;
        let reference = rk4_step(|t, y| derivative(&params, t, y), y0, dt);
        let solved = step(params.rhs(), y0, dt, &Tolerances::default()).unwrap();
        assert_close(solved, reference, 1e-6);
    }

    #[test]
    fn test_initial_condition_step_matches_rk4() {
        let params = PhysicsParams {
            drag: 0.0,
            ..Default::default()
        };
        let y0 = PendulumState::INITIAL.to_vec();
        let reference = rk4_step(|t, y| derivative(&params, t, y), y0, 0.01);
        let solved = step(params.rhs(), y0, 0.01, &Tolerances::default()).unwrap();
        assert_close(solved, reference, 1e-6);
    }

    #[test]
    fn test_tiny_span_leaves_state_unchanged() {
        let params = PhysicsParams::default();
        let y0 = DVec4::new(0.7, 2.0, -1.1, 0.5);
        let solved = step(params.rhs(), y0, 1e-10, &Tolerances::default()).unwrap();
        assert!((solved - y0).abs().max_element() < 1e-8);
    }

    #[test]
    fn test_single_time_point_fails() {
        let params = PhysicsParams::default();
        let err = integrate(params.rhs(), DVec4::ZERO, &[0.0], &Tolerances::default());
        assert_eq!(err, Err(IntegrationError::TooFewTimePoints { got: 1 }));
        let err = integrate(params.rhs(), DVec4::ZERO, &[], &Tolerances::default());
        assert_eq!(err, Err(IntegrationError::TooFewTimePoints { got: 0 }));
    }

    #[test]
    fn test_non_increasing_times_fail() {
        let params = PhysicsParams::default();
        let err = integrate(params.rhs(), DVec4::ZERO, &[0.0, 0.01, 0.01], &Tolerances::default());
        assert_eq!(err, Err(IntegrationError::NonIncreasingTimes { index: 2 }));
        let err = integrate(params.rhs(), DVec4::ZERO, &[0.0, f64::NAN], &Tolerances::default());
        assert_eq!(err, Err(IntegrationError::NonIncreasingTimes { index: 1 }));
    }

    #[test]
    fn test_non_finite_derivative_fails() {
        let rhs = |t: f64, y: DVec4| if t > 0.005 { DVec4::splat(f64::NAN) } else { y };
        let err = integrate(rhs, DVec4::ONE, &[0.0, 0.01], &Tolerances::default()).unwrap_err();
        assert!(matches!(err, IntegrationError::NonFiniteDerivative { .. }));
    }

    #[test]
    fn test_non_finite_input_fails() {
        let params = PhysicsParams::default();
        let y0 = DVec4::new(f64::INFINITY, 0.0, 0.0, 0.0);
        let err = integrate(params.rhs(), y0, &[0.0, 0.01], &Tolerances::default());
        assert_eq!(err, Err(IntegrationError::NonFiniteInput));
    }

    #[test]
    fn test_overflowing_state_fails() {
        // Finite slope everywhere, but the state itself leaves f64 range
        let rhs = |_t: f64, _y: DVec4| DVec4::splat(1e300);
        let err = integrate(rhs, DVec4::ZERO, &[0.0, 1e10], &Tolerances::default());
        assert_eq!(err, Err(IntegrationError::NonFiniteState { t: 1e10 }));

        let err = step(rhs, DVec4::ZERO, 1e10, &Tolerances::default());
        assert!(matches!(err, Err(IntegrationError::NonFiniteState { .. })));
    }

    #[test]
    fn test_step_limit() {
        let rhs = |_t: f64, y: DVec4| DVec4::new(y.y, -1e6 * y.x, 0.0, 0.0);
        let tol = Tolerances {
            max_steps: 3,
            ..Default::default()
        };
        let err = integrate(rhs, DVec4::new(1.0, 0.0, 0.0, 0.0), &[0.0, 10.0], &tol).unwrap_err();
        assert!(matches!(err, IntegrationError::StepLimitExceeded { .. }));
    }

    #[test]
    fn test_output_times_hit_exactly_with_continuation() {
        // Repeated short solves from the previous final state track one long solve
        let params = PhysicsParams::default();
        let tol = Tolerances::default();
        let mut y = PendulumState::INITIAL.to_vec();
        for _ in 0..100 {
            y = step(params.rhs(), y, 0.01, &tol).unwrap();
        }
        let long = integrate(params.rhs(), PendulumState::INITIAL.to_vec(), &[0.0, 1.0], &tol)
            .unwrap();
        assert!((y - long[1]).abs().max_element() < 1e-6);
    }
}
