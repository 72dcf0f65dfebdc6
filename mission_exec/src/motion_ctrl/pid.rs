//! PID controller used for the per-axis position loops.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller with a fixed sample time.
///
/// The control loop runs at the mission's configured timestep, so the
/// controller accumulates its integral and differentiates its error against
/// that fixed step rather than wall-clock time. This keeps simulation runs
/// deterministic.
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    /// Fixed time between samples in seconds
    sample_time_s: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains and sample time.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, sample_time_s: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            sample_time_s,
            prev_error: None,
            integral: 0f64,
        }
    }

    /// Get the value of the controller for the given error.
    pub fn update(&mut self, error: f64) -> f64 {
        // Accumulate the integral term
        self.integral += error * self.sample_time_s;

        // Calculate the derivative.
        //
        // On the first sample there is no previous error, so we assume no
        // derivative rather than producing a spike from a full-error jump.
        let deriv = match self.prev_error {
            Some(e) => (error - e) / self.sample_time_s,
            None => 0f64,
        };

        // Remember the previous error
        self.prev_error = Some(error);

        self.k_p * error + self.k_i * self.integral + self.k_d * deriv
    }

    /// Clear the accumulated state, ready for a new target.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_proportional_only() {
        let mut pid = PidController::new(2.0, 0.0, 0.0, 0.1);

        assert_eq!(pid.update(1.0), 2.0);
        assert_eq!(pid.update(-0.5), -1.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 0.1);

        assert!((pid.update(1.0) - 0.1).abs() < 1e-12);
        assert!((pid.update(1.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_skipped_on_first_sample() {
        let mut pid = PidController::new(0.0, 0.0, 1.0, 0.1);

        assert_eq!(pid.update(1.0), 0.0);
        // (0.5 - 1.0) / 0.1
        assert!((pid.update(0.5) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut pid = PidController::new(0.0, 1.0, 1.0, 0.1);
        pid.update(1.0);
        pid.reset();

        assert!((pid.update(1.0) - 0.1).abs() < 1e-12);
    }
}
