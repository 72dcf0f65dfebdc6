//! # Localisation module
//!
//! This module is the boundary to the robot's position source. The core
//! never performs sensor fusion itself: in field operation an external
//! estimator pushes poses in through [`LocMgr::set_pose`], while in
//! simulation the manager corrupts the robot's true pose with Gaussian
//! noise to emulate an imperfect estimate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading) of the robot in the grid's local frame.
///
/// Heading is in radians in [0, 2pi), with 0 along the frame's +x (east)
/// axis.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct Pose {
    /// Position in the local frame in meters
    pub position_m: Vector2<f64>,

    /// Heading in radians, 0 along +x
    pub heading_rad: f64,
}

/// Provides an interface to the localisation source of the robot.
pub struct LocMgr {
    source: LocSource,

    /// Standard deviation of the simulated position noise, meters per axis
    noise_std_m: f64,

    rng: SmallRng,

    /// The most recent externally supplied pose
    pose: Option<Pose>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Where pose estimates come from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LocSource {
    /// Simulated estimates: the true pose corrupted by Gaussian noise
    SimNoise,

    /// Externally supplied estimates via [`LocMgr::set_pose`]
    External,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    /// Unit vector pointing in the heading direction.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }
}

impl LocMgr {
    /// Create a simulated localisation source.
    ///
    /// A seed of 0 draws entropy from the OS; any other value gives a
    /// reproducible noise sequence.
    pub fn sim(noise_std_m: f64, seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };

        Self {
            source: LocSource::SimNoise,
            noise_std_m,
            rng,
            pose: None,
        }
    }

    /// Create a field localisation source fed by an external estimator.
    pub fn external() -> Self {
        Self {
            source: LocSource::External,
            noise_std_m: 0.0,
            rng: SmallRng::seed_from_u64(0),
            pose: None,
        }
    }

    pub fn source(&self) -> LocSource {
        self.source
    }

    /// Supply the latest external pose estimate.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = Some(pose);
    }

    /// The current pose estimate.
    ///
    /// In simulation this is the given true pose with independent Gaussian
    /// noise applied to each position axis; the truth itself is left
    /// untouched. In field operation it is the most recent externally
    /// supplied pose, or `None` if the estimator has not reported yet.
    pub fn estimate(&mut self, truth: &Pose) -> Option<Pose> {
        match self.source {
            LocSource::SimNoise => {
                let mut estimate = *truth;
                estimate.position_m[0] += self.gaussian();
                estimate.position_m[1] += self.gaussian();
                Some(estimate)
            }
            LocSource::External => self.pose,
        }
    }

    fn gaussian(&mut self) -> f64 {
        if self.noise_std_m == 0.0 {
            return 0.0;
        }

        let n: f64 = self.rng.sample(StandardNormal);
        n * self.noise_std_m
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_estimate_noiseless() {
        let mut loc = LocMgr::sim(0.0, 42);
        let truth = Pose::new(1.0, 2.0, 0.5);

        assert_eq!(loc.estimate(&truth), Some(truth));
    }

    #[test]
    fn test_sim_estimate_deterministic_seed() {
        let mut loc_a = LocMgr::sim(0.3, 7);
        let mut loc_b = LocMgr::sim(0.3, 7);
        let truth = Pose::new(1.0, 2.0, 0.5);

        for _ in 0..10 {
            assert_eq!(loc_a.estimate(&truth), loc_b.estimate(&truth));
        }
    }

    #[test]
    fn test_sim_estimate_leaves_truth_untouched() {
        let mut loc = LocMgr::sim(0.5, 99);
        let truth = Pose::new(1.0, 2.0, 0.5);
        let estimate = loc.estimate(&truth).unwrap();

        assert_eq!(truth, Pose::new(1.0, 2.0, 0.5));
        assert_eq!(estimate.heading_rad, truth.heading_rad);
    }

    #[test]
    fn test_external_estimate() {
        let mut loc = LocMgr::external();
        let truth = Pose::default();

        assert_eq!(loc.estimate(&truth), None);

        let reported = Pose::new(3.0, 4.0, 1.0);
        loc.set_pose(reported);
        assert_eq!(loc.estimate(&truth), Some(reported));
    }
}
