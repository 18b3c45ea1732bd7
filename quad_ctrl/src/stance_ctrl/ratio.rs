//! # Load ratio allocation
//!
//! Decides what share of the body weight each stance leg should nominally
//! carry. Ratios weight the force optimisation rather than partition the
//! load, so they need not sum to one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

use super::Params;
use quad_if::NUM_LEGS;
use util::maths::{clamp, smoothstep};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Nominal load share of each leg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoadRatio {
    pub per_leg: [f64; NUM_LEGS],
}

/// Computes the load ratios from the contact state.
#[derive(Debug, Clone)]
pub struct RatioAllocator {
    f_min_ratio: [f64; NUM_LEGS],
    f_max_ratio: [f64; NUM_LEGS],
    ramp_width: f64,
    ramp_floor: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RatioAllocator {
    pub fn new(params: &Params) -> Self {
        Self {
            f_min_ratio: params.f_min_ratio,
            f_max_ratio: params.f_max_ratio,
            ramp_width: params.ratio_ramp_width,
            ramp_floor: params.ratio_ramp_floor,
        }
    }

    /// Compute the load ratios.
    ///
    /// Legs in contact share `1/N` of the load, scaled down near the start and
    /// end of the stance phase, then limited to the per-leg bounds. Legs not
    /// in contact get a ratio of zero.
    ///
    /// `legs_in_contact` is checked against `contacts`, which wins if they
    /// disagree.
    pub fn compute(
        &self,
        contacts: &[bool; NUM_LEGS],
        legs_in_contact: usize,
        phase: f64
    ) -> LoadRatio {
        let n = contacts.iter().filter(|c| **c).count();

        if n != legs_in_contact {
            debug!(
                "Contact count mismatch: {} legs flagged but {} reported",
                n, legs_in_contact
            );
        }

        let mut ratio = LoadRatio::default();

        if n == 0 {
            return ratio;
        }

        let share = self.ramp(phase) / n as f64;

        for i in 0..NUM_LEGS {
            if contacts[i] {
                ratio.per_leg[i] = clamp(&share, &self.f_min_ratio[i], &self.f_max_ratio[i]);
            }
        }

        ratio
    }

    /// Load scaling for the given stance phase, 1 in mid stance and falling
    /// to `ramp_floor` at touchdown and liftoff.
    fn ramp(&self, phase: f64) -> f64 {
        let phase = if phase.is_finite() {
            clamp(&phase, &0.0, &1.0)
        } else {
            0.5
        };

        let rise = smoothstep(0.0, self.ramp_width, phase);
        let fall = smoothstep(0.0, self.ramp_width, 1.0 - phase);

        self.ramp_floor + (1.0 - self.ramp_floor) * rise.min(fall)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
