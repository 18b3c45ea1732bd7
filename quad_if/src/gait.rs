//! # Gait Generator Interface
//!
//! The gait generator owns the stance/swing state machine. Controllers only ever read the
//! contact state it publishes for the current cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::NUM_LEGS;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Contact state of all legs for one control cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactState {
    /// True for each leg which is in contact with the ground.
    pub contacts: [bool; NUM_LEGS],

    /// Number of legs in contact with the ground.
    pub legs_in_contact: usize,

    /// Progress through the current stance phase, between 0 and 1.
    pub moving_base_phase: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of per-cycle contact state.
pub trait GaitGenerator {
    /// Contact state for the current cycle.
    fn contact_state(&self) -> ContactState;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ContactState {
    /// Build a contact state from the flags, counting the legs in contact.
    pub fn from_contacts(contacts: [bool; NUM_LEGS], moving_base_phase: f64) -> Self {
        Self {
            contacts,
            legs_in_contact: contacts.iter().filter(|c| **c).count(),
            moving_base_phase,
        }
    }
}

impl GaitGenerator for ContactState {
    fn contact_state(&self) -> ContactState {
        *self
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
