//! # Adoption Workflow
//!
//! ## Transition Table
//! ```text
//! ┌────────────────────┬─────────────┬──────────────────────────────────────┐
//! │ From               │ To          │ Pet effect                           │
//! ├────────────────────┼─────────────┼──────────────────────────────────────┤
//! │ pending            │ approved    │ none                                 │
//! │ pending            │ rejected    │ status → available                   │
//! │ approved           │ completed   │ status → adopted, adoptedBy, date    │
//! │ pending, approved  │ cancelled   │ status → available                   │
//! │ anything else      │             │ InvalidTransition                    │
//! └────────────────────┴─────────────┴──────────────────────────────────────┘
//! ```
//!
//! Creating an application is not a transition: see [`check_can_apply`].

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Adoption, AdoptionStatus, Pet, PetStatus};

/// What happens to the pet when an adoption changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetEffect {
    /// Pet document is left as is.
    None,
    /// Pet goes back to `available`.
    Release,
    /// Pet becomes `adopted` by the applicant.
    Adopt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdoptionTransition {
    pub from: AdoptionStatus,
    pub to: AdoptionStatus,
    pub pet_effect: PetEffect,
}

/// Looks up the transition from `current` to `requested`.
///
/// ## Example
/// ```rust
/// use pawmart_core::types::AdoptionStatus;
/// use pawmart_core::workflow::adoption::{next_state, PetEffect};
///
/// let t = next_state(AdoptionStatus::Approved, AdoptionStatus::Completed).unwrap();
/// assert_eq!(t.pet_effect, PetEffect::Adopt);
///
/// assert!(next_state(AdoptionStatus::Completed, AdoptionStatus::Cancelled).is_err());
/// ```
pub fn next_state(
    current: AdoptionStatus,
    requested: AdoptionStatus,
) -> CoreResult<AdoptionTransition> {
    use AdoptionStatus::*;

    let pet_effect = match (current, requested) {
        (Pending, Approved) => PetEffect::None,
        (Pending, Rejected) => PetEffect::Release,
        (Approved, Completed) => PetEffect::Adopt,
        (Pending | Approved, Cancelled) => PetEffect::Release,
        _ => return Err(CoreError::invalid_transition("adoption", current, requested)),
    };

    Ok(AdoptionTransition {
        from: current,
        to: requested,
        pet_effect,
    })
}

/// Checks that `applicant` may file a new application for `pet`.
///
/// `has_active_application` tells whether the applicant already has a
/// pending or approved application for this pet.
pub fn check_can_apply(pet: &Pet, applicant: &str, has_active_application: bool) -> CoreResult<()> {
    if pet.provider == applicant {
        return Err(CoreError::conflict("You cannot apply to adopt your own pet"));
    }
    if pet.status != PetStatus::Available {
        return Err(CoreError::conflict("Pet is not available for adoption"));
    }
    if has_active_application {
        return Err(CoreError::conflict(
            "You already have an active application for this pet",
        ));
    }
    Ok(())
}

/// Puts a pet on hold for a freshly filed application.
pub fn hold_pet(pet: &mut Pet, now: DateTime<Utc>) {
    pet.status = PetStatus::Pending;
    pet.updated_at = now;
}

/// Applies a transition to the adoption and its pet.
///
/// `reason` is stored as the rejection reason when rejecting and ignored
/// otherwise.
pub fn apply(
    transition: AdoptionTransition,
    adoption: &mut Adoption,
    pet: &mut Pet,
    reason: Option<String>,
    now: DateTime<Utc>,
) {
    adoption.status = transition.to;
    adoption.updated_at = now;

    match transition.to {
        AdoptionStatus::Rejected => adoption.rejection_reason = reason,
        AdoptionStatus::Completed => adoption.completion_date = Some(now),
        _ => {}
    }

    match transition.pet_effect {
        PetEffect::None => return,
        PetEffect::Release => pet.status = PetStatus::Available,
        PetEffect::Adopt => {
            pet.status = PetStatus::Adopted;
            pet.adopted_by = Some(adoption.applicant.clone());
            pet.adoption_date = Some(now);
        }
    }
    pet.updated_at = now;
}

/// Follow-ups are only accepted after the adoption is completed.
pub fn check_follow_up_allowed(status: AdoptionStatus) -> CoreResult<()> {
    if status != AdoptionStatus::Completed {
        return Err(CoreError::invalid_transition(
            "adoption",
            status,
            "follow-up (requires completed)",
        ));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
