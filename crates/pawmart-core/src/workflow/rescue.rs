//! # Rescue Workflow
//!
//! Rescue status has no guard table: every state may move to every other
//! state, including out of `completed`. The one rule is that entering
//! `completed` stamps `rescueDate.actual`.

use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::types::{Rescue, RescueStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescueTransition {
    pub from: RescueStatus,
    pub to: RescueStatus,
    /// Set `rescueDate.actual` to the time of the change.
    pub stamps_actual_date: bool,
}

/// Looks up the transition from `current` to `requested`. Never fails.
pub fn next_state(current: RescueStatus, requested: RescueStatus) -> CoreResult<RescueTransition> {
    Ok(RescueTransition {
        from: current,
        to: requested,
        stamps_actual_date: requested == RescueStatus::Completed,
    })
}

pub fn apply(transition: RescueTransition, rescue: &mut Rescue, now: DateTime<Utc>) {
    rescue.status = transition.to;
    if transition.stamps_actual_date {
        rescue.rescue_date.actual = Some(now);
    }
    rescue.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewRescue;
    use RescueStatus::*;

    #[test]
    fn test_every_pair_is_allowed() {
        let all = [Planning, InProgress, Completed, Cancelled];
        for from in all {
            for to in all {
                let t = next_state(from, to).unwrap();
                assert_eq!(t.stamps_actual_date, to == Completed);
            }
        }
    }

    #[test]
    fn test_completion_stamps_actual_date() {
        let mut rescue = NewRescue {
            title: "Shelter transfer".into(),
            description: String::new(),
            ngo: None,
            location: Default::default(),
            animals: vec![],
            resources: Default::default(),
            funding_required: Default::default(),
            planned_date: None,
        }
        .into_rescue("ngo");

        let t = next_state(rescue.status, InProgress).unwrap();
        apply(t, &mut rescue, Utc::now());
        assert!(rescue.rescue_date.actual.is_none());

        let t = next_state(rescue.status, Completed).unwrap();
        apply(t, &mut rescue, Utc::now());
        assert_eq!(rescue.status, Completed);
        assert!(rescue.rescue_date.actual.is_some());

        // Re-opening a completed rescue is accepted.
        let t = next_state(rescue.status, Planning).unwrap();
        apply(t, &mut rescue, Utc::now());
        assert_eq!(rescue.status, Planning);
    }
}
