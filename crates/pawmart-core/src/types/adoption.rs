//! Adoption applications.
//!
//! The status rules live in [`crate::workflow::adoption`]; this module only
//! holds the data.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Adoption Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdoptionStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl AdoptionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AdoptionStatus::Pending => "pending",
            AdoptionStatus::Approved => "approved",
            AdoptionStatus::Rejected => "rejected",
            AdoptionStatus::Completed => "completed",
            AdoptionStatus::Cancelled => "cancelled",
        }
    }

    /// An active application holds the pet (pet status `pending`).
    pub const fn is_active(&self) -> bool {
        matches!(self, AdoptionStatus::Pending | AdoptionStatus::Approved)
    }

    pub const fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl Default for AdoptionStatus {
    fn default() -> Self {
        AdoptionStatus::Pending
    }
}

impl fmt::Display for AdoptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sub-records
// =============================================================================

/// Questionnaire answers submitted with an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub living_situation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_yard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_pets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A chat message between applicant and provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// An internal note written by the provider or an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A post-adoption check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub author: String,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_condition: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub date: DateTime<Utc>,
}

// =============================================================================
// Adoption
// =============================================================================

/// One application by one applicant for one pet.
///
/// `provider` is copied from the pet at creation so access checks don't
/// need to load the pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adoption {
    pub id: String,
    pub pet: String,
    pub applicant: String,
    pub provider: String,
    pub status: AdoptionStatus,
    #[serde(default)]
    pub application_details: ApplicationDetails,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub follow_up: Vec<FollowUp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Adoption {
    /// Creates a `pending` application.
    pub fn new(
        pet_id: &str,
        applicant: &str,
        provider: &str,
        application_details: ApplicationDetails,
    ) -> Self {
        let now = Utc::now();
        Adoption {
            id: uuid::Uuid::new_v4().to_string(),
            pet: pet_id.to_string(),
            applicant: applicant.to_string(),
            provider: provider.to_string(),
            status: AdoptionStatus::Pending,
            application_details,
            messages: Vec::new(),
            notes: Vec::new(),
            follow_up: Vec::new(),
            rejection_reason: None,
            completion_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}
