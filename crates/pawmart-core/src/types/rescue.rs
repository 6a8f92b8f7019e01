//! NGO rescue operations, with their team, progress updates and funding.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::Location;
use crate::money::Money;

// =============================================================================
// Rescue Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescueStatus {
    Planning,
    InProgress,
    Completed,
    Cancelled,
}

impl RescueStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RescueStatus::Planning => "planning",
            RescueStatus::InProgress => "in_progress",
            RescueStatus::Completed => "completed",
            RescueStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for RescueStatus {
    fn default() -> Self {
        RescueStatus::Planning
    }
}

impl fmt::Display for RescueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sub-records
// =============================================================================

/// A group of animals covered by the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescuedAnimal {
    pub species: String,
    #[serde(default = "one")]
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub member: String,
    pub role: String,
}

/// Estimated needs for the operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volunteers_needed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicles_needed: Option<u32>,
    #[serde(default)]
    pub supplies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymousDonor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One donation. Exactly one of `donor` / `anonymous_donor` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_donor: Option<AnonymousDonor>,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub date: DateTime<Utc>,
}

/// Funding state of a rescue.
///
/// `raised` is a running sum updated in the same statement that appends
/// each donation. It is never recomputed from `donations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Funding {
    #[serde(default)]
    pub required: Money,
    #[serde(default)]
    pub raised: Money,
    #[serde(default)]
    pub donations: Vec<Donation>,
}

/// A progress update posted by the team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub date: DateTime<Utc>,
}

/// Summary of results. Each provided field overwrites the stored one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcomes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animals_rescued: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animals_treated: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animals_adopted: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
}

impl Outcomes {
    /// Shallow merge: fields present in `other` replace ours.
    pub fn merge(&mut self, other: Outcomes) {
        if other.animals_rescued.is_some() {
            self.animals_rescued = other.animals_rescued;
        }
        if other.animals_treated.is_some() {
            self.animals_treated = other.animals_treated;
        }
        if other.animals_adopted.is_some() {
            self.animals_adopted = other.animals_adopted;
        }
        if other.summary.is_some() {
            self.summary = other.summary;
        }
        if other.challenges.is_some() {
            self.challenges = other.challenges;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RescueDate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned: Option<DateTime<Utc>>,
    /// Stamped when the rescue moves to `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<DateTime<Utc>>,
}

// =============================================================================
// Rescue
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rescue {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// User id of the owning NGO.
    pub ngo: String,
    pub status: RescueStatus,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub animals: Vec<RescuedAnimal>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub funding: Funding,
    #[serde(default)]
    pub updates: Vec<ProgressUpdate>,
    #[serde(default)]
    pub outcomes: Outcomes,
    #[serde(default)]
    pub rescue_date: RescueDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rescue {
    pub fn is_team_member(&self, user_id: &str) -> bool {
        self.team.iter().any(|t| t.member == user_id)
    }
}

/// Fields supplied when creating a rescue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRescue {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Honoured for admins only; an NGO always owns what it creates.
    pub ngo: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub animals: Vec<RescuedAnimal>,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub funding_required: Money,
    pub planned_date: Option<DateTime<Utc>>,
}

impl NewRescue {
    pub fn into_rescue(self, ngo: &str) -> Rescue {
        let now = Utc::now();
        Rescue {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title.trim().to_string(),
            description: self.description,
            ngo: ngo.to_string(),
            status: RescueStatus::Planning,
            location: self.location,
            animals: self.animals,
            team: Vec::new(),
            resources: self.resources,
            funding: Funding {
                required: self.funding_required,
                ..Default::default()
            },
            updates: Vec::new(),
            outcomes: Outcomes::default(),
            rescue_date: RescueDate {
                planned: self.planned_date,
                actual: None,
            },
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable details of a rescue. Status, team, funding totals, updates and
/// outcomes have their own operations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub animals: Option<Vec<RescuedAnimal>>,
    pub resources: Option<Resources>,
    pub funding_required: Option<Money>,
    pub planned_date: Option<DateTime<Utc>>,
}

impl RescuePatch {
    pub fn apply_to(self, rescue: &mut Rescue) {
        if let Some(title) = self.title {
            rescue.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            rescue.description = description;
        }
        if let Some(location) = self.location {
            rescue.location = location;
        }
        if let Some(animals) = self.animals {
            rescue.animals = animals;
        }
        if let Some(resources) = self.resources {
            rescue.resources = resources;
        }
        if let Some(required) = self.funding_required {
            rescue.funding.required = required;
        }
        if let Some(planned) = self.planned_date {
            rescue.rescue_date.planned = Some(planned);
        }
        rescue.updated_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
