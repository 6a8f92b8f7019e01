//! Pet listings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::Location;
use crate::money::Money;

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Fish,
    Reptile,
    Other,
}

impl Species {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Bird => "bird",
            Species::Rabbit => "rabbit",
            Species::Fish => "fish",
            Species::Reptile => "reptile",
            Species::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl PetSize {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PetSize::Small => "small",
            PetSize::Medium => "medium",
            PetSize::Large => "large",
            PetSize::ExtraLarge => "extra_large",
        }
    }
}

impl Default for PetSize {
    fn default() -> Self {
        PetSize::Medium
    }
}

/// Availability of a pet.
///
/// ```text
/// available ──(application filed)──► pending ──(completed)──► adopted
///     ▲                                 │
///     └──────(rejected / cancelled)─────┘
/// ```
///
/// Only the adoption workflow moves a pet between these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Adopted,
}

impl PetStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Adopted => "adopted",
        }
    }
}

impl Default for PetStatus {
    fn default() -> Self {
        PetStatus::Available
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pet
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    #[serde(default)]
    pub vaccinated: bool,
    #[serde(default)]
    pub neutered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_notes: Option<String>,
}

/// An adoptable pet listed by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub species: Species,
    pub breed: String,
    /// Age in whole years.
    pub age: u32,
    pub gender: Gender,
    pub size: PetSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub health: Health,
    pub adoption_fee: Money,
    pub status: PetStatus,
    /// User id of the listing seller or ngo (or the admin who created it).
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adopted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adoption_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when listing a new pet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub breed: String,
    pub age: u32,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub size: PetSize,
    pub color: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub health: Health,
    #[serde(default)]
    pub adoption_fee: Money,
    pub location: Option<Location>,
}

impl NewPet {
    /// Creates an `available` pet owned by `provider`.
    pub fn into_pet(self, provider: &str) -> Pet {
        let now = Utc::now();
        Pet {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            species: self.species,
            breed: self.breed,
            age: self.age,
            gender: self.gender,
            size: self.size,
            color: self.color,
            description: self.description,
            images: self.images,
            health: self.health,
            adoption_fee: self.adoption_fee,
            status: PetStatus::Available,
            provider: provider.to_string(),
            adopted_by: None,
            adoption_date: None,
            location: self.location,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Descriptive fields a pet's owner may edit.
///
/// `status`, `provider`, `adoptedBy` and `adoptionDate` are owned by the
/// adoption workflow and are not part of this patch; such keys in a
/// request body are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetPatch {
    pub name: Option<String>,
    pub species: Option<Species>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub size: Option<PetSize>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub health: Option<Health>,
    pub adoption_fee: Option<Money>,
    pub location: Option<Location>,
}

impl PetPatch {
    pub fn apply_to(self, pet: &mut Pet) {
        if let Some(name) = self.name {
            pet.name = name.trim().to_string();
        }
        if let Some(species) = self.species {
            pet.species = species;
        }
        if let Some(breed) = self.breed {
            pet.breed = breed;
        }
        if let Some(age) = self.age {
            pet.age = age;
        }
        if let Some(gender) = self.gender {
            pet.gender = gender;
        }
        if let Some(size) = self.size {
            pet.size = size;
        }
        if let Some(color) = self.color {
            pet.color = Some(color);
        }
        if let Some(description) = self.description {
            pet.description = description;
        }
        if let Some(images) = self.images {
            pet.images = images;
        }
        if let Some(health) = self.health {
            pet.health = health;
        }
        if let Some(fee) = self.adoption_fee {
            pet.adoption_fee = fee;
        }
        if let Some(location) = self.location {
            pet.location = Some(location);
        }
        pet.updated_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
