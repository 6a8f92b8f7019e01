//! # Pet Repository
//!
//! Pet listings. Status changes driven by adoptions go through a
//! [`UnitOfWork`](crate::UnitOfWork); this repository handles listing
//! CRUD and the public catalog query.
//!
//! ## Catalog Query
//! ```text
//! GET /api/pets?species=dog&breed=lab&minAge=1&maxAge=5&sort=-age&page=2
//!        │
//!        ▼
//! PetQuery { species, breed, min_age, max_age, gender, size, status,
//!            provider, sort }
//!        │
//!        ▼
//! WHERE species = ? AND instr(lower(breed), lower(?)) > 0
//!   AND age >= ? AND age <= ?
//! ORDER BY age DESC, created_at DESC
//! LIMIT 10 OFFSET 10
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::document;
use crate::error::DbResult;
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{Gender, PageRequest, Pet, PetSize, PetStatus, Species};

const ADOPTION_FIELDS: &[&str] = &["$.status", "$.adoptedBy", "$.adoptionDate"];

/// Catalog ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PetSort {
    #[default]
    Newest,
    Oldest,
    Age,
    AgeDesc,
    Fee,
    FeeDesc,
}

impl PetSort {
    /// Parses the `sort` query parameter. Unknown values sort newest first.
    pub fn from_param(param: &str) -> Self {
        match param {
            "oldest" => PetSort::Oldest,
            "age" => PetSort::Age,
            "-age" => PetSort::AgeDesc,
            "fee" => PetSort::Fee,
            "-fee" => PetSort::FeeDesc,
            _ => PetSort::Newest,
        }
    }

    fn to_sort(self) -> Sort {
        match self {
            PetSort::Newest => Sort::Newest,
            PetSort::Oldest => Sort::Oldest,
            PetSort::Age => Sort::asc("$.age"),
            PetSort::AgeDesc => Sort::desc("$.age"),
            PetSort::Fee => Sort::asc("$.adoptionFee"),
            PetSort::FeeDesc => Sort::desc("$.adoptionFee"),
        }
    }
}

/// Filters accepted by the pet catalog. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct PetQuery {
    pub species: Option<Species>,
    /// Case-insensitive substring.
    pub breed: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub gender: Option<Gender>,
    pub size: Option<PetSize>,
    pub status: Option<PetStatus>,
    pub provider: Option<String>,
    pub sort: PetSort,
}

impl PetQuery {
    fn filter(&self) -> Filter {
        Filter::new()
            .eq_opt("$.species", self.species.map(|s| s.as_str()))
            .contains_opt("$.breed", self.breed.as_deref())
            .gte_opt("$.age", self.min_age)
            .lte_opt("$.age", self.max_age)
            .eq_opt("$.gender", self.gender.map(|g| g.as_str()))
            .eq_opt("$.size", self.size.map(|s| s.as_str()))
            .eq_opt("$.status", self.status.map(|s| s.as_str()))
            .eq_opt("$.provider", self.provider.clone())
    }
}

#[derive(Debug, Clone)]
pub struct PetRepository {
    pool: SqlitePool,
}

impl PetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PetRepository { pool }
    }

    pub async fn create(&self, pet: &Pet) -> DbResult<()> {
        debug!(pet_id = %pet.id, provider = %pet.provider, "Creating pet");
        document::insert(&self.pool, pet).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Pet> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Pet>> {
        document::get(&self.pool, id).await
    }

    /// Writes listing changes. Adoption-owned fields keep their stored
    /// values; only a [`UnitOfWork`](crate::UnitOfWork) moves them.
    pub async fn update(&self, pet: &Pet) -> DbResult<()> {
        document::replace_keeping(&self.pool, pet, ADOPTION_FIELDS).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(pet_id = %id, "Deleting pet");
        document::delete::<Pet>(&self.pool, id).await
    }

    pub async fn list(&self, query: &PetQuery, page: PageRequest) -> DbResult<Page<Pet>> {
        document::find(&self.pool, &query.filter(), query.sort.to_sort(), page).await
    }

    /// Loads the given pets, skipping ids that no longer exist.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Pet>> {
        document::get_many(&self.pool, ids).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
