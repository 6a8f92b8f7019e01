//! # Adoption Repository
//!
//! Applications, their conversation thread, provider notes and
//! post-adoption follow-ups.
//!
//! Creating an application and changing its status also change the pet,
//! so those run through a [`UnitOfWork`](crate::UnitOfWork). The appends
//! here touch only the adoption document and are single statements:
//!
//! ```text
//! UPDATE adoptions
//! SET doc = json_set(json_insert(doc, '$.messages[#]', json(?)), '$.updatedAt', ?)
//! WHERE id = ?
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::document;
use crate::error::DbResult;
use crate::filter::{Filter, Page, Sort};
use pawmart_core::types::{Adoption, AdoptionStatus, FollowUp, Message, Note, PageRequest};

/// Listing filters. The API fills `applicant` or `provider` from the
/// caller's role before adding user-supplied filters.
#[derive(Debug, Clone, Default)]
pub struct AdoptionQuery {
    pub status: Option<AdoptionStatus>,
    pub pet: Option<String>,
    pub applicant: Option<String>,
    pub provider: Option<String>,
}

impl AdoptionQuery {
    fn filter(&self) -> Filter {
        Filter::new()
            .eq_opt("$.status", self.status.map(|s| s.as_str()))
            .eq_opt("$.pet", self.pet.clone())
            .eq_opt("$.applicant", self.applicant.clone())
            .eq_opt("$.provider", self.provider.clone())
    }
}

#[derive(Debug, Clone)]
pub struct AdoptionRepository {
    pool: SqlitePool,
}

impl AdoptionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AdoptionRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Adoption> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Adoption>> {
        document::get(&self.pool, id).await
    }

    /// Lists applications, newest first.
    pub async fn list(&self, query: &AdoptionQuery, page: PageRequest) -> DbResult<Page<Adoption>> {
        document::find(&self.pool, &query.filter(), Sort::Newest, page).await
    }

    pub async fn add_message(&self, id: &str, message: &Message) -> DbResult<Adoption> {
        debug!(adoption_id = %id, sender = %message.sender, "Appending message");
        document::append::<Adoption>(&self.pool, id, "$.messages", message).await?;
        self.get(id).await
    }

    pub async fn add_note(&self, id: &str, note: &Note) -> DbResult<Adoption> {
        debug!(adoption_id = %id, author = %note.author, "Appending note");
        document::append::<Adoption>(&self.pool, id, "$.notes", note).await?;
        self.get(id).await
    }

    pub async fn add_follow_up(&self, id: &str, follow_up: &FollowUp) -> DbResult<Adoption> {
        debug!(adoption_id = %id, author = %follow_up.author, "Appending follow-up");
        document::append::<Adoption>(&self.pool, id, "$.followUp", follow_up).await?;
        self.get(id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
