//! # Rescue Repository
//!
//! Rescue operations, their teams, progress updates and donations.
//!
//! ## Donations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/rescues/:id/donate  { amount: 5000, ... }                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE rescues SET doc = json_set(                                     │
//! │      json_insert(doc, '$.funding.donations[#]', json(?)),               │
//! │      '$.funding.raised', raised + ?,                                    │
//! │      '$.updatedAt', ?)                                                  │
//! │  WHERE id = ?                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  One statement: concurrent donations can never lose an increment        │
//! │  or record a donation without counting it.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::document;
use crate::error::{DbError, DbResult};
use crate::filter::{Filter, Page, Sort};
use crate::unit_of_work::now_rfc3339;
use pawmart_core::types::{
    Donation, Funding, Outcomes, PageRequest, ProgressUpdate, Rescue, RescueStatus, TeamMember,
};

const APPENDED_FIELDS: &[&str] = &["$.funding", "$.team", "$.updates", "$.outcomes"];

#[derive(Debug, Clone, Default)]
pub struct RescueQuery {
    pub status: Option<RescueStatus>,
    pub ngo: Option<String>,
    /// Case-insensitive substrings of the rescue location.
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl RescueQuery {
    fn filter(&self) -> Filter {
        Filter::new()
            .eq_opt("$.status", self.status.map(|s| s.as_str()))
            .eq_opt("$.ngo", self.ngo.clone())
            .contains_opt("$.location.city", self.city.as_deref())
            .contains_opt("$.location.state", self.state.as_deref())
            .contains_opt("$.location.country", self.country.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct RescueRepository {
    pool: SqlitePool,
}

impl RescueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RescueRepository { pool }
    }

    pub async fn create(&self, rescue: &Rescue) -> DbResult<()> {
        info!(rescue_id = %rescue.id, ngo = %rescue.ngo, "Creating rescue");
        document::insert(&self.pool, rescue).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Rescue> {
        document::fetch(&self.pool, id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Rescue>> {
        document::get(&self.pool, id).await
    }

    /// Writes the owner-edited fields. Funding, team, updates and outcomes
    /// keep their stored values.
    pub async fn update(&self, rescue: &Rescue) -> DbResult<()> {
        document::replace_keeping(&self.pool, rescue, APPENDED_FIELDS).await
    }

    /// Shallow-merges `outcomes` into the stored ones and returns the rescue.
    pub async fn merge_outcomes(&self, id: &str, outcomes: Outcomes) -> DbResult<Rescue> {
        let mut tx = self.pool.begin().await?;
        let mut rescue: Rescue = document::fetch(&mut *tx, id).await?;
        rescue.outcomes.merge(outcomes);
        document::set_field::<Rescue>(&mut *tx, id, "$.outcomes", &rescue.outcomes).await?;
        tx.commit().await?;

        debug!(rescue_id = %id, "Outcomes merged");
        self.get(id).await
    }

    /// Lists rescues, newest first.
    pub async fn list(&self, query: &RescueQuery, page: PageRequest) -> DbResult<Page<Rescue>> {
        document::find(&self.pool, &query.filter(), Sort::Newest, page).await
    }

    /// Appends team members. Duplicates are kept.
    pub async fn add_team_members(&self, id: &str, members: &[TeamMember]) -> DbResult<Rescue> {
        let mut tx = self.pool.begin().await?;
        for member in members {
            document::append::<Rescue>(&mut *tx, id, "$.team", member).await?;
        }
        tx.commit().await?;

        debug!(rescue_id = %id, added = members.len(), "Team members added");
        self.get(id).await
    }

    pub async fn add_update(&self, id: &str, update: &ProgressUpdate) -> DbResult<Rescue> {
        document::append::<Rescue>(&self.pool, id, "$.updates", update).await?;
        self.get(id).await
    }

    /// Records a donation and raises `funding.raised` by its amount in the
    /// same statement. Returns the new funding block.
    ///
    /// ## Errors
    /// - `NotFound` when the rescue does not exist
    /// - `Conflict` when `raised` would no longer fit in an `i64`
    pub async fn add_donation(&self, id: &str, donation: &Donation) -> DbResult<Funding> {
        let amount = donation.amount.cents();
        let result = sqlx::query(
            r#"
            UPDATE rescues
            SET doc = json_set(
                json_insert(doc, '$.funding.donations[#]', json(?2)),
                '$.funding.raised', coalesce(json_extract(doc, '$.funding.raised'), 0) + ?3,
                '$.updatedAt', ?4)
            WHERE id = ?1 AND coalesce(json_extract(doc, '$.funding.raised'), 0) <= ?5
            "#,
        )
        .bind(id)
        .bind(serde_json::to_string(donation)?)
        .bind(amount)
        .bind(now_rfc3339())
        .bind(i64::MAX.saturating_sub(amount))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find(id).await? {
                Some(_) => Err(DbError::conflict("Funding limit reached")),
                None => Err(DbError::not_found("Rescue", id)),
            };
        }

        info!(
            rescue_id = %id,
            amount = donation.amount.cents(),
            anonymous = donation.anonymous_donor.is_some(),
            "Donation recorded"
        );

        Ok(self.get(id).await?.funding)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use pawmart_core::types::{AnonymousDonor, Location, NewRescue};
    use pawmart_core::Money;

    fn rescue_in(city: &str) -> Rescue {
        NewRescue {
            title: "River flood".to_string(),
            description: String::new(),
            ngo: None,
            location: Location {
                city: Some(city.to_string()),
                ..Default::default()
            },
            animals: vec![],
            resources: Default::default(),
            funding_required: Money::from_cents(100_000),
            planned_date: None,
        }
        .into_rescue("ngo-1")
    }

    fn donation(amount: i64, donor: Option<&str>) -> Donation {
        Donation {
            donor: donor.map(str::to_string),
            anonymous_donor: match donor {
                Some(_) => None,
                None => Some(AnonymousDonor {
                    name: "A friend".to_string(),
                    email: None,
                }),
            },
            amount: Money::from_cents(amount),
            message: None,
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_donations_accumulate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rescue = rescue_in("Porto");
        db.rescues().create(&rescue).await.unwrap();

        db.rescues().add_donation(&rescue.id, &donation(5000, None)).await.unwrap();
        db.rescues()
            .add_donation(&rescue.id, &donation(2500, Some("buyer-1")))
            .await
            .unwrap();
        let funding = db
            .rescues()
            .add_donation(&rescue.id, &donation(125, None))
            .await
            .unwrap();

        assert_eq!(funding.raised, Money::from_cents(7625));
        assert_eq!(funding.required, Money::from_cents(100_000));
        assert_eq!(funding.donations.len(), 3);
        assert!(funding.donations[0].donor.is_none());
        assert_eq!(funding.donations[1].donor.as_deref(), Some("buyer-1"));
    }

    #[tokio::test]
    async fn test_edit_from_stale_copy_keeps_donations() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rescue = rescue_in("Porto");
        db.rescues().create(&rescue).await.unwrap();

        let mut stale = db.rescues().get(&rescue.id).await.unwrap();
        db.rescues().add_donation(&rescue.id, &donation(5000, None)).await.unwrap();

        stale.status = RescueStatus::InProgress;
        stale.title = "River flood, phase two".to_string();
        db.rescues().update(&stale).await.unwrap();

        let stored = db.rescues().get(&rescue.id).await.unwrap();
        assert_eq!(stored.status, RescueStatus::InProgress);
        assert_eq!(stored.title, "River flood, phase two");
        assert_eq!(stored.funding.raised, Money::from_cents(5000));
        assert_eq!(stored.funding.donations.len(), 1);
    }

    #[tokio::test]
    async fn test_outcomes_merge_is_shallow() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rescue = rescue_in("Porto");
        db.rescues().create(&rescue).await.unwrap();

        db.rescues()
            .merge_outcomes(
                &rescue.id,
                Outcomes {
                    animals_rescued: Some(12),
                    summary: Some("All dogs out".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let merged = db
            .rescues()
            .merge_outcomes(
                &rescue.id,
                Outcomes {
                    animals_treated: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(merged.outcomes.animals_rescued, Some(12));
        assert_eq!(merged.outcomes.animals_treated, Some(4));
        assert_eq!(merged.outcomes.summary.as_deref(), Some("All dogs out"));
    }

    #[tokio::test]
    async fn test_donation_past_i64_is_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rescue = rescue_in("Porto");
        db.rescues().create(&rescue).await.unwrap();

        let big = 5_000_000_000_000_000_000;
        db.rescues().add_donation(&rescue.id, &donation(big, None)).await.unwrap();
        let err = db
            .rescues()
            .add_donation(&rescue.id, &donation(big, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        // The stored document still decodes.
        let stored = db.rescues().get(&rescue.id).await.unwrap();
        assert_eq!(stored.funding.raised.cents(), big);
        assert_eq!(stored.funding.donations.len(), 1);
    }

    #[tokio::test]
    async fn test_donation_to_missing_rescue() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .rescues()
            .add_donation("missing", &donation(100, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_location_filter_is_case_insensitive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.rescues().create(&rescue_in("Porto Alegre")).await.unwrap();
        db.rescues().create(&rescue_in("Lisbon")).await.unwrap();

        let query = RescueQuery {
            city: Some("porto".to_string()),
            ..Default::default()
        };
        let page = db.rescues().list(&query, PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].location.city.as_deref(), Some("Porto Alegre"));
    }

    #[tokio::test]
    async fn test_team_and_updates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rescue = rescue_in("Porto");
        db.rescues().create(&rescue).await.unwrap();

        let member = TeamMember {
            member: "vol-1".to_string(),
            role: "driver".to_string(),
        };
        let updated = db
            .rescues()
            .add_team_members(&rescue.id, &[member.clone(), member])
            .await
            .unwrap();
        assert_eq!(updated.team.len(), 2);
        assert!(updated.is_team_member("vol-1"));

        let update = ProgressUpdate {
            author: "vol-1".to_string(),
            content: "Reached the site".to_string(),
            images: vec![],
            date: Utc::now(),
        };
        let updated = db.rescues().add_update(&rescue.id, &update).await.unwrap();
        assert_eq!(updated.updates.len(), 1);
    }
}
