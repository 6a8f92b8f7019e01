//! # Rescue Routes
//!
//! ```text
//! GET  /api/rescues                  public   status, ngo, city, state, country
//! POST /api/rescues                  ngo | admin
//! GET  /api/rescues/{id}             public
//! PUT  /api/rescues/{id}             owning ngo | admin   details
//! PUT  /api/rescues/{id}/status      owning ngo | admin
//! PUT  /api/rescues/{id}/outcomes    owning ngo | admin   shallow merge
//! POST /api/rescues/{id}/team        owning ngo | admin   { members: [...] }
//! POST /api/rescues/{id}/updates     team | owning ngo | admin
//! POST /api/rescues/{id}/donate      auth, or anonymous with a donor name
//! ```
//!
//! ## Donations
//! ```text
//! { amount, message?, anonymous?, anonymousDonor? }
//!        │
//!        ├── anonymous = true  ──► donor never recorded (even with a token)
//!        │                         anonymousDonor.name required
//!        │
//!        └── otherwise ──► token required (401), donor = caller
//!
//! append donation + raised += amount   (one UPDATE statement)
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{check_id, collection, page_request};
use crate::auth::{AuthError, AuthUser, OptionalAuth};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Resource, Subject};
use pawmart_core::types::{
    AnonymousDonor, Donation, Funding, NewRescue, Outcomes, ProgressUpdate, Rescue, RescuePatch,
    RescueStatus, Role, TeamMember,
};
use pawmart_core::validation::{
    validate_donation_amount, validate_name, validate_price_cents, validate_text, Validator,
};
use pawmart_core::workflow::rescue;
use pawmart_core::{Money, ValidationError};
use pawmart_db::RescueQuery;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rescues).post(create_rescue))
        .route("/{id}", get(get_rescue).put(update_rescue))
        .route("/{id}/status", put(update_status))
        .route("/{id}/outcomes", put(update_outcomes))
        .route("/{id}/team", post(add_team_members))
        .route("/{id}/updates", post(add_update))
        .route("/{id}/donate", post(donate))
}

/// Loads a rescue the caller may act on with `action`.
async fn load_for(
    state: &AppState,
    subject: &Subject,
    id: &str,
    action: Action,
) -> ApiResult<Rescue> {
    check_id(id, "Rescue")?;
    let rescue = state.db.rescues().get(id).await?;
    authorize(
        subject,
        action,
        &Resource::Rescue {
            ngo: &rescue.ngo,
            team: &rescue.team,
        },
    )?;
    Ok(rescue)
}

// =============================================================================
// Listing and Reading
// =============================================================================

#[derive(Debug, Deserialize)]
struct RescueListParams {
    status: Option<RescueStatus>,
    ngo: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_rescues(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RescueListParams>,
) -> ApiResult<Json<Value>> {
    let query = RescueQuery {
        status: params.status,
        ngo: params.ngo,
        city: params.city,
        state: params.state,
        country: params.country,
    };
    let page = state
        .db
        .rescues()
        .list(&query, page_request(params.page, params.limit))
        .await?;
    collection("rescues", page)
}

async fn get_rescue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Rescue>> {
    check_id(&id, "Rescue")?;
    Ok(Json(state.db.rescues().get(&id).await?))
}

// =============================================================================
// Management
// =============================================================================

async fn create_rescue(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(new): ApiJson<NewRescue>,
) -> ApiResult<(StatusCode, Json<Rescue>)> {
    authorize(&subject, Action::CreateRescue, &Resource::None)?;

    Validator::new()
        .check(validate_name("title", &new.title))
        .check(validate_price_cents(
            "fundingRequired",
            new.funding_required.cents(),
        ))
        .finish()?;

    // NGOs always run their own rescues; admins may assign one.
    let ngo = match (subject.role, new.ngo.as_deref()) {
        (Role::Admin, Some(ngo)) if ngo != subject.user_id => {
            if !state.db.users().exists(ngo).await? {
                return Err(ApiError::not_found("User"));
            }
            ngo.to_string()
        }
        _ => subject.user_id.clone(),
    };

    let rescue = new.into_rescue(&ngo);
    state.db.rescues().create(&rescue).await?;

    info!(rescue_id = %rescue.id, ngo = %rescue.ngo, "Rescue created");
    Ok((StatusCode::CREATED, Json(rescue)))
}

async fn update_rescue(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<RescuePatch>,
) -> ApiResult<Json<Rescue>> {
    let mut validator = Validator::new();
    if let Some(title) = &patch.title {
        validator.check(validate_name("title", title));
    }
    if let Some(required) = patch.funding_required {
        validator.check(validate_price_cents("fundingRequired", required.cents()));
    }
    validator.finish()?;

    let mut rescue = load_for(&state, &subject, &id, Action::ManageRescue).await?;
    patch.apply_to(&mut rescue);
    state.db.rescues().update(&rescue).await?;
    Ok(Json(state.db.rescues().get(&id).await?))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: RescueStatus,
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<Rescue>> {
    let mut rescue = load_for(&state, &subject, &id, Action::ManageRescue).await?;

    let transition = rescue::next_state(rescue.status, req.status)?;
    rescue::apply(transition, &mut rescue, Utc::now());
    state.db.rescues().update(&rescue).await?;

    info!(
        rescue_id = %rescue.id,
        from = %transition.from,
        to = %transition.to,
        "Rescue status changed"
    );
    Ok(Json(state.db.rescues().get(&id).await?))
}

async fn update_outcomes(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(outcomes): ApiJson<Outcomes>,
) -> ApiResult<Json<Rescue>> {
    load_for(&state, &subject, &id, Action::ManageRescue).await?;
    Ok(Json(state.db.rescues().merge_outcomes(&id, outcomes).await?))
}

#[derive(Debug, Deserialize)]
struct TeamRequest {
    #[serde(default)]
    members: Vec<TeamMember>,
}

async fn add_team_members(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TeamRequest>,
) -> ApiResult<Json<Rescue>> {
    if req.members.is_empty() {
        return Err(ValidationError::Required {
            field: "members".to_string(),
        }
        .into());
    }
    load_for(&state, &subject, &id, Action::ManageRescue).await?;

    for member in &req.members {
        check_id(&member.member, "User")?;
        if !state.db.users().exists(&member.member).await? {
            return Err(ApiError::not_found("User"));
        }
    }

    let rescue = state.db.rescues().add_team_members(&id, &req.members).await?;
    info!(rescue_id = %id, added = req.members.len(), "Team members added");
    Ok(Json(rescue))
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    #[serde(default)]
    content: String,
    #[serde(default)]
    images: Vec<String>,
}

async fn add_update(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateRequest>,
) -> ApiResult<Json<Rescue>> {
    validate_text("content", &req.content)?;
    load_for(&state, &subject, &id, Action::PostRescueUpdate).await?;

    let update = ProgressUpdate {
        author: subject.user_id.clone(),
        content: req.content.trim().to_string(),
        images: req.images,
        date: Utc::now(),
    };
    Ok(Json(state.db.rescues().add_update(&id, &update).await?))
}

// =============================================================================
// Donations
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DonationRequest {
    amount: Money,
    message: Option<String>,
    #[serde(default)]
    anonymous: bool,
    anonymous_donor: Option<AnonymousDonor>,
}

async fn donate(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<DonationRequest>,
) -> ApiResult<Json<Funding>> {
    check_id(&id, "Rescue")?;
    validate_donation_amount(req.amount.cents())?;

    let (donor, anonymous_donor) = if req.anonymous {
        let donor = req
            .anonymous_donor
            .filter(|d| !d.name.trim().is_empty())
            .ok_or_else(|| ValidationError::Required {
                field: "anonymousDonor.name".to_string(),
            })?;
        (None, Some(donor))
    } else {
        let caller = caller.ok_or(AuthError::MissingToken)?;
        (Some(caller.user_id), None)
    };

    let donation = Donation {
        donor,
        anonymous_donor,
        amount: req.amount,
        message: req.message,
        date: Utc::now(),
    };
    let funding = state.db.rescues().add_donation(&id, &donation).await?;

    info!(
        rescue_id = %id,
        amount = donation.amount.cents(),
        raised = funding.raised.cents(),
        anonymous = req.anonymous,
        "Donation recorded"
    );
    Ok(Json(funding))
}
