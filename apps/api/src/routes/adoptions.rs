//! # Adoption Routes
//!
//! ## Lifecycle
//! ```text
//! POST /api/adoptions ─────────► pending ──(provider)──► approved ──► completed
//!   pet: available → pending        │                        │        pet: adopted
//!                                   ├──(provider)──► rejected│
//!                                   │   pet: available       │
//!                                   └──(any party)──► cancelled ◄─────┘
//!                                       pet: available
//! ```
//!
//! Every step that touches both the adoption and its pet runs in one
//! [`UnitOfWork`](pawmart_db::UnitOfWork).
//!
//! ```text
//! GET  /api/adoptions                   auth   scoped by role
//! POST /api/adoptions                   auth   { pet, applicationDetails }
//! GET  /api/adoptions/{id}              applicant | provider | admin
//! PUT  /api/adoptions/{id}/status       { status, reason? }
//! POST /api/adoptions/{id}/messages     { text }
//! POST /api/adoptions/{id}/notes        { text }                provider | admin
//! POST /api/adoptions/{id}/follow-up    { notes, petCondition?, images }
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
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Resource, Subject};
use pawmart_core::types::{
    Adoption, AdoptionStatus, ApplicationDetails, FollowUp, Message, Note, Pet, Role,
};
use pawmart_core::validation::validate_text;
use pawmart_core::workflow::adoption;
use pawmart_db::AdoptionQuery;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_adoptions).post(create_adoption))
        .route("/{id}", get(get_adoption))
        .route("/{id}/status", put(update_status))
        .route("/{id}/messages", post(add_message))
        .route("/{id}/notes", post(add_note))
        .route("/{id}/follow-up", post(add_follow_up))
}

fn adoption_resource(a: &Adoption) -> Resource<'_> {
    Resource::Adoption {
        applicant: &a.applicant,
        provider: &a.provider,
    }
}

/// Loads an adoption the caller may act on with `action`.
async fn load_for(
    state: &AppState,
    subject: &Subject,
    id: &str,
    action: Action,
) -> ApiResult<Adoption> {
    check_id(id, "Adoption")?;
    let adoption = state.db.adoptions().get(id).await?;
    authorize(subject, action, &adoption_resource(&adoption))?;
    Ok(adoption)
}

// =============================================================================
// Listing and Reading
// =============================================================================

#[derive(Debug, Deserialize)]
struct AdoptionListParams {
    status: Option<AdoptionStatus>,
    pet: Option<String>,
    applicant: Option<String>,
    provider: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_adoptions(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiQuery(params): ApiQuery<AdoptionListParams>,
) -> ApiResult<Json<Value>> {
    let mut query = AdoptionQuery {
        status: params.status,
        pet: params.pet,
        applicant: params.applicant,
        provider: params.provider,
    };

    match subject.role {
        Role::Admin => {}
        role if role.is_provider() => query.provider = Some(subject.user_id.clone()),
        _ => query.applicant = Some(subject.user_id.clone()),
    }

    let page = state
        .db
        .adoptions()
        .list(&query, page_request(params.page, params.limit))
        .await?;
    collection("adoptions", page)
}

async fn get_adoption(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Adoption>> {
    let adoption = load_for(&state, &subject, &id, Action::ReadAdoption).await?;
    Ok(Json(adoption))
}

// =============================================================================
// Workflow
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAdoptionRequest {
    #[serde(alias = "petId")]
    pet: String,
    #[serde(default)]
    application_details: ApplicationDetails,
}

async fn create_adoption(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(req): ApiJson<CreateAdoptionRequest>,
) -> ApiResult<(StatusCode, Json<Adoption>)> {
    check_id(&req.pet, "Pet")?;

    let mut uow = state.db.begin().await?;
    let mut pet: Pet = uow.fetch(&req.pet).await?;
    let has_active = uow.has_active_adoption(&pet.id, &subject.user_id).await?;
    adoption::check_can_apply(&pet, &subject.user_id, has_active)?;

    let application = Adoption::new(
        &pet.id,
        &subject.user_id,
        &pet.provider,
        req.application_details,
    );
    adoption::hold_pet(&mut pet, application.created_at);

    uow.insert(&application).await?;
    uow.replace(&pet).await?;
    uow.commit().await?;

    info!(
        adoption_id = %application.id,
        pet_id = %pet.id,
        applicant = %application.applicant,
        "Adoption application filed"
    );
    Ok((StatusCode::CREATED, Json(application)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest {
    status: AdoptionStatus,
    #[serde(alias = "rejectionReason")]
    reason: Option<String>,
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<Adoption>> {
    check_id(&id, "Adoption")?;

    let mut uow = state.db.begin().await?;
    let mut application: Adoption = uow.fetch(&id).await?;
    authorize(
        &subject,
        Action::SetAdoptionStatus(req.status),
        &adoption_resource(&application),
    )?;

    let transition = adoption::next_state(application.status, req.status)?;
    let mut pet: Pet = uow.fetch(&application.pet).await?;
    adoption::apply(transition, &mut application, &mut pet, req.reason, Utc::now());

    uow.replace(&application).await?;
    uow.replace(&pet).await?;
    uow.commit().await?;

    info!(
        adoption_id = %application.id,
        from = %transition.from,
        to = %transition.to,
        pet_status = %pet.status,
        "Adoption status changed"
    );
    Ok(Json(application))
}

// =============================================================================
// Conversation, Notes and Follow-ups
// =============================================================================

#[derive(Debug, Deserialize)]
struct TextRequest {
    #[serde(default)]
    text: String,
}

async fn add_message(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TextRequest>,
) -> ApiResult<Json<Adoption>> {
    validate_text("text", &req.text)?;
    load_for(&state, &subject, &id, Action::MessageAdoption).await?;

    let message = Message {
        sender: subject.user_id.clone(),
        text: req.text.trim().to_string(),
        timestamp: Utc::now(),
    };
    Ok(Json(state.db.adoptions().add_message(&id, &message).await?))
}

async fn add_note(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TextRequest>,
) -> ApiResult<Json<Adoption>> {
    validate_text("text", &req.text)?;
    load_for(&state, &subject, &id, Action::AddAdoptionNote).await?;

    let note = Note {
        author: subject.user_id.clone(),
        text: req.text.trim().to_string(),
        created_at: Utc::now(),
    };
    Ok(Json(state.db.adoptions().add_note(&id, &note).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FollowUpRequest {
    #[serde(default)]
    notes: String,
    pet_condition: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

async fn add_follow_up(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<FollowUpRequest>,
) -> ApiResult<Json<Adoption>> {
    validate_text("notes", &req.notes)?;
    let application = load_for(&state, &subject, &id, Action::AddFollowUp).await?;
    adoption::check_follow_up_allowed(application.status)?;

    let follow_up = FollowUp {
        author: subject.user_id.clone(),
        notes: req.notes.trim().to_string(),
        pet_condition: req.pet_condition,
        images: req.images,
        date: Utc::now(),
    };
    Ok(Json(
        state.db.adoptions().add_follow_up(&id, &follow_up).await?,
    ))
}
