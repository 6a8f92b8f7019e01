//! # Pet Catalog Routes
//!
//! ```text
//! GET    /api/pets        public   filters + sort + pagination
//! POST   /api/pets        seller | ngo | admin
//! GET    /api/pets/{id}   public
//! PUT    /api/pets/{id}   provider | admin   descriptive fields only
//! DELETE /api/pets/{id}   provider | admin   refused while an adoption is
//!                                            active or the pet is adopted
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{check_id, collection, page_request};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Resource};
use pawmart_core::types::{Gender, NewPet, Pet, PetPatch, PetSize, PetStatus, Species};
use pawmart_core::validation::{validate_name, validate_price_cents, Validator};
use pawmart_db::{PetQuery, PetSort};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pets).post(create_pet))
        .route("/{id}", get(get_pet).put(update_pet).delete(delete_pet))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PetListParams {
    species: Option<Species>,
    breed: Option<String>,
    min_age: Option<u32>,
    max_age: Option<u32>,
    gender: Option<Gender>,
    size: Option<PetSize>,
    status: Option<PetStatus>,
    provider: Option<String>,
    sort: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_pets(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PetListParams>,
) -> ApiResult<Json<Value>> {
    let query = PetQuery {
        species: params.species,
        breed: params.breed,
        min_age: params.min_age,
        max_age: params.max_age,
        gender: params.gender,
        size: params.size,
        status: params.status,
        provider: params.provider,
        sort: params
            .sort
            .as_deref()
            .map(PetSort::from_param)
            .unwrap_or_default(),
    };

    let page = state
        .db
        .pets()
        .list(&query, page_request(params.page, params.limit))
        .await?;
    collection("pets", page)
}

async fn create_pet(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(new): ApiJson<NewPet>,
) -> ApiResult<(StatusCode, Json<Pet>)> {
    authorize(&subject, Action::CreatePet, &Resource::None)?;

    Validator::new()
        .check(validate_name("name", &new.name))
        .check(validate_price_cents("adoptionFee", new.adoption_fee.cents()))
        .finish()?;

    let pet = new.into_pet(&subject.user_id);
    state.db.pets().create(&pet).await?;

    info!(pet_id = %pet.id, provider = %pet.provider, "Pet listed");
    Ok((StatusCode::CREATED, Json(pet)))
}

async fn get_pet(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Pet>> {
    check_id(&id, "Pet")?;
    Ok(Json(state.db.pets().get(&id).await?))
}

async fn update_pet(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<PetPatch>,
) -> ApiResult<Json<Pet>> {
    check_id(&id, "Pet")?;
    let mut pet = state.db.pets().get(&id).await?;
    authorize(
        &subject,
        Action::UpdatePet,
        &Resource::Pet {
            provider: &pet.provider,
        },
    )?;

    let mut validator = Validator::new();
    if let Some(name) = &patch.name {
        validator.check(validate_name("name", name));
    }
    if let Some(fee) = patch.adoption_fee {
        validator.check(validate_price_cents("adoptionFee", fee.cents()));
    }
    validator.finish()?;

    patch.apply_to(&mut pet);
    state.db.pets().update(&pet).await?;
    Ok(Json(state.db.pets().get(&id).await?))
}

async fn delete_pet(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    check_id(&id, "Pet")?;

    let mut uow = state.db.begin().await?;
    let pet: Pet = uow.fetch(&id).await?;
    authorize(
        &subject,
        Action::DeletePet,
        &Resource::Pet {
            provider: &pet.provider,
        },
    )?;

    if pet.status == PetStatus::Adopted {
        return Err(ApiError::bad_request("Adopted pets cannot be removed"));
    }
    if uow.count_active_adoptions(&pet.id).await? > 0 {
        return Err(ApiError::bad_request(
            "Pet has an active adoption application",
        ));
    }

    uow.delete::<Pet>(&pet.id).await?;
    uow.commit().await?;

    info!(pet_id = %pet.id, "Pet removed");
    Ok(Json(json!({ "message": "Pet removed" })))
}
